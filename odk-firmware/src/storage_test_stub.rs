use core::ops::Range;

use embedded_storage::{ReadStorage, Storage};

extern crate std;

#[derive(Debug)]
pub enum StorageStubError {
    Unknown,
}

#[derive(Debug)]
pub enum Action {
    Read(u32, usize),
    Write(u32, std::vec::Vec<u8>),
}

/// Byte-addressed persistent store held in RAM.
///
/// `observer` sees every access and can fail it. Writes that land in `worn` are silently dropped,
/// which is how a failing cell looks to a verifying writer.
pub struct StorageStub<'f, const SIZE: usize> {
    pub buf: [u8; SIZE],
    #[allow(clippy::type_complexity)]
    pub observer: Option<&'f dyn Fn(Action, &mut [u8]) -> Result<(), StorageStubError>>,
    pub worn: Option<Range<usize>>,
    pub write_count: usize,
}
impl<const SIZE: usize> ReadStorage for StorageStub<'_, SIZE> {
    type Error = StorageStubError;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        if let Some(observer) = self.observer {
            observer(Action::Read(offset, bytes.len()), &mut self.buf)?;
        }
        let offset = offset as usize;
        let src = self
            .buf
            .get(offset..offset + bytes.len())
            .ok_or(StorageStubError::Unknown)?;
        bytes.copy_from_slice(src);

        Ok(())
    }

    fn capacity(&self) -> usize {
        self.buf.len()
    }
}
impl<const SIZE: usize> Storage for StorageStub<'_, SIZE> {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        if let Some(observer) = self.observer {
            observer(Action::Write(offset, bytes.into()), &mut self.buf)?;
        }
        self.write_count += 1;
        let offset = offset as usize;
        if offset + bytes.len() > SIZE {
            return Err(StorageStubError::Unknown);
        }

        for (i, b) in bytes.iter().enumerate() {
            let addr = offset + i;
            if !matches!(&self.worn, Some(r) if r.contains(&addr)) {
                self.buf[addr] = *b;
            }
        }

        Ok(())
    }
}
impl<const SIZE: usize> Default for StorageStub<'_, SIZE> {
    fn default() -> Self {
        Self {
            buf: [0xff; SIZE],
            observer: None,
            worn: None,
            write_count: 0,
        }
    }
}

pub type DefaultStorageStub = StorageStub<'static, 256>;

/// A store holding the factory configuration.
pub fn factory_config() -> crate::config::ConfigStore<DefaultStorageStub> {
    let mut stub = DefaultStorageStub::default();
    stub.buf[..crate::config::layout::LAYOUT_SIZE]
        .copy_from_slice(&crate::config::defaults::factory_image());
    let mut config = crate::config::ConfigStore::new(stub);
    config.load().unwrap();
    config
}

/// Set a parameter by its protocol address.
pub fn set_param<S: Storage>(
    config: &mut crate::config::ConfigStore<S>,
    mt: odk_common::sysex_message::MessageType,
    sub_type: u8,
    index: u8,
    value: u8,
) {
    let loc = crate::config::layout::locate(mt, sub_type, index).unwrap();
    config.set(loc, value).unwrap();
}
