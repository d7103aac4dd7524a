use embedded_storage::Storage;
use odk_common::globals::{hw_feature, hw_parameter, sw_feature};

use layout::{Location, LAYOUT_SIZE, SIGNATURE, SIGNATURE_ADDR};

pub mod defaults;
pub mod layout;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// The persistent store reported an error.
    Storage,
    /// The value read back differs from the value written.
    Mismatch,
}

/// Persistent configuration with an in-memory mirror.
///
/// Reads are served from the mirror. Every write goes to storage first, is read back and compared,
/// and only then lands in the mirror.
pub struct ConfigStore<S: Storage> {
    storage: S,
    mirror: [u8; LAYOUT_SIZE],
}

impl<S: Storage> ConfigStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            mirror: [0; LAYOUT_SIZE],
        }
    }

    /// Fill the mirror from storage, writing the factory configuration first if the store has
    /// never been initialized. Returns true when defaults were written.
    pub fn load(&mut self) -> Result<bool, StoreError> {
        let mut signature = [0; SIGNATURE.len()];
        self.storage
            .read(SIGNATURE_ADDR as u32, &mut signature)
            .map_err(|_| StoreError::Storage)?;

        let fresh = signature != SIGNATURE;
        if fresh {
            crate::info!("config signature missing; writing defaults");
            self.write_factory_defaults()?;
        }

        self.storage
            .read(0, &mut self.mirror)
            .map_err(|_| StoreError::Storage)?;
        Ok(fresh)
    }

    /// Write every default, then the signature.
    pub fn write_factory_defaults(&mut self) -> Result<(), StoreError> {
        let image = defaults::factory_image();
        let sig = SIGNATURE_ADDR as usize..SIGNATURE_ADDR as usize + SIGNATURE.len();
        for (address, value) in image.iter().enumerate() {
            if !sig.contains(&address) {
                self.set_byte(address, *value)?;
            }
        }
        for address in sig {
            self.set_byte(address, image[address])?;
        }
        Ok(())
    }

    pub fn get_byte(&self, address: usize) -> u8 {
        self.mirror.get(address).copied().unwrap_or(0)
    }

    pub fn set_byte(&mut self, address: usize, value: u8) -> Result<(), StoreError> {
        if address >= LAYOUT_SIZE {
            crate::warn!("config address {} out of range", address);
            return Err(StoreError::Storage);
        }
        self.storage
            .write(address as u32, &[value])
            .map_err(|_| StoreError::Storage)?;

        let mut back = [0];
        self.storage
            .read(address as u32, &mut back)
            .map_err(|_| StoreError::Storage)?;
        if back[0] != value {
            crate::warn!(
                "config write mismatch at {}: wrote {}, read {}",
                address,
                value,
                back[0]
            );
            return Err(StoreError::Mismatch);
        }

        self.mirror[address] = value;
        Ok(())
    }

    /// Value at `loc`; bit-packed fields read as 0 or 1.
    pub fn get(&self, loc: Location) -> u8 {
        let byte = self.get_byte(loc.offset as usize);
        match loc.bit {
            Some(bit) => (byte >> bit) & 1,
            None => byte,
        }
    }

    /// Store `value` at `loc`. Bit-packed fields treat any non-zero value as 1.
    pub fn set(&mut self, loc: Location, value: u8) -> Result<(), StoreError> {
        let address = loc.offset as usize;
        let value = match loc.bit {
            Some(bit) => {
                let mut byte = [self.get_byte(address)];
                crate::bit_write(&mut byte, bit as usize, value != 0).ok_or(StoreError::Storage)?
            }
            None => value,
        };
        self.set_byte(address, value)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Channel for `kind`, one of [odk_common::globals::midi_channel].
    pub fn midi_channel(&self, kind: u8) -> u8 {
        self.get_byte((layout::MIDI_CHANNEL_ADDR + kind as u16) as usize)
    }

    pub fn hw_parameter(&self, parameter: u8) -> u8 {
        self.get_byte((layout::HW_PARAMETER_ADDR + parameter as u16) as usize)
    }

    pub fn board_type(&self) -> u8 {
        self.hw_parameter(hw_parameter::BOARD_TYPE)
    }

    pub fn long_press_time_ms(&self) -> u32 {
        self.hw_parameter(hw_parameter::LONG_PRESS_TIME) as u32 * 100
    }

    pub fn blink_time_ms(&self) -> u32 {
        self.hw_parameter(hw_parameter::BLINK_TIME) as u32 * 100
    }

    pub fn start_up_switch_time_ms(&self) -> u32 {
        self.hw_parameter(hw_parameter::START_UP_SWITCH_TIME) as u32 * 10
    }

    pub fn start_up_routine(&self) -> u8 {
        self.hw_parameter(hw_parameter::START_UP_ROUTINE)
    }

    pub fn total_led_number(&self) -> u8 {
        self.hw_parameter(hw_parameter::TOTAL_LED_NUMBER)
    }

    pub fn sw_feature(&self, feature: u8) -> bool {
        feature < sw_feature::COUNT && self.packed(layout::SW_FEATURE_ADDR, feature)
    }

    pub fn hw_feature(&self, feature: u8) -> bool {
        feature < hw_feature::COUNT && self.packed(layout::HW_FEATURE_ADDR, feature)
    }

    pub fn button_latching(&self, button: u8) -> bool {
        self.packed(layout::BUTTON_TYPE_ADDR, button)
    }

    pub fn button_note(&self, button: u8) -> u8 {
        self.get_byte((layout::BUTTON_NOTE_ADDR + button as u16) as usize)
    }

    pub fn pot_enabled(&self, pot: u8) -> bool {
        self.packed(layout::POT_ENABLED_ADDR, pot)
    }

    pub fn pot_inverted(&self, pot: u8) -> bool {
        self.packed(layout::POT_INVERTED_ADDR, pot)
    }

    pub fn pot_cc(&self, pot: u8) -> u8 {
        self.get_byte((layout::POT_CC_ADDR + pot as u16) as usize)
    }

    pub fn encoder_enabled(&self, encoder: u8) -> bool {
        self.packed(layout::ENCODER_ENABLED_ADDR, encoder)
    }

    pub fn encoder_inverted(&self, encoder: u8) -> bool {
        self.packed(layout::ENCODER_INVERTED_ADDR, encoder)
    }

    pub fn led_activation_note(&self, led: u8) -> u8 {
        self.get_byte((layout::LED_ACTIVATION_NOTE_ADDR + led as u16) as usize)
    }

    pub fn led_start_up_number(&self, led: u8) -> u8 {
        self.get_byte((layout::LED_START_UP_NUMBER_ADDR + led as u16) as usize)
    }

    fn packed(&self, start: u16, index: u8) -> bool {
        match self.mirror.get(start as usize..) {
            Some(packed) => crate::bit_read(packed, index as usize),
            None => false,
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod test;
