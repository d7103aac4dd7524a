#![no_std]
pub mod board;
pub mod buttons;
pub mod clock;
pub mod config;
pub mod device;
pub mod encoders;
pub mod leds;
pub mod midi;
pub mod pots;
pub mod scanner;
pub mod sysex;

#[cfg(any(test, feature = "test-utils"))]
pub mod board_test_stub;
#[cfg(any(test, feature = "test-utils"))]
pub mod storage_test_stub;
#[cfg(test)]
pub mod time_driver_test_stub;

#[macro_use]
mod macros;

/// Read bit `index` of a packed array where each byte holds eight elements.
fn bit_read(packed: &[u8], index: usize) -> bool {
    match packed.get(index >> 3) {
        Some(byte) => byte & (1 << (index & 7)) != 0,
        None => {
            crate::warn!("packed index out of range {}", index);
            false
        }
    }
}

/// Write bit `index` of a packed array. Returns the byte that now holds the bit, or `None` if
/// `index` is outside `packed`.
fn bit_write(packed: &mut [u8], index: usize, value: bool) -> Option<u8> {
    let byte = packed.get_mut(index >> 3)?;
    let bp = 1 << (index & 7);
    if value {
        *byte |= bp;
    } else {
        *byte &= !bp;
    }
    Some(*byte)
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod test;
