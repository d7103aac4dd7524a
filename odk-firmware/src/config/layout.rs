//! Where every persistent parameter lives in the store.

use odk_common::{
    globals::{
        hw_feature, hw_parameter, midi_channel, sw_feature, MAX_BUTTONS, MAX_ENCODERS, MAX_LEDS,
        MAX_POTS,
    },
    sysex_message::{self as msg, MessageType},
};

pub const SIGNATURE: [u8; 2] = [0x4f, 0x44];

pub const SIGNATURE_ADDR: u16 = 0;
pub const MIDI_CHANNEL_ADDR: u16 = 2;
pub const HW_PARAMETER_ADDR: u16 = MIDI_CHANNEL_ADDR + midi_channel::COUNT as u16;
pub const SW_FEATURE_ADDR: u16 = HW_PARAMETER_ADDR + hw_parameter::COUNT as u16;
pub const HW_FEATURE_ADDR: u16 = SW_FEATURE_ADDR + 1;
pub const BUTTON_TYPE_ADDR: u16 = HW_FEATURE_ADDR + 1;
pub const BUTTON_NOTE_ADDR: u16 = BUTTON_TYPE_ADDR + packed_len(MAX_BUTTONS);
pub const POT_ENABLED_ADDR: u16 = BUTTON_NOTE_ADDR + MAX_BUTTONS as u16;
pub const POT_INVERTED_ADDR: u16 = POT_ENABLED_ADDR + packed_len(MAX_POTS);
pub const POT_CC_ADDR: u16 = POT_INVERTED_ADDR + packed_len(MAX_POTS);
pub const ENCODER_ENABLED_ADDR: u16 = POT_CC_ADDR + MAX_POTS as u16;
pub const ENCODER_INVERTED_ADDR: u16 = ENCODER_ENABLED_ADDR + packed_len(MAX_ENCODERS);
pub const LED_ACTIVATION_NOTE_ADDR: u16 = ENCODER_INVERTED_ADDR + packed_len(MAX_ENCODERS);
pub const LED_START_UP_NUMBER_ADDR: u16 = LED_ACTIVATION_NOTE_ADDR + MAX_LEDS as u16;

pub const LAYOUT_SIZE: usize = LED_START_UP_NUMBER_ADDR as usize + MAX_LEDS;

const _: () = assert!(LAYOUT_SIZE == 140);
const _: () = assert!(sw_feature::COUNT <= 8 && hw_feature::COUNT <= 8);

const fn packed_len(n: usize) -> u16 {
    n.div_ceil(8) as u16
}

/// A byte offset and, for bit-packed fields, the bit within that byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Location {
    pub offset: u16,
    pub bit: Option<u8>,
}

impl Location {
    const fn byte(offset: u16) -> Self {
        Self { offset, bit: None }
    }

    const fn packed(start: u16, index: u8) -> Self {
        Self {
            offset: start + (index >> 3) as u16,
            bit: Some(index & 7),
        }
    }
}

/// Map a parameter to its storage location.
///
/// Returns `None` when the sub-type or index is out of range, and for values that are not
/// persisted (LED state and the whole-configuration type).
pub fn locate(mt: MessageType, sub_type: u8, index: u8) -> Option<Location> {
    if sub_type >= mt.sub_type_count() || index as usize >= mt.element_count() {
        return None;
    }
    let i = index as u16;
    Some(match mt {
        MessageType::MidiChannel => Location::byte(MIDI_CHANNEL_ADDR + i),
        MessageType::HwParameter => Location::byte(HW_PARAMETER_ADDR + i),
        MessageType::SwFeature => Location::packed(SW_FEATURE_ADDR, index),
        MessageType::HwFeature => Location::packed(HW_FEATURE_ADDR, index),
        MessageType::Button => match sub_type {
            msg::button::TYPE => Location::packed(BUTTON_TYPE_ADDR, index),
            _ => Location::byte(BUTTON_NOTE_ADDR + i),
        },
        MessageType::Pot => match sub_type {
            msg::pot::ENABLED => Location::packed(POT_ENABLED_ADDR, index),
            msg::pot::INVERTED => Location::packed(POT_INVERTED_ADDR, index),
            _ => Location::byte(POT_CC_ADDR + i),
        },
        MessageType::Encoder => match sub_type {
            msg::encoder::ENABLED => Location::packed(ENCODER_ENABLED_ADDR, index),
            _ => Location::packed(ENCODER_INVERTED_ADDR, index),
        },
        MessageType::Led => match sub_type {
            msg::led::ACTIVATION_NOTE => Location::byte(LED_ACTIVATION_NOTE_ADDR + i),
            msg::led::START_UP_NUMBER => Location::byte(LED_START_UP_NUMBER_ADDR + i),
            _ => return None,
        },
        MessageType::All => return None,
    })
}

#[cfg(test)]
#[path = "layout_test.rs"]
mod test;
