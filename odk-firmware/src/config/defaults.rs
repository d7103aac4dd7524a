//! Factory configuration.

use odk_common::{
    globals::{board_type, hw_feature, hw_parameter, midi_channel, sw_feature, MAX_LEDS},
    sysex_message::{self as msg, MessageType},
};

use super::layout::{locate, LAYOUT_SIZE, SIGNATURE, SIGNATURE_ADDR};

/// Factory value of a persistent parameter. `None` for anything [locate] rejects.
pub fn default_value(mt: MessageType, sub_type: u8, index: u8) -> Option<u8> {
    locate(mt, sub_type, index)?;
    Some(match mt {
        MessageType::MidiChannel => match index {
            midi_channel::LONG_PRESS_NOTE => 2,
            midi_channel::POT_NOTE => 3,
            _ => 1,
        },
        MessageType::HwParameter => match index {
            hw_parameter::BOARD_TYPE => board_type::OPEN_DECK_1,
            hw_parameter::LONG_PRESS_TIME => 5,
            hw_parameter::BLINK_TIME => 4,
            hw_parameter::START_UP_SWITCH_TIME => 12,
            hw_parameter::START_UP_ROUTINE => 1,
            _ => MAX_LEDS as u8,
        },
        MessageType::SwFeature => match index {
            sw_feature::ENCODER_NOTES | sw_feature::START_UP_ROUTINE => 0,
            _ => 1,
        },
        MessageType::HwFeature => match index {
            hw_feature::ENCODERS => 0,
            _ => 1,
        },
        MessageType::Button => match sub_type {
            msg::button::TYPE => 0,
            _ => index,
        },
        MessageType::Pot => match sub_type {
            msg::pot::ENABLED => 1,
            msg::pot::INVERTED => 0,
            _ => index,
        },
        MessageType::Encoder => 0,
        // activation note and start-up slot both follow the LED index
        MessageType::Led => index,
        MessageType::All => return None,
    })
}

/// The whole store as written on first boot, signature included.
pub fn factory_image() -> [u8; LAYOUT_SIZE] {
    let mut image = [0; LAYOUT_SIZE];
    let start = SIGNATURE_ADDR as usize;
    image[start..start + SIGNATURE.len()].copy_from_slice(&SIGNATURE);

    for mt in (0..=MessageType::Led as u8).filter_map(MessageType::from_u8) {
        for sub_type in 0..mt.sub_type_count() {
            for index in 0..mt.element_count() as u8 {
                let (Some(loc), Some(value)) = (
                    locate(mt, sub_type, index),
                    default_value(mt, sub_type, index),
                ) else {
                    continue;
                };
                let offset = loc.offset as usize;
                match loc.bit {
                    Some(bit) => {
                        crate::bit_write(&mut image[offset..], bit as usize, value != 0);
                    }
                    None => image[offset] = value,
                }
            }
        }
    }
    image
}
