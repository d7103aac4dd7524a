//! Byte-level vocabulary of the configuration SysEx protocol.
//!
//! Offsets are relative to the payload after transport framing (`F0`/`F7`) has been removed.

pub const MANUFACTURER_ID: [u8; 3] = [0x00, 0x53, 0x43];

pub const ACK: u8 = 0x41;
pub const ERROR: u8 = 0x46;

/// A handshake is the manufacturer id followed by a wish and an amount byte.
pub const HANDSHAKE_LEN: usize = 5;
/// Manufacturer id, wish, amount, message type and sub-type.
pub const REQUEST_HEADER_LEN: usize = 7;
/// Manufacturer id, ACK, wish, amount, message type and sub-type.
pub const RESPONSE_HEADER_LEN: usize = 8;
pub const ERROR_RESPONSE_LEN: usize = 5;
pub const ACK_RESPONSE_LEN: usize = 4;

pub const WISH: usize = 3;
pub const AMOUNT: usize = 4;
pub const MESSAGE_TYPE: usize = 5;
pub const SUB_TYPE: usize = 6;
pub const PARAMETER_ID: usize = 7;
pub const NEW_VALUE_SINGLE: usize = 8;
pub const NEW_VALUE_ALL: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Wish {
    Get = 0,
    Set = 1,
    Restore = 2,
}

impl Wish {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Get),
            1 => Some(Self::Set),
            2 => Some(Self::Restore),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Amount {
    Single = 0,
    All = 1,
}

impl Amount {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Single),
            1 => Some(Self::All),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum MessageType {
    MidiChannel = 0,
    HwParameter = 1,
    SwFeature = 2,
    HwFeature = 3,
    Button = 4,
    Pot = 5,
    Encoder = 6,
    Led = 7,
    /// Whole configuration; only [Wish::Restore] is supported.
    All = 8,
}

impl MessageType {
    pub const fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0 => Self::MidiChannel,
            1 => Self::HwParameter,
            2 => Self::SwFeature,
            3 => Self::HwFeature,
            4 => Self::Button,
            5 => Self::Pot,
            6 => Self::Encoder,
            7 => Self::Led,
            8 => Self::All,
            _ => return None,
        })
    }

    /// Number of sub-types; sub-types are numbered from zero.
    pub const fn sub_type_count(self) -> u8 {
        match self {
            Self::Button => 2,
            Self::Pot => 3,
            Self::Encoder => 2,
            Self::Led => 3,
            _ => 1,
        }
    }

    /// Number of addressable elements (the length of an ALL transfer).
    pub const fn element_count(self) -> usize {
        use crate::globals::*;
        match self {
            Self::MidiChannel => midi_channel::COUNT as usize,
            Self::HwParameter => hw_parameter::COUNT as usize,
            Self::SwFeature => sw_feature::COUNT as usize,
            Self::HwFeature => hw_feature::COUNT as usize,
            Self::Button => MAX_BUTTONS,
            Self::Pot => MAX_POTS,
            Self::Encoder => MAX_ENCODERS,
            Self::Led => MAX_LEDS,
            Self::All => 1,
        }
    }
}

pub mod button {
    pub const TYPE: u8 = 0;
    pub const NOTE: u8 = 1;
}

pub mod pot {
    pub const ENABLED: u8 = 0;
    pub const INVERTED: u8 = 1;
    pub const CC_NUMBER: u8 = 2;
}

pub mod encoder {
    pub const ENABLED: u8 = 0;
    pub const INVERTED: u8 = 1;
}

pub mod led {
    pub const ACTIVATION_NOTE: u8 = 0;
    pub const START_UP_NUMBER: u8 = 1;
    pub const STATE: u8 = 2;
}

/// Values accepted by an LED state SET.
pub mod led_state {
    pub const CONSTANT_OFF: u8 = 0;
    pub const CONSTANT_ON: u8 = 1;
    pub const BLINK_OFF: u8 = 2;
    pub const BLINK_ON: u8 = 3;
}

/// Every rejection the protocol engine can answer with. The discriminant is the byte sent after
/// [ERROR].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SysExError {
    HandshakeMissing = 0,
    InvalidWish = 1,
    InvalidAmount = 2,
    InvalidMessageType = 3,
    InvalidSubType = 4,
    InvalidParameter = 5,
    InvalidNewParameter = 6,
    MessageTooShort = 7,
    NotSupported = 8,
    StoreWriteMismatch = 9,
}

impl SysExError {
    pub fn code(self) -> u8 {
        self as u8
    }
}

#[cfg(test)]
#[path = "sysex_message_test.rs"]
mod test;
