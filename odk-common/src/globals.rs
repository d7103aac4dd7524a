pub const MAX_BUTTONS: usize = 32;
pub const MAX_POTS: usize = 16;
pub const MAX_ENCODERS: usize = MAX_BUTTONS / 2;
pub const MAX_LEDS: usize = 32;

/// Inputs behind each analog multiplexer.
pub const MUX_INPUTS: u8 = 8;
/// Analog channels a board can expose.
pub const ANALOG_CHANNELS: u8 = 8;

/// Minimum time a button reading must stay unchanged before it is reported.
pub const DEBOUNCE_TIME_MS: u32 = 5;
/// Expected interval between two scan ticks.
pub const SCAN_PERIOD_MS: u32 = 1;

/// A pot moved within [POT_MOVE_TIMEOUT_MS] must change by at least this much.
pub const POT_STEP: u16 = 8;
/// A pot idle for longer than [POT_MOVE_TIMEOUT_MS] must change by at least this much.
pub const POT_STEP_TIMEOUT: u16 = 8;
pub const POT_MOVE_TIMEOUT_MS: u32 = 200;
/// Marks a pot that has never emitted a note.
pub const POT_NOTE_NONE: u8 = 128;

/// Pitch bend offset from center sent per encoder step.
pub const ENCODER_STEP: u16 = 64;
pub const PITCH_BEND_CENTER: u16 = 8192;

pub const NOTE_ON_VELOCITY: u8 = 127;

/// Velocities received on the input channel that drive LEDs.
pub const LED_VELOCITY_CONSTANT_OFF: u8 = 0x00;
pub const LED_VELOCITY_BLINK_OFF: u8 = 0x3F;
pub const LED_VELOCITY_BLINK_ON: u8 = 0x40;

pub const MIDI_CHANNEL_MIN: u8 = 1;
pub const MIDI_CHANNEL_MAX: u8 = 16;

pub mod midi_channel {
    pub const BUTTON_NOTE: u8 = 0;
    pub const LONG_PRESS_NOTE: u8 = 1;
    pub const POT_CC: u8 = 2;
    pub const ENCODER_CC: u8 = 3;
    pub const INPUT: u8 = 4;
    pub const POT_NOTE: u8 = 5;
    pub const COUNT: u8 = 6;
}

pub mod hw_parameter {
    pub const BOARD_TYPE: u8 = 0;
    /// Stored in units of 100 ms.
    pub const LONG_PRESS_TIME: u8 = 1;
    /// Stored in units of 100 ms.
    pub const BLINK_TIME: u8 = 2;
    /// Stored in units of 10 ms.
    pub const START_UP_SWITCH_TIME: u8 = 3;
    pub const START_UP_ROUTINE: u8 = 4;
    pub const TOTAL_LED_NUMBER: u8 = 5;
    pub const COUNT: u8 = 6;

    pub const LONG_PRESS_TIME_MIN: u8 = 4;
    pub const LONG_PRESS_TIME_MAX: u8 = 15;
    pub const BLINK_TIME_MIN: u8 = 1;
    pub const BLINK_TIME_MAX: u8 = 15;
    pub const START_UP_SWITCH_TIME_MIN: u8 = 1;
    pub const START_UP_SWITCH_TIME_MAX: u8 = 150;
    /// Routine 0 disables the animation, 1 is the six-walk pattern.
    pub const START_UP_ROUTINES: u8 = 2;
}

pub mod sw_feature {
    pub const RUNNING_STATUS: u8 = 0;
    pub const STANDARD_NOTE_OFF: u8 = 1;
    pub const ENCODER_NOTES: u8 = 2;
    pub const POT_NOTES: u8 = 3;
    pub const LONG_PRESS: u8 = 4;
    pub const LED_BLINK: u8 = 5;
    pub const START_UP_ROUTINE: u8 = 6;
    pub const COUNT: u8 = 7;
}

pub mod hw_feature {
    pub const BUTTONS: u8 = 0;
    pub const POTS: u8 = 1;
    pub const ENCODERS: u8 = 2;
    pub const LEDS: u8 = 3;
    pub const COUNT: u8 = 4;
}

pub mod board_type {
    pub const CUSTOM: u8 = 0;
    pub const OPEN_DECK_1: u8 = 1;
    pub const TANNIN: u8 = 2;
    pub const COUNT: u8 = 3;
}

pub mod button_type {
    pub const MOMENTARY: u8 = 0;
    pub const LATCHING: u8 = 1;
}
