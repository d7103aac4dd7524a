//! The electrical side of a control surface.
//!
//! The engines only ever talk to a [Board]. [PinMatrix] implements it over `embedded-hal` pins for
//! boards wired as a column-scanned matrix with analog multiplexers.

use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
};
use odk_common::globals::{board_type, ANALOG_CHANNELS, MUX_INPUTS};

/// Capabilities the scan engines need from the hardware.
pub trait Board {
    fn columns(&self) -> u8;
    fn button_rows(&self) -> u8;
    fn led_rows(&self) -> u8;

    /// Drive `column` and release every other column.
    fn activate_column(&mut self, column: u8);
    /// Button rows of the active column. Bit `n` set means the button on row `n` is pressed.
    fn read_button_rows(&mut self) -> u8;
    fn led_row_on(&mut self, row: u8);
    fn led_rows_off(&mut self);

    /// Route multiplexer input `input` to every analog channel. Returns once the multiplexer
    /// outputs have settled; [Board::sample_analog] follows immediately.
    fn select_mux_input(&mut self, input: u8);
    fn is_analog_channel_enabled(&self, channel: u8) -> bool;
    /// 10 bit sample of `channel`.
    fn sample_analog(&mut self, channel: u8) -> u16;
}

/// The raw ADC primitive.
pub trait AnalogInput {
    fn read(&mut self, channel: u8) -> u16;
}

/// Time the multiplexer outputs need after the select lines change.
pub const MUX_SETTLE_NS: u32 = 100;

/// Geometry of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BoardLayout {
    pub columns: u8,
    pub button_rows: u8,
    pub led_rows: u8,
    /// Bit `n` set when analog channel `n` has a multiplexer attached.
    pub analog_channels: u8,
}

impl BoardLayout {
    pub const OPEN_DECK_1: Self = Self {
        columns: 8,
        button_rows: 4,
        led_rows: 4,
        analog_channels: (1 << 6) | (1 << 7),
    };

    pub const TANNIN: Self = Self {
        columns: 5,
        button_rows: 4,
        led_rows: 1,
        analog_channels: (1 << 0) | (1 << 1),
    };

    /// Layout of a known board type. Custom boards bring their own layout.
    pub fn for_board_type(board: u8) -> Option<Self> {
        match board {
            board_type::OPEN_DECK_1 => Some(Self::OPEN_DECK_1),
            board_type::TANNIN => Some(Self::TANNIN),
            _ => None,
        }
    }

    pub fn is_analog_channel_enabled(&self, channel: u8) -> bool {
        channel < ANALOG_CHANNELS && self.analog_channels & (1 << channel) != 0
    }
}

/// A matrix board built from GPIO pins.
///
/// Columns are active low; button rows read low when pressed (pull-ups); LED rows are active high.
/// The three mux select pins carry the input number in binary, least significant bit first.
pub struct PinMatrix<
    I: InputPin,
    O: OutputPin,
    A: AnalogInput,
    D: DelayNs,
    const COLS: usize,
    const ROWS: usize,
    const LED_ROWS: usize,
> {
    column_pins: [O; COLS],
    row_pins: [I; ROWS],
    led_row_pins: [O; LED_ROWS],
    mux_select_pins: [O; 3],
    analog: A,
    delay: D,
    analog_channels: u8,
}

impl<
        I: InputPin,
        O: OutputPin,
        A: AnalogInput,
        D: DelayNs,
        const COLS: usize,
        const ROWS: usize,
        const LED_ROWS: usize,
    > PinMatrix<I, O, A, D, COLS, ROWS, LED_ROWS>
{
    pub fn new(
        column_pins: [O; COLS],
        row_pins: [I; ROWS],
        led_row_pins: [O; LED_ROWS],
        mux_select_pins: [O; 3],
        analog: A,
        delay: D,
        analog_channels: u8,
    ) -> Self {
        let mut me = Self {
            column_pins,
            row_pins,
            led_row_pins,
            mux_select_pins,
            analog,
            delay,
            analog_channels,
        };
        for op in me.column_pins.iter_mut() {
            let _ = op.set_high();
        }
        me.led_rows_off();
        me
    }

    pub fn layout(&self) -> BoardLayout {
        BoardLayout {
            columns: COLS as u8,
            button_rows: ROWS as u8,
            led_rows: LED_ROWS as u8,
            analog_channels: self.analog_channels,
        }
    }
}

impl<I: InputPin, O: OutputPin, A: AnalogInput, D: DelayNs> PinMatrix<I, O, A, D, 8, 4, 4> {
    pub fn open_deck_1(
        column_pins: [O; 8],
        row_pins: [I; 4],
        led_row_pins: [O; 4],
        mux_select_pins: [O; 3],
        analog: A,
        delay: D,
    ) -> Self {
        Self::new(
            column_pins,
            row_pins,
            led_row_pins,
            mux_select_pins,
            analog,
            delay,
            BoardLayout::OPEN_DECK_1.analog_channels,
        )
    }
}

impl<I: InputPin, O: OutputPin, A: AnalogInput, D: DelayNs> PinMatrix<I, O, A, D, 5, 4, 1> {
    pub fn tannin(
        column_pins: [O; 5],
        row_pins: [I; 4],
        led_row_pins: [O; 1],
        mux_select_pins: [O; 3],
        analog: A,
        delay: D,
    ) -> Self {
        Self::new(
            column_pins,
            row_pins,
            led_row_pins,
            mux_select_pins,
            analog,
            delay,
            BoardLayout::TANNIN.analog_channels,
        )
    }
}

impl<
        I: InputPin,
        O: OutputPin,
        A: AnalogInput,
        D: DelayNs,
        const COLS: usize,
        const ROWS: usize,
        const LED_ROWS: usize,
    > Board for PinMatrix<I, O, A, D, COLS, ROWS, LED_ROWS>
{
    fn columns(&self) -> u8 {
        COLS as u8
    }

    fn button_rows(&self) -> u8 {
        ROWS as u8
    }

    fn led_rows(&self) -> u8 {
        LED_ROWS as u8
    }

    fn activate_column(&mut self, column: u8) {
        let column = column as usize;
        for (i, op) in self.column_pins.iter_mut().enumerate() {
            let _ = if i == column {
                op.set_low()
            } else {
                op.set_high()
            };
        }
    }

    fn read_button_rows(&mut self) -> u8 {
        self.row_pins
            .iter_mut()
            .enumerate()
            .take(8)
            .fold(0, |bits, (row, ip)| {
                if ip.is_low().unwrap_or(false) {
                    bits | (1 << row)
                } else {
                    bits
                }
            })
    }

    fn led_row_on(&mut self, row: u8) {
        if let Some(op) = self.led_row_pins.get_mut(row as usize) {
            let _ = op.set_high();
        }
    }

    fn led_rows_off(&mut self) {
        for op in self.led_row_pins.iter_mut() {
            let _ = op.set_low();
        }
    }

    fn select_mux_input(&mut self, input: u8) {
        let input = input % MUX_INPUTS;
        for (bit, op) in self.mux_select_pins.iter_mut().enumerate() {
            let _ = if input & (1 << bit) != 0 {
                op.set_high()
            } else {
                op.set_low()
            };
        }
        self.delay.delay_ns(MUX_SETTLE_NS);
    }

    fn is_analog_channel_enabled(&self, channel: u8) -> bool {
        channel < ANALOG_CHANNELS && self.analog_channels & (1 << channel) != 0
    }

    fn sample_analog(&mut self, channel: u8) -> u16 {
        self.analog.read(channel) & 0x3ff
    }
}

#[cfg(test)]
#[path = "board_test.rs"]
mod test;
