extern crate std;

use std::vec::Vec;

use crate::board::{Board, BoardLayout};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardCall {
    ActivateColumn(u8),
    LedRowOn(u8),
    LedRowsOff,
    SelectMux(u8),
    Sample(u8),
}

/// A scripted board. Switch positions and analog levels are set by the test; every output call
/// is recorded.
pub struct MockBoard {
    pub layout: BoardLayout,
    /// `pressed[column]` holds one bit per button row.
    pub pressed: [u8; 8],
    /// `analog[channel][mux input]`
    pub analog: [[u16; 8]; 8],
    pub calls: Vec<BoardCall>,
    pub record: bool,
    active_column: u8,
    mux_input: u8,
    lit_rows: u8,
}

impl MockBoard {
    pub fn new(layout: BoardLayout) -> Self {
        Self {
            layout,
            pressed: [0; 8],
            analog: [[0; 8]; 8],
            calls: Vec::new(),
            record: true,
            active_column: 0,
            mux_input: 0,
            lit_rows: 0,
        }
    }

    pub fn press(&mut self, button: usize) {
        let (column, row) = self.locate(button);
        self.pressed[column] |= 1 << row;
    }

    pub fn release(&mut self, button: usize) {
        let (column, row) = self.locate(button);
        self.pressed[column] &= !(1 << row);
    }

    pub fn set_pot(&mut self, channel: u8, input: u8, value: u16) {
        self.analog[channel as usize][input as usize] = value;
    }

    pub fn active_column(&self) -> u8 {
        self.active_column
    }

    /// Rows currently driven on.
    pub fn lit_rows(&self) -> u8 {
        self.lit_rows
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    fn locate(&self, button: usize) -> (usize, usize) {
        let columns = self.layout.columns as usize;
        (button % columns, button / columns)
    }

    fn call(&mut self, call: BoardCall) {
        if self.record {
            self.calls.push(call);
        }
    }
}

impl Board for MockBoard {
    fn columns(&self) -> u8 {
        self.layout.columns
    }

    fn button_rows(&self) -> u8 {
        self.layout.button_rows
    }

    fn led_rows(&self) -> u8 {
        self.layout.led_rows
    }

    fn activate_column(&mut self, column: u8) {
        self.active_column = column;
        self.call(BoardCall::ActivateColumn(column));
    }

    fn read_button_rows(&mut self) -> u8 {
        self.pressed[self.active_column as usize]
    }

    fn led_row_on(&mut self, row: u8) {
        self.lit_rows |= 1 << row;
        self.call(BoardCall::LedRowOn(row));
    }

    fn led_rows_off(&mut self) {
        self.lit_rows = 0;
        self.call(BoardCall::LedRowsOff);
    }

    fn select_mux_input(&mut self, input: u8) {
        self.mux_input = input;
        self.call(BoardCall::SelectMux(input));
    }

    fn is_analog_channel_enabled(&self, channel: u8) -> bool {
        self.layout.is_analog_channel_enabled(channel)
    }

    fn sample_analog(&mut self, channel: u8) -> u16 {
        self.call(BoardCall::Sample(channel));
        self.analog[channel as usize][self.mux_input as usize]
    }
}
