use embedded_storage::Storage;
use odk_common::globals::{midi_channel, sw_feature, DEBOUNCE_TIME_MS, MAX_BUTTONS};

use crate::{
    config::ConfigStore,
    encoders,
    midi::{MidiMessage, MidiSink},
};

/// Column passes needed to cover [DEBOUNCE_TIME_MS], clamped to what a compare mask can hold.
pub fn debounce_depth(columns: u8, scan_period_ms: u32) -> u8 {
    let pass_ms = (scan_period_ms * columns as u32).max(1);
    DEBOUNCE_TIME_MS.div_ceil(pass_ms).clamp(1, 4) as u8
}

/// Mask whose cleared low bits hold the last `depth` readings.
pub fn compare_mask(depth: u8) -> u8 {
    0xff << depth.clamp(1, 4)
}

/// Debounce and note logic for every button of the matrix.
pub struct ButtonEngine {
    columns: u8,
    button_rows: u8,
    compare: u8,
    /// Readings shifted in one per column pass, padded with `compare`.
    history: [u8; MAX_BUTTONS],
    /// Last reported stable reading; always `0xff` or `compare`.
    stable: [u8; MAX_BUTTONS],
    /// Latest raw reading per button, bit per button.
    lines: u32,
    /// Latching buttons that are toggled on.
    toggled: u32,
    long_press_armed: u32,
    long_press_sent: u32,
    long_press_start: [u32; MAX_BUTTONS],
}

impl ButtonEngine {
    pub fn new(columns: u8, button_rows: u8, scan_period_ms: u32) -> Self {
        let compare = compare_mask(debounce_depth(columns, scan_period_ms));
        Self {
            columns,
            button_rows: button_rows.min(8),
            compare,
            history: [compare; MAX_BUTTONS],
            stable: [compare; MAX_BUTTONS],
            lines: 0,
            toggled: 0,
            long_press_armed: 0,
            long_press_sent: 0,
            long_press_start: [0; MAX_BUTTONS],
        }
    }

    pub fn compare(&self) -> u8 {
        self.compare
    }

    /// Raw line levels from the most recent reads; bit set means pressed.
    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn is_pressed(&self, button: u8) -> bool {
        self.stable.get(button as usize) == Some(&0xff)
    }

    /// Process every row of `column`. `rows` has a bit set for each pressed row.
    pub fn process_column<S: Storage, M: MidiSink>(
        &mut self,
        column: u8,
        rows: u8,
        now: u32,
        config: &ConfigStore<S>,
        sink: &mut M,
    ) {
        for row in 0..self.button_rows {
            let button = column as usize + row as usize * self.columns as usize;
            if button >= MAX_BUTTONS {
                break;
            }
            self.process(button as u8, rows & (1 << row) != 0, now, config, sink);
        }
    }

    /// Feed one reading of `button` through debounce, then emit any resulting notes.
    pub fn process<S: Storage, M: MidiSink>(
        &mut self,
        button: u8,
        reading: bool,
        now: u32,
        config: &ConfigStore<S>,
        sink: &mut M,
    ) {
        let b = button as usize;
        if b >= MAX_BUTTONS {
            return;
        }
        let bp = 1 << b;
        if reading {
            self.lines |= bp;
        } else {
            self.lines &= !bp;
        }

        let notes = !encoders::pair_active(config, button / 2);

        if let Some(pressed) = self.debounce(b, reading) {
            if notes {
                if pressed {
                    self.pressed(b, now, config, sink);
                } else {
                    self.released(b, config, sink);
                }
            }
        }

        if notes {
            self.check_long_press(b, now, config, sink);
        }
    }

    /// Shift `reading` in. Returns the new stable state when it differs from the stored one.
    fn debounce(&mut self, b: usize, reading: bool) -> Option<bool> {
        let h = (self.history[b] << 1) | reading as u8 | self.compare;
        self.history[b] = h;

        if (h == 0xff || h == self.compare) && h != self.stable[b] {
            self.stable[b] = h;
            Some(h == 0xff)
        } else {
            None
        }
    }

    fn pressed<S: Storage, M: MidiSink>(
        &mut self,
        b: usize,
        now: u32,
        config: &ConfigStore<S>,
        sink: &mut M,
    ) {
        let bp = 1 << b;
        let button = b as u8;
        let note = config.button_note(button);
        let channel = config.midi_channel(midi_channel::BUTTON_NOTE);

        if config.button_latching(button) {
            if self.toggled & bp != 0 {
                self.send_note_off(b, note, config, sink);
                self.toggled &= !bp;
            } else {
                sink.send(MidiMessage::note_on(channel, note));
                self.toggled |= bp;
            }
        } else {
            sink.send(MidiMessage::note_on(channel, note));
            if config.sw_feature(sw_feature::LONG_PRESS) {
                self.long_press_armed |= bp;
                self.long_press_start[b] = now;
            }
        }
    }

    fn released<S: Storage, M: MidiSink>(&mut self, b: usize, config: &ConfigStore<S>, sink: &mut M) {
        let button = b as u8;
        if config.button_latching(button) {
            return;
        }
        self.send_note_off(b, config.button_note(button), config, sink);
        self.long_press_armed &= !(1 << b);
    }

    /// Note off on the note channel, plus the long-press channel when a long press fired.
    fn send_note_off<S: Storage, M: MidiSink>(
        &mut self,
        b: usize,
        note: u8,
        config: &ConfigStore<S>,
        sink: &mut M,
    ) {
        let bp = 1 << b;
        let standard = config.sw_feature(sw_feature::STANDARD_NOTE_OFF);
        sink.send(MidiMessage::note_off(
            config.midi_channel(midi_channel::BUTTON_NOTE),
            note,
            standard,
        ));
        if self.long_press_sent & bp != 0 {
            sink.send(MidiMessage::note_off(
                config.midi_channel(midi_channel::LONG_PRESS_NOTE),
                note,
                standard,
            ));
            self.long_press_sent &= !bp;
        }
    }

    fn check_long_press<S: Storage, M: MidiSink>(
        &mut self,
        b: usize,
        now: u32,
        config: &ConfigStore<S>,
        sink: &mut M,
    ) {
        let bp = 1 << b;
        if self.long_press_armed & bp == 0
            || self.long_press_sent & bp != 0
            || self.stable[b] != 0xff
            || !config.sw_feature(sw_feature::LONG_PRESS)
        {
            return;
        }
        if now.wrapping_sub(self.long_press_start[b]) >= config.long_press_time_ms() {
            let button = b as u8;
            crate::debug!("long press {}", button);
            sink.send(MidiMessage::note_on(
                config.midi_channel(midi_channel::LONG_PRESS_NOTE),
                config.button_note(button),
            ));
            self.long_press_sent |= bp;
        }
    }
}

#[cfg(test)]
#[path = "buttons_test.rs"]
mod test;
