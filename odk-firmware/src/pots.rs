use embedded_storage::Storage;
use odk_common::globals::{
    midi_channel, sw_feature, ANALOG_CHANNELS, MAX_POTS, MUX_INPUTS, POT_MOVE_TIMEOUT_MS,
    POT_NOTE_NONE, POT_STEP, POT_STEP_TIMEOUT,
};

use crate::{
    board::Board,
    config::ConfigStore,
    midi::{MidiMessage, MidiSink},
};

/// Position bucket of a CC value: 0 at the bottom, 5 at the top, 1-4 in between.
pub fn note_bucket(cc: u8) -> u8 {
    match cc {
        0 => 0,
        127..=u8::MAX => 5,
        v => 1 + (v >> 5),
    }
}

/// Note for `pot` at `cc`, as (channel offset, note). Each pot owns six notes; they continue on
/// the next channel after note 127.
pub fn pot_note(pot: u8, cc: u8) -> (u8, u8) {
    let note = 6 * pot as u16 + note_bucket(cc) as u16;
    ((note / 128) as u8, (note % 128) as u8)
}

pub struct PotEngine {
    last_sample: [u16; MAX_POTS],
    last_change: [u32; MAX_POTS],
    last_note: [u8; MAX_POTS],
    last_note_channel: [u8; MAX_POTS],
}

impl Default for PotEngine {
    fn default() -> Self {
        Self {
            last_sample: [0; MAX_POTS],
            last_change: [0; MAX_POTS],
            last_note: [POT_NOTE_NONE; MAX_POTS],
            last_note_channel: [0; MAX_POTS],
        }
    }
}

impl PotEngine {
    pub fn last_sample(&self, pot: u8) -> u16 {
        self.last_sample.get(pot as usize).copied().unwrap_or(0)
    }

    pub fn last_note(&self, pot: u8) -> u8 {
        self.last_note
            .get(pot as usize)
            .copied()
            .unwrap_or(POT_NOTE_NONE)
    }

    /// Record every pot's position without sending anything. No note counts as sent, so the
    /// first accepted move sends a note on with nothing to turn off.
    pub fn seed<B: Board>(&mut self, board: &mut B, now: u32) {
        self.scan(board, |engine, pot, raw| {
            let p = pot as usize;
            engine.last_sample[p] = raw;
            engine.last_change[p] = now;
        });
    }

    /// Sample every pot and send messages for the ones that moved.
    pub fn read<B: Board, S: Storage, M: MidiSink>(
        &mut self,
        board: &mut B,
        now: u32,
        config: &ConfigStore<S>,
        sink: &mut M,
    ) {
        self.scan(board, |engine, pot, raw| {
            if engine.moved(pot, raw, now) {
                engine.accept(pot, raw, now, config, &mut *sink);
            }
        });
    }

    /// Visit each enabled analog channel in order; the n-th enabled channel carries mux n.
    fn scan<B: Board>(&mut self, board: &mut B, mut f: impl FnMut(&mut Self, u8, u16)) {
        let mut mux = 0;
        for channel in 0..ANALOG_CHANNELS {
            if !board.is_analog_channel_enabled(channel) {
                continue;
            }
            for input in 0..MUX_INPUTS {
                let pot = mux * MUX_INPUTS + input;
                if pot as usize >= MAX_POTS {
                    return;
                }
                board.select_mux_input(input);
                let raw = board.sample_analog(channel);
                f(self, pot, raw);
            }
            mux += 1;
        }
    }

    fn moved(&self, pot: u8, raw: u16, now: u32) -> bool {
        let p = pot as usize;
        let diff = raw.abs_diff(self.last_sample[p]);
        if now.wrapping_sub(self.last_change[p]) < POT_MOVE_TIMEOUT_MS {
            diff >= POT_STEP
        } else {
            diff >= POT_STEP_TIMEOUT
        }
    }

    fn accept<S: Storage, M: MidiSink>(
        &mut self,
        pot: u8,
        raw: u16,
        now: u32,
        config: &ConfigStore<S>,
        sink: &mut M,
    ) {
        let p = pot as usize;
        let cc = (raw >> 3).min(127) as u8;
        let cc = if config.pot_inverted(pot) { 127 - cc } else { cc };
        let enabled = config.pot_enabled(pot);

        if enabled {
            sink.send(MidiMessage::ControlChange {
                channel: config.midi_channel(midi_channel::POT_CC),
                control: config.pot_cc(pot),
                value: cc,
            });
        }

        if config.sw_feature(sw_feature::POT_NOTES) {
            let (offset, note) = pot_note(pot, cc);
            let channel = config.midi_channel(midi_channel::POT_NOTE) + offset;
            if note != self.last_note[p] || channel != self.last_note_channel[p] {
                if enabled {
                    if self.last_note[p] != POT_NOTE_NONE {
                        sink.send(MidiMessage::note_off(
                            self.last_note_channel[p],
                            self.last_note[p],
                            config.sw_feature(sw_feature::STANDARD_NOTE_OFF),
                        ));
                    }
                    sink.send(MidiMessage::note_on(channel, note));
                }
                self.last_note[p] = note;
                self.last_note_channel[p] = channel;
            }
        }

        self.last_sample[p] = raw;
        self.last_change[p] = now;
    }
}

#[cfg(test)]
#[path = "pots_test.rs"]
mod test;
