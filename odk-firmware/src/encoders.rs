use embedded_storage::Storage;
use odk_common::globals::{hw_feature, midi_channel, ENCODER_STEP, MAX_ENCODERS, PITCH_BEND_CENTER};

use crate::{
    config::ConfigStore,
    midi::{MidiMessage, MidiSink},
};

/// Step for each (previous, current) pair of 2 bit line states, indexed `previous << 2 | current`.
const QUADRATURE: [i8; 16] = [0, 1, -1, 0, -1, 0, 0, 1, 1, 0, 0, -1, 0, -1, 1, 0];

const UNKNOWN: u8 = 0xff;

/// True when buttons `2 * encoder` and `2 * encoder + 1` act as an encoder rather than notes.
pub fn pair_active<S: Storage>(config: &ConfigStore<S>, encoder: u8) -> bool {
    (encoder as usize) < MAX_ENCODERS
        && config.hw_feature(hw_feature::ENCODERS)
        && config.encoder_enabled(encoder)
}

/// Direction of a transition: 1 clockwise, -1 counter-clockwise, 0 for no or invalid movement.
pub fn step(previous: u8, current: u8) -> i8 {
    QUADRATURE[(((previous & 3) << 2) | (current & 3)) as usize]
}

pub struct EncoderEngine {
    state: [u8; MAX_ENCODERS],
}

impl Default for EncoderEngine {
    fn default() -> Self {
        Self {
            state: [UNKNOWN; MAX_ENCODERS],
        }
    }
}

impl EncoderEngine {
    /// Compare each active pair's line state in `lines` (bit per button) with the previous tick.
    pub fn update<S: Storage, M: MidiSink>(
        &mut self,
        lines: u32,
        config: &ConfigStore<S>,
        sink: &mut M,
    ) {
        for (encoder, state) in self.state.iter_mut().enumerate() {
            let first = encoder * 2;
            if !pair_active(config, encoder as u8) {
                *state = UNKNOWN;
                continue;
            }
            let current = ((lines >> first) & 3) as u8;
            let previous = *state;
            *state = current;
            if previous == UNKNOWN {
                continue;
            }

            let mut direction = step(previous, current);
            if direction == 0 {
                continue;
            }
            if config.encoder_inverted(encoder as u8) {
                direction = -direction;
            }
            let value = if direction > 0 {
                PITCH_BEND_CENTER + ENCODER_STEP
            } else {
                PITCH_BEND_CENTER - ENCODER_STEP
            };
            sink.send(MidiMessage::PitchBend {
                channel: config.midi_channel(midi_channel::ENCODER_CC),
                value,
            });
        }
    }
}

#[cfg(test)]
#[path = "encoders_test.rs"]
mod test;
