use embassy_sync::{blocking_mutex::raw::RawMutex, channel::Channel};
use odk_common::globals::NOTE_ON_VELOCITY;

/// A channel voice message produced by the engines. Channels are 1-16 as configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MidiMessage {
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8, velocity: u8 },
    ControlChange { channel: u8, control: u8, value: u8 },
    /// 14 bit value, 8192 is centered.
    PitchBend { channel: u8, value: u16 },
}

impl MidiMessage {
    pub fn note_on(channel: u8, note: u8) -> Self {
        Self::NoteOn {
            channel,
            note,
            velocity: NOTE_ON_VELOCITY,
        }
    }

    /// A real note off when `standard` is set, otherwise a note on with zero velocity.
    pub fn note_off(channel: u8, note: u8, standard: bool) -> Self {
        if standard {
            Self::NoteOff {
                channel,
                note,
                velocity: 0,
            }
        } else {
            Self::NoteOn {
                channel,
                note,
                velocity: 0,
            }
        }
    }

    pub fn channel(&self) -> u8 {
        match *self {
            Self::NoteOn { channel, .. }
            | Self::NoteOff { channel, .. }
            | Self::ControlChange { channel, .. }
            | Self::PitchBend { channel, .. } => channel,
        }
    }

    /// Status byte and both data bytes, without any running status.
    pub fn to_bytes(&self) -> [u8; 3] {
        let ch = self.channel().wrapping_sub(1) & 0xf;
        match *self {
            Self::NoteOn { note, velocity, .. } => [0x90 | ch, note & 0x7f, velocity & 0x7f],
            Self::NoteOff { note, velocity, .. } => [0x80 | ch, note & 0x7f, velocity & 0x7f],
            Self::ControlChange { control, value, .. } => [0xb0 | ch, control & 0x7f, value & 0x7f],
            Self::PitchBend { value, .. } => [0xe0 | ch, (value & 0x7f) as u8, (value >> 7) as u8 & 0x7f],
        }
    }
}

/// Receives every message the engines emit.
pub trait MidiSink {
    fn send(&mut self, msg: MidiMessage);
}

impl<const N: usize> MidiSink for heapless::Vec<MidiMessage, N> {
    fn send(&mut self, msg: MidiMessage) {
        if self.push(msg).is_err() {
            crate::warn!("midi buffer full, dropped {:?}", msg);
        }
    }
}

impl<T: MidiSink + ?Sized> MidiSink for &mut T {
    fn send(&mut self, msg: MidiMessage) {
        (**self).send(msg)
    }
}

/// Hands messages to another task, typically the one owning the MIDI transport.
pub struct MidiChannel<M: RawMutex, const N: usize>(Channel<M, MidiMessage, N>);
impl<M: RawMutex, const N: usize> Default for MidiChannel<M, N> {
    fn default() -> Self {
        Self(Channel::new())
    }
}
impl<M: RawMutex, const N: usize> MidiChannel<M, N> {
    pub async fn receive(&self) -> MidiMessage {
        self.0.receive().await
    }

    pub fn try_receive(&self) -> Option<MidiMessage> {
        self.0.try_receive().ok()
    }

    pub fn try_send(&self, msg: MidiMessage) {
        if self.0.try_send(msg).is_err() {
            crate::warn!("midi channel full, dropped {:?}", msg);
        }
    }
}

impl<M: RawMutex, const N: usize> MidiSink for &MidiChannel<M, N> {
    fn send(&mut self, msg: MidiMessage) {
        self.try_send(msg);
    }
}

#[cfg(test)]
#[path = "midi_test.rs"]
mod test;
