use embassy_futures::block_on;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;

use super::*;

#[test]
fn status_bytes() {
    assert_eq!(
        MidiMessage::NoteOn {
            channel: 1,
            note: 60,
            velocity: 127
        }
        .to_bytes(),
        [0x90, 60, 127]
    );
    assert_eq!(
        MidiMessage::NoteOff {
            channel: 16,
            note: 3,
            velocity: 0
        }
        .to_bytes(),
        [0x8f, 3, 0]
    );
    assert_eq!(
        MidiMessage::ControlChange {
            channel: 2,
            control: 7,
            value: 100
        }
        .to_bytes(),
        [0xb1, 7, 100]
    );
    assert_eq!(
        MidiMessage::PitchBend {
            channel: 1,
            value: 8192 + 64
        }
        .to_bytes(),
        [0xe0, 64, 64]
    );
}

#[test]
fn note_off_encoding() {
    assert_eq!(
        MidiMessage::note_off(2, 40, true),
        MidiMessage::NoteOff {
            channel: 2,
            note: 40,
            velocity: 0
        }
    );
    assert_eq!(MidiMessage::note_off(2, 40, false).to_bytes(), [0x91, 40, 0]);
    assert_eq!(MidiMessage::note_on(2, 40).to_bytes(), [0x91, 40, 127]);
}

#[test]
fn vec_sink_drops_when_full() {
    let mut sink = heapless::Vec::<MidiMessage, 1>::new();
    let msg = MidiMessage::PitchBend {
        channel: 3,
        value: 8192,
    };
    sink.send(msg);
    sink.send(MidiMessage::PitchBend {
        channel: 4,
        value: 0,
    });
    assert_eq!(sink.as_slice(), &[msg]);
}

#[test]
fn channel_sink() {
    let channel = MidiChannel::<NoopRawMutex, 2>::default();
    let mut sink = &channel;
    let msg = MidiMessage::NoteOn {
        channel: 1,
        note: 1,
        velocity: 127,
    };
    sink.send(msg);
    sink.send(msg);
    sink.send(msg);

    assert_eq!(block_on(channel.receive()), msg);
    assert_eq!(channel.try_receive(), Some(msg));
    assert_eq!(channel.try_receive(), None);
}
