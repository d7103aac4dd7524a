use odk_common::{
    globals::hw_feature,
    sysex_message::{self as msg, MessageType},
};

use super::*;
use crate::storage_test_stub::{factory_config, set_param};

type Sink = heapless::Vec<MidiMessage, 32>;

macro_rules! setup {
    ($buttons:ident, $config:ident, $sink:ident) => {
        setup!($buttons, $config, $sink, 8);
    };
    ($buttons:ident, $config:ident, $sink:ident, $columns:expr) => {
        #[allow(unused_mut)]
        let mut $config = factory_config();
        let mut $buttons = ButtonEngine::new($columns, 4, 1);
        let mut $sink = Sink::new();

        #[allow(unused_macros)]
        macro_rules! read {
            ($b:expr, $r:expr, $now:expr) => {
                $buttons.process($b, $r, $now, &$config, &mut $sink)
            };
        }
    };
}

fn on(channel: u8, note: u8) -> MidiMessage {
    MidiMessage::note_on(channel, note)
}

fn off(channel: u8, note: u8) -> MidiMessage {
    MidiMessage::note_off(channel, note, true)
}

#[test]
fn compare_masks() {
    assert_eq!(debounce_depth(8, 1), 1);
    assert_eq!(debounce_depth(5, 1), 1);
    assert_eq!(debounce_depth(2, 1), 3);
    assert_eq!(debounce_depth(1, 1), 4);
    assert_eq!(debounce_depth(0, 0), 4);

    assert_eq!(compare_mask(1), 0xfe);
    assert_eq!(compare_mask(2), 0xfc);
    assert_eq!(compare_mask(3), 0xf8);
    assert_eq!(compare_mask(4), 0xf0);
}

#[test]
fn momentary_press_and_release() {
    setup!(buttons, config, sink);
    read!(3, true, 0);
    assert!(buttons.is_pressed(3));
    read!(3, true, 1);
    read!(3, false, 2);
    assert!(!buttons.is_pressed(3));

    assert_eq!(sink.as_slice(), &[on(1, 3), off(1, 3)]);
}

#[test]
fn note_off_as_zero_velocity_note_on() {
    setup!(buttons, config, sink);
    set_param(
        &mut config,
        MessageType::SwFeature,
        0,
        sw_feature::STANDARD_NOTE_OFF,
        0,
    );
    read!(0, true, 0);
    read!(0, false, 1);

    assert_eq!(
        sink.last(),
        Some(&MidiMessage::NoteOn {
            channel: 1,
            note: 0,
            velocity: 0
        })
    );
}

#[test]
fn bouncing_reading_is_not_reported() {
    setup!(buttons, config, sink, 1);
    assert_eq!(buttons.compare(), 0xf0);

    for r in [true, false, true, true, false, true, true, true] {
        read!(5, r, 0);
        assert!(sink.is_empty());
    }
    read!(5, true, 0);
    assert_eq!(sink.as_slice(), &[on(1, 5)]);

    for r in [false, false, false] {
        read!(5, r, 0);
    }
    assert!(buttons.is_pressed(5));
    read!(5, false, 0);
    assert!(!buttons.is_pressed(5));
    assert_eq!(sink.len(), 2);
}

#[test]
fn only_settled_registers_change_state() {
    setup!(buttons, config, sink, 2);
    let compare = buttons.compare();
    let mut seed = 0x2545_f491u32;
    let mut last = false;
    for now in 0..2000 {
        seed ^= seed << 13;
        seed ^= seed >> 17;
        seed ^= seed << 5;
        read!(7, seed & 3 != 0, now);
        let h = buttons.history[7];
        let pressed = buttons.is_pressed(7);
        if pressed != last {
            assert!(h == 0xff || h == compare, "{h:#x}");
            last = pressed;
        }
        if sink.is_full() {
            sink.clear();
        }
    }
}

#[test]
fn latching_toggles() {
    setup!(buttons, config, sink);
    set_param(&mut config, MessageType::Button, msg::button::TYPE, 9, 1);
    set_param(&mut config, MessageType::Button, msg::button::NOTE, 9, 60);

    read!(9, true, 0);
    read!(9, false, 1);
    assert_eq!(sink.as_slice(), &[on(1, 60)]);

    read!(9, true, 2);
    read!(9, false, 3);
    assert_eq!(sink.as_slice(), &[on(1, 60), off(1, 60)]);
}

#[test]
fn long_press() {
    setup!(buttons, config, sink);
    read!(4, true, 1000);
    read!(4, true, 1499);
    assert_eq!(sink.as_slice(), &[on(1, 4)]);

    read!(4, true, 1500);
    assert_eq!(sink.as_slice(), &[on(1, 4), on(2, 4)]);
    read!(4, true, 3000);
    assert_eq!(sink.len(), 2);

    read!(4, false, 3001);
    assert_eq!(sink.as_slice(), &[on(1, 4), on(2, 4), off(1, 4), off(2, 4)]);

    sink.clear();
    read!(4, true, 4000);
    read!(4, false, 4100);
    assert_eq!(sink.as_slice(), &[on(1, 4), off(1, 4)]);
}

#[test]
fn long_press_disabled() {
    setup!(buttons, config, sink);
    set_param(&mut config, MessageType::SwFeature, 0, sw_feature::LONG_PRESS, 0);
    read!(4, true, 0);
    read!(4, true, 10_000);
    read!(4, false, 10_001);
    assert_eq!(sink.as_slice(), &[on(1, 4), off(1, 4)]);
}

#[test]
fn encoder_lines_are_silent() {
    setup!(buttons, config, sink);
    set_param(&mut config, MessageType::HwFeature, 0, hw_feature::ENCODERS, 1);
    set_param(&mut config, MessageType::Encoder, msg::encoder::ENABLED, 1, 1);

    read!(2, true, 0);
    read!(3, true, 0);
    assert!(sink.is_empty());
    assert_eq!(buttons.lines(), 0b1100);

    read!(4, true, 0);
    assert_eq!(sink.as_slice(), &[on(1, 4)]);
}

#[test]
fn column_rows_map_to_buttons() {
    setup!(buttons, config, sink);
    buttons.process_column(2, 0b1010, 0, &config, &mut sink);
    assert_eq!(sink.as_slice(), &[on(1, 10), on(1, 26)]);
    assert_eq!(buttons.lines(), (1 << 10) | (1 << 26));
}
