extern crate std;

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use odk_common::{
    globals::{ENCODER_STEP, PITCH_BEND_CENTER},
    sysex_message::{self as msg, MessageType, MANUFACTURER_ID},
};

use super::*;
use crate::board::BoardLayout;
use crate::board_test_stub::{BoardCall, MockBoard};
use crate::clock::ManualClock;
use crate::config::layout::{LAYOUT_SIZE, SIGNATURE};
use crate::leds::LedState;
use crate::midi::MidiMessage;
use crate::storage_test_stub::{set_param, DefaultStorageStub};

type Sink = heapless::Vec<MidiMessage, 64>;

macro_rules! setup {
    ($device:ident, $clock:ident) => {
        let $clock = ManualClock::new(0);
        let mut $device = Device::new(
            MockBoard::new(BoardLayout::OPEN_DECK_1),
            DefaultStorageStub::default(),
            &$clock,
            Sink::new(),
        );
        $device.init().unwrap();
        $device.board_mut().clear_calls();

        #[allow(unused_macros)]
        macro_rules! ticks {
            ($n:expr) => {
                for _ in 0..$n {
                    $clock.advance(1);
                    $device.scan_tick();
                }
            };
        }
    };
}

fn request(body: &[u8]) -> std::vec::Vec<u8> {
    let mut v = MANUFACTURER_ID.to_vec();
    v.extend_from_slice(body);
    v
}

#[test]
fn first_boot_writes_configuration() {
    setup!(device, clock);
    let storage = device.config().storage();
    assert_eq!(&storage.buf[..2], &SIGNATURE);
    assert_eq!(
        &storage.buf[..LAYOUT_SIZE],
        &crate::config::defaults::factory_image()
    );
    assert!(device.leds().all_off());
    assert_eq!(clock.now_ms(), 0);
}

#[test]
fn handshake_set_get() {
    setup!(device, clock);
    assert_eq!(
        device.handle_sysex(&[0x00, 0x53, 0x43, 0x00, 0x01]).unwrap(),
        [0x00, 0x53, 0x43, 0x41]
    );

    let resp = device.handle_sysex(&request(&[1, 0, 4, 1, 3, 60])).unwrap();
    assert_eq!(resp, [0x00, 0x53, 0x43, 0x41, 1, 0, 4, 1]);

    let resp = device.handle_sysex(&request(&[0, 0, 4, 1, 3])).unwrap();
    assert_eq!(resp, [0x00, 0x53, 0x43, 0x41, 0, 0, 4, 1, 60]);

    device.board_mut().press(3);
    ticks!(4);
    assert_eq!(device.sink().as_slice(), &[MidiMessage::note_on(1, 60)]);
}

#[test]
fn scan_reports_buttons() {
    setup!(device, clock);
    device.board_mut().press(10);
    ticks!(2);
    assert!(device.sink().is_empty());
    ticks!(1);
    assert_eq!(device.sink().as_slice(), &[MidiMessage::note_on(1, 10)]);
    assert!(device.buttons().is_pressed(10));

    device.board_mut().release(10);
    ticks!(8);
    assert_eq!(device.sink().len(), 2);
    assert_eq!(device.sink()[1], MidiMessage::note_off(1, 10, true));
}

#[test]
fn hardware_features_gate_engines() {
    setup!(device, clock);
    set_param(&mut device.config, MessageType::HwFeature, 0, hw_feature::BUTTONS, 0);
    set_param(&mut device.config, MessageType::HwFeature, 0, hw_feature::POTS, 0);
    set_param(&mut device.config, MessageType::HwFeature, 0, hw_feature::LEDS, 0);

    device.board_mut().press(0);
    device.board_mut().set_pot(6, 0, 900);
    device.note_received(1, 0, 127);
    ticks!(16);
    device.read_pots();

    assert!(device.sink().is_empty());
    assert!(!device
        .board()
        .calls
        .iter()
        .any(|c| matches!(c, BoardCall::LedRowOn(_) | BoardCall::Sample(_))));
}

#[test]
fn pots_are_seeded_at_boot() {
    let clock = ManualClock::new(0);
    let mut board = MockBoard::new(BoardLayout::OPEN_DECK_1);
    board.set_pot(7, 2, 1000);
    let mut device = Device::new(board, DefaultStorageStub::default(), &clock, Sink::new());
    device.init().unwrap();

    device.read_pots();
    assert!(device.sink().is_empty());

    clock.advance(500);
    device.board_mut().set_pot(7, 2, 0);
    device.read_pots();
    assert_eq!(
        device.sink()[0],
        MidiMessage::ControlChange {
            channel: 1,
            control: 10,
            value: 0
        }
    );
}

#[test]
fn incoming_notes_drive_leds() {
    setup!(device, clock);
    set_param(&mut device.config, MessageType::Led, msg::led::ACTIVATION_NOTE, 13, 70);

    device.note_received(2, 70, 127);
    assert!(device.leds().all_off());
    device.note_received(1, 70, 20);
    assert_eq!(device.leds().state(13), LedState::CONSTANT);

    // LED 13 sits in column 5, row 1
    ticks!(6);
    assert_eq!(device.board().active_column(), 5);
    assert_eq!(device.board().lit_rows(), 0b10);
    ticks!(1);
    assert_eq!(device.board().lit_rows(), 0);

    device.note_received(1, 70, 0);
    assert!(device.leds().all_off());
}

#[test]
fn blinking_follows_blink_time() {
    setup!(device, clock);
    device.note_received(1, 4, 100);
    assert!(device.leds().is_blinking());

    ticks!(399);
    assert_eq!(device.leds().state(4), LedState::BLINK_LIT);
    ticks!(1);
    assert_eq!(device.leds().state(4), LedState::BLINK_DARK);

    set_param(&mut device.config, MessageType::SwFeature, 0, sw_feature::LED_BLINK, 0);
    device.note_received(1, 5, 100);
    assert_eq!(device.leds().state(5), LedState::CONSTANT);
}

#[test]
fn encoder_pair_sends_pitch_bend() {
    setup!(device, clock);
    set_param(&mut device.config, MessageType::HwFeature, 0, hw_feature::ENCODERS, 1);
    set_param(&mut device.config, MessageType::Encoder, msg::encoder::ENABLED, 0, 1);

    ticks!(8);
    device.board_mut().press(0);
    ticks!(1);
    assert_eq!(
        device.sink().as_slice(),
        &[MidiMessage::PitchBend {
            channel: 1,
            value: PITCH_BEND_CENTER + ENCODER_STEP
        }]
    );
}

#[test]
fn start_up_walk() {
    setup!(device, clock);
    set_param(&mut device.config, MessageType::SwFeature, 0, sw_feature::START_UP_ROUTINE, 1);

    device.start_up_routine();

    assert!(device.leds().all_off());
    assert!(clock.now_ms() >= 6 * 32 * 120);
    assert!(device
        .board()
        .calls
        .iter()
        .any(|c| matches!(c, BoardCall::LedRowOn(3))));
}

#[test]
fn start_up_needs_leds() {
    setup!(device, clock);
    set_param(&mut device.config, MessageType::SwFeature, 0, sw_feature::START_UP_ROUTINE, 1);
    set_param(&mut device.config, MessageType::HwFeature, 0, hw_feature::LEDS, 0);
    device.start_up_routine();
    assert_eq!(clock.now_ms(), 0);
    assert!(device.board().calls.is_empty());
}

#[test]
fn shared_device() {
    setup!(device, clock);
    let _ = device.handle_sysex(&[0x00, 0x53, 0x43, 0x00, 0x01]);
    device.board_mut().press(1);

    let shared: SharedDevice<NoopRawMutex, _, _, _, _> = device.into_shared();
    shared.lock(|d| {
        let mut d = d.borrow_mut();
        d.scan_tick();
        d.scan_tick();
    });
    shared.lock(|d| {
        assert_eq!(d.borrow().sink().as_slice(), &[MidiMessage::note_on(1, 1)]);
    });
}
