//! The device context: every engine plus the collaborators they are driven with.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::{raw::RawMutex, Mutex};
use embedded_storage::Storage;
use odk_common::globals::{hw_feature, midi_channel, sw_feature, MAX_LEDS, SCAN_PERIOD_MS};

use crate::{
    board::Board,
    buttons::ButtonEngine,
    clock::Clock,
    config::{ConfigStore, StoreError},
    encoders::EncoderEngine,
    leds::{LedCommand, LedEngine, WalkState, START_UP_PATTERN},
    midi::MidiSink,
    pots::PotEngine,
    scanner::Scanner,
    sysex::{Response, SysExEngine},
};

/// Start-up routine number that plays [START_UP_PATTERN].
const START_UP_WALK: u8 = 1;

pub struct Device<B: Board, S: Storage, C: Clock, M: MidiSink> {
    board: B,
    config: ConfigStore<S>,
    clock: C,
    sink: M,
    scanner: Scanner,
    buttons: ButtonEngine,
    pots: PotEngine,
    encoders: EncoderEngine,
    leds: LedEngine,
    sysex: SysExEngine,
}

/// A [Device] shared between the scan loop and the protocol handler.
pub type SharedDevice<R, B, S, C, M> = Mutex<R, RefCell<Device<B, S, C, M>>>;

impl<B: Board, S: Storage, C: Clock, M: MidiSink> Device<B, S, C, M> {
    pub fn new(board: B, storage: S, clock: C, sink: M) -> Self {
        let columns = board.columns();
        let button_rows = board.button_rows();
        Self {
            board,
            config: ConfigStore::new(storage),
            clock,
            sink,
            scanner: Scanner::new(columns),
            buttons: ButtonEngine::new(columns, button_rows, SCAN_PERIOD_MS),
            pots: PotEngine::default(),
            encoders: EncoderEngine::default(),
            leds: LedEngine::default(),
            sysex: SysExEngine::default(),
        }
    }

    /// Wrap the device for use behind a blocking mutex.
    pub fn into_shared<R: RawMutex>(self) -> SharedDevice<R, B, S, C, M> {
        Mutex::new(RefCell::new(self))
    }

    /// Load the configuration, record the pot positions and play the start-up routine.
    pub fn init(&mut self) -> Result<(), StoreError> {
        if self.config.load()? {
            crate::info!("factory configuration written");
        }
        if self.config.hw_feature(hw_feature::POTS) {
            let now = self.clock.now_ms();
            self.pots.seed(&mut self.board, now);
        }
        self.start_up_routine();
        Ok(())
    }

    /// Advance to the next column, then process its buttons, the encoders and the LED rows.
    pub fn scan_tick(&mut self) {
        let now = self.clock.now_ms();
        let column = self.scanner.next_column(&mut self.board);

        if self.config.hw_feature(hw_feature::BUTTONS) {
            let rows = self.board.read_button_rows();
            self.buttons
                .process_column(column, rows, now, &self.config, &mut self.sink);
            self.encoders
                .update(self.buttons.lines(), &self.config, &mut self.sink);
        }

        if self.config.hw_feature(hw_feature::LEDS) {
            self.leds.update_blink(now, self.config.blink_time_ms());
            self.leds.drive_column(column, &mut self.board);
        }
    }

    pub fn read_pots(&mut self) {
        if !self.config.hw_feature(hw_feature::POTS) {
            return;
        }
        let now = self.clock.now_ms();
        self.pots
            .read(&mut self.board, now, &self.config, &mut self.sink);
    }

    /// Answer a configuration request; `None` when it is not addressed to this device.
    pub fn handle_sysex(&mut self, request: &[u8]) -> Option<Response> {
        let now = self.clock.now_ms();
        self.sysex
            .process(request, &mut self.config, &mut self.leds, now)
    }

    /// A note arriving on the input channel drives the first LED with that activation note.
    pub fn note_received(&mut self, channel: u8, note: u8, velocity: u8) {
        if channel != self.config.midi_channel(midi_channel::INPUT) {
            return;
        }
        let Some(command) = LedCommand::from_velocity(velocity) else {
            return;
        };
        let total = self.config.total_led_number();
        let Some(led) = (0..total).find(|led| self.config.led_activation_note(*led) == note) else {
            crate::debug!("no led for note {}", note);
            return;
        };
        let blink = self.config.sw_feature(sw_feature::LED_BLINK);
        self.leds.apply(led, command, blink, self.clock.now_ms());
    }

    /// Play the configured start-up animation, leaving every LED off.
    pub fn start_up_routine(&mut self) {
        if !self.config.sw_feature(sw_feature::START_UP_ROUTINE)
            || !self.config.hw_feature(hw_feature::LEDS)
            || self.config.start_up_routine() != START_UP_WALK
        {
            return;
        }
        crate::info!("start-up routine");

        let total = (self.config.total_led_number() as usize).min(MAX_LEDS);
        let mut order = [0; MAX_LEDS];
        for (i, slot) in order[..total].iter_mut().enumerate() {
            *slot = self.config.led_start_up_number(i as u8);
        }

        for (forward, single, turn_on) in START_UP_PATTERN {
            let mut walk = WalkState::new(&mut self.leds, &order[..total], forward, single, turn_on);
            while walk.step(&mut self.leds) {
                self.refresh_leds();
            }
        }
        self.leds.set_all(false);
        self.refresh_leds();
    }

    /// Multiplex the LED rows for one start-up step.
    fn refresh_leds(&mut self) {
        let duration = self.config.start_up_switch_time_ms();
        let start = self.clock.now_ms();
        loop {
            let column = self.scanner.next_column(&mut self.board);
            self.leds.drive_column(column, &mut self.board);
            self.clock.delay_ms(SCAN_PERIOD_MS);
            if self.clock.now_ms().wrapping_sub(start) >= duration {
                break;
            }
        }
    }

    pub fn config(&self) -> &ConfigStore<S> {
        &self.config
    }

    pub fn leds(&self) -> &LedEngine {
        &self.leds
    }

    pub fn buttons(&self) -> &ButtonEngine {
        &self.buttons
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    pub fn sink(&self) -> &M {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut M {
        &mut self.sink
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

#[cfg(test)]
#[path = "device_test.rs"]
mod test;
