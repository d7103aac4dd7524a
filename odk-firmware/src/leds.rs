//! LED state, blinking and the start-up animation.
//!
//! Each LED keeps one packed byte. Bit 0 requests constant on, bit 1 blinking, bit 2 marks the LED
//! active, bit 3 remembers a blink hidden behind a constant request and bit 4 is the blink phase.
//! Only the eight values named on [LedState] are ever stored.

use odk_common::{
    globals::{LED_VELOCITY_BLINK_OFF, LED_VELOCITY_BLINK_ON, LED_VELOCITY_CONSTANT_OFF, MAX_LEDS},
    sysex_message::led_state,
};

use crate::board::Board;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LedState(u8);

impl LedState {
    pub const OFF: Self = Self(0x00);
    pub const CONSTANT: Self = Self(0x05);
    pub const BLINK_DARK: Self = Self(0x06);
    pub const BLINK_LIT: Self = Self(0x16);
    pub const CONSTANT_REMEMBER: Self = Self(0x0d);
    pub const CONSTANT_REMEMBER_BLINK: Self = Self(0x1d);
    pub const BOTH: Self = Self(0x17);
    pub const CONSTANT_AFTER_BLINK: Self = Self(0x15);

    pub const ALL: [Self; 8] = [
        Self::OFF,
        Self::CONSTANT,
        Self::BLINK_DARK,
        Self::BLINK_LIT,
        Self::CONSTANT_REMEMBER,
        Self::CONSTANT_REMEMBER_BLINK,
        Self::BOTH,
        Self::CONSTANT_AFTER_BLINK,
    ];

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_lit(self) -> bool {
        self != Self::OFF && self != Self::BLINK_DARK
    }

    /// Blinking with nothing else requested; the only states the blink timer touches.
    pub fn is_pure_blink(self) -> bool {
        self == Self::BLINK_DARK || self == Self::BLINK_LIT
    }

    pub fn on(self, blink: bool) -> Self {
        match (self, blink) {
            (Self::OFF, false) => Self::CONSTANT,
            (Self::OFF, true) => Self::BLINK_LIT,
            (Self::CONSTANT, true) => Self::BOTH,
            (Self::BLINK_DARK | Self::BLINK_LIT, false) => Self::CONSTANT_REMEMBER,
            (Self::BLINK_DARK | Self::BLINK_LIT, true) => Self::BLINK_LIT,
            (Self::CONSTANT_REMEMBER, true) => Self::CONSTANT_REMEMBER_BLINK,
            (Self::BOTH, false) => Self::CONSTANT_REMEMBER,
            (Self::CONSTANT_AFTER_BLINK, true) => Self::BOTH,
            (s, _) => s,
        }
    }

    pub fn off(self, blink: bool) -> Self {
        match (self, blink) {
            (Self::CONSTANT, false) | (Self::CONSTANT_AFTER_BLINK, false) => Self::OFF,
            (Self::BLINK_DARK | Self::BLINK_LIT, true) => Self::OFF,
            (Self::CONSTANT_REMEMBER | Self::CONSTANT_REMEMBER_BLINK | Self::BOTH, false) => {
                Self::BLINK_LIT
            }
            (Self::CONSTANT_REMEMBER | Self::CONSTANT_REMEMBER_BLINK, true) => Self::CONSTANT,
            (Self::BOTH, true) => Self::CONSTANT_AFTER_BLINK,
            (s, _) => s,
        }
    }

    pub fn apply(self, command: LedCommand) -> Self {
        match command {
            LedCommand::ConstantOff => self.off(false),
            LedCommand::ConstantOn => self.on(false),
            LedCommand::BlinkOff => self.off(true),
            LedCommand::BlinkOn => self.on(true),
        }
    }

    /// Protocol state code: blinking, lit or off.
    pub fn code(self) -> u8 {
        if self.is_pure_blink() || self == Self::BOTH {
            led_state::BLINK_ON
        } else if self == Self::OFF {
            led_state::CONSTANT_OFF
        } else {
            led_state::CONSTANT_ON
        }
    }

    fn with_phase(self, lit: bool) -> Self {
        if !self.is_pure_blink() {
            self
        } else if lit {
            Self::BLINK_LIT
        } else {
            Self::BLINK_DARK
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedCommand {
    ConstantOff,
    ConstantOn,
    BlinkOff,
    BlinkOn,
}

impl LedCommand {
    /// Meaning of a note velocity received on the input channel.
    pub fn from_velocity(velocity: u8) -> Option<Self> {
        Some(match velocity {
            LED_VELOCITY_CONSTANT_OFF => Self::ConstantOff,
            LED_VELOCITY_BLINK_OFF => Self::BlinkOff,
            v if v < LED_VELOCITY_BLINK_OFF => Self::ConstantOn,
            LED_VELOCITY_BLINK_ON..=127 => Self::BlinkOn,
            _ => return None,
        })
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            led_state::CONSTANT_OFF => Self::ConstantOff,
            led_state::CONSTANT_ON => Self::ConstantOn,
            led_state::BLINK_OFF => Self::BlinkOff,
            led_state::BLINK_ON => Self::BlinkOn,
            _ => return None,
        })
    }

    /// The same request with blinking replaced by constant light.
    fn without_blink(self) -> Self {
        match self {
            Self::BlinkOff => Self::ConstantOff,
            Self::BlinkOn => Self::ConstantOn,
            c => c,
        }
    }
}

pub struct LedEngine {
    states: [LedState; MAX_LEDS],
    phase_lit: bool,
    blinking: bool,
    blink_timer: u32,
}

impl Default for LedEngine {
    fn default() -> Self {
        Self {
            states: [LedState::OFF; MAX_LEDS],
            phase_lit: true,
            blinking: false,
            blink_timer: 0,
        }
    }
}

impl LedEngine {
    pub fn state(&self, led: u8) -> LedState {
        self.states.get(led as usize).copied().unwrap_or_default()
    }

    pub fn states(&self) -> &[LedState] {
        &self.states
    }

    pub fn is_blinking(&self) -> bool {
        self.blinking
    }

    pub fn phase_lit(&self) -> bool {
        self.phase_lit
    }

    /// Apply `command` to `led`. Blink requests become constant ones when `blink_enabled` is off.
    pub fn apply(&mut self, led: u8, command: LedCommand, blink_enabled: bool, now: u32) {
        let Some(state) = self.states.get_mut(led as usize) else {
            return;
        };
        let command = if blink_enabled {
            command
        } else {
            command.without_blink()
        };
        let next = state.apply(command);
        *state = if self.blinking {
            next.with_phase(self.phase_lit)
        } else {
            next
        };
        self.check_blinking(now);
    }

    pub fn set_all(&mut self, on: bool) {
        let state = if on { LedState::CONSTANT } else { LedState::OFF };
        self.states = [state; MAX_LEDS];
        self.blinking = false;
        self.phase_lit = true;
    }

    /// Force `led` fully on or off.
    pub fn set(&mut self, led: u8, on: bool) {
        if let Some(s) = self.states.get_mut(led as usize) {
            *s = if on { LedState::CONSTANT } else { LedState::OFF };
        }
        self.check_blinking(self.blink_timer);
    }

    pub fn all_off(&self) -> bool {
        self.states.iter().all(|s| *s == LedState::OFF)
    }

    /// Flip the blink phase every `blink_time_ms` while any LED blinks.
    pub fn update_blink(&mut self, now: u32, blink_time_ms: u32) {
        if !self.blinking || now.wrapping_sub(self.blink_timer) < blink_time_ms {
            return;
        }
        self.phase_lit = !self.phase_lit;
        for s in self.states.iter_mut() {
            *s = s.with_phase(self.phase_lit);
        }
        self.blink_timer = now;
    }

    /// Light every LED row whose LED in `column` is lit.
    pub fn drive_column<B: Board>(&self, column: u8, board: &mut B) {
        let columns = board.columns() as usize;
        for row in 0..board.led_rows() {
            let led = column as usize + row as usize * columns;
            if self.states.get(led).is_some_and(|s| s.is_lit()) {
                board.led_row_on(row);
            }
        }
    }

    fn check_blinking(&mut self, now: u32) {
        let blinking = self.states.iter().any(|s| s.is_pure_blink());
        if blinking && !self.blinking {
            self.blink_timer = now;
            self.phase_lit = true;
        } else if !blinking && self.blinking {
            self.phase_lit = true;
        }
        self.blinking = blinking;
    }
}

/// One sweep of the start-up animation across the LEDs in start-up order.
#[derive(Debug)]
pub struct WalkState {
    order: [u8; MAX_LEDS],
    len: u8,
    forward: bool,
    single: bool,
    turn_on: bool,
    /// Next position in walk order.
    position: u8,
    /// Steps left, including the closing empty step.
    remaining: u8,
}

impl WalkState {
    /// Prepare a walk over `order`. Turning off in fill mode starts from everything lit. An edge
    /// LED already left in the target state by the previous walk is skipped.
    pub fn new(leds: &mut LedEngine, order: &[u8], forward: bool, single: bool, turn_on: bool) -> Self {
        let len = order.len().min(MAX_LEDS);
        let mut walk = Self {
            order: [0; MAX_LEDS],
            len: len as u8,
            forward,
            single,
            turn_on,
            position: 0,
            remaining: len as u8 + 1,
        };
        walk.order[..len].copy_from_slice(&order[..len]);

        if !turn_on && (!single || leds.all_off()) {
            leds.set_all(true);
        }

        if len > 0 && leds.state(walk.led_at(0)).is_lit() == turn_on {
            walk.position = 1;
            walk.remaining -= 1;
        }
        walk
    }

    fn led_at(&self, position: u8) -> u8 {
        let i = if self.forward {
            position
        } else {
            self.len - 1 - position
        };
        self.order[i as usize]
    }

    /// Do the next step. Returns false once the walk is over.
    pub fn step(&mut self, leds: &mut LedEngine) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        if self.position < self.len {
            if self.single {
                leds.set_all(!self.turn_on);
            }
            leds.set(self.led_at(self.position), self.turn_on);
            self.position += 1;
        }
        true
    }
}

/// The six sweeps of start-up pattern 1 as (forward, single, turn on).
pub const START_UP_PATTERN: [(bool, bool, bool); 6] = [
    (true, true, true),
    (false, false, true),
    (true, false, false),
    (false, true, true),
    (true, false, true),
    (false, false, false),
];

#[cfg(test)]
#[path = "leds_test.rs"]
mod test;
