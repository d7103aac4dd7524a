extern crate std;

use core::{
    cell::{Cell, RefCell},
    convert::Infallible,
};
use embedded_hal::digital::ErrorType;
use std::rc::Rc;

use super::*;

#[derive(Clone, Default)]
struct Pin(Rc<Cell<bool>>);

impl Pin {
    fn high(&self) -> bool {
        self.0.get()
    }
}

impl ErrorType for Pin {
    type Error = Infallible;
}

impl InputPin for Pin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.get())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.0.get())
    }
}

impl OutputPin for Pin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.set(true);
        Ok(())
    }
}

struct Adc;

impl AnalogInput for Adc {
    fn read(&mut self, channel: u8) -> u16 {
        0xf000 | channel as u16 * 100
    }
}

/// Records the mux input selected when each delay starts, with its length.
struct Delay {
    mux: [Pin; 3],
    log: Rc<RefCell<std::vec::Vec<(u8, u32)>>>,
}

impl DelayNs for Delay {
    fn delay_ns(&mut self, ns: u32) {
        let input = self
            .mux
            .iter()
            .enumerate()
            .fold(0, |acc, (i, p)| acc | (p.high() as u8) << i);
        self.log.borrow_mut().push((input, ns));
    }
}

macro_rules! setup {
    ($board:ident, $cols:ident, $rows:ident, $leds:ident, $mux:ident) => {
        setup!($board, $cols, $rows, $leds, $mux, _delays);
    };
    ($board:ident, $cols:ident, $rows:ident, $leds:ident, $mux:ident, $delays:ident) => {
        let $cols: [Pin; 5] = Default::default();
        let $rows: [Pin; 4] = Default::default();
        let $leds: [Pin; 1] = Default::default();
        let $mux: [Pin; 3] = Default::default();
        for r in $rows.iter() {
            r.0.set(true);
        }
        let $delays = Rc::new(RefCell::new(std::vec::Vec::new()));
        let delay = Delay {
            mux: $mux.clone(),
            log: $delays.clone(),
        };
        #[allow(unused_mut)]
        let mut $board = PinMatrix::tannin(
            $cols.clone(),
            $rows.clone(),
            $leds.clone(),
            $mux.clone(),
            Adc,
            delay,
        );
    };
}

#[test]
fn layouts() {
    assert_eq!(
        BoardLayout::for_board_type(board_type::OPEN_DECK_1),
        Some(BoardLayout::OPEN_DECK_1)
    );
    assert_eq!(BoardLayout::for_board_type(board_type::CUSTOM), None);

    let tannin = BoardLayout::for_board_type(board_type::TANNIN).unwrap();
    assert_eq!(
        (tannin.columns, tannin.button_rows, tannin.led_rows),
        (5, 4, 1)
    );
    assert!(tannin.is_analog_channel_enabled(1));
    assert!(!tannin.is_analog_channel_enabled(6));
    assert!(BoardLayout::OPEN_DECK_1.is_analog_channel_enabled(6));
    assert!(!BoardLayout::OPEN_DECK_1.is_analog_channel_enabled(9));
}

#[test]
fn columns_are_active_low() {
    setup!(board, cols, _rows, _leds, _mux);
    assert!(cols.iter().all(Pin::high));
    assert_eq!(board.layout(), BoardLayout::TANNIN);

    board.activate_column(2);
    assert_eq!(
        cols.iter().map(Pin::high).collect::<std::vec::Vec<_>>(),
        [true, true, false, true, true]
    );

    board.activate_column(4);
    assert!(cols[2].high());
    assert!(!cols[4].high());
}

#[test]
fn button_rows_read_low_as_pressed() {
    setup!(board, _cols, rows, _leds, _mux);
    assert_eq!(board.read_button_rows(), 0);

    rows[1].0.set(false);
    rows[3].0.set(false);
    assert_eq!(board.read_button_rows(), 0b1010);
}

#[test]
fn led_rows() {
    setup!(board, _cols, _rows, leds, _mux);
    assert!(!leds[0].high());
    board.led_row_on(0);
    assert!(leds[0].high());
    board.led_row_on(3);
    board.led_rows_off();
    assert!(!leds[0].high());
}

#[test]
fn mux_select_and_analog() {
    setup!(board, _cols, _rows, _leds, mux);
    board.select_mux_input(5);
    assert_eq!(
        mux.iter().map(Pin::high).collect::<std::vec::Vec<_>>(),
        [true, false, true]
    );
    board.select_mux_input(2);
    assert_eq!(
        mux.iter().map(Pin::high).collect::<std::vec::Vec<_>>(),
        [false, true, false]
    );

    assert!(board.is_analog_channel_enabled(0));
    assert!(!board.is_analog_channel_enabled(2));
    assert_eq!(board.sample_analog(1), 100);
}

#[test]
fn mux_settles_before_sampling() {
    setup!(board, _cols, _rows, _leds, _mux, delays);
    assert!(delays.borrow().is_empty());

    board.select_mux_input(6);
    board.select_mux_input(3);
    assert_eq!(
        delays.borrow().as_slice(),
        &[(6, MUX_SETTLE_NS), (3, MUX_SETTLE_NS)]
    );
}
