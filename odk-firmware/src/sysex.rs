//! Configuration requests over SysEx.
//!
//! A request is checked field by field in wire order and the first failure is answered. Nothing is
//! written until the whole request has been validated.

use embedded_storage::Storage;
use odk_common::{
    globals::{
        board_type, hw_parameter, sw_feature, MAX_BUTTONS, MAX_LEDS, MIDI_CHANNEL_MAX,
        MIDI_CHANNEL_MIN,
    },
    sysex_message::{
        self as msg, Amount, MessageType, SysExError, Wish, ACK, ERROR, HANDSHAKE_LEN,
        MANUFACTURER_ID, REQUEST_HEADER_LEN, RESPONSE_HEADER_LEN,
    },
};

use crate::{
    config::{defaults::default_value, layout::locate, ConfigStore},
    leds::{LedCommand, LedEngine},
};

/// Largest element count of any message type.
const MAX_ELEMENTS: usize = MAX_BUTTONS;

const _: () = {
    let mut mt = 0;
    while mt <= MessageType::All as u8 {
        if let Some(mt) = MessageType::from_u8(mt) {
            assert!(mt.element_count() <= MAX_ELEMENTS);
        }
        mt += 1;
    }
};

pub const RESPONSE_CAPACITY: usize = RESPONSE_HEADER_LEN + MAX_ELEMENTS;

pub type Response = heapless::Vec<u8, RESPONSE_CAPACITY>;

/// Shortest valid request for the given operation.
pub fn min_length(wish: Wish, amount: Amount, mt: MessageType) -> usize {
    match (wish, amount) {
        (Wish::Set, Amount::Single) => msg::NEW_VALUE_SINGLE + 1,
        (Wish::Set, Amount::All) => msg::NEW_VALUE_ALL + mt.element_count(),
        (_, Amount::Single) => msg::PARAMETER_ID + 1,
        (_, Amount::All) => REQUEST_HEADER_LEN,
    }
}

/// True when `value` is acceptable for the addressed parameter.
pub fn value_in_range(mt: MessageType, sub_type: u8, index: u8, value: u8) -> bool {
    match mt {
        MessageType::MidiChannel => (MIDI_CHANNEL_MIN..=MIDI_CHANNEL_MAX).contains(&value),
        MessageType::HwParameter => match index {
            hw_parameter::BOARD_TYPE => value < board_type::COUNT,
            hw_parameter::LONG_PRESS_TIME => (hw_parameter::LONG_PRESS_TIME_MIN
                ..=hw_parameter::LONG_PRESS_TIME_MAX)
                .contains(&value),
            hw_parameter::BLINK_TIME => {
                (hw_parameter::BLINK_TIME_MIN..=hw_parameter::BLINK_TIME_MAX).contains(&value)
            }
            hw_parameter::START_UP_SWITCH_TIME => (hw_parameter::START_UP_SWITCH_TIME_MIN
                ..=hw_parameter::START_UP_SWITCH_TIME_MAX)
                .contains(&value),
            hw_parameter::START_UP_ROUTINE => value < hw_parameter::START_UP_ROUTINES,
            hw_parameter::TOTAL_LED_NUMBER => value as usize <= MAX_LEDS,
            _ => false,
        },
        MessageType::SwFeature | MessageType::HwFeature | MessageType::Encoder => value <= 1,
        MessageType::Button => match sub_type {
            msg::button::TYPE => value <= 1,
            _ => value < 128,
        },
        MessageType::Pot => match sub_type {
            msg::pot::CC_NUMBER => value < 128,
            _ => value <= 1,
        },
        MessageType::Led => match sub_type {
            msg::led::ACTIVATION_NOTE => value < 128,
            msg::led::START_UP_NUMBER => (value as usize) < MAX_LEDS,
            _ => value <= msg::led_state::BLINK_ON,
        },
        MessageType::All => false,
    }
}

pub fn error_response(error: SysExError) -> Response {
    let mut resp = Response::new();
    push(&mut resp, &MANUFACTURER_ID);
    push(&mut resp, &[ERROR, error.code()]);
    resp
}

fn push(resp: &mut Response, bytes: &[u8]) {
    if resp.extend_from_slice(bytes).is_err() {
        crate::warn!("sysex response overflow");
    }
}

/// Request fields that passed the header checks.
#[derive(Debug, Clone, Copy)]
struct Request {
    wish: Wish,
    amount: Amount,
    mt: MessageType,
    sub_type: u8,
}

impl Request {
    fn ack_header(&self) -> Response {
        let mut resp = Response::new();
        push(&mut resp, &MANUFACTURER_ID);
        push(
            &mut resp,
            &[
                ACK,
                self.wish as u8,
                self.amount as u8,
                self.mt as u8,
                self.sub_type,
            ],
        );
        resp
    }

    fn is_led_state(&self) -> bool {
        self.mt == MessageType::Led && self.sub_type == msg::led::STATE
    }
}

/// Protocol state; only the handshake is remembered between requests.
#[derive(Debug, Default)]
pub struct SysExEngine {
    session: bool,
}

impl SysExEngine {
    pub fn is_session_enabled(&self) -> bool {
        self.session
    }

    /// Answer `request`, with framing already removed. Returns `None` for messages addressed to
    /// another manufacturer.
    pub fn process<S: Storage>(
        &mut self,
        request: &[u8],
        config: &mut ConfigStore<S>,
        leds: &mut LedEngine,
        now: u32,
    ) -> Option<Response> {
        if request.get(..MANUFACTURER_ID.len()) != Some(&MANUFACTURER_ID[..]) {
            return None;
        }
        Some(match self.dispatch(request, config, leds, now) {
            Ok(resp) => resp,
            Err(err) => {
                crate::debug!("sysex rejected: {:?}", err);
                error_response(err)
            }
        })
    }

    fn dispatch<S: Storage>(
        &mut self,
        request: &[u8],
        config: &mut ConfigStore<S>,
        leds: &mut LedEngine,
        now: u32,
    ) -> Result<Response, SysExError> {
        if request.len() == HANDSHAKE_LEN {
            self.session = true;
            let mut resp = Response::new();
            push(&mut resp, &MANUFACTURER_ID);
            push(&mut resp, &[ACK]);
            return Ok(resp);
        }
        if !self.session {
            return Err(SysExError::HandshakeMissing);
        }
        let req = parse_header(request)?;

        if req.mt == MessageType::All {
            if req.amount == Amount::Single && request[msg::PARAMETER_ID] != 0 {
                return Err(SysExError::InvalidParameter);
            }
            crate::info!("factory reset");
            config
                .write_factory_defaults()
                .map_err(|_| SysExError::StoreWriteMismatch)?;
            leds.set_all(false);
            return Ok(req.ack_header());
        }

        match req.amount {
            Amount::Single => {
                let index = request[msg::PARAMETER_ID];
                if index as usize >= req.mt.element_count() {
                    return Err(SysExError::InvalidParameter);
                }
                let mut resp = req.ack_header();
                match req.wish {
                    Wish::Get => push(&mut resp, &[get(&req, index, config, leds)]),
                    Wish::Set => {
                        let value = request[msg::NEW_VALUE_SINGLE];
                        if !value_in_range(req.mt, req.sub_type, index, value) {
                            return Err(SysExError::InvalidNewParameter);
                        }
                        set(&req, index, value, config, leds, now)?;
                    }
                    Wish::Restore => restore(&req, index, config, leds)?,
                }
                Ok(resp)
            }
            Amount::All => {
                let count = req.mt.element_count();
                let mut resp = req.ack_header();
                match req.wish {
                    Wish::Get => {
                        for index in 0..count as u8 {
                            push(&mut resp, &[get(&req, index, config, leds)]);
                        }
                    }
                    Wish::Set => {
                        let values = &request[msg::NEW_VALUE_ALL..msg::NEW_VALUE_ALL + count];
                        if !values
                            .iter()
                            .zip(0..)
                            .all(|(v, i)| value_in_range(req.mt, req.sub_type, i, *v))
                        {
                            return Err(SysExError::InvalidNewParameter);
                        }
                        for (value, index) in values.iter().zip(0..) {
                            set(&req, index, *value, config, leds, now)?;
                        }
                    }
                    Wish::Restore => {
                        for index in 0..count as u8 {
                            restore(&req, index, config, leds)?;
                        }
                    }
                }
                Ok(resp)
            }
        }
    }
}

/// Steps 3 to 9 of validation: everything up to the parameter index.
fn parse_header(request: &[u8]) -> Result<Request, SysExError> {
    if request.len() < REQUEST_HEADER_LEN {
        return Err(SysExError::MessageTooShort);
    }
    let wish = Wish::from_u8(request[msg::WISH]).ok_or(SysExError::InvalidWish)?;
    let amount = Amount::from_u8(request[msg::AMOUNT]).ok_or(SysExError::InvalidAmount)?;
    let mt = MessageType::from_u8(request[msg::MESSAGE_TYPE])
        .ok_or(SysExError::InvalidMessageType)?;
    if request.len() < min_length(wish, amount, mt) {
        return Err(SysExError::MessageTooShort);
    }
    let sub_type = request[msg::SUB_TYPE];
    if sub_type >= mt.sub_type_count() {
        return Err(SysExError::InvalidSubType);
    }
    if mt == MessageType::All && wish != Wish::Restore {
        return Err(SysExError::NotSupported);
    }
    Ok(Request {
        wish,
        amount,
        mt,
        sub_type,
    })
}

fn get<S: Storage>(req: &Request, index: u8, config: &ConfigStore<S>, leds: &LedEngine) -> u8 {
    if req.is_led_state() {
        return leds.state(index).code();
    }
    locate(req.mt, req.sub_type, index).map_or(0, |loc| config.get(loc))
}

fn set<S: Storage>(
    req: &Request,
    index: u8,
    value: u8,
    config: &mut ConfigStore<S>,
    leds: &mut LedEngine,
    now: u32,
) -> Result<(), SysExError> {
    if req.is_led_state() {
        let command = LedCommand::from_code(value).ok_or(SysExError::InvalidNewParameter)?;
        let blink = config.sw_feature(sw_feature::LED_BLINK);
        leds.apply(index, command, blink, now);
        return Ok(());
    }
    let loc = locate(req.mt, req.sub_type, index).ok_or(SysExError::InvalidParameter)?;
    config
        .set(loc, value)
        .map_err(|_| SysExError::StoreWriteMismatch)
}

fn restore<S: Storage>(
    req: &Request,
    index: u8,
    config: &mut ConfigStore<S>,
    leds: &mut LedEngine,
) -> Result<(), SysExError> {
    if req.is_led_state() {
        leds.set(index, false);
        return Ok(());
    }
    let loc = locate(req.mt, req.sub_type, index).ok_or(SysExError::InvalidParameter)?;
    let value = default_value(req.mt, req.sub_type, index).ok_or(SysExError::InvalidParameter)?;
    config
        .set(loc, value)
        .map_err(|_| SysExError::StoreWriteMismatch)
}

#[cfg(test)]
#[path = "sysex_test.rs"]
mod test;
