#![no_std]
pub mod globals;
pub mod sysex_message;
