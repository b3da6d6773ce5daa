//! Builders for the standard reader command frames.
//!
//! The codec and parser treat payloads as opaque; these helpers only
//! package the documented byte sequences for the common commands. Replies
//! are interpreted by the caller.

use bytes::Bytes;

use crate::codec::Frame;
use crate::error::Result;

/// Default reader address for a single-reader setup.
pub const DEFAULT_ADDRESS: u8 = 0x00;

/// ROM-version query command.
pub const CMD_ROM: u8 = 0x4F;
/// Reader-setting write command (command mode, antenna selection).
pub const CMD_SETTING: u8 = 0x4E;
/// Inventory2 tag-read trigger.
pub const CMD_INVENTORY2: u8 = 0x78;
/// Buzzer control.
pub const CMD_BUZZER: u8 = 0x42;
/// Command code carried by unsolicited tag report frames.
pub const CMD_TAG_REPORT: u8 = 0x49;

/// ROM-version query subcommand byte.
pub const SUB_ROM_VERSION: u8 = 0x90;
/// Antenna-selection setting register.
pub const SUB_ANTENNA: u8 = 0x9C;
/// Inventory2 acknowledgment marker, first payload byte of the ack.
pub const INVENTORY2_ACK: u8 = 0xF0;

/// Encode a ROM-version query.
pub fn check_rom(address: u8) -> Result<Bytes> {
    Frame::new(address, CMD_ROM, &[SUB_ROM_VERSION][..]).encode()
}

/// Encode the setting write that switches the reader into command mode.
pub fn set_command_mode(address: u8) -> Result<Bytes> {
    Frame::new(address, CMD_SETTING, &[0x00, 0x00, 0x00, 0x1C][..]).encode()
}

/// Encode an antenna-selection setting write. Antennas number from 0.
pub fn switch_antenna(antenna: u8, address: u8) -> Result<Bytes> {
    Frame::new(address, CMD_SETTING, vec![SUB_ANTENNA, antenna]).encode()
}

/// Encode an Inventory2 trigger. The reader acknowledges with
/// `[0xF0, tag_count]` and then sends one tag report frame per tag.
pub fn inventory2(address: u8) -> Result<Bytes> {
    Frame::new(address, CMD_INVENTORY2, &[0xF0, 0x40, 0x01][..]).encode()
}

/// Encode a buzzer command. `mode` 0x00 silences, 0x01 sounds.
pub fn buzzer(mode: u8, address: u8) -> Result<Bytes> {
    Frame::new(address, CMD_BUZZER, vec![mode, 0x00]).encode()
}
