//! Canned reply generation for the emulated reader.

use bytes::Bytes;

use tr3link_frame::commands::{
    CMD_BUZZER, CMD_INVENTORY2, CMD_ROM, CMD_SETTING, CMD_TAG_REPORT, INVENTORY2_ACK,
    SUB_ROM_VERSION,
};
use tr3link_frame::{Frame, Result};

/// ROM identity the emulator reports: version digits, series, model code.
pub const ROM_IDENT: &[u8] = b"1052TR3A1";

/// Payload byte returned for commands the emulator does not model.
const NAK: u8 = 0xFF;

/// Demo tag list: each entry is a DSFID byte followed by an 8-byte UID.
pub fn default_tags() -> Vec<Bytes> {
    vec![
        Bytes::from_static(&[0x00, 0xE0, 0x04, 0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC]),
        Bytes::from_static(&[0x01, 0xE0, 0x04, 0x98, 0x76, 0x54, 0x32, 0x10, 0xFF]),
    ]
}

/// Build the reply frames for one received command.
///
/// Inventory produces an acknowledgment followed by one tag report frame
/// per configured tag, which is exactly the multi-frame shape clients
/// must drain with receive-only reads.
pub fn build_replies(address: u8, command: u8, data: &[u8], tags: &[Bytes]) -> Result<Vec<Bytes>> {
    match (command, data) {
        (CMD_ROM, [SUB_ROM_VERSION]) => {
            let mut rom = vec![SUB_ROM_VERSION];
            rom.extend_from_slice(ROM_IDENT);
            Ok(vec![Frame::new(address, CMD_ROM, rom).encode()?])
        }
        (CMD_SETTING, _) => Ok(vec![Frame::new(address, CMD_SETTING, &[0x00][..]).encode()?]),
        (CMD_INVENTORY2, _) => {
            let count = tags.len().min(usize::from(u8::MAX)) as u8;
            let mut replies =
                vec![Frame::new(address, CMD_INVENTORY2, vec![INVENTORY2_ACK, count]).encode()?];
            for tag in tags.iter().take(usize::from(count)) {
                replies.push(Frame::new(address, CMD_TAG_REPORT, tag.clone()).encode()?);
            }
            Ok(replies)
        }
        (CMD_BUZZER, _) => Ok(vec![Frame::new(address, CMD_BUZZER, &[0x00][..]).encode()?]),
        _ => Ok(vec![Frame::new(address, command, &[NAK][..]).encode()?]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tr3link_frame::Parser;

    fn decode(wire: &Bytes) -> (u8, u8, Bytes) {
        let mut parser = Parser::new();
        let mut complete = false;
        for &byte in wire.iter() {
            complete = parser.push(byte);
        }
        assert!(complete, "reply frame must parse");
        parser.take_fields().expect("fields should be available")
    }

    #[test]
    fn rom_query_reports_the_identity() {
        let replies =
            build_replies(0x00, CMD_ROM, &[SUB_ROM_VERSION], &[]).expect("build should succeed");
        assert_eq!(replies.len(), 1);

        let (_, command, payload) = decode(&replies[0]);
        assert_eq!(command, CMD_ROM);
        assert_eq!(payload[0], SUB_ROM_VERSION);
        assert_eq!(&payload[1..], ROM_IDENT);
    }

    #[test]
    fn rom_command_with_unknown_subcommand_naks() {
        let replies = build_replies(0x00, CMD_ROM, &[0x12], &[]).expect("build should succeed");
        let (_, _, payload) = decode(&replies[0]);
        assert_eq!(payload.as_ref(), &[NAK]);
    }

    #[test]
    fn setting_writes_are_acknowledged() {
        for data in [&[0x00, 0x00, 0x00, 0x1C][..], &[0x9C, 0x01][..]] {
            let replies =
                build_replies(0x00, CMD_SETTING, data, &[]).expect("build should succeed");
            let (_, command, payload) = decode(&replies[0]);
            assert_eq!(command, CMD_SETTING);
            assert_eq!(payload.as_ref(), &[0x00]);
        }
    }

    #[test]
    fn inventory_acknowledges_then_reports_each_tag() {
        let tags = default_tags();
        let replies = build_replies(0x00, CMD_INVENTORY2, &[0xF0, 0x40, 0x01], &tags)
            .expect("build should succeed");
        assert_eq!(replies.len(), 1 + tags.len());

        let (_, command, payload) = decode(&replies[0]);
        assert_eq!(command, CMD_INVENTORY2);
        assert_eq!(payload.as_ref(), &[INVENTORY2_ACK, tags.len() as u8]);

        for (reply, tag) in replies[1..].iter().zip(&tags) {
            let (_, command, payload) = decode(reply);
            assert_eq!(command, CMD_TAG_REPORT);
            assert_eq!(&payload, tag);
        }
    }

    #[test]
    fn inventory_with_no_tags_reports_zero() {
        let replies = build_replies(0x00, CMD_INVENTORY2, &[0xF0, 0x40, 0x01], &[])
            .expect("build should succeed");
        assert_eq!(replies.len(), 1);
        let (_, _, payload) = decode(&replies[0]);
        assert_eq!(payload.as_ref(), &[INVENTORY2_ACK, 0x00]);
    }

    #[test]
    fn unknown_commands_get_a_nak_echoing_the_command() {
        let replies = build_replies(0x02, 0x6B, &[0x01], &[]).expect("build should succeed");
        let (address, command, payload) = decode(&replies[0]);
        assert_eq!(address, 0x02);
        assert_eq!(command, 0x6B);
        assert_eq!(payload.as_ref(), &[NAK]);
    }
}
