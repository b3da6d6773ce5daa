use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use tracing::warn;

use tr3link_client::{Reply, Tr3Client};
use tr3link_frame::commands;

use crate::cmd::InventoryArgs;
use crate::exit::{client_error, frame_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{hex_bytes, OutputFormat};

/// One tag reported by an inventory read: DSFID byte plus 8-byte UID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryTag {
    pub dsfid: u8,
    pub uid: Vec<u8>,
}

impl InventoryTag {
    /// Parse a tag report payload. Anything that is not DSFID + UID8 is
    /// not a tag.
    pub fn from_reply(reply: &Reply) -> Option<Self> {
        if reply.command != commands::CMD_TAG_REPORT || reply.payload.len() != 9 {
            return None;
        }
        Some(Self {
            dsfid: reply.payload[0],
            uid: reply.payload[1..].to_vec(),
        })
    }

    /// UID rendered MSB-first, the byte order reader manuals print.
    pub fn uid_text(&self) -> String {
        let ordered: Vec<u8> = self.uid.iter().rev().copied().collect();
        hex_bytes(&ordered)
    }
}

pub fn run(args: InventoryArgs, format: OutputFormat) -> CliResult<i32> {
    let client = args.connect.open()?;
    let tags = collect_tags(&client, args.connect.address, args.connect.retries)?;
    client.close();

    print_tags(&tags, format);
    Ok(SUCCESS)
}

/// Trigger Inventory2 and drain the tag report frames that follow the
/// acknowledgment.
pub fn collect_tags(client: &Tr3Client, address: u8, retries: u32) -> CliResult<Vec<InventoryTag>> {
    let request =
        commands::inventory2(address).map_err(|err| frame_error("encode failed", err))?;
    let ack = client
        .transact(&request, retries)
        .map_err(|err| client_error("inventory failed", err))?;

    if ack.command != commands::CMD_INVENTORY2
        || ack.payload.len() < 2
        || ack.payload[0] != commands::INVENTORY2_ACK
    {
        return Err(CliError::new(
            DATA_INVALID,
            format!(
                "unexpected inventory acknowledgment: cmd={:#04X} payload=[{}]",
                ack.command,
                hex_bytes(&ack.payload)
            ),
        ));
    }

    let count = usize::from(ack.payload[1]);
    let mut tags = Vec::with_capacity(count);
    for index in 0..count {
        let report = client
            .receive_only()
            .map_err(|err| client_error("tag report missing", err))?;
        match InventoryTag::from_reply(&report) {
            Some(tag) => tags.push(tag),
            None => warn!(
                index,
                command = report.command,
                "unexpected frame in tag report stream"
            ),
        }
    }
    Ok(tags)
}

pub fn print_tags(tags: &[InventoryTag], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(tags).unwrap_or_else(|_| "[]".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "DSFID", "UID"]);
            for (index, tag) in tags.iter().enumerate() {
                table.add_row(vec![
                    (index + 1).to_string(),
                    format!("{:02X}", tag.dsfid),
                    tag.uid_text(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            for (index, tag) in tags.iter().enumerate() {
                println!(
                    "tag {}: dsfid={:02X} uid={}",
                    index + 1,
                    tag.dsfid,
                    tag.uid_text()
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use tr3link_frame::Frame;

    fn tag_reply(payload: &[u8]) -> Reply {
        let raw = Frame::new(0x00, commands::CMD_TAG_REPORT, payload.to_vec())
            .encode()
            .expect("encode should succeed");
        Reply::from_raw(raw).expect("decode should succeed")
    }

    #[test]
    fn parses_a_tag_report() {
        let reply = tag_reply(&[0x01, 0xE0, 0x04, 0x98, 0x76, 0x54, 0x32, 0x10, 0xFF]);
        let tag = InventoryTag::from_reply(&reply).expect("tag should parse");
        assert_eq!(tag.dsfid, 0x01);
        assert_eq!(tag.uid.len(), 8);
        assert_eq!(tag.uid_text(), "FF 10 32 54 76 98 04 E0");
    }

    #[test]
    fn rejects_wrong_shape_or_command() {
        let short = tag_reply(&[0x01, 0xE0]);
        assert_eq!(InventoryTag::from_reply(&short), None);

        let raw = Frame::new(0x00, commands::CMD_ROM, Bytes::from_static(&[0u8; 9]))
            .encode()
            .expect("encode should succeed");
        let wrong_command = Reply::from_raw(raw).expect("decode should succeed");
        assert_eq!(InventoryTag::from_reply(&wrong_command), None);
    }
}
