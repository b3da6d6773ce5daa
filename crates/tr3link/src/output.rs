use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use tr3link_client::Reply;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct ReplyOutput {
    command: String,
    address: u8,
    payload_size: usize,
    payload: String,
    raw: String,
}

pub fn print_reply(reply: &Reply, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = ReplyOutput {
                command: format!("{:#04X}", reply.command),
                address: reply.address,
                payload_size: reply.payload.len(),
                payload: hex_bytes(&reply.payload),
                raw: hex_bytes(&reply.raw),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["CMD", "ADDR", "SIZE", "PAYLOAD"])
                .add_row(vec![
                    format!("{:#04X}", reply.command),
                    format!("{:#04X}", reply.address),
                    reply.payload.len().to_string(),
                    hex_bytes(&reply.payload),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "cmd={:#04X} addr={:#04X} size={} payload=[{}]",
                reply.command,
                reply.address,
                reply.payload.len(),
                hex_bytes(&reply.payload)
            );
        }
        OutputFormat::Raw => {
            print_raw(&reply.raw);
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

/// Space-separated uppercase hex, the way reader manuals print frames.
pub fn hex_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}
