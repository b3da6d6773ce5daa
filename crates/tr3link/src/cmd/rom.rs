use tr3link_frame::commands;

use crate::cmd::RomArgs;
use crate::exit::{client_error, frame_error, CliResult, SUCCESS};
use crate::output::{print_reply, OutputFormat};

pub fn run(args: RomArgs, format: OutputFormat) -> CliResult<i32> {
    let client = args.connect.open()?;
    let request = commands::check_rom(args.connect.address)
        .map_err(|err| frame_error("encode failed", err))?;
    let reply = client
        .transact(&request, args.connect.retries)
        .map_err(|err| client_error("ROM query failed", err))?;
    client.close();

    match parse_rom_text(&reply.payload) {
        Some(text) => println!("ROM version: {text}"),
        None => println!("ROM version: unknown"),
    }
    print_reply(&reply, format);
    Ok(SUCCESS)
}

/// Render the ROM reply payload as a human-readable version string.
///
/// Layout after the `0x90` echo byte: one major digit, two minor digits,
/// one patch digit, three series characters, two model-code characters.
pub fn parse_rom_text(data: &[u8]) -> Option<String> {
    if data.len() < 10 || data[0] != 0x90 {
        return None;
    }
    let text: String = data[1..10].iter().map(|&b| char::from(b)).collect();
    let (version, ident) = text.split_at(4);
    let (major, rest) = version.split_at(1);
    let (minor, patch) = rest.split_at(2);
    Some(format!("{major}.{minor}.{patch} {ident}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_emulator_identity() {
        let mut data = vec![0x90];
        data.extend_from_slice(b"1052TR3A1");
        assert_eq!(parse_rom_text(&data).as_deref(), Some("1.05.2 TR3A1"));
    }

    #[test]
    fn rejects_short_or_unmarked_payloads() {
        assert_eq!(parse_rom_text(&[0x90, 0x31]), None);
        let mut data = vec![0x00];
        data.extend_from_slice(b"1052TR3A1");
        assert_eq!(parse_rom_text(&data), None);
    }
}
