use std::net::SocketAddr;

use tracing::info;

use tr3link_client::Tr3Client;
use tr3link_emulator::DeviceEmulator;
use tr3link_frame::commands;

use crate::cmd::inventory::{collect_tags, print_tags};
use crate::cmd::rom::parse_rom_text;
use crate::cmd::{parse_duration, SessionArgs};
use crate::exit::{client_error, frame_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::OutputFormat;

/// Run the complete demo conversation against an in-process emulator:
/// ROM query, command mode, antenna select, inventory with tag reports,
/// buzzer.
pub fn run(args: SessionArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;
    let bind: SocketAddr = "127.0.0.1:0"
        .parse()
        .map_err(|err| CliError::new(INTERNAL, format!("loopback addr: {err}")))?;

    let mut emulator = DeviceEmulator::new()
        .spawn(bind)
        .map_err(|err| CliError::new(INTERNAL, format!("emulator start failed: {err}")))?;
    let addr = emulator.local_addr();

    let result = run_sequence(&addr, timeout, args.retries, format);

    emulator.stop();
    result
}

fn run_sequence(
    addr: &SocketAddr,
    timeout: std::time::Duration,
    retries: u32,
    format: OutputFormat,
) -> CliResult<i32> {
    let address = commands::DEFAULT_ADDRESS;
    let client = Tr3Client::new();
    client
        .connect(&addr.ip().to_string(), addr.port(), timeout)
        .map_err(|err| client_error("connect failed", err))?;
    info!(%addr, "connected to emulator");

    let rom = client
        .transact(
            &commands::check_rom(address).map_err(|err| frame_error("encode failed", err))?,
            retries,
        )
        .map_err(|err| client_error("ROM query failed", err))?;
    println!(
        "ROM version: {}",
        parse_rom_text(&rom.payload).unwrap_or_else(|| "unknown".to_string())
    );

    client
        .transact(
            &commands::set_command_mode(address)
                .map_err(|err| frame_error("encode failed", err))?,
            retries,
        )
        .map_err(|err| client_error("command-mode set failed", err))?;
    println!("command mode set");

    client
        .transact(
            &commands::switch_antenna(0, address)
                .map_err(|err| frame_error("encode failed", err))?,
            retries,
        )
        .map_err(|err| client_error("antenna switch failed", err))?;
    println!("antenna #0 selected");

    let tags = collect_tags(&client, address, retries)?;
    println!("inventory reported {} tag(s)", tags.len());
    print_tags(&tags, format);

    client
        .transact(
            &commands::buzzer(0x01, address).map_err(|err| frame_error("encode failed", err))?,
            retries,
        )
        .map_err(|err| client_error("buzzer command failed", err))?;
    println!("buzzer sounded");

    client.close();
    Ok(SUCCESS)
}
