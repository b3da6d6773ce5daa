use std::time::Duration;

use clap::{Args, Subcommand};
use tr3link_client::Tr3Client;

use crate::exit::{client_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod antenna;
pub mod buzzer;
pub mod emulate;
pub mod inventory;
pub mod rom;
pub mod session;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Query the reader's ROM version.
    Rom(RomArgs),
    /// Switch the active antenna.
    Antenna(AntennaArgs),
    /// Trigger an inventory read and list the reported tags.
    Inventory(InventoryArgs),
    /// Sound or silence the buzzer.
    Buzzer(BuzzerArgs),
    /// Run a full demo session against an in-process emulator.
    Session(SessionArgs),
    /// Run the reader emulator in the foreground until Ctrl-C.
    Emulate(emulate::EmulateArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Rom(args) => rom::run(args, format),
        Command::Antenna(args) => antenna::run(args, format),
        Command::Inventory(args) => inventory::run(args, format),
        Command::Buzzer(args) => buzzer::run(args, format),
        Command::Session(args) => session::run(args, format),
        Command::Emulate(args) => emulate::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Connection flags shared by every reader-facing subcommand.
#[derive(Args, Debug, Clone)]
pub struct ConnectArgs {
    /// Reader host name or IP address.
    #[arg(long, default_value = "192.168.0.2")]
    pub host: String,

    /// Reader TCP port.
    #[arg(long, default_value_t = 9004)]
    pub port: u16,

    /// I/O timeout for connect, reads, and writes (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,

    /// Extra attempts after a timed-out transaction.
    #[arg(long, default_value_t = 1)]
    pub retries: u32,

    /// Reader address byte.
    #[arg(long, default_value_t = 0x00)]
    pub address: u8,
}

impl ConnectArgs {
    /// Connect a fresh client with these flags.
    pub fn open(&self) -> CliResult<Tr3Client> {
        let timeout = parse_duration(&self.timeout)?;
        let client = Tr3Client::new();
        client
            .connect(&self.host, self.port, timeout)
            .map_err(|err| client_error("connect failed", err))?;
        Ok(client)
    }
}

#[derive(Args, Debug)]
pub struct RomArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
}

#[derive(Args, Debug)]
pub struct AntennaArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,

    /// Antenna number to activate (numbering starts at 0).
    #[arg(long, short = 'n', default_value_t = 0)]
    pub antenna: u8,
}

#[derive(Args, Debug)]
pub struct InventoryArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
}

#[derive(Args, Debug)]
pub struct BuzzerArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,

    /// Silence instead of sounding.
    #[arg(long)]
    pub off: bool,
}

#[derive(Args, Debug)]
pub struct SessionArgs {
    /// I/O timeout for the demo client (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,

    /// Extra attempts after a timed-out transaction.
    #[arg(long, default_value_t = 1)]
    pub retries: u32,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build information.
    #[arg(long)]
    pub extended: bool,
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        _ => Err(CliError::new(
            USAGE,
            format!("unsupported duration unit: {unit}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
        assert!(parse_duration("").is_err());
    }
}
