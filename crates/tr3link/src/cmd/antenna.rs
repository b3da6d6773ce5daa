use tr3link_frame::commands;

use crate::cmd::AntennaArgs;
use crate::exit::{client_error, frame_error, CliResult, SUCCESS};
use crate::output::{print_reply, OutputFormat};

pub fn run(args: AntennaArgs, format: OutputFormat) -> CliResult<i32> {
    let client = args.connect.open()?;
    let request = commands::switch_antenna(args.antenna, args.connect.address)
        .map_err(|err| frame_error("encode failed", err))?;
    let reply = client
        .transact(&request, args.connect.retries)
        .map_err(|err| client_error("antenna switch failed", err))?;
    client.close();

    println!("antenna #{} selected", args.antenna);
    print_reply(&reply, format);
    Ok(SUCCESS)
}
