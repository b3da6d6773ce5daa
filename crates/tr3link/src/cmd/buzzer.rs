use tr3link_frame::commands;

use crate::cmd::BuzzerArgs;
use crate::exit::{client_error, frame_error, CliResult, SUCCESS};
use crate::output::{print_reply, OutputFormat};

pub fn run(args: BuzzerArgs, format: OutputFormat) -> CliResult<i32> {
    let mode = if args.off { 0x00 } else { 0x01 };

    let client = args.connect.open()?;
    let request = commands::buzzer(mode, args.connect.address)
        .map_err(|err| frame_error("encode failed", err))?;
    let reply = client
        .transact(&request, args.connect.retries)
        .map_err(|err| client_error("buzzer command failed", err))?;
    client.close();

    print_reply(&reply, format);
    Ok(SUCCESS)
}
