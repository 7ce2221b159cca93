use sliplink::frame::encode;

use crate::cmd::EncodeArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let datagram = args.payload.resolve()?;
    let frame = encode(&datagram);
    print_frame(&frame, datagram.len(), format);
    Ok(SUCCESS)
}
