use sliplink::frame::{DecoderConfig, SlipDecoder};

use crate::cmd::DecodeArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_datagram, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let wire = args.payload.resolve()?;
    let mut decoder = SlipDecoder::with_config(DecoderConfig {
        max_frame_size: args.max_frame_size,
    });

    let datagrams = decoder.feed(&wire);
    for (i, datagram) in datagrams.iter().enumerate() {
        print_datagram(datagram, i + 1, format);
    }

    if !decoder.pending().is_empty() {
        tracing::warn!(
            pending = decoder.pending().len(),
            "input ends inside an unterminated frame"
        );
    }
    tracing::debug!(datagrams = datagrams.len(), input = wire.len(), "decode finished");

    Ok(SUCCESS)
}
