use crate::cmd::SendArgs;
use crate::exit::{link_error, CliResult, SUCCESS};

pub fn run(args: SendArgs) -> CliResult<i32> {
    let datagram = args.payload.resolve()?;
    let links = args.links.open()?;

    links
        .set
        .send(&datagram, &args.to)
        .map_err(|err| link_error("send failed", err))?;

    tracing::info!(peer = %args.to, size = datagram.len(), "datagram sent");
    Ok(SUCCESS)
}
