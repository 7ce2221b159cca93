//! Two hosts joined by an in-memory null-modem cable exchange datagrams.
//!
//! Run with: `cargo run -p sliplink --example null-modem`

use sliplink::transport::MemoryEndpoint;
use sliplink::{LinkError, LinkSet};

fn main() -> Result<(), LinkError> {
    let (router_line, host_line) = MemoryEndpoint::pair();

    // Each side names the peer at the far end of its line.
    let router = LinkSet::new([("192.168.123.2", router_line.clone())]);
    let host = LinkSet::new([("192.168.123.1", host_line)]);

    host.register_receiver(|datagram| {
        println!("host received {} bytes: {:02x?}", datagram.len(), datagram.as_ref());
        Ok(())
    });
    let router_rx = router.register_channel();

    router.send(&[0x45, 0x00, 0xC0, 0xDB, 0x01], "192.168.123.2")?;
    println!("router wrote {:02x?}", router_line.take_sent());

    host.send(b"pong", "192.168.123.1")?;
    for datagram in router_rx.try_iter() {
        println!("router received {:?}", String::from_utf8_lossy(&datagram));
    }

    match router.send(b"lost", "10.0.0.1") {
        Err(err) => println!("expected failure: {err}"),
        Ok(()) => unreachable!("no link leads to 10.0.0.1"),
    }
    Ok(())
}
