#![cfg(unix)]

use std::io::Write;
use std::os::unix::net::UnixStream;
use std::sync::Arc;
use std::time::Duration;

use sliplink_link::LinkSet;
use sliplink_transport::StreamEndpoint;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

fn stream_endpoint(name: &str, stream: UnixStream) -> Arc<StreamEndpoint> {
    let reader = stream.try_clone().expect("socket should clone");
    Arc::new(StreamEndpoint::new(name, reader, stream))
}

#[test]
fn datagrams_cross_a_socket_pair() {
    let (left, right) = UnixStream::pair().expect("socket pair should open");
    let router_line = stream_endpoint("router", left);
    let host_line = stream_endpoint("host", right);
    let router = LinkSet::new([("10.0.0.2", Arc::clone(&router_line))]);
    let host = LinkSet::new([("10.0.0.1", Arc::clone(&host_line))]);
    let host_rx = host.register_channel();
    let router_rx = router.register_channel();
    router_line.start().expect("reader should start");
    host_line.start().expect("reader should start");

    for i in 0..32u8 {
        router
            .send(&[i, 0xC0, 0xDB, i], "10.0.0.2")
            .expect("send should succeed");
    }
    host.send(b"done", "10.0.0.1").expect("reply should succeed");

    for i in 0..32u8 {
        let datagram = host_rx.recv_timeout(RECV_TIMEOUT).expect("datagram should arrive");
        assert_eq!(datagram.as_ref(), &[i, 0xC0, 0xDB, i]);
    }
    let reply = router_rx.recv_timeout(RECV_TIMEOUT).expect("reply should arrive");
    assert_eq!(reply.as_ref(), b"done");
}

#[test]
fn frames_written_in_dribbles_are_reassembled() {
    let (local, mut remote) = UnixStream::pair().expect("socket pair should open");
    let line = stream_endpoint("dribble", local);
    let set = LinkSet::new([("10.0.0.2", Arc::clone(&line))]);
    let rx = set.register_channel();
    line.start().expect("reader should start");

    let wire = [0xC0, 0x45, 0x00, 0xDB, 0xDC, 0xDB, 0xDD, 0x01, 0xC0];
    for byte in wire {
        remote.write_all(&[byte]).expect("write should succeed");
        remote.flush().expect("flush should succeed");
        std::thread::sleep(Duration::from_millis(2));
    }

    let datagram = rx.recv_timeout(RECV_TIMEOUT).expect("datagram should arrive");
    assert_eq!(datagram.as_ref(), &[0x45, 0x00, 0xC0, 0xDB, 0x01]);
}

#[test]
fn reader_survives_a_panicking_receiver() {
    let (local, mut remote) = UnixStream::pair().expect("socket pair should open");
    let line = stream_endpoint("faulty", local);
    let set = LinkSet::new([("10.0.0.2", Arc::clone(&line))]);
    let (tx, rx) = std::sync::mpsc::channel();
    set.register_receiver(move |datagram| {
        assert_ne!(datagram.as_ref(), b"bad", "receiver rejects this datagram");
        tx.send(datagram).map_err(|err| err.into())
    });
    line.start().expect("reader should start");

    remote.write_all(b"\xC0bad\xC0").expect("write should succeed");
    remote.flush().expect("flush should succeed");
    std::thread::sleep(Duration::from_millis(20));
    remote.write_all(b"\xC0good\xC0").expect("write should succeed");

    let datagram = rx.recv_timeout(RECV_TIMEOUT).expect("datagram should arrive");
    assert_eq!(datagram.as_ref(), b"good");
    assert!(line.is_reading());
}
