use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use bytes::Bytes;
use sliplink_frame::{encode, DecoderConfig, SlipDecoder};
use sliplink_transport::PhysicalEndpoint;
use tracing::{trace, warn};

use crate::error::{DeliveryResult, Result};

/// Configuration for a [`Link`].
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// Label attached to this link's log records.
    pub label: String,
    /// Reassembly settings for the incoming direction.
    pub decoder: DecoderConfig,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            label: "link".to_string(),
            decoder: DecoderConfig::default(),
        }
    }
}

/// One SLIP-framed datagram pipe over a physical endpoint.
///
/// Construction installs the raw receive handler on the endpoint. That
/// handler owns the reassembly state and runs on whatever thread the endpoint
/// delivers bytes from; every datagram it completes is handed to the
/// `on_datagram` callback before the next segment of the chunk is looked at.
/// A callback `Err` or panic is logged and the next frame is processed as
/// usual, so the endpoint's delivery thread survives a faulty consumer.
///
/// `send` runs entirely in the caller's thread. `Link` adds no locking of its
/// own between sending and receiving.
pub struct Link {
    endpoint: Box<dyn PhysicalEndpoint>,
    label: String,
}

impl Link {
    /// Create a link with default configuration.
    pub fn new<E, F>(endpoint: E, on_datagram: F) -> Self
    where
        E: PhysicalEndpoint + 'static,
        F: FnMut(Bytes) -> DeliveryResult + Send + 'static,
    {
        Self::with_config(endpoint, LinkConfig::default(), on_datagram)
    }

    /// Create a link with explicit configuration.
    pub fn with_config<E, F>(endpoint: E, config: LinkConfig, mut on_datagram: F) -> Self
    where
        E: PhysicalEndpoint + 'static,
        F: FnMut(Bytes) -> DeliveryResult + Send + 'static,
    {
        let mut decoder = SlipDecoder::with_config(config.decoder);
        let label = config.label.clone();

        endpoint.register_receiver(Box::new(move |chunk: &[u8]| {
            decoder.feed_with(chunk, |datagram| {
                let size = datagram.len();
                match catch_unwind(AssertUnwindSafe(|| on_datagram(datagram))) {
                    Ok(Ok(())) => trace!(link = %label, size, "delivered datagram"),
                    Ok(Err(err)) => {
                        warn!(link = %label, size, error = %err, "datagram delivery failed")
                    }
                    Err(panic) => warn!(
                        link = %label,
                        size,
                        panic = panic_message(panic.as_ref()),
                        "datagram receiver panicked"
                    ),
                }
            });
        }));

        Self {
            endpoint: Box::new(endpoint),
            label: config.label,
        }
    }

    /// Frame `datagram` and write it to the endpoint in a single `send`.
    ///
    /// Endpoint errors are returned as [`LinkError::Transport`](crate::LinkError::Transport).
    pub fn send(&self, datagram: &[u8]) -> Result<()> {
        let frame = encode(datagram);
        self.endpoint.send(&frame)?;
        trace!(link = %self.label, size = datagram.len(), wire_size = frame.len(), "sent datagram");
        Ok(())
    }

    /// Label used in this link's log records.
    pub fn label(&self) -> &str {
        &self.label
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

impl std::fmt::Debug for Link {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Link").field("label", &self.label).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use sliplink_transport::{MemoryEndpoint, TransportError};

    use super::*;
    use crate::error::LinkError;

    type Received = Arc<Mutex<Vec<Vec<u8>>>>;

    fn recording_link(endpoint: &Arc<MemoryEndpoint>) -> (Link, Received) {
        let received: Received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        let link = Link::new(Arc::clone(endpoint), move |datagram: Bytes| {
            sink.lock().unwrap().push(datagram.to_vec());
            Ok(())
        });
        (link, received)
    }

    #[test]
    fn send_writes_framed_datagram() {
        let endpoint = MemoryEndpoint::new();
        let (link, _) = recording_link(&endpoint);

        link.send(&[0x45, 0x00, 0xC0, 0xDB, 0x01]).unwrap();

        assert_eq!(
            endpoint.sent(),
            vec![0xC0, 0x45, 0x00, 0xDB, 0xDC, 0xDB, 0xDD, 0x01, 0xC0]
        );
    }

    #[test]
    fn send_empty_datagram_writes_two_delimiters() {
        let endpoint = MemoryEndpoint::new();
        let (link, _) = recording_link(&endpoint);

        link.send(b"").unwrap();

        assert_eq!(endpoint.sent(), vec![0xC0, 0xC0]);
    }

    #[test]
    fn construction_registers_receiver() {
        let endpoint = MemoryEndpoint::new();
        assert!(!endpoint.has_receiver());
        let (_link, _) = recording_link(&endpoint);
        assert!(endpoint.has_receiver());
    }

    #[test]
    fn incoming_chunks_are_decoded() {
        let endpoint = MemoryEndpoint::new();
        let (_link, received) = recording_link(&endpoint);

        endpoint.inject(b"\xC0hel");
        assert!(received.lock().unwrap().is_empty());
        endpoint.inject(b"lo\xC0\xC0wor");
        endpoint.inject(b"ld\xC0");

        assert_eq!(
            *received.lock().unwrap(),
            vec![b"hello".to_vec(), b"world".to_vec()]
        );
    }

    #[test]
    fn failed_delivery_does_not_block_next_frame() {
        let endpoint = MemoryEndpoint::new();
        let received: Received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        let _link = Link::new(Arc::clone(&endpoint), move |datagram: Bytes| {
            if datagram.as_ref() == b"bad" {
                return Err("rejected".into());
            }
            sink.lock().unwrap().push(datagram.to_vec());
            Ok(())
        });

        endpoint.inject(b"\xC0bad\xC0\xC0good\xC0");
        endpoint.inject(b"\xC0bad\xC0");
        endpoint.inject(b"\xC0later\xC0");

        assert_eq!(
            *received.lock().unwrap(),
            vec![b"good".to_vec(), b"later".to_vec()]
        );
    }

    #[test]
    fn panicking_receiver_does_not_stop_the_chunk() {
        let endpoint = MemoryEndpoint::new();
        let received: Received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        let _link = Link::new(Arc::clone(&endpoint), move |datagram: Bytes| {
            // Stands in for an upstream parser indexing past a short datagram.
            let _version = datagram[8];
            sink.lock().unwrap().push(datagram.to_vec());
            Ok(())
        });

        endpoint.inject(b"\xC0short\xC0\xC0long enough\xC0");
        endpoint.inject(b"\xC0tiny\xC0\xC0also long enough\xC0");

        assert_eq!(
            *received.lock().unwrap(),
            vec![b"long enough".to_vec(), b"also long enough".to_vec()]
        );
    }

    #[test]
    fn panic_message_reads_string_payloads() {
        let literal: Box<dyn Any + Send> = Box::new("boom");
        let formatted: Box<dyn Any + Send> = Box::new(format!("bad {}", 7));
        let other: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(literal.as_ref()), "boom");
        assert_eq!(panic_message(formatted.as_ref()), "bad 7");
        assert_eq!(panic_message(other.as_ref()), "non-string panic payload");
    }

    #[test]
    fn endpoint_error_passes_through() {
        let endpoint = MemoryEndpoint::new();
        let (link, _) = recording_link(&endpoint);
        endpoint.close();

        let err = link.send(b"lost").unwrap_err();
        assert!(matches!(err, LinkError::Transport(TransportError::Closed)));
    }

    #[test]
    fn decoder_limit_from_config() {
        let endpoint = MemoryEndpoint::new();
        let received: Received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        let config = LinkConfig {
            label: "limited".to_string(),
            decoder: DecoderConfig {
                max_frame_size: Some(3),
            },
        };
        let link = Link::with_config(Arc::clone(&endpoint), config, move |datagram: Bytes| {
            sink.lock().unwrap().push(datagram.to_vec());
            Ok(())
        });

        endpoint.inject(b"\xC0toolong\xC0\xC0ok\xC0");

        assert_eq!(link.label(), "limited");
        assert_eq!(*received.lock().unwrap(), vec![b"ok".to_vec()]);
    }

    #[test]
    fn links_over_a_pair_exchange_datagrams() {
        let (left, right) = MemoryEndpoint::pair();
        let (left_link, left_received) = recording_link(&left);
        let (right_link, right_received) = recording_link(&right);

        left_link.send(&[0xC0, 0xDB, 0x00]).unwrap();
        right_link.send(b"reply").unwrap();

        assert_eq!(*right_received.lock().unwrap(), vec![vec![0xC0, 0xDB, 0x00]]);
        assert_eq!(*left_received.lock().unwrap(), vec![b"reply".to_vec()]);
    }
}
