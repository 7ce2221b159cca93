use std::collections::HashMap;
use std::sync::mpsc;
use std::sync::{Arc, PoisonError, RwLock};

use bytes::Bytes;
use sliplink_frame::DecoderConfig;
use sliplink_transport::PhysicalEndpoint;
use tracing::{debug, info, trace};

use crate::address::PeerAddress;
use crate::error::{DeliveryResult, LinkError, Result};
use crate::link::{Link, LinkConfig};

/// Receiver for datagrams coming up from any link.
pub type UpstreamReceiver = Arc<dyn Fn(Bytes) -> DeliveryResult + Send + Sync>;

type ReceiverSlot = Arc<RwLock<Option<UpstreamReceiver>>>;

/// A fixed set of links, keyed by the address of the peer at each far end.
///
/// Incoming datagrams from every link go to one upstream receiver, with no
/// indication of which link they arrived on; the layer above has to work the
/// source out from the datagram itself. The receiver slot is late-bound: the
/// latest [`register_receiver`](LinkSet::register_receiver) call wins and
/// applies to every datagram delivered after it, from any link.
pub struct LinkSet {
    links: HashMap<PeerAddress, Link>,
    upstream: ReceiverSlot,
}

impl LinkSet {
    /// Build one link per `(peer address, endpoint)` entry. When an address
    /// repeats, the last entry wins and earlier endpoints are left untouched.
    pub fn new<I, A, E>(mapping: I) -> Self
    where
        I: IntoIterator<Item = (A, E)>,
        A: Into<PeerAddress>,
        E: PhysicalEndpoint + 'static,
    {
        Self::with_config(mapping, DecoderConfig::default())
    }

    /// Build one link per entry, each decoding with `decoder`.
    pub fn with_config<I, A, E>(mapping: I, decoder: DecoderConfig) -> Self
    where
        I: IntoIterator<Item = (A, E)>,
        A: Into<PeerAddress>,
        E: PhysicalEndpoint + 'static,
    {
        let upstream: ReceiverSlot = Arc::new(RwLock::new(None));
        let mut links = HashMap::new();

        // Collapse repeated addresses first: a link registers its receiver on
        // construction, so a displaced one would keep delivering.
        let endpoints: HashMap<PeerAddress, E> = mapping
            .into_iter()
            .map(|(address, endpoint)| (address.into(), endpoint))
            .collect();

        for (address, endpoint) in endpoints {
            let config = LinkConfig {
                label: address.to_string(),
                decoder: decoder.clone(),
            };
            let link = Link::with_config(endpoint, config, forward_to(Arc::clone(&upstream)));
            debug!(peer = %address, "link attached");
            links.insert(address, link);
        }

        info!(links = links.len(), "link set ready");
        Self { links, upstream }
    }

    /// Replace the upstream receiver.
    pub fn register_receiver<F>(&self, receiver: F)
    where
        F: Fn(Bytes) -> DeliveryResult + Send + Sync + 'static,
    {
        let receiver: UpstreamReceiver = Arc::new(receiver);
        *self.upstream.write().unwrap_or_else(PoisonError::into_inner) = Some(receiver);
    }

    /// Register a receiver that forwards every datagram into a channel.
    ///
    /// This moves delivery off the endpoints' reader threads: the returned
    /// `Receiver` can be drained by a single consumer thread of the caller's
    /// choosing. Once it is dropped, deliveries fail with
    /// [`LinkError::ReceiverClosed`] and are logged by the link.
    pub fn register_channel(&self) -> mpsc::Receiver<Bytes> {
        let (tx, rx) = mpsc::channel();
        self.register_receiver(move |datagram| {
            tx.send(datagram)
                .map_err(|_| LinkError::ReceiverClosed.into())
        });
        rx
    }

    /// Send `datagram` on the link whose far end is `peer`.
    ///
    /// Fails with [`LinkError::RouteNotFound`] before anything is written when
    /// no such link exists.
    pub fn send(&self, datagram: &[u8], peer: impl AsRef<str>) -> Result<()> {
        let peer = peer.as_ref();
        let link = self
            .links
            .get(peer)
            .ok_or_else(|| LinkError::RouteNotFound(PeerAddress::from(peer)))?;
        link.send(datagram)
    }

    /// Peer addresses with a link, sorted.
    pub fn peers(&self) -> Vec<&PeerAddress> {
        let mut peers: Vec<_> = self.links.keys().collect();
        peers.sort();
        peers
    }

    /// Whether a link exists for `peer`.
    pub fn contains(&self, peer: impl AsRef<str>) -> bool {
        self.links.contains_key(peer.as_ref())
    }

    /// Number of links.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Whether the set has no links.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl std::fmt::Debug for LinkSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkSet")
            .field("peers", &self.peers())
            .finish()
    }
}

fn forward_to(slot: ReceiverSlot) -> impl FnMut(Bytes) -> DeliveryResult + Send + 'static {
    move |datagram| {
        // Clone out of the lock so a receiver may re-register without deadlocking.
        let receiver = slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match receiver {
            Some(receiver) => receiver(datagram),
            None => {
                trace!(size = datagram.len(), "no upstream receiver, dropping datagram");
                Ok(())
            }
        }
    }
}
