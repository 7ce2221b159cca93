//! Datagram links over SLIP-framed byte streams.
//!
//! A [`Link`] turns one physical endpoint into a datagram pipe. A [`LinkSet`]
//! owns one link per peer address, picks the outgoing link by the address of
//! the peer at its far end, and funnels every incoming datagram, whatever
//! link it came from, to a single upstream receiver.
//!
//! No routing, retransmission, flow control, or authentication happens here.

pub mod address;
pub mod error;
pub mod link;
pub mod set;

pub use address::PeerAddress;
pub use error::{DeliveryError, DeliveryResult, LinkError, Result};
pub use link::{Link, LinkConfig};
pub use set::{LinkSet, UpstreamReceiver};
