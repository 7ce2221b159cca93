//! SLIP link layer for datagrams over serial lines.
//!
//! sliplink delimits datagrams inside a raw byte stream with SLIP-style byte
//! stuffing, reassembles them on the far side however the stream happens to
//! be chunked, and multiplexes several point-to-point lines by the address of
//! the peer at the other end of each.
//!
//! # Crate Structure
//!
//! - [`transport`] — Physical endpoints (serial devices, PTYs, in-memory pairs)
//! - [`frame`] — Byte stuffing and streaming frame reassembly
//! - [`link`] — Per-line links and the address-keyed link set

/// Re-export transport types.
pub mod transport {
    pub use sliplink_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use sliplink_frame::*;
}

/// Re-export link types.
pub mod link {
    pub use sliplink_link::*;
}

pub use sliplink_link::{LinkError, LinkSet, PeerAddress};
