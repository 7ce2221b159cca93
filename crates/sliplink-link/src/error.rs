use crate::address::PeerAddress;

/// Errors that can occur in link operations.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// No link is configured for the requested peer address.
    #[error("no route to {0}")]
    RouteNotFound(PeerAddress),

    /// The physical endpoint rejected the write.
    #[error("transport error: {0}")]
    Transport(#[from] sliplink_transport::TransportError),

    /// The consuming side of a datagram channel has gone away.
    #[error("datagram receiver closed")]
    ReceiverClosed,
}

pub type Result<T> = std::result::Result<T, LinkError>;

/// Error returned by a datagram receiver to reject one datagram.
pub type DeliveryError = Box<dyn std::error::Error + Send + Sync>;

/// Outcome of handing one decoded datagram to a receiver.
pub type DeliveryResult = std::result::Result<(), DeliveryError>;
