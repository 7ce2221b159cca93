use std::path::PathBuf;

/// Errors raised by physical endpoints.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the device at the specified path.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An I/O error occurred on the underlying stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The endpoint has been closed and no longer accepts bytes.
    #[error("endpoint closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, TransportError>;
