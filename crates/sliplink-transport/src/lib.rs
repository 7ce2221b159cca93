//! Raw byte-stream endpoints underneath the SLIP link layer.
//!
//! A physical endpoint moves unframed bytes: it writes whatever it is given
//! and hands incoming bytes to a registered receiver in arrival order, in
//! chunks whose boundaries mean nothing. Everything above this crate builds
//! on the [`PhysicalEndpoint`] trait defined here.
//!
//! - [`MemoryEndpoint`] — in-process endpoint (and back-to-back pairs)
//! - [`StreamEndpoint`] — any `Read`/`Write` stream with a reader thread
//! - [`open_serial`] — a serial device or PTY opened in raw mode

pub mod error;
pub mod memory;
pub mod serial;
pub mod stream;
pub mod traits;

pub use error::{Result, TransportError};
pub use memory::MemoryEndpoint;
pub use serial::open_serial;
pub use stream::StreamEndpoint;
pub use traits::{PhysicalEndpoint, RawReceiver};
