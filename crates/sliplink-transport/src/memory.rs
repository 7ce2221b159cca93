use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::trace;

use crate::error::{Result, TransportError};
use crate::traits::{PhysicalEndpoint, RawReceiver};

/// In-process endpoint.
///
/// Every byte passed to [`send`](PhysicalEndpoint::send) is recorded, and
/// chunks can be pushed to the registered receiver with [`inject`]. Two
/// endpoints created by [`pair`] behave like a null-modem cable: bytes sent on
/// one are delivered, synchronously and in the sender's thread, to the other.
///
/// A receiver must not inject back into the endpoint that is currently
/// calling it.
///
/// [`inject`]: MemoryEndpoint::inject
/// [`pair`]: MemoryEndpoint::pair
#[derive(Default)]
pub struct MemoryEndpoint {
    sent: Mutex<Vec<u8>>,
    receiver: Mutex<Option<RawReceiver>>,
    peer: Mutex<Weak<MemoryEndpoint>>,
    closed: AtomicBool,
}

impl MemoryEndpoint {
    /// Create a standalone endpoint with no far end.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Create two endpoints wired back to back.
    pub fn pair() -> (Arc<Self>, Arc<Self>) {
        let left = Self::new();
        let right = Self::new();
        *lock(&left.peer) = Arc::downgrade(&right);
        *lock(&right.peer) = Arc::downgrade(&left);
        (left, right)
    }

    /// Deliver `chunk` to the registered receiver as if it arrived on the line.
    ///
    /// Empty chunks and chunks arriving with no receiver installed are dropped.
    pub fn inject(&self, chunk: &[u8]) {
        if chunk.is_empty() {
            return;
        }
        match lock(&self.receiver).as_mut() {
            Some(receiver) => receiver(chunk),
            None => trace!(size = chunk.len(), "no receiver registered, dropping chunk"),
        }
    }

    /// Everything sent so far.
    pub fn sent(&self) -> Vec<u8> {
        lock(&self.sent).clone()
    }

    /// Everything sent so far, clearing the record.
    pub fn take_sent(&self) -> Vec<u8> {
        std::mem::take(&mut *lock(&self.sent))
    }

    /// Whether a receiver is currently installed.
    pub fn has_receiver(&self) -> bool {
        lock(&self.receiver).is_some()
    }

    /// Make every later `send` fail with [`TransportError::Closed`].
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

impl PhysicalEndpoint for MemoryEndpoint {
    fn send(&self, bytes: &[u8]) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }
        lock(&self.sent).extend_from_slice(bytes);

        let peer = lock(&self.peer).upgrade();
        if let Some(peer) = peer {
            peer.inject(bytes);
        }
        Ok(())
    }

    fn register_receiver(&self, receiver: RawReceiver) {
        *lock(&self.receiver) = Some(receiver);
    }
}

impl std::fmt::Debug for MemoryEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryEndpoint")
            .field("sent", &lock(&self.sent).len())
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
