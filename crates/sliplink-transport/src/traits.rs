use crate::error::Result;

/// Callback invoked with each chunk of raw bytes read from an endpoint.
///
/// Chunks arrive in order but carry no framing: one chunk may hold part of a
/// frame, several frames, or anything in between.
pub type RawReceiver = Box<dyn FnMut(&[u8]) + Send>;

/// A raw, unframed, ordered byte stream to one peer.
///
/// Implementations decide which thread runs the receiver. Callers must not
/// assume it is the thread that called [`register_receiver`].
///
/// [`register_receiver`]: PhysicalEndpoint::register_receiver
pub trait PhysicalEndpoint: Send + Sync {
    /// Transmit `bytes` in order. Partial writes are the endpoint's concern.
    fn send(&self, bytes: &[u8]) -> Result<()>;

    /// Install the receiver for incoming chunks, replacing any previous one.
    fn register_receiver(&self, receiver: RawReceiver);
}

impl<T: PhysicalEndpoint + ?Sized> PhysicalEndpoint for std::sync::Arc<T> {
    fn send(&self, bytes: &[u8]) -> Result<()> {
        (**self).send(bytes)
    }

    fn register_receiver(&self, receiver: RawReceiver) {
        (**self).register_receiver(receiver)
    }
}
