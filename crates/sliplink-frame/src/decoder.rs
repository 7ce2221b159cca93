use bytes::{Bytes, BytesMut};
use tracing::warn;

use crate::codec::{unescape, FRAME_END};

const INITIAL_BUFFER_CAPACITY: usize = 2 * 1024;

/// Configuration for [`SlipDecoder`].
#[derive(Debug, Clone, Default)]
pub struct DecoderConfig {
    /// Largest still-escaped frame body the decoder will buffer. `None`
    /// buffers without limit. A frame that outgrows the limit is dropped up to
    /// its closing delimiter.
    pub max_frame_size: Option<usize>,
}

/// Streaming reassembly of delimited frames.
///
/// Chunks may split a frame anywhere or carry several frames; the bytes of the
/// frame still open at the end of a chunk are kept for the next call.
#[derive(Debug)]
pub struct SlipDecoder {
    buf: BytesMut,
    config: DecoderConfig,
    discarding: bool,
}

impl Default for SlipDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SlipDecoder {
    /// Create a decoder with default configuration.
    pub fn new() -> Self {
        Self::with_config(DecoderConfig::default())
    }

    /// Create a decoder with explicit configuration.
    pub fn with_config(config: DecoderConfig) -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
            discarding: false,
        }
    }

    /// Feed newly arrived bytes and return every frame they complete, in order.
    ///
    /// See [`feed_with`](SlipDecoder::feed_with) for the splitting rules.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Bytes> {
        let mut frames = Vec::new();
        self.feed_with(chunk, |frame| frames.push(frame));
        frames
    }

    /// Feed newly arrived bytes, handing each completed frame to `sink` as
    /// soon as its closing delimiter is reached.
    ///
    /// The chunk is split at each `FRAME_END`. Every split point closes the
    /// frame being buffered: a non-empty buffer is unescaped and passed on, an
    /// empty one (back-to-back delimiters) yields nothing. Either way the
    /// buffer is empty before `sink` runs. Bytes after the last delimiter stay
    /// buffered.
    pub fn feed_with<F>(&mut self, chunk: &[u8], mut sink: F)
    where
        F: FnMut(Bytes),
    {
        let mut segments = chunk.split(|&b| b == FRAME_END).peekable();

        while let Some(segment) = segments.next() {
            self.append(segment);
            if segments.peek().is_some() {
                if let Some(frame) = self.close_frame() {
                    sink(frame);
                }
            }
        }
    }

    /// Raw (still escaped) bytes of the frame currently open.
    pub fn pending(&self) -> &[u8] {
        &self.buf
    }

    /// Drop the frame currently open.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.discarding = false;
    }

    /// Current decoder configuration.
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    fn append(&mut self, segment: &[u8]) {
        if self.discarding || segment.is_empty() {
            return;
        }
        self.buf.extend_from_slice(segment);

        if let Some(max) = self.config.max_frame_size {
            if self.buf.len() > max {
                warn!(size = self.buf.len(), max, "frame exceeds size limit, discarding");
                self.buf.clear();
                self.discarding = true;
            }
        }
    }

    fn close_frame(&mut self) -> Option<Bytes> {
        if std::mem::take(&mut self.discarding) {
            self.buf.clear();
            return None;
        }
        if self.buf.is_empty() {
            return None;
        }
        let frame = unescape(&self.buf);
        self.buf.clear();
        Some(frame)
    }
}
