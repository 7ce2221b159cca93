//! SLIP-style framing for datagrams carried over a raw byte stream.
//!
//! Every datagram goes on the wire as:
//! - a leading `FRAME_END` (0xC0)
//! - the payload, with 0xDB written as `DB DD` and 0xC0 written as `DB DC`
//! - a trailing `FRAME_END`
//!
//! [`SlipDecoder`] reverses this over a stream delivered in arbitrary chunks,
//! keeping the still-open frame between calls.

pub mod codec;
pub mod decoder;

pub use codec::{encode, encode_frame, encoded_len, unescape, ESC, ESC_END, ESC_ESC, FRAME_END};
pub use decoder::{DecoderConfig, SlipDecoder};
