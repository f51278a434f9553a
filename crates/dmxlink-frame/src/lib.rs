//! Length-prefixed message framing for the DMX USB widget protocol.
//!
//! Every message on the link is framed as:
//! - A start byte (`0x7E`)
//! - A 1-byte message label
//! - A 2-byte little-endian payload length
//! - The payload (at most 600 bytes)
//! - A stop byte (`0xE7`)
//!
//! This crate is pure: encoding and decoding only, no I/O. The exchange
//! layer in `dmxlink-widget` owns the read/write discipline.

pub mod codec;
pub mod error;
pub mod labels;

pub use codec::{
    decode_reply, encode_frame, split_length, wire_size, MAX_PAYLOAD, OVERHEAD, START_BYTE,
    STOP_BYTE,
};
pub use error::{FrameError, Result};
