//! Protocol module - wire format, checksum, encoder, and decoder.
//!
//! This module implements the UART bridge frame protocol:
//! - Marker constants and the rolling 8-bit checksum
//! - Frame encoding for outgoing payloads
//! - Byte-at-a-time decoding state machine
//! - Frame struct with typed accessors

mod decoder;
mod frame;
mod wire_format;

pub use decoder::FrameDecoder;
pub use frame::Frame;
pub use wire_format::{
    checksum, encode_frame, CARRIAGE, FRAME_OVERHEAD, HEAD, MAX_PAYLOAD_LEN, NEWLINE, TAIL,
};
