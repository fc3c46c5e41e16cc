//! Decoded frame with typed accessors.
//!
//! Represents one complete, checksum-verified packet as handed to the
//! application. Uses `bytes::Bytes` for zero-copy payload sharing.
//!
//! # Example
//!
//! ```
//! use blewire::protocol::Frame;
//! use bytes::Bytes;
//!
//! let frame = Frame::new(2, Bytes::from_static(&[0x06, 0x2A]), 0x2D);
//! assert_eq!(frame.message_id(), Some(0x06));
//! assert_eq!(frame.data(), &[0x2A]);
//! ```

use bytes::Bytes;

/// A complete, validated protocol frame.
///
/// The decoder only produces a `Frame` after head, tail, checksum, and both
/// terminator bytes have been validated. The fixed marker bytes are not
/// stored; `declared_len` is carried verbatim from the wire and is advisory
/// only (payload extent is determined by the tail marker, not by this field).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Payload length as declared in the frame's LENGTH byte.
    pub declared_len: u8,
    /// Payload bytes (zero-copy via `bytes::Bytes`); byte 0 is the message
    /// identifier.
    pub payload: Bytes,
    /// Validated checksum from the wire.
    pub checksum: u8,
}

impl Frame {
    /// Create a new frame from its decoded parts.
    pub fn new(declared_len: u8, payload: Bytes, checksum: u8) -> Self {
        Self {
            declared_len,
            payload,
            checksum,
        }
    }

    /// Create a frame from raw payload bytes (copies data).
    pub fn from_parts(declared_len: u8, payload: &[u8], checksum: u8) -> Self {
        Self {
            declared_len,
            payload: Bytes::copy_from_slice(payload),
            checksum,
        }
    }

    /// Get a reference to the payload bytes.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Get a clone of the payload as Bytes (cheap, zero-copy).
    #[inline]
    pub fn payload_bytes(&self) -> Bytes {
        self.payload.clone()
    }

    /// Get the actual payload length (number of bytes collected).
    #[inline]
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }

    /// Get the declared payload length from the LENGTH byte.
    ///
    /// Advisory only; compare with [`payload_len`](Self::payload_len) if the
    /// application cares about the mismatch.
    #[inline]
    pub fn declared_len(&self) -> u8 {
        self.declared_len
    }

    /// Get the message identifier (payload byte 0).
    #[inline]
    pub fn message_id(&self) -> Option<u8> {
        self.payload.first().copied()
    }

    /// Get the data bytes following the message identifier.
    #[inline]
    pub fn data(&self) -> &[u8] {
        self.payload.get(1..).unwrap_or(&[])
    }

    /// Get the validated checksum byte.
    #[inline]
    pub fn checksum(&self) -> u8 {
        self.checksum
    }
}
