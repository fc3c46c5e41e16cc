//! Wire format constants, checksum, and frame encoding.
//!
//! Implements the UART bridge frame layout:
//! ```text
//! ┌──────┬────────┬─────────────┬──────┬──────────┬──────┬──────┐
//! │ HEAD │ LENGTH │ PAYLOAD     │ TAIL │ CHECKSUM │ CR   │ LF   │
//! │ 0xCC │ 1 byte │ 0-127 bytes │ 0xB9 │ 1 byte   │ 0x0D │ 0x0A │
//! └──────┴────────┴─────────────┴──────┴──────────┴──────┴──────┘
//! ```
//!
//! PAYLOAD byte 0 carries the message identifier by convention. The checksum
//! covers the payload bytes only; head, length, tail, and terminator are
//! excluded.

use crate::error::{BlewireError, Result};

/// Frame start marker.
pub const HEAD: u8 = 0xCC;

/// Payload end marker.
pub const TAIL: u8 = 0xB9;

/// First terminator byte (carriage return).
pub const CARRIAGE: u8 = 0x0D;

/// Second terminator byte (newline).
pub const NEWLINE: u8 = 0x0A;

/// Maximum payload length in bytes, message identifier included.
pub const MAX_PAYLOAD_LEN: usize = 127;

/// Fixed bytes surrounding the payload: head, length, tail, checksum, and
/// the two terminator bytes.
pub const FRAME_OVERHEAD: usize = 6;

/// Rolling 8-bit frame checksum.
pub mod checksum {
    /// Fold one byte into the running checksum.
    ///
    /// The accumulator is first stirred by a shift-and-add near-rotation,
    /// then the byte is added; every step truncates to 8 bits. The peer
    /// firmware computes this exact shift sequence, so the expression stays
    /// in literal form rather than a bitwise rotate.
    ///
    /// # Example
    ///
    /// ```
    /// use blewire::protocol::checksum;
    ///
    /// assert_eq!(checksum::update(132, 0), 0x84);
    /// ```
    #[inline]
    pub fn update(byte: u8, previous: u8) -> u8 {
        let rotated = (previous >> 1).wrapping_add(previous << 7);
        rotated.wrapping_add(byte)
    }

    /// Checksum of a whole payload, folded left to right from seed 0.
    ///
    /// # Example
    ///
    /// ```
    /// use blewire::protocol::checksum;
    ///
    /// assert_eq!(checksum::compute(&[132, 0, 37, 125, 150]), 230);
    /// ```
    pub fn compute(payload: &[u8]) -> u8 {
        payload.iter().fold(0, |acc, &b| update(b, acc))
    }
}

/// Encode an application payload into a complete wire frame.
///
/// Output order: head, declared payload length, payload bytes, tail,
/// checksum over the payload, carriage return, newline. The result is handed
/// verbatim to the transport sink.
///
/// # Arguments
///
/// * `payload` - 0 to 127 bytes; byte 0 is the message identifier by
///   convention
///
/// # Errors
///
/// Returns [`BlewireError::PayloadTooLarge`] if `payload` is longer than
/// [`MAX_PAYLOAD_LEN`] bytes.
///
/// # Example
///
/// ```
/// use blewire::protocol::encode_frame;
///
/// let frame = encode_frame(&[0x05]).unwrap();
/// assert_eq!(frame, vec![0xCC, 0x01, 0x05, 0xB9, 0x05, 0x0D, 0x0A]);
/// ```
pub fn encode_frame(payload: &[u8]) -> Result<Vec<u8>> {
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(BlewireError::PayloadTooLarge {
            len: payload.len(),
            max: MAX_PAYLOAD_LEN,
        });
    }

    let mut frame = Vec::with_capacity(payload.len() + FRAME_OVERHEAD);
    frame.push(HEAD);
    frame.push(payload.len() as u8);
    frame.extend_from_slice(payload);
    frame.push(TAIL);
    frame.push(checksum::compute(payload));
    frame.push(CARRIAGE);
    frame.push(NEWLINE);
    Ok(frame)
}
