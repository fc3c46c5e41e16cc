//! Byte-at-a-time frame decoder.
//!
//! Implements the framing state machine for the UART bridge stream:
//! - `AwaitHead`: scanning for the 0xCC start marker
//! - `AwaitLength`: one declared-length byte
//! - `AwaitId`: first payload byte (message ID); the checksum restarts here
//! - `AwaitPayload`: payload bytes until the 0xB9 tail marker
//! - `AwaitChecksum`, `AwaitCarriage`, `AwaitNewline`: trailer validation
//!
//! A mismatch at any validation step discards the frame in progress and
//! returns to `AwaitHead`; the decoder resynchronizes on the next start
//! marker. Malformed input is never an error, only a silent restart.
//!
//! # Example
//!
//! ```
//! use blewire::protocol::{encode_frame, FrameDecoder};
//!
//! let mut decoder = FrameDecoder::new();
//! let wire = encode_frame(&[0x05]).unwrap();
//!
//! let frames = decoder.push(&wire);
//! assert_eq!(frames.len(), 1);
//! assert_eq!(frames[0].payload(), &[0x05]);
//! ```

use bytes::{BufMut, BytesMut};

use super::wire_format::{checksum, CARRIAGE, HEAD, MAX_PAYLOAD_LEN, NEWLINE, TAIL};
use super::Frame;

/// State machine positions for frame parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    /// Scanning for the frame start marker.
    AwaitHead,
    /// Start marker seen; next byte is the declared payload length.
    AwaitLength,
    /// Next byte is payload byte 0, the message identifier.
    AwaitId,
    /// Collecting payload bytes until the tail marker.
    AwaitPayload,
    /// Payload closed; next byte must equal the running checksum.
    AwaitChecksum,
    /// Checksum accepted; expecting the carriage return.
    AwaitCarriage,
    /// Expecting the final newline; emits the frame on success.
    AwaitNewline,
}

/// Incremental decoder turning a raw byte stream into validated frames.
///
/// Owns all parsing state; no globals, no locks. The buffer holds at most
/// the frame currently under construction - raw bytes are never queued
/// beyond it. Feed single bytes with [`push_byte`](Self::push_byte) or whole
/// received chunks with [`push`](Self::push).
pub struct FrameDecoder {
    /// Current parsing state.
    state: DecodeState,
    /// Declared payload length from the LENGTH byte (advisory only).
    declared_len: u8,
    /// Payload bytes collected so far.
    payload: BytesMut,
    /// Running checksum over the collected payload bytes.
    checksum: u8,
}

impl FrameDecoder {
    /// Create a decoder in its initial state.
    pub fn new() -> Self {
        Self {
            state: DecodeState::AwaitHead,
            declared_len: 0,
            payload: BytesMut::with_capacity(MAX_PAYLOAD_LEN),
            checksum: 0,
        }
    }

    /// Process a single byte and advance the state machine one transition.
    ///
    /// Returns the completed frame when this byte finishes a fully validated
    /// frame, otherwise `None`. Payload extent is determined solely by the
    /// tail marker; the LENGTH byte is recorded on the frame but never
    /// cross-checked against the bytes actually collected.
    pub fn push_byte(&mut self, byte: u8) -> Option<Frame> {
        match self.state {
            DecodeState::AwaitHead => {
                if byte == HEAD {
                    self.begin_frame();
                    self.state = DecodeState::AwaitLength;
                }
                None
            }

            DecodeState::AwaitLength => {
                self.declared_len = byte;
                self.state = DecodeState::AwaitId;
                None
            }

            DecodeState::AwaitId => {
                // The byte after LENGTH is always payload byte 0, even when
                // its value collides with a marker byte.
                self.checksum = checksum::update(byte, 0);
                self.payload.put_u8(byte);
                self.state = DecodeState::AwaitPayload;
                None
            }

            DecodeState::AwaitPayload => {
                if byte == TAIL {
                    self.state = DecodeState::AwaitChecksum;
                } else {
                    self.checksum = checksum::update(byte, self.checksum);
                    self.payload.put_u8(byte);
                }
                None
            }

            DecodeState::AwaitChecksum => {
                if byte == self.checksum {
                    self.state = DecodeState::AwaitCarriage;
                } else {
                    self.reset();
                }
                None
            }

            DecodeState::AwaitCarriage => {
                if byte == CARRIAGE {
                    self.state = DecodeState::AwaitNewline;
                } else {
                    self.reset();
                }
                None
            }

            DecodeState::AwaitNewline => {
                let frame = if byte == NEWLINE {
                    Some(Frame::new(
                        self.declared_len,
                        self.payload.split().freeze(),
                        self.checksum,
                    ))
                } else {
                    None
                };
                self.reset();
                frame
            }
        }
    }

    /// Feed a received chunk and collect every frame it completes.
    ///
    /// Transports deliver notifications several bytes at a time; this drives
    /// [`push_byte`](Self::push_byte) over the whole chunk. Frames split
    /// across chunks are carried over to the next call.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Frame> {
        let mut frames = Vec::new();
        for &byte in chunk {
            if let Some(frame) = self.push_byte(byte) {
                frames.push(frame);
            }
        }
        frames
    }

    /// Discard any frame in progress and return to the initial state.
    ///
    /// This is also the external reset hook for a stream known to be out of
    /// sync (for example after a transport reconnect).
    pub fn reset(&mut self) {
        self.state = DecodeState::AwaitHead;
        self.declared_len = 0;
        self.payload.clear();
        self.checksum = 0;
    }

    /// Check whether the decoder is between frames.
    pub fn is_idle(&self) -> bool {
        self.state == DecodeState::AwaitHead
    }

    /// Number of payload bytes collected for the frame in progress.
    pub fn pending_len(&self) -> usize {
        self.payload.len()
    }

    /// Prepare the scratch state for a new frame.
    fn begin_frame(&mut self) {
        self.declared_len = 0;
        self.payload.clear();
        self.checksum = 0;
    }

    /// Get the current state for debugging.
    #[cfg(test)]
    fn state_name(&self) -> &'static str {
        match self.state {
            DecodeState::AwaitHead => "AwaitHead",
            DecodeState::AwaitLength => "AwaitLength",
            DecodeState::AwaitId => "AwaitId",
            DecodeState::AwaitPayload => "AwaitPayload",
            DecodeState::AwaitChecksum => "AwaitChecksum",
            DecodeState::AwaitCarriage => "AwaitCarriage",
            DecodeState::AwaitNewline => "AwaitNewline",
        }
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}
