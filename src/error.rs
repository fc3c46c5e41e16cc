//! Error types for blewire.

use thiserror::Error;

/// Main error type for all link operations.
#[derive(Debug, Error)]
pub enum BlewireError {
    /// I/O error during transport reads/writes.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Payload exceeds the frame format's length limit.
    #[error("Payload length {len} exceeds the {max}-byte frame limit")]
    PayloadTooLarge { len: usize, max: usize },

    /// Outbound channel full - frame not queued.
    #[error("Transport send queue full")]
    TransportBusy,

    /// Transport closed - the link's I/O tasks have shut down.
    #[error("Transport closed")]
    TransportClosed,
}

/// Result type alias using BlewireError.
pub type Result<T> = std::result::Result<T, BlewireError>;
