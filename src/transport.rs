//! Push-style transport adapter for notification-driven radios.
//!
//! BLE UART bridges deliver inbound data as GATT notifications: the radio
//! glue is called with a handful of bytes and needs somewhere to put them.
//! [`byte_channel`] is that boundary - a bounded byte channel whose feeder
//! half lives in the radio callback and whose stream half is consumed by
//! the link's decode task. When the channel is full, excess bytes are
//! dropped at the feeder; the framing layer resynchronizes downstream.
//!
//! The stream half implements [`AsyncRead`], so it plugs directly into
//! [`LinkBuilder::connect`](crate::LinkBuilder::connect).
//! [`ByteStream::poll_byte`] offers the same bytes to non-async callers.
//!
//! # Example
//!
//! ```
//! use blewire::transport::byte_channel;
//!
//! let (feeder, mut stream) = byte_channel(8);
//!
//! // Radio callback side:
//! assert_eq!(feeder.push_slice(&[0x01, 0x02]), 2);
//!
//! // Decode side, non-async poll:
//! assert_eq!(stream.poll_byte(), Some(0x01));
//! assert_eq!(stream.poll_byte(), Some(0x02));
//! assert_eq!(stream.poll_byte(), None);
//! ```

use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, ReadBuf};
use tokio::sync::mpsc;

/// Default inbound byte-channel capacity.
///
/// Sized so one full-MTU notification fits without truncation.
pub const DEFAULT_INBOUND_CAPACITY: usize = 256;

/// Create a bounded inbound byte channel.
///
/// Returns the feeder half for the radio callback and the stream half for
/// the decode task.
///
/// # Panics
///
/// Panics if `capacity` is zero.
pub fn byte_channel(capacity: usize) -> (ByteFeeder, ByteStream) {
    let (tx, rx) = mpsc::channel(capacity);
    (ByteFeeder { tx }, ByteStream { rx })
}

/// Producer half: pushes received notification bytes into the channel.
#[derive(Debug, Clone)]
pub struct ByteFeeder {
    tx: mpsc::Sender<u8>,
}

impl ByteFeeder {
    /// Push one byte.
    ///
    /// Returns `false` if the byte was dropped because the channel is full
    /// or the stream half is gone.
    pub fn push(&self, byte: u8) -> bool {
        self.tx.try_send(byte).is_ok()
    }

    /// Push a whole notification, stopping at the first byte that does not
    /// fit. Returns how many bytes were accepted; the remainder is dropped.
    pub fn push_slice(&self, bytes: &[u8]) -> usize {
        for (accepted, &byte) in bytes.iter().enumerate() {
            if !self.push(byte) {
                return accepted;
            }
        }
        bytes.len()
    }

    /// Check whether the stream half is still alive.
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }
}

/// Consumer half: the inbound byte source for the decode task.
#[derive(Debug)]
pub struct ByteStream {
    rx: mpsc::Receiver<u8>,
}

impl ByteStream {
    /// Non-blocking poll for the next inbound byte.
    ///
    /// Returns `None` when no byte is waiting; yielding is the caller's
    /// business. Async callers should read through [`AsyncRead`] instead.
    pub fn poll_byte(&mut self) -> Option<u8> {
        self.rx.try_recv().ok()
    }
}

impl AsyncRead for ByteStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        let stream = self.get_mut();
        let mut filled = false;

        // Drain whatever is immediately available into the read buffer.
        while buf.remaining() > 0 {
            match stream.rx.poll_recv(cx) {
                Poll::Ready(Some(byte)) => {
                    buf.put_slice(&[byte]);
                    filled = true;
                }
                // All feeders dropped; an empty read signals EOF.
                Poll::Ready(None) => return Poll::Ready(Ok(())),
                Poll::Pending if filled => return Poll::Ready(Ok(())),
                Poll::Pending => return Poll::Pending,
            }
        }

        Poll::Ready(Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[test]
    fn test_push_then_poll_byte() {
        let (feeder, mut stream) = byte_channel(4);

        assert!(feeder.push(0xAA));
        assert!(feeder.push(0xBB));

        assert_eq!(stream.poll_byte(), Some(0xAA));
        assert_eq!(stream.poll_byte(), Some(0xBB));
        assert_eq!(stream.poll_byte(), None);
    }

    #[test]
    fn test_poll_byte_empty_returns_none() {
        let (_feeder, mut stream) = byte_channel(4);
        assert_eq!(stream.poll_byte(), None);
    }

    #[test]
    fn test_push_slice_reports_accepted_when_full() {
        let (feeder, mut stream) = byte_channel(4);

        assert_eq!(feeder.push_slice(&[1, 2, 3, 4, 5, 6]), 4);
        assert!(!feeder.push(7));

        for expected in 1..=4 {
            assert_eq!(stream.poll_byte(), Some(expected));
        }
        assert_eq!(stream.poll_byte(), None);

        // Capacity reopens once the stream drains.
        assert_eq!(feeder.push_slice(&[8, 9]), 2);
    }

    #[test]
    fn test_push_after_stream_dropped_fails() {
        let (feeder, stream) = byte_channel(4);
        assert!(feeder.is_open());

        drop(stream);

        assert!(!feeder.is_open());
        assert!(!feeder.push(0x01));
        assert_eq!(feeder.push_slice(&[1, 2, 3]), 0);
    }

    #[test]
    fn test_feeder_clone_shares_channel() {
        let (feeder, mut stream) = byte_channel(4);
        let second = feeder.clone();

        assert!(feeder.push(0x01));
        assert!(second.push(0x02));

        assert_eq!(stream.poll_byte(), Some(0x01));
        assert_eq!(stream.poll_byte(), Some(0x02));
    }

    #[tokio::test]
    async fn test_async_read_delivers_pushed_bytes() {
        let (feeder, mut stream) = byte_channel(8);
        feeder.push_slice(&[0x10, 0x20, 0x30]);

        let mut buf = [0u8; 8];
        let n = stream.read(&mut buf).await.unwrap();

        assert_eq!(n, 3);
        assert_eq!(&buf[..n], &[0x10, 0x20, 0x30]);
    }

    #[tokio::test]
    async fn test_async_read_waits_for_feeder() {
        let (feeder, mut stream) = byte_channel(8);

        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            feeder.push(0x55);
        });

        let mut buf = [0u8; 1];
        let n = stream.read(&mut buf).await.unwrap();

        assert_eq!(n, 1);
        assert_eq!(buf[0], 0x55);
    }

    #[tokio::test]
    async fn test_async_read_eof_after_feeder_drop() {
        let (feeder, mut stream) = byte_channel(8);
        feeder.push(0x01);
        drop(feeder);

        let mut buf = [0u8; 8];
        let n = stream.read(&mut buf).await.unwrap();
        assert_eq!(n, 1);

        let n = stream.read(&mut buf).await.unwrap();
        assert_eq!(n, 0);
    }
}
