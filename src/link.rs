//! Link builder and runtime loops.
//!
//! The [`LinkBuilder`] configures queue sizes and wires a transport into
//! a running [`Link`]. Connecting spawns two tasks:
//! 1. Writer task - owns the write half, drains the outbound channel
//! 2. Decode task - owns the read half, feeds bytes through the decoder
//!    and enqueues completed frames
//!
//! # Example
//!
//! ```ignore
//! use blewire::Link;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (reader, writer) = open_uart().await?;
//!     let link = Link::builder().connect(reader, writer);
//!
//!     link.send(&[0x06, 0x01]).await?;
//!
//!     while let Some(frame) = link.try_recv() {
//!         println!("message {:?}: {:?}", frame.message_id(), frame.data());
//!     }
//!     Ok(())
//! }
//! ```

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::error::{BlewireError, Result};
use crate::protocol::{encode_frame, Frame, FrameDecoder};
use crate::queue::{PacketQueue, DEFAULT_PACKET_QUEUE_CAPACITY};
use crate::writer::{spawn_writer_task, WriterConfig, WriterHandle};

/// Read buffer size for the decode loop.
///
/// BLE-UART bridges deliver notification-sized chunks, so a small buffer
/// covers a full burst without waste.
const READ_BUFFER_SIZE: usize = 256;

/// Builder for configuring and connecting a [`Link`].
pub struct LinkBuilder {
    queue_capacity: usize,
    writer_config: WriterConfig,
}

impl LinkBuilder {
    /// Create a new link builder.
    pub fn new() -> Self {
        Self {
            queue_capacity: DEFAULT_PACKET_QUEUE_CAPACITY,
            writer_config: WriterConfig::default(),
        }
    }

    /// Set the inbound packet queue capacity.
    ///
    /// When the queue is full, newly decoded frames are dropped.
    /// Default: 16
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Set the outbound channel capacity.
    ///
    /// `send` waits when this many frames are already in flight.
    /// Default: 64
    pub fn send_capacity(mut self, capacity: usize) -> Self {
        self.writer_config.channel_capacity = capacity;
        self
    }

    /// Connect the link over the given transport halves.
    ///
    /// Spawns the writer and decode tasks; the returned [`Link`] is live
    /// immediately.
    pub fn connect<R, W>(self, reader: R, writer: W) -> Link
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        // 1. Spawn writer task (owns the write half)
        let (writer, writer_task) = spawn_writer_task(writer, self.writer_config);

        // 2. Create the inbound packet queue
        let queue = PacketQueue::new(self.queue_capacity);

        // 3. Spawn decode loop, signalling shutdown when it ends
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let queue_clone = queue.clone();

        tokio::spawn(async move {
            tracing::debug!("Decode loop started");
            if let Err(e) = Link::decode_loop(reader, queue_clone).await {
                tracing::error!("Decode loop error: {}", e);
            }
            tracing::debug!("Decode loop stopped");
            let _ = shutdown_tx.send(());
        });

        Link {
            queue,
            writer,
            shutdown_rx,
            _writer_task: writer_task,
        }
    }
}

impl Default for LinkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running framed link over a byte transport.
///
/// Use `send()` to transmit payloads and `try_recv()` to drain decoded
/// frames. Use `wait_for_shutdown()` to block until the transport closes.
pub struct Link {
    /// Queue of decoded inbound frames.
    queue: PacketQueue,
    /// Writer handle for outbound frames.
    writer: WriterHandle,
    /// Shutdown signal receiver.
    shutdown_rx: oneshot::Receiver<()>,
    /// Writer task handle.
    _writer_task: JoinHandle<Result<()>>,
}

impl Link {
    /// Create a new link builder.
    pub fn builder() -> LinkBuilder {
        LinkBuilder::new()
    }

    /// Main decode loop - reads transport bytes and enqueues frames.
    async fn decode_loop<R: AsyncRead + Unpin>(mut reader: R, queue: PacketQueue) -> Result<()> {
        use tokio::io::AsyncReadExt;

        let mut decoder = FrameDecoder::new();
        let mut buf = vec![0u8; READ_BUFFER_SIZE];

        loop {
            let n = match reader.read(&mut buf).await {
                Ok(0) => return Ok(()), // Transport closed
                Ok(n) => n,
                Err(e) => return Err(BlewireError::Io(e)),
            };

            for frame in decoder.push(&buf[..n]) {
                let message_id = frame.message_id().unwrap_or_default();
                if !queue.try_enqueue(frame) {
                    tracing::warn!("Packet queue full, dropping frame with message id {}", message_id);
                }
            }
        }
    }

    /// Encode a payload and send it to the writer task.
    ///
    /// Waits for outbound channel capacity if needed; does not wait for
    /// the frame to reach the wire.
    ///
    /// # Errors
    ///
    /// Returns [`BlewireError::PayloadTooLarge`] if the payload exceeds
    /// the frame limit, [`BlewireError::TransportClosed`] if the writer
    /// task is gone.
    pub async fn send(&self, payload: &[u8]) -> Result<()> {
        let wire = encode_frame(payload)?;
        self.writer.send(Bytes::from(wire)).await
    }

    /// Encode a payload and send it without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`BlewireError::TransportBusy`] if the outbound channel is
    /// full, otherwise as [`Link::send`].
    pub fn try_send(&self, payload: &[u8]) -> Result<()> {
        let wire = encode_frame(payload)?;
        self.writer.try_send(Bytes::from(wire))
    }

    /// Take the next decoded frame, if one is waiting.
    pub fn try_recv(&self) -> Option<Frame> {
        self.queue.try_dequeue()
    }

    /// Get a handle to the inbound packet queue.
    ///
    /// The handle shares state with the link; it can be moved to another
    /// thread or task and drained there.
    pub fn packets(&self) -> PacketQueue {
        self.queue.clone()
    }

    /// Check whether the writer task has shut down.
    pub fn is_closed(&self) -> bool {
        self.writer.is_closed()
    }

    /// Wait for shutdown (transport close or read error).
    ///
    /// This consumes the link and blocks until the decode loop ends.
    pub async fn wait_for_shutdown(self) -> Result<()> {
        let _ = self.shutdown_rx.await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::duplex;

    async fn wait_for_frame(link: &Link) -> Frame {
        for _ in 0..200 {
            if let Some(frame) = link.try_recv() {
                return frame;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        panic!("no frame arrived");
    }

    #[test]
    fn test_builder_creation() {
        let builder = LinkBuilder::new();
        assert_eq!(builder.queue_capacity, DEFAULT_PACKET_QUEUE_CAPACITY);
    }

    #[test]
    fn test_builder_default() {
        let builder = LinkBuilder::default();
        assert_eq!(builder.queue_capacity, DEFAULT_PACKET_QUEUE_CAPACITY);
    }

    #[test]
    fn test_builder_configuration() {
        let builder = Link::builder().queue_capacity(4).send_capacity(8);

        assert_eq!(builder.queue_capacity, 4);
        assert_eq!(builder.writer_config.channel_capacity, 8);
    }

    #[tokio::test]
    async fn test_send_and_receive_over_duplex() {
        let (host_io, device_io) = duplex(1024);
        let (host_rd, host_wr) = tokio::io::split(host_io);
        let (dev_rd, dev_wr) = tokio::io::split(device_io);

        let host = Link::builder().connect(host_rd, host_wr);
        let device = Link::builder().connect(dev_rd, dev_wr);

        host.send(&[0x06, 0xAA]).await.unwrap();

        let frame = wait_for_frame(&device).await;
        assert_eq!(frame.payload(), &[0x06, 0xAA]);
        assert_eq!(frame.message_id(), Some(0x06));
    }

    #[tokio::test]
    async fn test_send_rejects_oversized_payload() {
        let (host_io, _device_io) = duplex(1024);
        let (host_rd, host_wr) = tokio::io::split(host_io);
        let link = Link::builder().connect(host_rd, host_wr);

        let err = link.send(&[0u8; 128]).await.unwrap_err();
        assert!(matches!(
            err,
            BlewireError::PayloadTooLarge { len: 128, max: 127 }
        ));
    }

    #[tokio::test]
    async fn test_shutdown_when_peer_drops() {
        let (host_io, device_io) = duplex(1024);
        let (host_rd, host_wr) = tokio::io::split(host_io);

        let link = Link::builder().connect(host_rd, host_wr);
        drop(device_io);

        link.wait_for_shutdown().await.unwrap();
    }
}
