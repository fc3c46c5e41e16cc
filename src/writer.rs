//! Dedicated writer task for outbound frames.
//!
//! Encoded frames are handed to a single writer task through an mpsc
//! channel instead of sharing the transport sink behind a mutex. The task
//! owns the sink and writes whatever frames are ready in one vectored
//! call.
//!
//! # Architecture
//!
//! ```text
//! App task 1 ─┐
//! App task 2 ─┼─► mpsc::Sender<Bytes> ─► Writer Task ─► UART sink
//! App task N ─┘
//! ```
//!
//! Sending is best-effort: the handle waits for channel capacity at most,
//! never for delivery.

use std::io::IoSlice;

use bytes::Bytes;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{BlewireError, Result};

/// Default outbound channel capacity in frames.
pub const DEFAULT_SEND_CAPACITY: usize = 64;

/// Maximum frames to batch in a single write operation.
const MAX_BATCH_SIZE: usize = 64;

/// Configuration for the writer task.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Channel capacity for the outbound frame queue.
    pub channel_capacity: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_SEND_CAPACITY,
        }
    }
}

/// Handle for sending encoded frames to the writer task.
///
/// Cheaply cloneable; clones feed the same task.
#[derive(Debug, Clone)]
pub struct WriterHandle {
    /// Channel sender for encoded frames.
    tx: mpsc::Sender<Bytes>,
}

impl WriterHandle {
    /// Send an encoded frame to the writer task.
    ///
    /// Waits for channel capacity if the outbound queue is momentarily
    /// full; does not wait for the frame to reach the wire.
    ///
    /// # Errors
    ///
    /// Returns [`BlewireError::TransportClosed`] if the writer task is gone.
    pub async fn send(&self, frame: Bytes) -> Result<()> {
        self.tx
            .send(frame)
            .await
            .map_err(|_| BlewireError::TransportClosed)
    }

    /// Try to send an encoded frame without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`BlewireError::TransportBusy`] if the outbound queue is
    /// full, [`BlewireError::TransportClosed`] if the writer task is gone.
    pub fn try_send(&self, frame: Bytes) -> Result<()> {
        self.tx.try_send(frame).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => BlewireError::TransportBusy,
            mpsc::error::TrySendError::Closed(_) => BlewireError::TransportClosed,
        })
    }

    /// Check whether the writer task has shut down.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Spawn the writer task and return a handle for sending frames.
///
/// # Arguments
///
/// * `writer` - The async byte sink (transport write half)
/// * `config` - Writer configuration
///
/// # Returns
///
/// A tuple of `(WriterHandle, JoinHandle)` where the JoinHandle resolves
/// when the task ends (all handles dropped, or an I/O error).
pub fn spawn_writer_task<W>(writer: W, config: WriterConfig) -> (WriterHandle, JoinHandle<Result<()>>)
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(config.channel_capacity);
    let handle = WriterHandle { tx };
    let task = tokio::spawn(writer_loop(rx, writer));

    (handle, task)
}

/// Spawn the writer task with default configuration.
pub fn spawn_writer_task_default<W>(writer: W) -> (WriterHandle, JoinHandle<Result<()>>)
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    spawn_writer_task(writer, WriterConfig::default())
}

/// Main writer loop - receives encoded frames and writes them to the sink.
async fn writer_loop<W>(mut rx: mpsc::Receiver<Bytes>, mut writer: W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    loop {
        // Wait for the first frame.
        let first = match rx.recv().await {
            Some(frame) => frame,
            None => {
                // Channel closed, clean shutdown.
                tracing::debug!("Writer task stopped");
                return Ok(());
            }
        };

        // Collect additional ready frames without waiting.
        let mut batch = Vec::with_capacity(MAX_BATCH_SIZE);
        batch.push(first);

        while batch.len() < MAX_BATCH_SIZE {
            match rx.try_recv() {
                Ok(frame) => batch.push(frame),
                Err(_) => break,
            }
        }

        if let Err(e) = write_batch(&mut writer, &batch).await {
            tracing::error!("Writer I/O error: {}", e);
            return Err(e);
        }
    }
}

/// Write a batch of frames using scatter/gather I/O (write_vectored).
async fn write_batch<W>(writer: &mut W, batch: &[Bytes]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    if batch.is_empty() {
        return Ok(());
    }

    let slices: Vec<IoSlice<'_>> = batch.iter().map(|frame| IoSlice::new(frame)).collect();
    let total_size: usize = batch.iter().map(|frame| frame.len()).sum();

    // Fast path: everything fits in one vectored write.
    let written = writer.write_vectored(&slices).await?;

    if written == total_size {
        writer.flush().await?;
        return Ok(());
    }

    if written == 0 {
        return Err(BlewireError::Io(std::io::Error::new(
            std::io::ErrorKind::WriteZero,
            "write_vectored returned 0",
        )));
    }

    // Slow path: partial write, continue with the remaining bytes.
    let mut total_written = written;

    while total_written < total_size {
        let remaining_slices = build_remaining_slices(batch, total_written);
        if remaining_slices.is_empty() {
            break;
        }

        let written = writer.write_vectored(&remaining_slices).await?;
        if written == 0 {
            return Err(BlewireError::Io(std::io::Error::new(
                std::io::ErrorKind::WriteZero,
                "write_vectored returned 0",
            )));
        }

        total_written += written;
    }

    writer.flush().await?;
    Ok(())
}

/// Build the IoSlice array for the bytes left after a partial write.
fn build_remaining_slices(batch: &[Bytes], skip_bytes: usize) -> Vec<IoSlice<'_>> {
    let mut slices = Vec::with_capacity(batch.len());
    let mut skipped = 0;

    for frame in batch {
        let frame_end = skipped + frame.len();
        if skip_bytes < frame_end {
            let start_in_frame = skip_bytes.saturating_sub(skipped);
            slices.push(IoSlice::new(&frame[start_in_frame..]));
        }
        skipped = frame_end;
    }

    slices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::encode_frame;
    use std::io::Cursor;
    use std::time::Duration;
    use tokio::io::{duplex, AsyncReadExt};

    fn wire(payload: &[u8]) -> Bytes {
        Bytes::from(encode_frame(payload).unwrap())
    }

    #[test]
    fn test_writer_config_default() {
        let config = WriterConfig::default();
        assert_eq!(config.channel_capacity, DEFAULT_SEND_CAPACITY);
    }

    #[tokio::test]
    async fn test_writer_handle_send() {
        let (client, mut server) = duplex(4096);
        let (handle, _task) = spawn_writer_task_default(client);

        let frame = wire(&[0x05, 0x01]);
        let expected = frame.clone();
        handle.send(frame).await.unwrap();

        let mut buf = vec![0u8; expected.len()];
        server.read_exact(&mut buf).await.unwrap();
        assert_eq!(buf, expected);
    }

    #[tokio::test]
    async fn test_frames_arrive_verbatim_in_order() {
        let (client, mut server) = duplex(4096);
        let (handle, _task) = spawn_writer_task_default(client);

        let mut expected = Vec::new();
        for id in 1..=5u8 {
            let frame = wire(&[id, id.wrapping_mul(7)]);
            expected.extend_from_slice(&frame);
            handle.send(frame).await.unwrap();
        }

        let mut received = vec![0u8; expected.len()];
        server.read_exact(&mut received).await.unwrap();
        assert_eq!(received, expected);
    }

    #[tokio::test]
    async fn test_writer_batching() {
        let (client, mut server) = duplex(4096);
        let (handle, _task) = spawn_writer_task_default(client);

        for i in 0..10u8 {
            handle.send(wire(&[i, 0x10, 0x20])).await.unwrap();
        }

        // Give the writer task time to drain the whole burst.
        tokio::time::sleep(Duration::from_millis(50)).await;

        let mut buf = vec![0u8; 1024];
        let n = server.read(&mut buf).await.unwrap();

        // Three payload bytes plus framing, ten times over.
        assert_eq!(n, 10 * 9);
    }

    #[tokio::test]
    async fn test_try_send_when_channel_full() {
        let (tx, _rx) = mpsc::channel::<Bytes>(1);
        let handle = WriterHandle { tx };

        handle.try_send(wire(&[0x01])).unwrap();
        let err = handle.try_send(wire(&[0x02])).unwrap_err();

        assert!(matches!(err, BlewireError::TransportBusy));
    }

    #[tokio::test]
    async fn test_send_after_writer_gone() {
        let (tx, rx) = mpsc::channel::<Bytes>(1);
        let handle = WriterHandle { tx };
        drop(rx);

        assert!(handle.is_closed());

        let err = handle.send(wire(&[0x01])).await.unwrap_err();
        assert!(matches!(err, BlewireError::TransportClosed));

        let err = handle.try_send(wire(&[0x01])).unwrap_err();
        assert!(matches!(err, BlewireError::TransportClosed));
    }

    #[test]
    fn test_build_remaining_slices_no_skip() {
        let batch = vec![wire(&[0x01, 0x02])];

        let slices = build_remaining_slices(&batch, 0);
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].len(), batch[0].len());
    }

    #[test]
    fn test_build_remaining_slices_partial_frame() {
        let batch = vec![wire(&[0x01, 0x02]), wire(&[0x03])];

        let slices = build_remaining_slices(&batch, 5);
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].len(), batch[0].len() - 5);
        assert_eq!(slices[1].len(), batch[1].len());
    }

    #[test]
    fn test_build_remaining_slices_skip_whole_frame() {
        let batch = vec![wire(&[0x01, 0x02]), wire(&[0x03])];

        let slices = build_remaining_slices(&batch, batch[0].len());
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].len(), batch[1].len());
    }

    #[tokio::test]
    async fn test_write_batch_single() {
        let mut buf = Cursor::new(Vec::new());
        let batch = vec![wire(&[0x05])];

        write_batch(&mut buf, &batch).await.unwrap();

        assert_eq!(buf.into_inner(), batch[0]);
    }

    #[tokio::test]
    async fn test_write_batch_multiple() {
        let mut buf = Cursor::new(Vec::new());
        let batch: Vec<Bytes> = (0..5u8).map(|i| wire(&[i, 0xAA])).collect();

        write_batch(&mut buf, &batch).await.unwrap();

        let expected: Vec<u8> = batch.iter().flat_map(|f| f.to_vec()).collect();
        assert_eq!(buf.into_inner(), expected);
    }

    #[tokio::test]
    async fn test_writer_shutdown_on_channel_close() {
        let (client, _server) = duplex(4096);
        let (handle, task) = spawn_writer_task_default(client);

        drop(handle);

        let result = task.await.unwrap();
        assert!(result.is_ok());
    }
}
