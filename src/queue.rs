//! Bounded hand-off queue for decoded frames.
//!
//! The decode task enqueues completed frames; application code dequeues them
//! at its own pace from any thread, no async runtime required.
//! Under capacity exhaustion new arrivals are dropped, never the oldest
//! queued frame (drop-new backpressure).
//!
//! # Example
//!
//! ```
//! use blewire::protocol::Frame;
//! use blewire::queue::PacketQueue;
//!
//! let queue = PacketQueue::new(2);
//! assert!(queue.try_enqueue(Frame::from_parts(1, &[0x01], 0x01)));
//! assert!(queue.try_enqueue(Frame::from_parts(1, &[0x02], 0x02)));
//!
//! // Full: the third frame is dropped.
//! assert!(!queue.try_enqueue(Frame::from_parts(1, &[0x03], 0x03)));
//!
//! let first = queue.try_dequeue().unwrap();
//! assert_eq!(first.payload(), &[0x01]);
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::protocol::Frame;

/// Default queue capacity in frames.
pub const DEFAULT_PACKET_QUEUE_CAPACITY: usize = 16;

/// Bounded, thread-safe FIFO of decoded frames.
///
/// Clones share the same queue; handing a clone to another thread or task
/// gives it an independent consumer handle. Enqueue and dequeue each run
/// under one mutex, so the full/empty check and the mutation cannot
/// interleave with another producer or consumer.
#[derive(Debug, Clone)]
pub struct PacketQueue {
    inner: Arc<QueueInner>,
}

#[derive(Debug)]
struct QueueInner {
    frames: Mutex<VecDeque<Frame>>,
    capacity: usize,
}

impl PacketQueue {
    /// Create a queue holding at most `capacity` frames.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                frames: Mutex::new(VecDeque::with_capacity(capacity)),
                capacity,
            }),
        }
    }

    /// Try to enqueue a completed frame.
    ///
    /// Returns `false` and drops the frame if the queue is at capacity.
    /// Frames already queued are never evicted.
    pub fn try_enqueue(&self, frame: Frame) -> bool {
        match self.inner.frames.lock() {
            Ok(mut frames) => {
                if frames.len() >= self.inner.capacity {
                    false
                } else {
                    frames.push_back(frame);
                    true
                }
            }
            Err(_) => false,
        }
    }

    /// Take the oldest queued frame, if any. Non-blocking.
    pub fn try_dequeue(&self) -> Option<Frame> {
        self.inner
            .frames
            .lock()
            .ok()
            .and_then(|mut frames| frames.pop_front())
    }

    /// Number of frames currently queued.
    pub fn len(&self) -> usize {
        self.inner
            .frames
            .lock()
            .map(|frames| frames.len())
            .unwrap_or(0)
    }

    /// Check if the queue holds no frames.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if the queue is at capacity.
    pub fn is_full(&self) -> bool {
        self.len() >= self.inner.capacity
    }

    /// Maximum number of frames the queue can hold.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }
}

impl Default for PacketQueue {
    fn default() -> Self {
        Self::new(DEFAULT_PACKET_QUEUE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(tag: u16) -> Frame {
        Frame::from_parts(2, &[(tag >> 8) as u8, tag as u8], 0)
    }

    fn tag_of(frame: &Frame) -> u16 {
        u16::from_be_bytes([frame.payload()[0], frame.payload()[1]])
    }

    #[test]
    fn test_enqueue_dequeue_fifo_order() {
        let queue = PacketQueue::new(4);

        for tag in 0..4 {
            assert!(queue.try_enqueue(frame(tag)));
        }

        for tag in 0..4 {
            assert_eq!(tag_of(&queue.try_dequeue().unwrap()), tag);
        }
        assert!(queue.try_dequeue().is_none());
    }

    #[test]
    fn test_try_dequeue_empty_returns_none() {
        let queue = PacketQueue::new(4);
        assert!(queue.try_dequeue().is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_drop_new_on_full_keeps_existing_order() {
        let queue = PacketQueue::new(2);

        assert!(queue.try_enqueue(frame(1)));
        assert!(queue.try_enqueue(frame(2)));
        assert!(queue.is_full());

        // At capacity: the newcomer is refused, not an older entry.
        assert!(!queue.try_enqueue(frame(3)));
        assert_eq!(queue.len(), 2);

        assert_eq!(tag_of(&queue.try_dequeue().unwrap()), 1);
        assert_eq!(tag_of(&queue.try_dequeue().unwrap()), 2);
        assert!(queue.try_dequeue().is_none());
    }

    #[test]
    fn test_dequeue_reopens_capacity() {
        let queue = PacketQueue::new(1);

        assert!(queue.try_enqueue(frame(1)));
        assert!(!queue.try_enqueue(frame(2)));

        queue.try_dequeue().unwrap();
        assert!(queue.try_enqueue(frame(3)));
        assert_eq!(tag_of(&queue.try_dequeue().unwrap()), 3);
    }

    #[test]
    fn test_default_capacity() {
        let queue = PacketQueue::default();
        assert_eq!(queue.capacity(), DEFAULT_PACKET_QUEUE_CAPACITY);
    }

    #[test]
    fn test_clone_shares_state() {
        let queue = PacketQueue::new(4);
        let handle = queue.clone();

        assert!(queue.try_enqueue(frame(7)));
        assert_eq!(handle.len(), 1);
        assert_eq!(tag_of(&handle.try_dequeue().unwrap()), 7);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_concurrent_producer_consumer() {
        let queue = PacketQueue::new(512);
        let producer_queue = queue.clone();

        let producer = std::thread::spawn(move || {
            for tag in 0..500u16 {
                assert!(producer_queue.try_enqueue(frame(tag)));
            }
        });

        let mut received = Vec::with_capacity(500);
        while received.len() < 500 {
            match queue.try_dequeue() {
                Some(frame) => received.push(tag_of(&frame)),
                None => std::thread::yield_now(),
            }
        }
        producer.join().unwrap();

        let expected: Vec<u16> = (0..500).collect();
        assert_eq!(received, expected);
    }
}
