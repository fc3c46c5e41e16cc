//! # blewire
//!
//! Packet framing and transport plumbing for BLE-UART links.
//!
//! This crate frames application payloads for the serial side of a
//! BLE-to-UART bridge and recovers frames from the raw byte stream on
//! the way back, tolerating fragmentation and line noise.
//!
//! ## Architecture
//!
//! - **Wire format**: `HEAD | LENGTH | PAYLOAD | TAIL | CHECKSUM | CR | LF`
//! - **Decoder**: byte-at-a-time state machine, resynchronizes on the
//!   next `HEAD` after any malformed frame
//! - **Link**: writer task plus decode task over any `AsyncRead`/`AsyncWrite`
//!   transport, with a bounded queue of decoded frames
//!
//! ## Example
//!
//! ```ignore
//! use blewire::Link;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (reader, writer) = open_uart().await.unwrap();
//!     let link = Link::builder().connect(reader, writer);
//!
//!     link.send(&[0x06, 0x01]).await.unwrap();
//!
//!     if let Some(frame) = link.try_recv() {
//!         println!("message {:?}", frame.message_id());
//!     }
//! }
//! ```

pub mod error;
pub mod protocol;
pub mod queue;
pub mod transport;

mod link;
mod writer;

pub use error::{BlewireError, Result};
pub use link::{Link, LinkBuilder};
pub use protocol::{encode_frame, Frame, FrameDecoder};
pub use queue::PacketQueue;
pub use writer::{spawn_writer_task, WriterConfig, WriterHandle};
