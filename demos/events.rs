//! Event dispatch - decoding remote-control events from a byte feed.
//!
//! This example demonstrates:
//! - Feeding a link from a push-style byte source with `byte_channel`
//! - Mapping the message ID byte to a typed event enum
//! - Dispatching on decoded frames
//!
//! The event table mirrors a small BLE remote for a music player: the
//! first payload byte selects the event, the rest is the event value.
//!
//! # Running
//!
//! ```sh
//! cargo run --example events
//! ```

use std::time::Duration;

use blewire::transport::{byte_channel, DEFAULT_INBOUND_CAPACITY};
use blewire::{encode_frame, Link};

/// Events a remote control can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RemoteEvent {
    Example = 0,
    MusicSelectLeft = 1,
    MusicSelectRight = 2,
    MusicSelect = 3,
    SongSkipPrev = 4,
    SongSkipNext = 5,
    SongPlay = 6,
    SongPause = 7,
}

impl TryFrom<u8> for RemoteEvent {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(RemoteEvent::Example),
            1 => Ok(RemoteEvent::MusicSelectLeft),
            2 => Ok(RemoteEvent::MusicSelectRight),
            3 => Ok(RemoteEvent::MusicSelect),
            4 => Ok(RemoteEvent::SongSkipPrev),
            5 => Ok(RemoteEvent::SongSkipNext),
            6 => Ok(RemoteEvent::SongPlay),
            7 => Ok(RemoteEvent::SongPause),
            other => Err(other),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // The feeder stands in for a radio notification callback; the link
    // never writes back, so the write half is a sink.
    let (feeder, stream) = byte_channel(DEFAULT_INBOUND_CAPACITY);
    let link = Link::builder().connect(stream, tokio::io::sink());

    // Simulate a burst of button presses arriving from the remote.
    let presses: &[&[u8]] = &[
        &[RemoteEvent::SongPlay as u8],
        &[RemoteEvent::MusicSelectRight as u8, 0x02],
        &[RemoteEvent::SongSkipNext as u8],
        &[0x7F, 0xAA], // not in the event table
    ];
    for payload in presses {
        let wire = encode_frame(payload)?;
        feeder.push_slice(&wire);
    }

    let mut seen = 0;
    while seen < presses.len() {
        let Some(frame) = link.try_recv() else {
            tokio::time::sleep(Duration::from_millis(1)).await;
            continue;
        };
        seen += 1;

        let Some(id) = frame.message_id() else {
            continue;
        };

        match RemoteEvent::try_from(id) {
            Ok(RemoteEvent::SongPlay) => println!("play"),
            Ok(RemoteEvent::SongPause) => println!("pause"),
            Ok(RemoteEvent::SongSkipNext) => println!("skip forward"),
            Ok(RemoteEvent::SongSkipPrev) => println!("skip back"),
            Ok(event) => println!("{:?} value {:?}", event, frame.data()),
            Err(id) => println!("unknown event {:#04X}, ignoring", id),
        }
    }

    Ok(())
}
