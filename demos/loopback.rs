//! Loopback - two links talking over an in-memory transport.
//!
//! This example demonstrates:
//! - Connecting a link with `Link::builder()`
//! - Sending payloads with `link.send()`
//! - Draining decoded frames with `link.try_recv()`
//!
//! # Running
//!
//! ```sh
//! cargo run --example loopback
//! ```

use std::time::Duration;

use blewire::Link;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // An in-memory pipe stands in for the UART pair.
    let (host_io, device_io) = tokio::io::duplex(4096);
    let (host_rd, host_wr) = tokio::io::split(host_io);
    let (dev_rd, dev_wr) = tokio::io::split(device_io);

    let host = Link::builder().connect(host_rd, host_wr);
    let device = Link::builder().connect(dev_rd, dev_wr);

    // The device echoes every frame back to the host.
    tokio::spawn(async move {
        loop {
            if let Some(frame) = device.try_recv() {
                println!(
                    "[device] message {:3?} with {} data byte(s)",
                    frame.message_id(),
                    frame.data().len()
                );
                let payload = frame.payload().to_vec();
                if let Err(e) = device.send(&payload).await {
                    eprintln!("[device] echo failed: {}", e);
                    break;
                }
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    });

    for id in 1..=3u8 {
        host.send(&[id, 0x10, 0x20]).await?;
        println!("[host]   sent message {}", id);
    }

    let mut echoed = 0;
    while echoed < 3 {
        if let Some(frame) = host.try_recv() {
            println!("[host]   echo for message {:?}", frame.message_id());
            echoed += 1;
        } else {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }

    println!("all echoes received");
    Ok(())
}
