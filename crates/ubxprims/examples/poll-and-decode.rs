//! Poll a receiver for its position and decode the reply.
//!
//! Run with:
//!   cargo run --example poll-and-decode
//!
//! The "receiver" here is an in-memory buffer; swap it for a serial port
//! handle implementing `Read + Write` to talk to real hardware.

use std::sync::Arc;

use ubxprims::catalog;
use ubxprims::frame::FrameWriter;
use ubxprims::message::{Decoded, MessageDecoder};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let poll = catalog::find("NAV-POSLLH-POLL")?.ok_or("catalog lacks NAV-POSLLH-POLL")?;
    let request = poll.new_message().to_frame()?;

    let mut link = FrameWriter::new(Vec::new());
    link.write_frame(&request)?;
    eprintln!("poll bytes: {:02X?}", link.get_ref());

    // Pretend the receiver answered with a position solution.
    let mut reply = catalog::nav_posllh()?.new_message();
    reply.set("iTOW", 345_600_000u32)?;
    reply.set("lon", 85_417_000i32)?;
    reply.set("lat", 473_769_000i32)?;
    reply.set("hMSL", 408_000i32)?;
    let mut wire = vec![0x00, 0x13];
    wire.extend_from_slice(&reply.to_bytes()?);

    let registry = Arc::new(catalog::output_registry()?);
    let mut decoder = MessageDecoder::new(registry);
    decoder.extend(&wire);

    while let Some(decoded) = decoder.next_message()? {
        match decoded {
            Decoded::Known(msg) => {
                println!(
                    "{}: lat={:.7} lon={:.7} hMSL={:.3}m",
                    msg.name(),
                    msg.physical("lat")?,
                    msg.physical("lon")?,
                    msg.physical("hMSL")?
                );
            }
            Decoded::Unknown(unknown) => {
                println!("unknown {} ({} bytes)", unknown.id, unknown.payload.len());
            }
        }
    }

    let stats = decoder.stats();
    eprintln!(
        "frames={} discarded_bytes={}",
        stats.frames, stats.discarded_bytes
    );
    Ok(())
}
