//! UBX field/message codec, framing and dispatch.
//!
//! ubxprims describes u-blox UBX messages as data, validates every field on
//! encode and decode, frames payloads for the wire and dispatches received
//! frames to the matching message schema.
//!
//! # Crate Structure
//!
//! - [`frame`]: sync/length/checksum framing, streaming decoder, reader and writer
//! - [`message`]: field model, message schemas, registry and message decoder
//! - [`catalog`]: sample UBX message definitions (behind `catalog` feature)

/// Re-export frame types.
pub mod frame {
    pub use ubxprims_frame::*;
}

/// Re-export message types.
pub mod message {
    pub use ubxprims_message::*;
}

#[cfg(feature = "catalog")]
pub mod catalog;
