//! UBX link-layer framing.
//!
//! Every message on the wire is framed with:
//! - A 2-byte sync marker (0xB5 0x62) for stream synchronization
//! - A 1-byte class and 1-byte id naming the message type
//! - A 2-byte little-endian payload length
//! - A 2-byte additive checksum over class, id, length and payload
//!
//! Decoders skip line noise, report incomplete input as `Ok(None)` and
//! recover from corrupted frames without losing the stream.

pub mod checksum;
pub mod codec;
pub mod decoder;
pub mod error;
pub mod id;
pub mod reader;
pub mod writer;

pub use checksum::{checksum, Checksum};
pub use codec::{
    decode_frame, decode_frame_with_stats, encode_frame, ChecksumRecovery, DecodeStats, Frame,
    FrameConfig, CHECKSUM_SIZE, FRAME_OVERHEAD, HEADER_SIZE, MAX_PAYLOAD, SYNC,
};
pub use decoder::FrameDecoder;
pub use error::{FrameError, Result};
pub use id::{class_name, MessageId, ACK, AID, CFG, INF, LOG, MON, NAV, RXM, TIM};
pub use reader::FrameReader;
pub use writer::FrameWriter;
