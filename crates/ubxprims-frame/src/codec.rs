use bytes::{Buf, BufMut, Bytes, BytesMut};
use tracing::{debug, trace};

use crate::checksum::{checksum, Checksum};
use crate::error::{FrameError, Result};
use crate::id::MessageId;

/// Sync marker: 0xB5 0x62 ("µb").
pub const SYNC: [u8; 2] = [0xB5, 0x62];

/// Frame header: sync (2) + class (1) + id (1) + length (2) = 6 bytes.
pub const HEADER_SIZE: usize = 6;

/// Trailing checksum: ck_a (1) + ck_b (1).
pub const CHECKSUM_SIZE: usize = 2;

/// Bytes a frame adds around its payload.
pub const FRAME_OVERHEAD: usize = HEADER_SIZE + CHECKSUM_SIZE;

/// Largest payload the 16-bit length field can describe.
pub const MAX_PAYLOAD: usize = u16::MAX as usize;

/// A validated UBX frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Message class.
    pub class: u8,
    /// Message id within the class.
    pub id: u8,
    /// The message payload (checksum already verified).
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(id: MessageId, payload: impl Into<Bytes>) -> Self {
        Self {
            class: id.class,
            id: id.id,
            payload: payload.into(),
        }
    }

    /// The `(class, id)` pair of this frame.
    pub fn message_id(&self) -> MessageId {
        MessageId::new(self.class, self.id)
    }

    /// The total wire size of this frame (header + payload + checksum).
    pub fn wire_size(&self) -> usize {
        FRAME_OVERHEAD + self.payload.len()
    }

    /// Encode this frame into a fresh buffer.
    pub fn to_bytes(&self) -> Result<Bytes> {
        let mut dst = BytesMut::with_capacity(self.wire_size());
        encode_frame(self.class, self.id, &self.payload, &mut dst)?;
        Ok(dst.freeze())
    }
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌───────────┬───────┬──────┬──────────┬─────────────┬──────────┐
/// │ Sync (2B) │ Class │ Id   │ Length   │ Payload     │ CK_A     │
/// │ 0xB5 0x62 │ (1B)  │ (1B) │ (2B LE)  │ (Length B)  │ CK_B     │
/// └───────────┴───────┴──────┴──────────┴─────────────┴──────────┘
/// ```
///
/// The checksum runs over class, id, length and payload.
pub fn encode_frame(class: u8, id: u8, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }
    let len = (payload.len() as u16).to_le_bytes();

    let mut ck = Checksum::new();
    ck.update(&[class, id]);
    ck.update(&len);
    ck.update(payload);

    dst.reserve(FRAME_OVERHEAD + payload.len());
    dst.put_slice(&SYNC);
    dst.put_u8(class);
    dst.put_u8(id);
    dst.put_slice(&len);
    dst.put_slice(payload);
    dst.put_slice(&ck.finish());
    Ok(())
}

/// What to discard after a frame fails its checksum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChecksumRecovery {
    /// Drop only the sync marker and scan for the next one. A corrupted
    /// length field cannot swallow the frames that follow.
    #[default]
    Resync,
    /// Drop the whole frame as described by its (unverified) length.
    SkipFrame,
}

/// Configuration for the frame codec.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum accepted payload size in bytes. Default: 65535.
    ///
    /// A header announcing more than this is treated as a false sync.
    pub max_payload_size: usize,
    /// Recovery policy after a checksum mismatch.
    pub checksum_recovery: ChecksumRecovery,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: MAX_PAYLOAD,
            checksum_recovery: ChecksumRecovery::default(),
        }
    }
}

/// Running counters kept while decoding a stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    /// Frames decoded successfully.
    pub frames: u64,
    /// Bytes dropped while hunting for a sync marker.
    pub discarded_bytes: u64,
    /// Frames rejected for a checksum mismatch.
    pub checksum_errors: u64,
    /// Headers rejected for announcing an oversized payload.
    pub oversized: u64,
    /// Sync markers whose frame was still incomplete when input ended.
    pub truncated: u64,
}

/// Decode a frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// Garbage in front of the sync marker is discarded silently. On success,
/// consumes the frame bytes from the buffer.
pub fn decode_frame(src: &mut BytesMut, config: &FrameConfig) -> Result<Option<Frame>> {
    let mut stats = DecodeStats::default();
    decode_frame_with_stats(src, config, &mut stats)
}

/// Same as [`decode_frame`], accumulating diagnostics into `stats`.
pub fn decode_frame_with_stats(
    src: &mut BytesMut,
    config: &FrameConfig,
    stats: &mut DecodeStats,
) -> Result<Option<Frame>> {
    let discarded = discard_until_sync(src);
    if discarded > 0 {
        stats.discarded_bytes += discarded as u64;
        trace!(discarded, "skipped bytes before sync marker");
    }

    if src.len() < HEADER_SIZE {
        return Ok(None); // Need more data
    }

    let class = src[2];
    let id = src[3];
    let payload_len = u16::from_le_bytes([src[4], src[5]]) as usize;

    if payload_len > config.max_payload_size {
        src.advance(SYNC.len());
        stats.oversized += 1;
        return Err(FrameError::PayloadTooLarge {
            size: payload_len,
            max: config.max_payload_size,
        });
    }

    let total = HEADER_SIZE + payload_len + CHECKSUM_SIZE;
    if src.len() < total {
        return Ok(None); // Need more data
    }

    let expected = checksum(&src[SYNC.len()..HEADER_SIZE + payload_len]);
    let actual = [src[total - 2], src[total - 1]];
    if expected != actual {
        let id = MessageId::new(class, id);
        stats.checksum_errors += 1;
        let skip = match config.checksum_recovery {
            ChecksumRecovery::Resync => SYNC.len(),
            ChecksumRecovery::SkipFrame => total,
        };
        src.advance(skip);
        debug!(%id, skip, "dropping frame with bad checksum");
        return Err(FrameError::ChecksumMismatch {
            id,
            expected,
            actual,
        });
    }

    src.advance(HEADER_SIZE);
    let payload = src.split_to(payload_len).freeze();
    src.advance(CHECKSUM_SIZE);
    stats.frames += 1;

    Ok(Some(Frame { class, id, payload }))
}

/// Drop everything in front of the first sync marker. A trailing lone
/// first sync byte is kept since its partner may arrive with the next read.
fn discard_until_sync(src: &mut BytesMut) -> usize {
    let skip = match src.windows(SYNC.len()).position(|w| w == SYNC) {
        Some(pos) => pos,
        None if src.last() == Some(&SYNC[0]) => src.len() - 1,
        None => src.len(),
    };
    src.advance(skip);
    skip
}
