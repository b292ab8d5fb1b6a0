use bytes::{Buf, BytesMut};
use tracing::debug;

use crate::codec::{decode_frame_with_stats, DecodeStats, Frame, FrameConfig, SYNC};
use crate::error::Result;

const INITIAL_BUFFER_CAPACITY: usize = 4 * 1024;

/// Incremental frame decoder for push-style input.
///
/// Feed bytes as they arrive with [`extend`](Self::extend) and drain
/// complete frames with [`next_frame`](Self::next_frame). One decoder per
/// stream; decoders share nothing.
#[derive(Debug)]
pub struct FrameDecoder {
    buf: BytesMut,
    config: FrameConfig,
    stats: DecodeStats,
}

impl FrameDecoder {
    /// Create a decoder with default configuration.
    pub fn new() -> Self {
        Self::with_config(FrameConfig::default())
    }

    /// Create a decoder with explicit configuration.
    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
            stats: DecodeStats::default(),
        }
    }

    /// Append received bytes to the internal buffer.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Decode the next complete frame, if one is buffered.
    ///
    /// `Ok(None)` means more input is needed. Recoverable errors (checksum,
    /// oversized header) leave the decoder ready for the next call.
    pub fn next_frame(&mut self) -> Result<Option<Frame>> {
        decode_frame_with_stats(&mut self.buf, &self.config, &mut self.stats)
    }

    /// Drain the buffer once no more input will arrive.
    ///
    /// A sync marker whose frame can no longer complete is treated as a
    /// false sync: it is dropped and scanning resumes behind it, so frames
    /// hidden behind it are still returned. Call repeatedly until it yields
    /// `Ok(None)`, which means the buffer is empty.
    pub fn finish(&mut self) -> Result<Option<Frame>> {
        loop {
            if let Some(frame) = self.next_frame()? {
                return Ok(Some(frame));
            }
            if self.buf.is_empty() {
                return Ok(None);
            }

            let skip = self.buf.len().min(SYNC.len());
            if skip == SYNC.len() {
                self.stats.truncated += 1;
                debug!(buffered = self.buf.len(), "dropping incomplete frame at end of input");
            }
            self.buf.advance(skip);
            self.stats.discarded_bytes += skip as u64;
        }
    }

    /// Number of bytes currently buffered.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Diagnostics accumulated so far.
    pub fn stats(&self) -> DecodeStats {
        self.stats
    }

    /// Current decoder configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Drop buffered bytes, e.g. after the underlying link was reset.
    pub fn clear(&mut self) {
        self.buf.clear();
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;
    use crate::codec::encode_frame;
    use crate::error::FrameError;

    fn wire(frames: &[(u8, u8, &[u8])]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        for (class, id, payload) in frames {
            encode_frame(*class, *id, payload, &mut buf).unwrap();
        }
        buf.to_vec()
    }

    #[test]
    fn decodes_across_chunk_boundaries() {
        let bytes = wire(&[(0x01, 0x02, b"abcd"), (0x0A, 0x04, b""), (0x21, 0x0B, b"xyz")]);
        let mut decoder = FrameDecoder::new();
        let mut frames = Vec::new();

        for chunk in bytes.chunks(3) {
            decoder.extend(chunk);
            while let Some(frame) = decoder.next_frame().unwrap() {
                frames.push(frame);
            }
        }

        assert_eq!(frames.len(), 3);
        assert_eq!(frames[2].payload.as_ref(), b"xyz");
        assert_eq!(decoder.stats().frames, 3);
        assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn garbage_then_frame_loses_nothing() {
        let mut decoder = FrameDecoder::new();
        decoder.extend(&[0xDE, 0xAD, 0xBE, 0xEF, 0xB5]);
        assert!(decoder.next_frame().unwrap().is_none());

        let bytes = wire(&[(0x01, 0x02, &[0x78, 0x56, 0x34, 0x12])]);
        decoder.extend(&bytes);
        let frame = decoder.next_frame().unwrap().unwrap();

        assert_eq!(frame.payload.as_ref(), &[0x78, 0x56, 0x34, 0x12]);
        // The stray 0xB5 is dropped once the real marker shows up.
        assert_eq!(decoder.stats().discarded_bytes, 5);
    }

    #[test]
    fn continues_after_checksum_error() {
        let mut bytes = wire(&[(0x01, 0x02, b"bad!")]);
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        bytes.extend(wire(&[(0x01, 0x02, b"good")]));

        let mut decoder = FrameDecoder::new();
        decoder.extend(&bytes);

        assert!(matches!(
            decoder.next_frame(),
            Err(FrameError::ChecksumMismatch { .. })
        ));
        let frame = decoder.next_frame().unwrap().unwrap();
        assert_eq!(frame.payload.as_ref(), b"good");
        assert_eq!(decoder.stats().checksum_errors, 1);
    }

    #[test]
    fn finish_resyncs_past_false_sync() {
        // Noise holding a sync marker that announces 256 payload bytes.
        let mut bytes = vec![0x00, 0xB5, 0x62, 0x13, 0x37, 0x00, 0x01, 0xAA];
        bytes.extend(wire(&[(0x01, 0x02, &[0x78, 0x56, 0x34, 0x12])]));

        let mut decoder = FrameDecoder::new();
        decoder.extend(&bytes);
        assert!(decoder.next_frame().unwrap().is_none());
        assert_eq!(decoder.buffered(), 19);

        let frame = decoder.finish().unwrap().unwrap();
        assert_eq!(frame.payload.as_ref(), &[0x78, 0x56, 0x34, 0x12]);
        assert!(decoder.finish().unwrap().is_none());

        let stats = decoder.stats();
        assert_eq!(stats.frames, 1);
        assert_eq!(stats.truncated, 1);
        assert_eq!(stats.discarded_bytes, 8);
        assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn finish_drops_incomplete_tail() {
        let bytes = wire(&[(0x01, 0x02, b"abcd"), (0x0A, 0x04, b"efgh")]);
        let mut decoder = FrameDecoder::new();
        decoder.extend(&bytes[..bytes.len() - 3]);

        assert_eq!(decoder.next_frame().unwrap().unwrap().payload.as_ref(), b"abcd");
        assert!(decoder.next_frame().unwrap().is_none());
        assert!(decoder.finish().unwrap().is_none());
        assert_eq!(decoder.stats().truncated, 1);
        assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn finish_on_lone_sync_byte() {
        let mut decoder = FrameDecoder::new();
        decoder.extend(&[0x01, 0xB5]);
        assert!(decoder.finish().unwrap().is_none());
        assert_eq!(decoder.stats().truncated, 0);
        assert_eq!(decoder.stats().discarded_bytes, 2);
    }

    #[test]
    fn clear_drops_partial_input() {
        let bytes = wire(&[(0x01, 0x02, b"abcd")]);
        let mut decoder = FrameDecoder::default();
        decoder.extend(&bytes[..5]);
        assert!(decoder.next_frame().unwrap().is_none());
        decoder.clear();
        assert_eq!(decoder.buffered(), 0);
    }
}
