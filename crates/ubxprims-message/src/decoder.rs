use std::sync::Arc;

use ubxprims_frame::{DecodeStats, FrameConfig, FrameDecoder};

use crate::error::Result;
use crate::registry::{Decoded, MessageRegistry};

/// Incremental decoder from raw bytes to dispatched messages.
///
/// Framing errors and schema errors are reported for the frame that caused
/// them; the following call continues with the next frame.
#[derive(Debug)]
pub struct MessageDecoder {
    frames: FrameDecoder,
    registry: Arc<MessageRegistry>,
}

impl MessageDecoder {
    pub fn new(registry: Arc<MessageRegistry>) -> Self {
        Self::with_config(registry, FrameConfig::default())
    }

    pub fn with_config(registry: Arc<MessageRegistry>, config: FrameConfig) -> Self {
        Self {
            frames: FrameDecoder::with_config(config),
            registry,
        }
    }

    /// Append received bytes.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.frames.extend(bytes);
    }

    /// Decode the next buffered message. `Ok(None)` means more input is
    /// needed.
    pub fn next_message(&mut self) -> Result<Option<Decoded>> {
        match self.frames.next_frame()? {
            Some(frame) => self.registry.decode_message(&frame).map(Some),
            None => Ok(None),
        }
    }

    /// Drain buffered messages after the input has ended; see
    /// [`FrameDecoder::finish`]. `Ok(None)` means nothing is left.
    pub fn finish(&mut self) -> Result<Option<Decoded>> {
        match self.frames.finish()? {
            Some(frame) => self.registry.decode_message(&frame).map(Some),
            None => Ok(None),
        }
    }

    /// Framing diagnostics accumulated so far.
    pub fn stats(&self) -> DecodeStats {
        self.frames.stats()
    }

    pub fn buffered(&self) -> usize {
        self.frames.buffered()
    }

    pub fn registry(&self) -> &Arc<MessageRegistry> {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;
    use ubxprims_frame::{encode_frame, FrameError, MessageId};

    use super::*;
    use crate::error::MessageError;
    use crate::field::FieldSpec;
    use crate::schema::MessageSchema;

    fn registry() -> Arc<MessageRegistry> {
        let schema = MessageSchema::builder((0x01, 0x02), "NAV-POSLLH")
            .field(FieldSpec::u32("iTOW"))
            .build_shared()
            .unwrap();
        Arc::new(MessageRegistry::from_schemas([schema]).unwrap())
    }

    fn frame(class: u8, id: u8, payload: &[u8]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        encode_frame(class, id, payload, &mut buf).unwrap();
        buf.to_vec()
    }

    #[test]
    fn decodes_known_and_unknown() {
        let mut decoder = MessageDecoder::new(registry());
        decoder.extend(&frame(0x01, 0x02, &[0x78, 0x56, 0x34, 0x12]));
        decoder.extend(&frame(0x05, 0x01, &[0x06, 0x01]));

        let first = decoder.next_message().unwrap().unwrap();
        assert_eq!(
            first.message().unwrap().get_u64("iTOW").unwrap(),
            0x1234_5678
        );
        let second = decoder.next_message().unwrap().unwrap();
        assert!(matches!(second, Decoded::Unknown(ref u) if u.id == MessageId::new(0x05, 0x01)));
        assert!(decoder.next_message().unwrap().is_none());
        assert_eq!(decoder.stats().frames, 2);
    }

    #[test]
    fn schema_error_is_local_to_its_frame() {
        let mut decoder = MessageDecoder::new(registry());
        decoder.extend(&frame(0x01, 0x02, &[1, 2]));
        decoder.extend(&frame(0x01, 0x02, &[1, 0, 0, 0]));

        let err = decoder.next_message().unwrap_err();
        assert!(matches!(err, MessageError::TruncatedData { .. }));
        assert!(err.is_recoverable());

        let next = decoder.next_message().unwrap().unwrap();
        assert_eq!(next.message().unwrap().get_u64("iTOW").unwrap(), 1);
    }

    #[test]
    fn checksum_error_is_local_to_its_frame() {
        let mut bad = frame(0x01, 0x02, &[9, 9, 9, 9]);
        let last = bad.len() - 1;
        bad[last] ^= 0xFF;

        let mut decoder = MessageDecoder::new(registry());
        decoder.extend(&bad);
        decoder.extend(&frame(0x01, 0x02, &[2, 0, 0, 0]));

        let err = decoder.next_message().unwrap_err();
        assert!(matches!(
            err,
            MessageError::Frame(FrameError::ChecksumMismatch { .. })
        ));
        assert!(err.is_recoverable());

        let next = decoder.next_message().unwrap().unwrap();
        assert_eq!(next.message().unwrap().get_u64("iTOW").unwrap(), 2);
        assert_eq!(decoder.stats().checksum_errors, 1);
    }

    #[test]
    fn finish_recovers_message_behind_false_sync() {
        let mut decoder = MessageDecoder::new(registry());
        decoder.extend(&[0xB5, 0x62, 0x01, 0x02, 0xFF, 0x00]);
        decoder.extend(&frame(0x01, 0x02, &[4, 0, 0, 0]));
        assert!(decoder.next_message().unwrap().is_none());

        let msg = decoder.finish().unwrap().unwrap();
        assert_eq!(msg.message().unwrap().get_u64("iTOW").unwrap(), 4);
        assert!(decoder.finish().unwrap().is_none());
        assert_eq!(decoder.stats().truncated, 1);
    }

    #[test]
    fn partial_input_needs_more_data() {
        let bytes = frame(0x01, 0x02, &[3, 0, 0, 0]);
        let mut decoder = MessageDecoder::new(registry());

        decoder.extend(&bytes[..5]);
        assert!(decoder.next_message().unwrap().is_none());
        decoder.extend(&bytes[5..]);
        assert!(decoder.next_message().unwrap().is_some());
        assert_eq!(decoder.buffered(), 0);
        assert_eq!(decoder.registry().len(), 1);
    }
}
