use crate::id::MessageId;

/// Errors that can occur during frame encoding/decoding.
///
/// Running out of buffered bytes is not an error: decoders report it as
/// `Ok(None)` so the caller can buffer more input and retry.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The transmitted checksum does not match the frame contents.
    ///
    /// The offending bytes have already been discarded; decoding can
    /// continue on the same buffer.
    #[error("checksum mismatch for message {id} (expected {expected:02X?}, got {actual:02X?})")]
    ChecksumMismatch {
        id: MessageId,
        expected: [u8; 2],
        actual: [u8; 2],
    },

    /// The payload exceeds the configured (or wire-format) maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The byte source ended before a complete frame was received.
    #[error("end of stream")]
    EndOfStream,
}

impl FrameError {
    /// True for errors that only affect a single frame; the stream can be
    /// decoded further.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FrameError::ChecksumMismatch { .. } | FrameError::PayloadTooLarge { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
