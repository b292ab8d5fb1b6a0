use std::io::{ErrorKind, Read};

use crate::codec::{DecodeStats, Frame, FrameConfig};
use crate::decoder::FrameDecoder;
use crate::error::{FrameError, Result};

const READ_CHUNK_SIZE: usize = 4 * 1024;

/// Reads complete frames from any `Read` byte source (serial port, file,
/// socket).
///
/// Handles partial reads and resynchronization internally. A checksum
/// mismatch is returned as an error for that frame only; the next call
/// continues with the following bytes.
pub struct FrameReader<T> {
    inner: T,
    decoder: FrameDecoder,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            decoder: FrameDecoder::with_config(config),
        }
    }

    /// Read the next complete frame (blocking).
    ///
    /// Returns `Err(FrameError::EndOfStream)` once EOF is reached and every
    /// complete frame still buffered has been returned. Incomplete frames
    /// left at EOF are dropped and counted in [`DecodeStats::truncated`].
    pub fn read_frame(&mut self) -> Result<Frame> {
        loop {
            if let Some(frame) = self.decoder.next_frame()? {
                return Ok(frame);
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                return match self.decoder.finish()? {
                    Some(frame) => Ok(frame),
                    None => Err(FrameError::EndOfStream),
                };
            }

            self.decoder.extend(&chunk[..read]);
        }
    }

    /// Decoding diagnostics accumulated so far.
    pub fn stats(&self) -> DecodeStats {
        self.decoder.stats()
    }

    /// Bytes read but not yet consumed by a complete frame.
    pub fn buffered(&self) -> usize {
        self.decoder.buffered()
    }

    /// Borrow the underlying source.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying source.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner source.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        self.decoder.config()
    }
}

impl<T: Read> Iterator for FrameReader<T> {
    type Item = Result<Frame>;

    /// Yields frames and recoverable errors; stops at end of stream.
    fn next(&mut self) -> Option<Self::Item> {
        match self.read_frame() {
            Err(FrameError::EndOfStream) => None,
            other => Some(other),
        }
    }
}
