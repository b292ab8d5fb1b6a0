/// Two-accumulator additive checksum used by UBX frames (8-bit Fletcher).
///
/// Both accumulators wrap at 256. The checksum covers class, id, length and
/// payload, never the sync marker or the checksum bytes themselves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Checksum {
    ck_a: u8,
    ck_b: u8,
}

impl Checksum {
    /// Start a new checksum with both accumulators at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes into the checksum.
    pub fn update(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.ck_a = self.ck_a.wrapping_add(byte);
            self.ck_b = self.ck_b.wrapping_add(self.ck_a);
        }
    }

    /// The `[ck_a, ck_b]` pair as transmitted on the wire.
    pub fn finish(&self) -> [u8; 2] {
        [self.ck_a, self.ck_b]
    }
}

/// Compute the checksum of a contiguous byte range.
pub fn checksum(bytes: &[u8]) -> [u8; 2] {
    let mut ck = Checksum::new();
    ck.update(bytes);
    ck.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vector() {
        assert_eq!(
            checksum(&[0x01, 0x02, 0x04, 0x00, 0x78, 0x56, 0x34, 0x12]),
            [0x1B, 0x8A]
        );
    }

    #[test]
    fn empty_poll_vector() {
        // NAV-POSLLH poll: class 0x01, id 0x02, zero length.
        assert_eq!(checksum(&[0x01, 0x02, 0x00, 0x00]), [0x03, 0x0A]);
    }

    #[test]
    fn incremental_matches_one_shot() {
        let data: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
        let mut ck = Checksum::new();
        for chunk in data.chunks(7) {
            ck.update(chunk);
        }
        assert_eq!(ck.finish(), checksum(&data));
    }
}
