//! CRC32 computation.
//!
//! The checksum here is an integrity/identity signal, not a cryptographic
//! hash. It is the standard reflected CRC-32 (polynomial 0xEDB88320) so
//! values are interchangeable with other tooling that records fingerprints.

/// Streaming CRC32 hasher.
///
/// Feed data with [`update`](Crc32::update), then call
/// [`finalize`](Crc32::finalize) to obtain the checksum.
pub struct Crc32 {
    state: u32,
}

impl Crc32 {
    pub fn new() -> Self {
        Crc32 { state: 0xFFFF_FFFF }
    }

    /// Update the hasher with new data.
    pub fn update(&mut self, data: &[u8]) {
        let mut crc = self.state;
        for &byte in data {
            crc ^= u32::from(byte);
            for _ in 0..8 {
                crc = if crc & 1 != 0 {
                    (crc >> 1) ^ 0xEDB8_8320
                } else {
                    crc >> 1
                };
            }
        }
        self.state = crc;
    }

    /// Finalize and return the checksum value.
    pub fn finalize(self) -> u32 {
        self.state ^ 0xFFFF_FFFF
    }
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute the CRC32 of a byte slice in one shot.
pub fn crc32_of(data: &[u8]) -> u32 {
    let mut hasher = Crc32::new();
    hasher.update(data);
    hasher.finalize()
}
