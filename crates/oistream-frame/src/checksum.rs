/// Running 8-bit additive checksum over frame bytes.
///
/// Every byte from the marker through the trailing checksum byte is summed
/// modulo 256; a frame is intact when the total is zero. This is the only
/// integrity check on the wire and it is not a digest: it detects any single
/// corrupted byte, but not reordered bytes or compensating errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Checksum {
    sum: u8,
}

impl Checksum {
    /// An empty accumulator.
    pub const fn new() -> Self {
        Self { sum: 0 }
    }

    /// Add one byte.
    pub fn accumulate(&mut self, byte: u8) {
        self.sum = self.sum.wrapping_add(byte);
    }

    /// Add every byte of a slice.
    pub fn accumulate_all(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.accumulate(byte);
        }
    }

    /// Clear the accumulator.
    pub fn reset(&mut self) {
        self.sum = 0;
    }

    /// The current sum modulo 256.
    pub fn sum(&self) -> u8 {
        self.sum
    }

    /// True when the accumulated sum is zero.
    ///
    /// Meaningful once the trailing checksum byte has been accumulated.
    pub fn is_valid(&self) -> bool {
        self.sum == 0
    }

    /// The byte that, accumulated next, makes the sum zero.
    pub fn complement(&self) -> u8 {
        0u8.wrapping_sub(self.sum)
    }

    /// The checksum byte to append after `bytes`.
    pub fn complement_of(bytes: &[u8]) -> u8 {
        let mut checksum = Self::new();
        checksum.accumulate_all(bytes);
        checksum.complement()
    }
}
