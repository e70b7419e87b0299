//! Response-stream compressor for the self-test signature path.

/// Feedback mask folded in when the accumulator MSB is set (the CRC-32
/// generator polynomial).
pub const MISR_POLY: u32 = 0x04C1_1DB7;

/// 32-bit multiple-input signature register.
///
/// Each accepted response word is folded into the accumulator with a
/// Galois-style step: `sig' = (sig << 1) ^ (msb ? POLY : 0) ^ word`. For a
/// fixed input word the step is a bijection of the accumulator, so a
/// single-bit difference in any absorbed word always survives to the final
/// signature — sensitivity is structural, not probabilistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Misr {
    signature: u32,
}

impl Misr {
    /// Creates a cleared analyzer.
    #[must_use]
    pub const fn new() -> Self {
        Self { signature: 0 }
    }

    pub(crate) const fn from_raw(signature: u32) -> Self {
        Self { signature }
    }

    /// Returns the accumulated signature.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.signature
    }

    /// Zeroes the accumulator.
    #[allow(clippy::missing_const_for_fn)]
    pub fn clear(&mut self) {
        self.signature = 0;
    }

    /// Folds one response word into the accumulator.
    #[allow(clippy::missing_const_for_fn)]
    pub fn absorb(&mut self, word: u32) {
        let feedback = if self.signature & 0x8000_0000 == 0 {
            0
        } else {
            MISR_POLY
        };
        self.signature = (self.signature << 1) ^ feedback ^ word;
    }
}
