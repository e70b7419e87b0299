//! Pseudo-random pattern generator for the self-test stimulus path.

/// Fixed non-zero value loaded into the generator on reset.
pub const LFSR_RESET_SEED: u32 = 0xDEAD_BEEF;

/// Maximal-length 32-bit Fibonacci LFSR with taps at bits 32, 22, 2 and 1.
///
/// The feedback polynomial `x^32 + x^22 + x^2 + x + 1` is primitive over
/// GF(2), so the generator walks every non-zero 32-bit state exactly once
/// before repeating. The all-zero state is a lock-up state for pure XOR
/// feedback and is unreachable from any non-zero state; reset and explicit
/// seed load are the only ways to set the register. The controller advances
/// the generator only while a test is running, so outside that window the
/// output holds its last value exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Lfsr {
    state: u32,
}

impl Default for Lfsr {
    fn default() -> Self {
        Self::new()
    }
}

impl Lfsr {
    /// Creates a generator holding the fixed reset seed.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: LFSR_RESET_SEED,
        }
    }

    pub(crate) const fn from_raw(state: u32) -> Self {
        Self { state }
    }

    /// Returns the current pattern output.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.state
    }

    /// Reloads the fixed reset seed.
    #[allow(clippy::missing_const_for_fn)]
    pub fn reset(&mut self) {
        self.state = LFSR_RESET_SEED;
    }

    /// Forces an arbitrary seed value.
    ///
    /// # Panics
    ///
    /// Debug builds panic on a zero seed. Release builds mirror the modeled
    /// hardware and leave the caller error undefended.
    #[allow(clippy::missing_const_for_fn)]
    pub fn seed_load(&mut self, value: u32) {
        debug_assert!(value != 0, "all-zero state locks a pure-XOR LFSR");
        self.state = value;
    }

    /// Shifts one step and returns the new pattern.
    ///
    /// The feedback bit is the XOR of bits 31, 21, 1 and 0; it enters at
    /// bit 0 while everything else moves toward the MSB.
    #[allow(clippy::missing_const_for_fn)]
    pub fn advance(&mut self) -> u32 {
        let s = self.state;
        let feedback = ((s >> 31) ^ (s >> 21) ^ (s >> 1) ^ s) & 1;
        self.state = (s << 1) | feedback;
        self.state
    }
}
