//! Deterministic Park–Miller random stream.
//!
//! Every generator builds its own [`RandomStream`] from a literal seed, so a
//! graph depends only on its seed and configuration and never on draws made
//! elsewhere in the program.

use rand::RngCore;

/// Park–Miller multiplier.
pub const MULTIPLIER: u64 = 16_807;

/// Park–Miller modulus (2^31 - 1).
pub const MODULUS: u64 = 2_147_483_647;

/// Minimal-standard linear congruential stream producing floats in `[0, 1)`.
///
/// The stream is also an infinite [`Iterator`] and implements
/// [`RngCore`], so callers that prefer the `rand::Rng` helpers can use them
/// without giving up reproducibility.
///
/// It is `Send` but deliberately not shared: `next_f64` mutates the state,
/// so each build owns its stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomStream {
    state: u64,
}

impl RandomStream {
    /// Create a stream from a seed.
    ///
    /// The seed is reduced into `[0, MODULUS)`; a zero state would repeat
    /// forever, so it is replaced by `MODULUS - 1`. Positive seeds below the
    /// modulus are used as-is.
    pub fn new(seed: i64) -> Self {
        let reduced = seed.rem_euclid(MODULUS as i64) as u64;
        let state = if reduced == 0 { MODULUS - 1 } else { reduced };
        Self { state }
    }

    /// Current internal state, always in `[1, MODULUS - 1]`.
    pub fn state(&self) -> u64 {
        self.state
    }

    /// Advance the state and return the next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.state = (self.state * MULTIPLIER) % MODULUS;
        (self.state - 1) as f64 / (MODULUS - 1) as f64
    }

    /// Uniform index in `0..len`, or `None` for an empty range.
    ///
    /// Consumes exactly one draw when `len > 0` and none otherwise.
    pub fn next_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let idx = (self.next_f64() * len as f64) as usize;
        Some(idx.min(len - 1))
    }
}

impl Iterator for RandomStream {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        Some(self.next_f64())
    }
}

impl RngCore for RandomStream {
    fn next_u32(&mut self) -> u32 {
        // 31 bits of state, shifted into the high end of the word.
        self.state = (self.state * MULTIPLIER) % MODULUS;
        ((self.state - 1) as u32) << 1
    }

    fn next_u64(&mut self) -> u64 {
        let hi = self.next_u32() as u64;
        let lo = self.next_u32() as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
