//! Linear congruential generator.
//!
//! See <https://en.wikipedia.org/wiki/Linear_congruential_generator>. The default
//! parameters are the Numerical Recipes ones: `m = 2^32`, `a = 1664525`,
//! `c = 1013904223`.

use std::sync::{Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

const DEFAULT_MODULUS: u64 = 0x1_0000_0000;
const DEFAULT_MULTIPLIER: u64 = 1_664_525;
const DEFAULT_INCREMENT: u64 = 1_013_904_223;

/// Errors raised when constructing a generator with custom parameters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LcgError {
    #[error("modulus must be positive")]
    ZeroModulus,
    #[error("multiplier {multiplier} must satisfy 0 < a < m (m = {modulus})")]
    InvalidMultiplier { multiplier: u64, modulus: u64 },
    #[error("increment {increment} must satisfy 0 <= c <= m (m = {modulus})")]
    InvalidIncrement { increment: u64, modulus: u64 },
}

/// A linear congruential pseudo-random generator.
///
/// Every draw computes `last = (multiplier * last + increment) mod modulus` and returns
/// the new `last`. The sequence is fully determined by the parameters and the seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LcgRandom {
    modulus: u64,
    multiplier: u64,
    increment: u64,
    last: u32,
}

impl Default for LcgRandom {
    fn default() -> Self {
        Self::new(0)
    }
}

impl LcgRandom {
    /// Creates a generator with the Numerical Recipes parameters and the given seed.
    pub fn new(seed: u32) -> Self {
        Self {
            modulus: DEFAULT_MODULUS,
            multiplier: DEFAULT_MULTIPLIER,
            increment: DEFAULT_INCREMENT,
            last: seed,
        }
    }

    /// Creates a generator with custom parameters.
    ///
    /// # Arguments
    /// * `modulus` - `m`, must be positive
    /// * `multiplier` - `a`, must satisfy `0 < a < m`
    /// * `increment` - `c`, must satisfy `0 <= c <= m`
    /// * `seed` - Initial value of `last`
    pub fn with_parameters(
        modulus: u64,
        multiplier: u64,
        increment: u64,
        seed: u32,
    ) -> Result<Self, LcgError> {
        if modulus == 0 {
            return Err(LcgError::ZeroModulus);
        }
        if multiplier == 0 || multiplier >= modulus {
            return Err(LcgError::InvalidMultiplier { multiplier, modulus });
        }
        if increment > modulus {
            return Err(LcgError::InvalidIncrement { increment, modulus });
        }
        Ok(Self {
            modulus,
            multiplier,
            increment,
            last: seed,
        })
    }

    /// Process-wide generator seeded from the wall clock.
    ///
    /// Only for UI-style randomization (e.g. choosing a fresh seed). The generation
    /// pipeline never touches it.
    pub fn shared() -> &'static Mutex<LcgRandom> {
        static SHARED: OnceLock<Mutex<LcgRandom>> = OnceLock::new();
        SHARED.get_or_init(|| Mutex::new(LcgRandom::new(wall_clock_seed())))
    }

    /// Draws the next value from the shared generator.
    pub fn shared_next() -> u32 {
        let mut rng = Self::shared()
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.next_u32()
    }

    /// Advances the generator and returns the new value.
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        let next = self
            .multiplier
            .wrapping_mul(self.last as u64)
            .wrapping_add(self.increment)
            % self.modulus;
        self.last = next as u32;
        self.last
    }

    /// Overwrites the state with `seed`, then advances once.
    #[inline]
    pub fn next_with_seed(&mut self, seed: u32) -> u32 {
        self.last = seed;
        self.next_u32()
    }

    /// Returns one of the 101 values `0.00, 0.01, ..., 1.00`.
    ///
    /// This is a discrete draw, not a uniform float: `(next % 101) / 100`.
    #[inline]
    pub fn next_percent(&mut self) -> f32 {
        (self.next_u32() % 101) as f32 / 100.0
    }

    /// Overwrites the state with `seed`, then draws a percentage.
    pub fn next_percent_with_seed(&mut self, seed: u32) -> f32 {
        self.last = seed;
        self.next_percent()
    }

    /// Replaces the current state without drawing.
    pub fn reseed(&mut self, seed: u32) {
        self.last = seed;
    }

    /// The most recently produced value (or the seed if nothing was drawn yet).
    pub fn last(&self) -> u32 {
        self.last
    }

    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    pub fn multiplier(&self) -> u64 {
        self.multiplier
    }

    pub fn increment(&self) -> u64 {
        self.increment
    }
}

fn wall_clock_seed() -> u32 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    (now.as_secs() % 60) as u32 + now.subsec_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_sequence_from_zero() {
        let mut rng = LcgRandom::new(0);
        assert_eq!(rng.next_u32(), 1_013_904_223);
        assert_eq!(rng.next_u32(), 1_196_435_762);
        assert_eq!(rng.next_u32(), 3_519_870_697);
        assert_eq!(rng.next_u32(), 2_868_466_484);
    }

    #[test]
    fn test_next_with_seed_overwrites_state() {
        let mut a = LcgRandom::new(0);
        a.next_u32();
        a.next_u32();
        let mut b = LcgRandom::new(42);
        assert_eq!(a.next_with_seed(42), b.next_u32());
        assert_eq!(a.last(), 1_083_814_273);
    }

    #[test]
    fn test_percent_is_discrete() {
        let mut rng = LcgRandom::new(42);
        // 1083814273 % 101 = 39, 378494188 % 101 = 21
        assert_eq!(rng.next_percent(), 0.39);
        assert_eq!(rng.next_percent(), 0.21);

        let mut rng = LcgRandom::new(7);
        for _ in 0..1000 {
            let p = rng.next_percent();
            assert!((0.0..=1.0).contains(&p));
            let hundredths = p * 100.0;
            assert!((hundredths - hundredths.round()).abs() < 1e-4);
        }
    }

    #[test]
    fn test_seeded_percent_and_reseed() {
        let mut rng = LcgRandom::new(0);
        rng.next_u32();
        // 1083814273 % 101 = 39
        assert_eq!(rng.next_percent_with_seed(42), 0.39);
        assert_eq!(rng.last(), 1_083_814_273);

        rng.reseed(42);
        assert_eq!(rng.last(), 42);
        assert_eq!(rng.next_u32(), 1_083_814_273);
    }

    #[test]
    fn test_reproducibility() {
        let mut a = LcgRandom::new(12345);
        let mut b = LcgRandom::new(12345);
        for _ in 0..100 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn test_custom_parameters_validated() {
        assert_eq!(
            LcgRandom::with_parameters(0, 1, 0, 0),
            Err(LcgError::ZeroModulus)
        );
        assert!(matches!(
            LcgRandom::with_parameters(16, 16, 0, 0),
            Err(LcgError::InvalidMultiplier { .. })
        ));
        assert!(matches!(
            LcgRandom::with_parameters(16, 5, 17, 0),
            Err(LcgError::InvalidIncrement { .. })
        ));

        let mut small = LcgRandom::with_parameters(16, 5, 3, 1).unwrap();
        assert_eq!(small.next_u32(), 8); // (5*1 + 3) % 16
        assert_eq!(small.next_u32(), 11); // (5*8 + 3) % 16
    }

    #[test]
    fn test_shared_instance_is_usable() {
        let a = LcgRandom::shared_next();
        let b = LcgRandom::shared_next();
        // Consecutive LCG outputs with full-period parameters never repeat immediately.
        assert_ne!(a, b);
    }
}
