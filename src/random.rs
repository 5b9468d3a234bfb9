//! Uniform random integers over arbitrary precision
//!
//! `RandomSource` is passed explicitly into every randomized operation. Key
//! generation uses [`RandomSource::from_entropy`], an OS-seeded `StdRng`;
//! tests use [`RandomSource::seeded`] for reproducible runs.

use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, Zero};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::error::{CryptoError, Result};

/// Source of uniformly distributed big integers
#[derive(Clone, Debug)]
pub struct RandomSource<R = StdRng> {
    rng: R,
}

impl RandomSource<StdRng> {
    /// Cryptographically strong source seeded from the operating system
    pub fn from_entropy() -> Self {
        RandomSource {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic source for reproducible tests
    pub fn seeded(seed: u64) -> Self {
        RandomSource {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: RngCore> RandomSource<R> {
    /// Wrap any RNG, e.g. a [`BbsGenerator`](crate::bbs::BbsGenerator)
    pub fn new(rng: R) -> Self {
        RandomSource { rng }
    }

    /// Give back the wrapped RNG
    pub fn into_inner(self) -> R {
        self.rng
    }

    /// Random integer with exactly `bit_length` bits (top bit forced)
    pub fn uniform_bits(&mut self, bit_length: u64) -> Result<BigUint> {
        if bit_length == 0 {
            return Err(CryptoError::InvalidRange(
                "bit length must be positive".to_string(),
            ));
        }

        let mut value = self.rng.gen_biguint(bit_length);
        value.set_bit(bit_length - 1, true);
        Ok(value)
    }

    /// Random odd integer with exactly `bit_length` bits
    pub fn odd_in_bitlength(&mut self, bit_length: u64) -> Result<BigUint> {
        let mut value = self.uniform_bits(bit_length)?;
        value.set_bit(0, true);
        Ok(value)
    }

    /// Uniform integer in the inclusive range [min, max]
    pub fn uniform_range(&mut self, min: &BigUint, max: &BigUint) -> Result<BigUint> {
        if min > max {
            return Err(CryptoError::InvalidRange(format!(
                "min {} exceeds max {}",
                min, max
            )));
        }

        let upper = max + BigUint::one();
        Ok(self.rng.gen_biguint_range(min, &upper))
    }

    /// Uniform integer in [0, bound); `bound` must be nonzero
    pub(crate) fn below(&mut self, bound: &BigUint) -> BigUint {
        debug_assert!(!bound.is_zero());
        self.rng.gen_biguint_below(bound)
    }
}

impl Default for RandomSource<StdRng> {
    fn default() -> Self {
        Self::from_entropy()
    }
}
