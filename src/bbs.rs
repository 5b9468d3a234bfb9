//! Blum-Blum-Shub pseudo-random bit generator
//!
//! The state advances as s <- s^2 mod n on every bit and the emitted bit is
//! the parity of the new state. The stream is unbounded and never rewinds.
//! It backs Pollard's Rho reseeding and can drive a
//! [`RandomSource`] through its [`RngCore`] impl, but is never used for
//! primary key material.

use num_bigint::BigUint;
use num_integer::Integer;
use rand::RngCore;

use crate::bootstrap::KeyFactory;
use crate::error::{CryptoError, Result};
use crate::random::RandomSource;
use crate::utils::are_coprime;

#[derive(Clone, Debug)]
pub struct BbsGenerator {
    n: BigUint,
    state: BigUint,
    bit_length: u64,
}

impl BbsGenerator {
    /// Build from two random `bit_length`-bit primes p ≡ q ≡ 3 (mod 4)
    pub fn new<R: RngCore>(
        bit_length: u64,
        factory: &KeyFactory,
        rng: &mut RandomSource<R>,
    ) -> Result<Self> {
        let p = factory.blum_prime_with_bits(bit_length, rng)?;
        let q = Self::distinct_prime(&p, factory, rng, |f, r| {
            f.blum_prime_with_bits(bit_length, r)
        })?;
        let mut generator = Self::seeded_from(p, q, factory, rng)?;
        generator.bit_length = bit_length;
        Ok(generator)
    }

    /// Build from two random primes in [min, max], both ≡ 3 (mod 4)
    ///
    /// Each output word spans the bit length of n.
    pub fn in_range<R: RngCore>(
        min: &BigUint,
        max: &BigUint,
        factory: &KeyFactory,
        rng: &mut RandomSource<R>,
    ) -> Result<Self> {
        let p = factory.blum_prime_in_range(min, max, rng)?;
        let q = Self::distinct_prime(&p, factory, rng, |f, r| {
            f.blum_prime_in_range(min, max, r)
        })?;
        Self::seeded_from(p, q, factory, rng)
    }

    /// Build from explicit primes and seed
    pub fn from_parts(p: &BigUint, q: &BigUint, seed: BigUint) -> Result<Self> {
        let three = BigUint::from(3u32);
        if p == q {
            return Err(CryptoError::InvalidParameter(
                "BBS primes must be distinct".to_string(),
            ));
        }
        if p % 4u32 != three || q % 4u32 != three {
            return Err(CryptoError::InvalidParameter(
                "BBS primes must be congruent to 3 mod 4".to_string(),
            ));
        }

        let n = p * q;
        if seed < BigUint::from(2u32) || seed >= n || !are_coprime(&seed, &n) {
            return Err(CryptoError::InvalidParameter(format!(
                "BBS seed must lie in [2, n) and be coprime to n = {}",
                n
            )));
        }

        Ok(BbsGenerator {
            bit_length: n.bits(),
            n,
            state: seed,
        })
    }

    fn distinct_prime<R, F>(
        p: &BigUint,
        factory: &KeyFactory,
        rng: &mut RandomSource<R>,
        mut draw: F,
    ) -> Result<BigUint>
    where
        R: RngCore,
        F: FnMut(&KeyFactory, &mut RandomSource<R>) -> Result<BigUint>,
    {
        for _ in 0..factory.max_attempts() {
            let q = draw(factory, rng)?;
            if &q != p {
                return Ok(q);
            }
        }
        Err(CryptoError::PrimeSearchExhausted {
            attempts: factory.max_attempts(),
        })
    }

    fn seeded_from<R: RngCore>(
        p: BigUint,
        q: BigUint,
        factory: &KeyFactory,
        rng: &mut RandomSource<R>,
    ) -> Result<Self> {
        let n = &p * &q;
        let seed = factory.generate_seed(&n, rng)?;
        Self::from_parts(&p, &q, seed)
    }

    /// The Blum integer n = p * q
    pub fn modulus(&self) -> &BigUint {
        &self.n
    }

    /// Bits per [`next_word`](Self::next_word)
    pub fn bit_length(&self) -> u64 {
        self.bit_length
    }

    #[cfg(test)]
    fn state(&self) -> &BigUint {
        &self.state
    }

    /// Advance the state once and emit its parity
    pub fn next_bit(&mut self) -> bool {
        self.state = (&self.state * &self.state) % &self.n;
        self.state.is_odd()
    }

    /// `bits` fresh bits; the i-th emitted bit becomes bit i of the result
    pub fn next_biguint(&mut self, bits: u64) -> BigUint {
        let mut value = BigUint::default();
        for i in 0..bits {
            if self.next_bit() {
                value.set_bit(i, true);
            }
        }
        value
    }

    /// One word of `bit_length` bits
    pub fn next_word(&mut self) -> BigUint {
        self.next_biguint(self.bit_length)
    }
}

impl RngCore for BbsGenerator {
    fn next_u32(&mut self) -> u32 {
        self.next_biguint(32)
            .to_u32_digits()
            .first()
            .copied()
            .unwrap_or(0)
    }

    fn next_u64(&mut self) -> u64 {
        self.next_biguint(64)
            .to_u64_digits()
            .first()
            .copied()
            .unwrap_or(0)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for byte in dest.iter_mut() {
            let mut value = 0u8;
            for i in 0..8 {
                if self.next_bit() {
                    value |= 1 << i;
                }
            }
            *byte = value;
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
