//! Prime and seed generation for key material

use log::{trace, warn};
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::One;
use rand::RngCore;

use crate::error::{CryptoError, Result};
use crate::primality::is_probable_prime;
use crate::random::RandomSource;
use crate::types::{PrimeBounds, PrimeConstraint, ToolkitConfig};
use crate::utils::are_coprime;

/// Produces primes and coprime seeds under explicit attempt limits
#[derive(Clone, Debug)]
pub struct KeyFactory {
    rounds: usize,
    max_attempts: u64,
}

impl KeyFactory {
    pub fn new(config: &ToolkitConfig) -> Self {
        KeyFactory {
            rounds: config.primality_test_rounds,
            max_attempts: config.max_prime_attempts,
        }
    }

    /// Number of draws allowed before a search gives up
    pub fn max_attempts(&self) -> u64 {
        self.max_attempts
    }

    /// Uniform s in [2, n-1] with gcd(s, n) = 1
    pub fn generate_seed<R: RngCore>(
        &self,
        n: &BigUint,
        rng: &mut RandomSource<R>,
    ) -> Result<BigUint> {
        let two = BigUint::from(2u32);
        if n <= &two {
            return Err(CryptoError::InvalidRange(format!(
                "no seed exists in [2, {} - 1]",
                n
            )));
        }

        let max = n - BigUint::one();
        for _ in 0..self.max_attempts {
            let seed = rng.uniform_range(&two, &max)?;
            if are_coprime(&seed, n) {
                return Ok(seed);
            }
        }

        warn!("seed search modulo {} exhausted", n);
        Err(CryptoError::PrimeSearchExhausted {
            attempts: self.max_attempts,
        })
    }

    /// Random prime satisfying every requested constraint
    pub fn generate_prime<R: RngCore>(
        &self,
        constraint: &PrimeConstraint,
        rng: &mut RandomSource<R>,
    ) -> Result<BigUint> {
        match &constraint.bounds {
            PrimeBounds::Bits(0) => {
                return Err(CryptoError::InvalidRange(
                    "bit length must be positive".to_string(),
                ))
            }
            PrimeBounds::Range { min, max } if min > max => {
                return Err(CryptoError::InvalidRange(format!(
                    "min {} exceeds max {}",
                    min, max
                )))
            }
            _ => {}
        }

        for attempt in 1..=self.max_attempts {
            let candidate = match self.candidate(constraint, rng)? {
                Some(candidate) => candidate,
                None => continue,
            };

            if is_probable_prime(&candidate, self.rounds, rng) {
                trace!("prime {} found after {} attempts", candidate, attempt);
                return Ok(candidate);
            }
        }

        warn!("prime search for {:?} exhausted", constraint);
        Err(CryptoError::PrimeSearchExhausted {
            attempts: self.max_attempts,
        })
    }

    /// Prime with exactly `bit_length` bits
    pub fn prime_with_bits<R: RngCore>(
        &self,
        bit_length: u64,
        rng: &mut RandomSource<R>,
    ) -> Result<BigUint> {
        self.generate_prime(&PrimeConstraint::bits(bit_length), rng)
    }

    /// Prime in [min, max]
    pub fn prime_in_range<R: RngCore>(
        &self,
        min: &BigUint,
        max: &BigUint,
        rng: &mut RandomSource<R>,
    ) -> Result<BigUint> {
        self.generate_prime(&PrimeConstraint::range(min.clone(), max.clone()), rng)
    }

    /// Prime with exactly `bit_length` bits and p ≡ 3 (mod 4)
    pub fn blum_prime_with_bits<R: RngCore>(
        &self,
        bit_length: u64,
        rng: &mut RandomSource<R>,
    ) -> Result<BigUint> {
        self.generate_prime(&PrimeConstraint::bits(bit_length).blum(), rng)
    }

    /// Prime in [min, max] with p ≡ 3 (mod 4)
    pub fn blum_prime_in_range<R: RngCore>(
        &self,
        min: &BigUint,
        max: &BigUint,
        rng: &mut RandomSource<R>,
    ) -> Result<BigUint> {
        self.generate_prime(
            &PrimeConstraint::range(min.clone(), max.clone()).blum(),
            rng,
        )
    }

    /// Draw one candidate; `None` when the adjusted value left the bounds
    fn candidate<R: RngCore>(
        &self,
        constraint: &PrimeConstraint,
        rng: &mut RandomSource<R>,
    ) -> Result<Option<BigUint>> {
        let mut candidate = match &constraint.bounds {
            PrimeBounds::Bits(bits) => rng.odd_in_bitlength(*bits)?,
            PrimeBounds::Range { min, max } => {
                let mut value = rng.uniform_range(min, max)?;
                // 2 is the only even prime worth keeping
                if value.is_even() && value != BigUint::from(2u32) {
                    value += 1u32;
                }
                value
            }
        };

        if constraint.congruent_3_mod_4 && (&candidate % 4u32) != BigUint::from(3u32) {
            candidate += 2u32;
        }

        let in_bounds = match &constraint.bounds {
            PrimeBounds::Bits(bits) => candidate.bits() == *bits,
            PrimeBounds::Range { min, max } => &candidate >= min && &candidate <= max,
        };
        let congruent = !constraint.congruent_3_mod_4 || (&candidate % 4u32) == BigUint::from(3u32);

        Ok((in_bounds && congruent).then_some(candidate))
    }
}

impl Default for KeyFactory {
    fn default() -> Self {
        KeyFactory::new(&ToolkitConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primality::DEFAULT_ROUNDS;
    use crate::utils::gcd;

    fn big(v: u64) -> BigUint {
        BigUint::from(v)
    }

    #[test]
    fn test_prime_with_bits() {
        let factory = KeyFactory::default();
        let mut rng = RandomSource::seeded(10);
        for bits in [2u64, 3, 8, 16, 64, 128] {
            let p = factory.prime_with_bits(bits, &mut rng).unwrap();
            assert_eq!(p.bits(), bits);
            assert!(is_probable_prime(&p, DEFAULT_ROUNDS, &mut rng));
        }
    }

    #[test]
    fn test_blum_primes_satisfy_constraints() {
        let factory = KeyFactory::default();
        let mut rng = RandomSource::seeded(11);
        for _ in 0..25 {
            let p = factory.blum_prime_with_bits(32, &mut rng).unwrap();
            assert_eq!(&p % 4u32, big(3));
            assert_eq!(p.bits(), 32);
            assert!(is_probable_prime(&p, DEFAULT_ROUNDS, &mut rng));

            let q = factory
                .blum_prime_in_range(&big(1000), &big(2000), &mut rng)
                .unwrap();
            assert_eq!(&q % 4u32, big(3));
            assert!(q >= big(1000) && q <= big(2000));
            assert!(is_probable_prime(&q, DEFAULT_ROUNDS, &mut rng));
        }
    }

    #[test]
    fn test_prime_in_range_respects_bounds() {
        let factory = KeyFactory::default();
        let mut rng = RandomSource::seeded(12);
        for _ in 0..50 {
            let p = factory.prime_in_range(&big(90), &big(100), &mut rng).unwrap();
            assert!(p == big(97), "only prime in [90, 100] is 97, got {}", p);
        }
    }

    #[test]
    fn test_prime_in_tiny_ranges() {
        let factory = KeyFactory::default();
        let mut rng = RandomSource::seeded(13);
        assert_eq!(factory.prime_in_range(&big(2), &big(2), &mut rng).unwrap(), big(2));
        assert_eq!(factory.prime_in_range(&big(3), &big(3), &mut rng).unwrap(), big(3));
        assert_eq!(
            factory.blum_prime_in_range(&big(0), &big(4), &mut rng).unwrap(),
            big(3)
        );
    }

    #[test]
    fn test_prime_free_range_exhausts() {
        let config = ToolkitConfig {
            max_prime_attempts: 200,
            ..ToolkitConfig::default()
        };
        let factory = KeyFactory::new(&config);
        let mut rng = RandomSource::seeded(14);

        let err = factory.prime_in_range(&big(24), &big(28), &mut rng).unwrap_err();
        assert_eq!(err, CryptoError::PrimeSearchExhausted { attempts: 200 });

        // 5 is prime but not 3 mod 4, and 7 is out of range
        let err = factory.blum_prime_in_range(&big(5), &big(6), &mut rng).unwrap_err();
        assert_eq!(err, CryptoError::PrimeSearchExhausted { attempts: 200 });
    }

    #[test]
    fn test_invalid_constraints() {
        let factory = KeyFactory::default();
        let mut rng = RandomSource::seeded(15);
        assert!(matches!(
            factory.prime_in_range(&big(10), &big(5), &mut rng),
            Err(CryptoError::InvalidRange(_))
        ));
        assert!(matches!(
            factory.prime_with_bits(0, &mut rng),
            Err(CryptoError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_generate_seed_is_coprime() {
        let factory = KeyFactory::default();
        let mut rng = RandomSource::seeded(16);
        let n = big(2 * 3 * 5 * 7 * 11 * 13);
        for _ in 0..100 {
            let s = factory.generate_seed(&n, &mut rng).unwrap();
            assert!(s >= big(2) && s < n);
            assert_eq!(gcd(&s, &n), big(1));
        }
        assert!(factory.generate_seed(&big(2), &mut rng).is_err());
    }
}
