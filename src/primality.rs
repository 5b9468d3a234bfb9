//! Miller-Rabin probabilistic primality test

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::One;
use rand::RngCore;

use crate::random::RandomSource;
use crate::utils::{factor_powers_of_two, mod_pow};

/// Rounds used wherever a prime is generated; false positives <= 4^-20
pub const DEFAULT_ROUNDS: usize = 20;

/// Miller-Rabin primality test
///
/// Returns `false` as soon as a witness proves `n` composite. A `true`
/// answer is wrong with probability at most 4^(-rounds).
pub fn is_probable_prime<R: RngCore>(
    n: &BigUint,
    rounds: usize,
    rng: &mut RandomSource<R>,
) -> bool {
    let two = BigUint::from(2u32);
    let three = BigUint::from(3u32);

    if n <= &BigUint::one() {
        return false;
    }
    if n == &two || n == &three {
        return true;
    }
    if n.is_even() {
        return false;
    }

    let n_minus_1 = n - BigUint::one();
    let (r, m) = factor_powers_of_two(&n_minus_1);
    // Bases are drawn from [2, n-2]
    let base_span = n - &three;

    'witness: for _ in 0..rounds {
        let b = &two + rng.below(&base_span);
        let mut x = mod_pow(&b, &m, n);

        if x.is_one() || x == n_minus_1 {
            continue;
        }

        for _ in 1..r {
            x = mod_pow(&x, &two, n);
            if x == n_minus_1 {
                continue 'witness;
            }
        }

        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(n: u64) -> bool {
        let mut rng = RandomSource::seeded(n);
        is_probable_prime(&BigUint::from(n), DEFAULT_ROUNDS, &mut rng)
    }

    #[test]
    fn test_small_primes() {
        for p in [2u64, 3, 5, 7, 11, 13, 17, 61, 53, 101, 103, 7919, 8971, 65537] {
            assert!(check(p), "{} should be prime", p);
        }
    }

    #[test]
    fn test_small_composites() {
        for c in [0u64, 1, 4, 6, 8, 9, 10, 12, 15, 25, 49, 3233, 10403] {
            assert!(!check(c), "{} should be composite", c);
        }
    }

    #[test]
    fn test_carmichael_numbers() {
        for c in [561u64, 1105, 1729, 2465, 2821, 6601, 8911, 41041] {
            assert!(!check(c), "Carmichael number {} passed", c);
        }
    }

    #[test]
    fn test_powers_of_two() {
        for k in 2..70u32 {
            let n = BigUint::one() << k;
            let mut rng = RandomSource::seeded(k as u64);
            assert!(!is_probable_prime(&n, DEFAULT_ROUNDS, &mut rng));
        }
    }

    #[test]
    fn test_large_known_prime() {
        // 2^127 - 1 is a Mersenne prime
        let m127 = (BigUint::one() << 127u32) - BigUint::one();
        let mut rng = RandomSource::seeded(127);
        assert!(is_probable_prime(&m127, DEFAULT_ROUNDS, &mut rng));

        // 2^128 + 1 is divisible by 59649589127497217
        let composite = (BigUint::one() << 128u32) + BigUint::one();
        assert!(!is_probable_prime(&composite, DEFAULT_ROUNDS, &mut rng));
    }
}
