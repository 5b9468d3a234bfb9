//! Number-theoretic helpers shared by both schemes and the attacks

use std::collections::BTreeSet;

use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_traits::{One, Zero};

use crate::error::{CryptoError, Result};

/// Modular exponentiation: base^exp mod modulus, by square-and-multiply
///
/// # Panics
///
/// Panics if `modulus` is zero.
pub fn mod_pow(base: &BigUint, exp: &BigUint, modulus: &BigUint) -> BigUint {
    assert!(!modulus.is_zero(), "mod_pow: modulus must be at least 1");

    if modulus.is_one() {
        return BigUint::zero();
    }

    let mut result = BigUint::one();
    let mut base = base % modulus;

    for i in 0..exp.bits() {
        if exp.bit(i) {
            result = (&result * &base) % modulus;
        }
        base = (&base * &base) % modulus;
    }

    result
}

/// Extended Euclidean algorithm: returns (g, x, y) with a*x + b*y = g
///
/// `g` is always non-negative; negative inputs are handled by running on
/// the absolute values and flipping the sign of the matching coefficient.
pub fn extended_gcd(a: &BigInt, b: &BigInt) -> (BigInt, BigInt, BigInt) {
    let (mut old_r, mut r) = (a.magnitude().clone(), b.magnitude().clone());
    let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());
    let (mut old_t, mut t) = (BigInt::zero(), BigInt::one());

    while !r.is_zero() {
        let (quotient, remainder) = old_r.div_rem(&r);
        let quotient = BigInt::from(quotient);

        old_r = std::mem::replace(&mut r, remainder);

        let next_s = &old_s - &quotient * &s;
        old_s = std::mem::replace(&mut s, next_s);

        let next_t = &old_t - &quotient * &t;
        old_t = std::mem::replace(&mut t, next_t);
    }

    if a.sign() == Sign::Minus {
        old_s = -old_s;
    }
    if b.sign() == Sign::Minus {
        old_t = -old_t;
    }

    (BigInt::from(old_r), old_s, old_t)
}

/// Compute the modular inverse of `a` modulo `m`, in [0, m)
pub fn mod_inverse(a: &BigUint, m: &BigUint) -> Result<BigUint> {
    if m.is_zero() {
        return Err(CryptoError::InvalidParameter(
            "modulus of an inverse must be positive".to_string(),
        ));
    }

    let m_int = BigInt::from(m.clone());
    let (g, x, _) = extended_gcd(&BigInt::from(a.clone()), &m_int);

    if !g.is_one() {
        return Err(CryptoError::NoModularInverse {
            value: a.clone(),
            modulus: m.clone(),
        });
    }

    // mod_floor keeps the result in [0, m) even for negative x
    x.mod_floor(&m_int)
        .to_biguint()
        .ok_or_else(|| CryptoError::InvalidParameter("negative inverse".to_string()))
}

/// Greatest common divisor by repeated remainder; gcd(0, 0) = 0
pub fn gcd(a: &BigUint, b: &BigUint) -> BigUint {
    let mut a = a.clone();
    let mut b = b.clone();

    while !b.is_zero() {
        let r = &a % &b;
        a = b;
        b = r;
    }

    a
}

/// True when gcd(a, b) = 1
pub fn are_coprime(a: &BigUint, b: &BigUint) -> bool {
    gcd(a, b).is_one()
}

/// Factor out powers of 2 from n: returns (s, d) with n = 2^s * d, d odd
pub fn factor_powers_of_two(n: &BigUint) -> (u64, BigUint) {
    match n.trailing_zeros() {
        Some(s) => (s, n >> s),
        None => (0, BigUint::zero()),
    }
}

/// Distinct prime factors of n by trial division up to sqrt(n)
///
/// Runs in O(sqrt(n)); only call it on moderately sized values such as p - 1
/// for a range-bounded prime p.
pub fn prime_factors_distinct(n: &BigUint) -> BTreeSet<BigUint> {
    let mut factors = BTreeSet::new();
    if n.is_zero() {
        return factors;
    }

    let mut n = n.clone();
    let two = BigUint::from(2u32);

    if n.is_even() {
        factors.insert(two.clone());
        while n.is_even() {
            n >>= 1;
        }
    }

    let mut i = BigUint::from(3u32);
    while &i * &i <= n {
        if (&n % &i).is_zero() {
            while (&n % &i).is_zero() {
                n /= &i;
            }
            factors.insert(i.clone());
        }
        i += &two;
    }

    if n > BigUint::one() {
        factors.insert(n);
    }

    factors
}

/// b is a primitive root mod p iff b^((p-1)/q) != 1 for every prime q | p-1
pub fn is_primitive_root(b: &BigUint, p: &BigUint, factors: &BTreeSet<BigUint>) -> bool {
    if p.is_zero() || (b % p).is_zero() {
        return false;
    }

    let p_minus_1 = p - BigUint::one();
    factors
        .iter()
        .all(|q| !mod_pow(b, &(&p_minus_1 / q), p).is_one())
}

/// Smallest primitive root modulo the prime p, scanning upward from 2
pub fn find_primitive_root(p: &BigUint) -> Result<BigUint> {
    let two = BigUint::from(2u32);
    if p < &two {
        return Err(CryptoError::InvalidParameter(format!(
            "{} is not a prime modulus",
            p
        )));
    }
    if p == &two {
        return Ok(BigUint::one());
    }

    let factors = prime_factors_distinct(&(p - BigUint::one()));

    let mut b = two;
    while &b < p {
        if is_primitive_root(&b, p, &factors) {
            return Ok(b);
        }
        b += 1u32;
    }

    Err(CryptoError::NoPrimitiveRoot(p.clone()))
}

/// ceil(sqrt(n))
pub(crate) fn ceil_sqrt(n: &BigUint) -> BigUint {
    let root = n.sqrt();
    if &(&root * &root) < n {
        root + 1u32
    } else {
        root
    }
}
