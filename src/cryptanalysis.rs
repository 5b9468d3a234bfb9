//! Integer factorization and discrete-log recovery
//!
//! Both searches are bounded by [`ToolkitConfig`]: Pollard's Rho gives up with
//! [`CryptoError::FactorizationTimeout`], Baby-Step/Giant-Step with
//! [`CryptoError::DiscreteLogNotFound`].

use std::collections::HashMap;

use log::{debug, trace, warn};
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};
use rand::RngCore;

use crate::bbs::BbsGenerator;
use crate::bootstrap::KeyFactory;
use crate::error::{CryptoError, Result};
use crate::primality::is_probable_prime;
use crate::random::RandomSource;
use crate::types::ToolkitConfig;
use crate::utils::{ceil_sqrt, gcd, mod_inverse, mod_pow};

const RHO_START_X: u32 = 5;
const RHO_START_Y: u32 = 26;

/// f(v) = v^2 + 1 mod n
fn rho_step(v: &BigUint, n: &BigUint) -> BigUint {
    (v * v + 1u32) % n
}

/// Find a non-trivial divisor of the composite `n` with Pollard's Rho
///
/// Floyd cycle detection from the fixed start (5, 26). When the walk closes
/// without a factor (gcd = n) both pointers are reseeded from a Blum-Blum-Shub
/// generator, built lazily from `rng` on the first cycle and reused after.
/// The cofactor is `n / d`.
pub fn pollard_rho<R: RngCore>(
    n: &BigUint,
    config: &ToolkitConfig,
    rng: &mut RandomSource<R>,
) -> Result<BigUint> {
    if n < &BigUint::from(4u32) {
        return Err(CryptoError::InvalidParameter(format!(
            "{} has no non-trivial factorization",
            n
        )));
    }
    if n.is_even() {
        return Ok(BigUint::from(2u32));
    }
    if is_probable_prime(n, config.primality_test_rounds, rng) {
        return Err(CryptoError::InvalidParameter(format!(
            "{} is prime and cannot be factored",
            n
        )));
    }

    let mut x = BigUint::from(RHO_START_X);
    let mut y = BigUint::from(RHO_START_Y);
    let mut reseeds = 0u32;
    let mut iterations = 0u64;
    let mut bbs: Option<BbsGenerator> = None;

    while iterations < config.rho_max_iterations {
        iterations += 1;
        x = rho_step(&x, n);
        y = rho_step(&rho_step(&y, n), n);

        let diff = if x > y { &x - &y } else { &y - &x };
        let d = gcd(&diff, n);

        if d.is_one() {
            continue;
        }
        if &d != n {
            debug!("pollard rho: divisor {} of {} after {} iterations", d, n, iterations);
            return Ok(d);
        }

        if reseeds == config.rho_max_reseeds {
            break;
        }
        reseeds += 1;

        if bbs.is_none() {
            bbs = Some(BbsGenerator::new(
                config.bbs_prime_bits,
                &KeyFactory::new(config),
                rng,
            )?);
        }
        if let Some(generator) = bbs.as_mut() {
            let bits = n.bits();
            x = generator.next_biguint(bits) % n;
            y = generator.next_biguint(bits) % n;
        }
        trace!(
            "pollard rho: cycle at iteration {}, reseed #{} with x = {}, y = {}",
            iterations,
            reseeds,
            x,
            y
        );
    }

    warn!("pollard rho: giving up on {}", n);
    Err(CryptoError::FactorizationTimeout {
        n: n.clone(),
        iterations,
        reseeds,
    })
}

/// Solve a^x ≡ target (mod p) with Baby-Step/Giant-Step over the group of order p - 1
///
/// The returned exponent is reduced modulo p - 1 and always verified.
pub fn baby_step_giant_step(
    a: &BigUint,
    target: &BigUint,
    p: &BigUint,
    config: &ToolkitConfig,
) -> Result<BigUint> {
    if p <= &BigUint::from(2u32) {
        return Err(CryptoError::InvalidParameter(format!(
            "modulus {} is too small for a discrete log",
            p
        )));
    }

    let target = target % p;
    let order = p - BigUint::one();
    let m = ceil_sqrt(&order);

    let table_size = m.to_u64().unwrap_or(u64::MAX);
    if table_size > config.bsgs_max_table_size {
        return Err(CryptoError::DiscreteLogNotFound(format!(
            "group of order {} needs a table of {} entries, limit is {}",
            order, m, config.bsgs_max_table_size
        )));
    }

    // L1: a^(j*m) -> j for j in [0, m]; the first j for a value wins
    let giant = mod_pow(a, &m, p);
    let mut table: HashMap<BigUint, u64> = HashMap::with_capacity(table_size as usize + 1);
    let mut current = BigUint::one();
    for j in 0..=table_size {
        table.entry(current.clone()).or_insert(j);
        current = (&current * &giant) % p;
    }

    let a_inv = mod_inverse(a, p)?;
    let mut gamma = target.clone();

    for i in 0..=table_size {
        if let Some(&j) = table.get(&gamma) {
            let base = &m * j;
            let i_big = BigUint::from(i);

            // The match means target = a^(m*j + i); m*j - i is tried first and
            // both are checked before accepting either.
            let mut candidates = Vec::with_capacity(2);
            if base >= i_big {
                candidates.push(&base - &i_big);
            }
            candidates.push(&base + &i_big);

            for x in candidates {
                if mod_pow(a, &x, p) == target {
                    let x = x % &order;
                    debug!("bsgs: match at i = {}, j = {}, x = {}", i, j, x);
                    return Ok(x);
                }
            }
            trace!("bsgs: table hit at i = {}, j = {} failed verification", i, j);
        }

        gamma = (&gamma * &a_inv) % p;
    }

    Err(CryptoError::DiscreteLogNotFound(format!(
        "{} is not a power of {} modulo {}",
        target, a, p
    )))
}

/// Recover the private exponent d from (n, e) by factoring n
pub(crate) fn recover_rsa_exponent<R: RngCore>(
    n: &BigUint,
    e: &BigUint,
    config: &ToolkitConfig,
    rng: &mut RandomSource<R>,
) -> Result<BigUint> {
    let p = pollard_rho(n, config, rng)?;
    let q = n / &p;
    debug!("rsa attack: n = {} = {} * {}", n, p, q);

    let phi = (&p - 1u32) * (&q - 1u32);
    if phi.is_zero() {
        return Err(CryptoError::InvalidParameter(format!(
            "phi({}) is zero",
            n
        )));
    }
    debug!("rsa attack: phi(n) = {}", phi);

    let d = mod_inverse(e, &phi)?;
    debug!("rsa attack: recovered d = {}", d);
    Ok(d)
}
