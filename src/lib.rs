//! # RSA and ElGamal with Cryptanalysis
//!
//! This library provides textbook RSA and ElGamal over arbitrary-precision
//! integers, together with the attacks that break them at small key sizes:
//! - Pollard's Rho factorization against RSA moduli
//! - Baby-Step/Giant-Step discrete logarithms against ElGamal public keys
//!
//! ## Features
//!
//! - **Number theory**: modular exponentiation, extended Euclid, inverses,
//!   prime factors of p - 1, primitive roots
//! - **Primes**: Miller-Rabin testing and constrained prime generation
//!   (bit length or numeric range, optionally ≡ 3 mod 4)
//! - **Randomness**: an explicit [`RandomSource`] threaded through every
//!   randomized operation, plus a Blum-Blum-Shub generator
//! - **Bounded searches**: every retry loop stops with a typed error, tuned
//!   through [`ToolkitConfig`]
//!
//! ## Example
//!
//! ```rust
//! use num_bigint::BigUint;
//! use pkc_toolkit::{RandomSource, RsaPublicKey, RsaScheme, ToolkitConfig};
//!
//! let mut rng = RandomSource::seeded(7);
//!
//! // Encrypt to a textbook public key...
//! let target = RsaPublicKey::new(3233u32.into(), 17u32.into()).unwrap();
//! let ciphertext = RsaScheme::from_public(target.clone())
//!     .encrypt(&65u32.into())
//!     .unwrap();
//! assert_eq!(ciphertext, BigUint::from(2790u32));
//!
//! // ...and read it back by factoring n
//! let attacker = RsaScheme::with_config(None, None, ToolkitConfig::default());
//! let plaintext = attacker.attack(&ciphertext, &target, &mut rng).unwrap();
//! assert_eq!(plaintext, BigUint::from(65u32));
//! ```

pub mod bbs;
pub mod bootstrap;
pub mod cryptanalysis;
pub mod elgamal;
pub mod error;
pub mod keys;
pub mod primality;
pub mod random;
pub mod rsa;
pub mod types;
pub mod utils;

// Re-export main types for convenience
pub use bbs::BbsGenerator;
pub use bootstrap::KeyFactory;
pub use cryptanalysis::{baby_step_giant_step, pollard_rho};
pub use elgamal::ElGamalScheme;
pub use error::{CryptoError, Result};
pub use keys::{
    ElGamalKeyPair, ElGamalPrivateKey, ElGamalPublicKey, RsaKeyPair, RsaPrivateKey, RsaPublicKey,
};
pub use primality::is_probable_prime;
pub use random::RandomSource;
pub use rsa::RsaScheme;
pub use types::{ElGamalCiphertext, PrimeBounds, PrimeConstraint, ToolkitConfig};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
