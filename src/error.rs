//! Error types for the toolkit

use num_bigint::BigUint;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CryptoError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("No modular inverse of {value} modulo {modulus}")]
    NoModularInverse { value: BigUint, modulus: BigUint },

    #[error("Key generation invariant violated: e*d mod phi(n) != 1")]
    KeyGenerationInvariantViolation,

    #[error("Plaintext must lie in [1, {modulus})")]
    PlaintextOutOfRange { modulus: BigUint },

    #[error("Ciphertext component must lie in [0, {modulus})")]
    CiphertextOutOfRange { modulus: BigUint },

    #[error("Malformed key data: {0}")]
    MalformedKeyData(String),

    #[error("Factorization of {n} gave up after {iterations} iterations and {reseeds} reseeds")]
    FactorizationTimeout {
        n: BigUint,
        iterations: u64,
        reseeds: u32,
    },

    #[error("Discrete log not found: {0}")]
    DiscreteLogNotFound(String),

    #[error("Prime search exhausted after {attempts} attempts")]
    PrimeSearchExhausted { attempts: u64 },

    #[error("No primitive root found modulo {0}")]
    NoPrimitiveRoot(BigUint),

    #[error("Missing {0} key")]
    MissingKey(&'static str),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}
