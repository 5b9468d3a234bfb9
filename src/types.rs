//! Core types and data structures

use num_bigint::BigUint;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Where a prime candidate is drawn from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PrimeBounds {
    /// Exactly this many bits, top bit set
    Bits(u64),
    /// Inclusive numeric range
    Range { min: BigUint, max: BigUint },
}

/// Constraints a generated prime must satisfy
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrimeConstraint {
    pub bounds: PrimeBounds,
    pub congruent_3_mod_4: bool,
}

impl PrimeConstraint {
    pub fn bits(bit_length: u64) -> Self {
        PrimeConstraint {
            bounds: PrimeBounds::Bits(bit_length),
            congruent_3_mod_4: false,
        }
    }

    pub fn range(min: BigUint, max: BigUint) -> Self {
        PrimeConstraint {
            bounds: PrimeBounds::Range { min, max },
            congruent_3_mod_4: false,
        }
    }

    /// Additionally require p ≡ 3 (mod 4)
    pub fn blum(mut self) -> Self {
        self.congruent_3_mod_4 = true;
        self
    }
}

/// ElGamal ciphertext (c1, c2)
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ElGamalCiphertext {
    pub(crate) c1: BigUint,
    pub(crate) c2: BigUint,
}

impl ElGamalCiphertext {
    /// Create a new ciphertext
    pub fn new(c1: BigUint, c2: BigUint) -> Self {
        ElGamalCiphertext { c1, c2 }
    }

    /// Get the first component (g^k mod p)
    pub fn c1(&self) -> &BigUint {
        &self.c1
    }

    /// Get the second component (m * y^k mod p)
    pub fn c2(&self) -> &BigUint {
        &self.c2
    }

    /// Two decimal lines: `c1`, `c2`
    pub fn to_text(&self) -> String {
        format!("{}\n{}\n", self.c1, self.c2)
    }

    pub fn from_text(text: &str) -> Result<Self> {
        let [c1, c2] = crate::keys::parse_fields(text, "ElGamal ciphertext")?;
        Ok(ElGamalCiphertext { c1, c2 })
    }
}

impl fmt::Display for ElGamalCiphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.c1, self.c2)
    }
}

/// Tunables shared by key generation and the attacks
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ToolkitConfig {
    /// Number of Miller-Rabin rounds for primality testing
    pub primality_test_rounds: usize,
    /// Cap on every rejection-sampling loop (prime search, seeds, q != p)
    pub max_prime_attempts: u64,
    /// Total Pollard's Rho steps across all walks
    pub rho_max_iterations: u64,
    /// Blum-Blum-Shub reseeds allowed after the walk cycles
    pub rho_max_reseeds: u32,
    /// Bit length of each prime in the reseeding BBS modulus
    pub bbs_prime_bits: u64,
    /// Largest giant-step table Baby-Step/Giant-Step will build
    pub bsgs_max_table_size: u64,
}

impl Default for ToolkitConfig {
    fn default() -> Self {
        ToolkitConfig {
            primality_test_rounds: 20,
            max_prime_attempts: 100_000,
            rho_max_iterations: 5_000_000,
            rho_max_reseeds: 32,
            bbs_prime_bits: 64,
            bsgs_max_table_size: 1 << 22,
        }
    }
}
