//! Key material as plain value objects, plus the line-oriented key-file codec
//!
//! File layouts, one decimal integer per line:
//!
//! | file             | lines                 |
//! |------------------|-----------------------|
//! | RSA public       | `n`, `e`              |
//! | RSA private      | `d`                   |
//! | ElGamal public   | `p`, `g`, `public_key`|
//! | ElGamal private  | `private_key`         |
//!
//! Private files carry no modulus, so parsing one takes the modulus from the
//! matching public half. Reading and writing the files themselves is left to
//! the caller.

use num_bigint::BigUint;
use num_traits::{One, Zero};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{CryptoError, Result};
use crate::utils::mod_pow;

/// Parse exactly `N` non-empty decimal lines
pub(crate) fn parse_fields<const N: usize>(text: &str, what: &str) -> Result<[BigUint; N]> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if lines.len() != N {
        return Err(CryptoError::MalformedKeyData(format!(
            "{} needs {} line(s), found {}",
            what,
            N,
            lines.len()
        )));
    }

    let values = lines
        .into_iter()
        .map(|line| {
            line.parse::<BigUint>().map_err(|_| {
                CryptoError::MalformedKeyData(format!("{}: '{}' is not a number", what, line))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    values
        .try_into()
        .map_err(|_| CryptoError::MalformedKeyData(format!("{}: wrong field count", what)))
}

fn check_modulus(modulus: &BigUint, name: &str) -> Result<()> {
    if modulus <= &BigUint::one() {
        return Err(CryptoError::InvalidParameter(format!(
            "{} must be greater than 1",
            name
        )));
    }
    Ok(())
}

/// RSA public key (n, e)
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RsaPublicKey {
    pub(crate) n: BigUint,
    pub(crate) e: BigUint,
}

impl RsaPublicKey {
    pub fn new(n: BigUint, e: BigUint) -> Result<Self> {
        let key = RsaPublicKey { n, e };
        key.validate()?;
        Ok(key)
    }

    /// Get the modulus
    pub fn modulus(&self) -> &BigUint {
        &self.n
    }

    /// Get the public exponent
    pub fn exponent(&self) -> &BigUint {
        &self.e
    }

    pub fn validate(&self) -> Result<()> {
        check_modulus(&self.n, "RSA modulus n")?;
        if self.e.is_zero() {
            return Err(CryptoError::InvalidParameter(
                "RSA public exponent must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn to_key_file(&self) -> String {
        format!("{}\n{}\n", self.n, self.e)
    }

    pub fn from_key_file(text: &str) -> Result<Self> {
        let [n, e] = parse_fields(text, "RSA public key")?;
        RsaPublicKey::new(n, e)
    }
}

impl fmt::Display for RsaPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RsaPublicKey({} bits, e = {})", self.n.bits(), self.e)
    }
}

/// RSA private key (n, d)
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RsaPrivateKey {
    pub(crate) n: BigUint,
    pub(crate) d: BigUint,
}

impl RsaPrivateKey {
    pub fn new(n: BigUint, d: BigUint) -> Result<Self> {
        check_modulus(&n, "RSA modulus n")?;
        Ok(RsaPrivateKey { n, d })
    }

    pub fn modulus(&self) -> &BigUint {
        &self.n
    }

    /// Get the private exponent
    pub fn exponent(&self) -> &BigUint {
        &self.d
    }

    pub fn to_key_file(&self) -> String {
        format!("{}\n", self.d)
    }

    /// Parse the one-line private file against the public modulus
    pub fn from_key_file(text: &str, n: &BigUint) -> Result<Self> {
        let [d] = parse_fields(text, "RSA private key")?;
        RsaPrivateKey::new(n.clone(), d)
    }
}

impl fmt::Display for RsaPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RsaPrivateKey(***)")
    }
}

/// RSA key pair
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RsaKeyPair {
    pub public_key: RsaPublicKey,
    pub private_key: RsaPrivateKey,
}

impl RsaKeyPair {
    pub fn from_key_files(public: &str, private: &str) -> Result<Self> {
        let public_key = RsaPublicKey::from_key_file(public)?;
        let private_key = RsaPrivateKey::from_key_file(private, &public_key.n)?;
        Ok(RsaKeyPair {
            public_key,
            private_key,
        })
    }
}

/// ElGamal public key (p, g, y = g^x mod p)
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ElGamalPublicKey {
    pub(crate) p: BigUint,
    pub(crate) g: BigUint,
    pub(crate) y: BigUint,
}

impl ElGamalPublicKey {
    pub fn new(p: BigUint, g: BigUint, y: BigUint) -> Result<Self> {
        let key = ElGamalPublicKey { p, g, y };
        key.validate()?;
        Ok(key)
    }

    /// Get the prime modulus
    pub fn modulus(&self) -> &BigUint {
        &self.p
    }

    /// Get the generator
    pub fn generator(&self) -> &BigUint {
        &self.g
    }

    /// Get the public component (g^x mod p)
    pub fn public_component(&self) -> &BigUint {
        &self.y
    }

    /// Validate the public key
    pub fn validate(&self) -> Result<()> {
        check_modulus(&self.p, "ElGamal modulus p")?;

        if self.g.is_zero() || self.g >= self.p {
            return Err(CryptoError::InvalidParameter(
                "Generator g must be in range [1, p)".to_string(),
            ));
        }

        if self.y.is_zero() || self.y >= self.p {
            return Err(CryptoError::InvalidParameter(
                "Public component must be in range [1, p)".to_string(),
            ));
        }

        Ok(())
    }

    pub fn to_key_file(&self) -> String {
        format!("{}\n{}\n{}\n", self.p, self.g, self.y)
    }

    pub fn from_key_file(text: &str) -> Result<Self> {
        let [p, g, y] = parse_fields(text, "ElGamal public key")?;
        ElGamalPublicKey::new(p, g, y)
    }
}

impl fmt::Display for ElGamalPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElGamalPublicKey({} bits)", self.p.bits())
    }
}

/// ElGamal private key (p, x)
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ElGamalPrivateKey {
    pub(crate) p: BigUint,
    pub(crate) x: BigUint,
}

impl ElGamalPrivateKey {
    pub fn new(p: BigUint, x: BigUint) -> Result<Self> {
        check_modulus(&p, "ElGamal modulus p")?;
        Ok(ElGamalPrivateKey { p, x })
    }

    pub fn modulus(&self) -> &BigUint {
        &self.p
    }

    /// Get the secret exponent
    pub fn secret_exponent(&self) -> &BigUint {
        &self.x
    }

    pub fn to_key_file(&self) -> String {
        format!("{}\n", self.x)
    }

    pub fn from_key_file(text: &str, p: &BigUint) -> Result<Self> {
        let [x] = parse_fields(text, "ElGamal private key")?;
        ElGamalPrivateKey::new(p.clone(), x)
    }
}

impl fmt::Display for ElGamalPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElGamalPrivateKey(***)")
    }
}

/// ElGamal key pair
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ElGamalKeyPair {
    pub public_key: ElGamalPublicKey,
    pub private_key: ElGamalPrivateKey,
}

impl ElGamalKeyPair {
    /// Create a key pair from existing components, deriving y = g^x mod p
    pub fn from_components(p: BigUint, g: BigUint, x: BigUint) -> Result<Self> {
        check_modulus(&p, "ElGamal modulus p")?;
        let y = mod_pow(&g, &x, &p);
        let public_key = ElGamalPublicKey::new(p.clone(), g, y)?;
        let private_key = ElGamalPrivateKey::new(p, x)?;

        Ok(ElGamalKeyPair {
            public_key,
            private_key,
        })
    }

    pub fn from_key_files(public: &str, private: &str) -> Result<Self> {
        let public_key = ElGamalPublicKey::from_key_file(public)?;
        let private_key = ElGamalPrivateKey::from_key_file(private, &public_key.p)?;
        Ok(ElGamalKeyPair {
            public_key,
            private_key,
        })
    }

    /// True when y = g^x mod p
    pub fn is_consistent(&self) -> bool {
        let pk = &self.public_key;
        mod_pow(&pk.g, &self.private_key.x, &pk.p) == pk.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(v: u64) -> BigUint {
        BigUint::from(v)
    }

    #[test]
    fn test_rsa_key_files() {
        let public = RsaPublicKey::new(big(3233), big(17)).unwrap();
        assert_eq!(public.to_key_file(), "3233\n17\n");

        let private = RsaPrivateKey::new(big(3233), big(2753)).unwrap();
        assert_eq!(private.to_key_file(), "2753\n");

        let pair = RsaKeyPair::from_key_files(" 3233\r\n17\n\n", "2753\n").unwrap();
        assert_eq!(pair.public_key, public);
        assert_eq!(pair.private_key, private);
    }

    #[test]
    fn test_elgamal_key_files() {
        let pair = ElGamalKeyPair::from_components(big(8971), big(2), big(1234)).unwrap();
        assert_eq!(pair.public_key.public_component(), &big(1685));
        assert!(pair.is_consistent());

        let text = pair.public_key.to_key_file();
        assert_eq!(text, "8971\n2\n1685\n");

        let parsed =
            ElGamalKeyPair::from_key_files(&text, &pair.private_key.to_key_file()).unwrap();
        assert_eq!(parsed, pair);
    }

    #[test]
    fn test_wrong_field_count() {
        for text in ["", "3233", "3233\n17\n5"] {
            assert!(matches!(
                RsaPublicKey::from_key_file(text),
                Err(CryptoError::MalformedKeyData(_))
            ));
        }
        assert!(matches!(
            ElGamalPublicKey::from_key_file("8971\n2"),
            Err(CryptoError::MalformedKeyData(_))
        ));
        assert!(matches!(
            RsaPrivateKey::from_key_file("1\n2\n", &big(3233)),
            Err(CryptoError::MalformedKeyData(_))
        ));
    }

    #[test]
    fn test_non_numeric_fields() {
        assert!(matches!(
            RsaPublicKey::from_key_file("3233\nseventeen\n"),
            Err(CryptoError::MalformedKeyData(_))
        ));
        assert!(matches!(
            ElGamalPrivateKey::from_key_file("-5\n", &big(8971)),
            Err(CryptoError::MalformedKeyData(_))
        ));
    }

    #[test]
    fn test_key_validation() {
        assert!(RsaPublicKey::new(big(1), big(3)).is_err());
        assert!(RsaPublicKey::new(big(3233), big(0)).is_err());
        assert!(ElGamalPublicKey::new(big(11), big(11), big(3)).is_err());
        assert!(ElGamalPublicKey::new(big(11), big(2), big(0)).is_err());
        assert!(ElGamalPublicKey::new(big(11), big(2), big(3)).is_ok());
    }

    #[test]
    fn test_components_with_degenerate_modulus() {
        for p in [0u64, 1] {
            assert!(matches!(
                ElGamalKeyPair::from_components(big(p), big(2), big(5)),
                Err(CryptoError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn test_private_keys_hidden_in_display() {
        let private = RsaPrivateKey::new(big(3233), big(2753)).unwrap();
        assert!(!private.to_string().contains("2753"));
    }
}
