//! RSA key generation, encryption, decryption and the factoring attack

use log::debug;
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::RngCore;

use crate::bootstrap::KeyFactory;
use crate::cryptanalysis::recover_rsa_exponent;
use crate::error::{CryptoError, Result};
use crate::keys::{RsaKeyPair, RsaPrivateKey, RsaPublicKey};
use crate::primality::{is_probable_prime, DEFAULT_ROUNDS};
use crate::random::RandomSource;
use crate::types::ToolkitConfig;
use crate::utils::{are_coprime, mod_inverse, mod_pow};

/// Conventional first choice for e
pub const DEFAULT_PUBLIC_EXPONENT: u32 = 65537;

impl RsaKeyPair {
    /// Derive a key pair from known primes and a starting exponent
    ///
    /// `e` is raised by 2 until it is coprime to φ(n) = (p-1)(q-1). Composite
    /// p or q are rejected, since φ(n) would be wrong for them.
    pub fn from_primes(p: &BigUint, q: &BigUint, e: &BigUint) -> Result<Self> {
        if p == q {
            return Err(CryptoError::InvalidParameter(
                "RSA primes must be distinct".to_string(),
            ));
        }
        if p <= &BigUint::one() || q <= &BigUint::one() {
            return Err(CryptoError::InvalidParameter(
                "RSA primes must be greater than 1".to_string(),
            ));
        }

        let mut rng = RandomSource::from_entropy();
        for factor in [p, q] {
            if !is_probable_prime(factor, DEFAULT_ROUNDS, &mut rng) {
                return Err(CryptoError::InvalidParameter(format!(
                    "RSA factor {} is not prime",
                    factor
                )));
            }
        }

        let n = p * q;
        let phi = (p - 1u32) * (q - 1u32);

        // Stepping by 2 from an even e would never leave the even numbers
        if e.is_zero() || (e.is_even() && phi.is_even()) {
            return Err(CryptoError::InvalidParameter(format!(
                "public exponent {} can never be coprime to phi(n) = {}",
                e, phi
            )));
        }

        let mut e = e.clone();
        while !are_coprime(&e, &phi) {
            e += 2u32;
        }

        let d = mod_inverse(&e, &phi)?;
        if !((&e * &d) % &phi).is_one() {
            return Err(CryptoError::KeyGenerationInvariantViolation);
        }

        Ok(RsaKeyPair {
            public_key: RsaPublicKey { n: n.clone(), e },
            private_key: RsaPrivateKey { n, d },
        })
    }
}

impl RsaKeyPair {
    /// Generate a key pair from primes in [min_prime, max_prime]
    pub fn generate<R: RngCore>(
        min_prime: &BigUint,
        max_prime: &BigUint,
        config: &ToolkitConfig,
        rng: &mut RandomSource<R>,
    ) -> Result<Self> {
        let scheme = RsaScheme::generate(min_prime, max_prime, config.clone(), rng)?;
        match (scheme.public_key, scheme.private_key) {
            (Some(public_key), Some(private_key)) => Ok(RsaKeyPair {
                public_key,
                private_key,
            }),
            _ => Err(CryptoError::MissingKey("RSA")),
        }
    }
}

/// RSA over owned key material
///
/// Either half of the key may be absent: a scheme built from a public key
/// can encrypt and attack, one built from a private key can decrypt.
#[derive(Clone, Debug)]
pub struct RsaScheme {
    public_key: Option<RsaPublicKey>,
    private_key: Option<RsaPrivateKey>,
    config: ToolkitConfig,
}

impl RsaScheme {
    /// Generate fresh keys from primes in [min_prime, max_prime]
    pub fn generate<R: RngCore>(
        min_prime: &BigUint,
        max_prime: &BigUint,
        config: ToolkitConfig,
        rng: &mut RandomSource<R>,
    ) -> Result<Self> {
        let mut scheme = RsaScheme::with_config(None, None, config);
        scheme.generate_keys(min_prime, max_prime, rng)?;
        Ok(scheme)
    }

    pub fn from_key_pair(key_pair: RsaKeyPair) -> Self {
        RsaScheme::with_config(
            Some(key_pair.public_key),
            Some(key_pair.private_key),
            ToolkitConfig::default(),
        )
    }

    /// Encrypt-only scheme from (n, e)
    pub fn from_public(public_key: RsaPublicKey) -> Self {
        RsaScheme::with_config(Some(public_key), None, ToolkitConfig::default())
    }

    /// Decrypt-only scheme from (n, d)
    pub fn from_private(private_key: RsaPrivateKey) -> Self {
        RsaScheme::with_config(None, Some(private_key), ToolkitConfig::default())
    }

    pub fn with_config(
        public_key: Option<RsaPublicKey>,
        private_key: Option<RsaPrivateKey>,
        config: ToolkitConfig,
    ) -> Self {
        RsaScheme {
            public_key,
            private_key,
            config,
        }
    }

    pub fn public_key(&self) -> Option<&RsaPublicKey> {
        self.public_key.as_ref()
    }

    pub fn private_key(&self) -> Option<&RsaPrivateKey> {
        self.private_key.as_ref()
    }

    pub fn config(&self) -> &ToolkitConfig {
        &self.config
    }

    /// Replace the key material with a freshly generated pair
    ///
    /// p and q are drawn from [min_prime, max_prime] with q resampled until
    /// q != p. The primes are dropped once n, e and d are derived.
    pub fn generate_keys<R: RngCore>(
        &mut self,
        min_prime: &BigUint,
        max_prime: &BigUint,
        rng: &mut RandomSource<R>,
    ) -> Result<()> {
        let factory = KeyFactory::new(&self.config);

        let p = factory.prime_in_range(min_prime, max_prime, rng)?;
        debug!("rsa keygen: p = {}", p);

        let mut q = factory.prime_in_range(min_prime, max_prime, rng)?;
        let mut attempts = 1;
        while q == p {
            if attempts >= factory.max_attempts() {
                return Err(CryptoError::PrimeSearchExhausted { attempts });
            }
            q = factory.prime_in_range(min_prime, max_prime, rng)?;
            attempts += 1;
        }
        debug!("rsa keygen: q = {}", q);

        let key_pair = RsaKeyPair::from_primes(&p, &q, &BigUint::from(DEFAULT_PUBLIC_EXPONENT))?;
        debug!(
            "rsa keygen: n = {}, e = {}",
            key_pair.public_key.n, key_pair.public_key.e
        );

        self.public_key = Some(key_pair.public_key);
        self.private_key = Some(key_pair.private_key);
        Ok(())
    }

    /// c = m^e mod n, for 0 < m < n
    pub fn encrypt(&self, plaintext: &BigUint) -> Result<BigUint> {
        let key = self.public_key.as_ref().ok_or(CryptoError::MissingKey("RSA public"))?;

        if plaintext.is_zero() || plaintext >= &key.n {
            return Err(CryptoError::PlaintextOutOfRange {
                modulus: key.n.clone(),
            });
        }

        Ok(mod_pow(plaintext, &key.e, &key.n))
    }

    /// m = c^d mod n
    pub fn decrypt(&self, ciphertext: &BigUint) -> Result<BigUint> {
        let key = self
            .private_key
            .as_ref()
            .ok_or(CryptoError::MissingKey("RSA private"))?;
        decrypt_with(key, ciphertext)
    }

    /// Factor the target modulus and rebuild its private key
    pub fn recover_private_key<R: RngCore>(
        &self,
        target: &RsaPublicKey,
        rng: &mut RandomSource<R>,
    ) -> Result<RsaPrivateKey> {
        let d = recover_rsa_exponent(&target.n, &target.e, &self.config, rng)?;
        Ok(RsaPrivateKey {
            n: target.n.clone(),
            d,
        })
    }

    /// Decrypt a ciphertext addressed to `target` without its private key
    pub fn attack<R: RngCore>(
        &self,
        ciphertext: &BigUint,
        target: &RsaPublicKey,
        rng: &mut RandomSource<R>,
    ) -> Result<BigUint> {
        let recovered = self.recover_private_key(target, rng)?;
        let plaintext = decrypt_with(&recovered, ciphertext)?;
        debug!("rsa attack: plaintext = {}", plaintext);
        Ok(plaintext)
    }
}

fn decrypt_with(key: &RsaPrivateKey, ciphertext: &BigUint) -> Result<BigUint> {
    if ciphertext >= &key.n {
        return Err(CryptoError::CiphertextOutOfRange {
            modulus: key.n.clone(),
        });
    }
    Ok(mod_pow(ciphertext, &key.d, &key.n))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(v: u64) -> BigUint {
        BigUint::from(v)
    }

    fn textbook() -> RsaScheme {
        RsaScheme::from_key_pair(RsaKeyPair::from_primes(&big(61), &big(53), &big(17)).unwrap())
    }

    #[test]
    fn test_textbook_keys() {
        let pair = RsaKeyPair::from_primes(&big(61), &big(53), &big(17)).unwrap();
        assert_eq!(pair.public_key.modulus(), &big(3233));
        assert_eq!(pair.public_key.exponent(), &big(17));
        assert_eq!(pair.private_key.exponent(), &big(2753));
    }

    #[test]
    fn test_textbook_encrypt_decrypt() {
        let rsa = textbook();
        assert_eq!(rsa.encrypt(&big(65)).unwrap(), big(2790));
        assert_eq!(rsa.decrypt(&big(2790)).unwrap(), big(65));
    }

    #[test]
    fn test_exponent_bumped_until_coprime() {
        // phi = 3120 = 2^4 * 3 * 5 * 13, so 15 -> 17
        let pair = RsaKeyPair::from_primes(&big(61), &big(53), &big(15)).unwrap();
        assert_eq!(pair.public_key.exponent(), &big(17));
    }

    #[test]
    fn test_even_exponent_rejected() {
        assert!(matches!(
            RsaKeyPair::from_primes(&big(61), &big(53), &big(16)),
            Err(CryptoError::InvalidParameter(_))
        ));
        assert!(RsaKeyPair::from_primes(&big(61), &big(61), &big(17)).is_err());
    }

    #[test]
    fn test_composite_factors_rejected() {
        // 55 = 5 * 11 and the Carmichael number 561 = 3 * 11 * 17
        for (p, q) in [(61u64, 55u64), (561, 53), (91, 97)] {
            assert!(matches!(
                RsaKeyPair::from_primes(&big(p), &big(q), &big(17)),
                Err(CryptoError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn test_generated_keys_satisfy_invariant() {
        let mut rng = RandomSource::seeded(30);
        for _ in 0..10 {
            let rsa =
                RsaScheme::generate(&big(1000), &big(10000), ToolkitConfig::default(), &mut rng)
                    .unwrap();
            let public = rsa.public_key().unwrap();
            let private = rsa.private_key().unwrap();

            let d = recover_rsa_exponent(&public.n, &public.e, rsa.config(), &mut rng).unwrap();
            assert_eq!(&d, private.exponent());

            for m in [1u64, 2, 42, 999] {
                let c = rsa.encrypt(&big(m)).unwrap();
                assert_eq!(rsa.decrypt(&c).unwrap(), big(m));
            }
        }
    }

    #[test]
    fn test_plaintext_range_checked() {
        let rsa = textbook();
        assert!(matches!(
            rsa.encrypt(&big(0)),
            Err(CryptoError::PlaintextOutOfRange { .. })
        ));
        assert!(matches!(
            rsa.encrypt(&big(3233)),
            Err(CryptoError::PlaintextOutOfRange { .. })
        ));
        assert!(matches!(
            rsa.decrypt(&big(4000)),
            Err(CryptoError::CiphertextOutOfRange { .. })
        ));
    }

    #[test]
    fn test_missing_key_halves() {
        let public_only = RsaScheme::from_public(RsaPublicKey::new(big(3233), big(17)).unwrap());
        assert_eq!(public_only.encrypt(&big(65)).unwrap(), big(2790));
        assert_eq!(
            public_only.decrypt(&big(2790)),
            Err(CryptoError::MissingKey("RSA private"))
        );

        let private_only =
            RsaScheme::from_private(RsaPrivateKey::new(big(3233), big(2753)).unwrap());
        assert_eq!(private_only.decrypt(&big(2790)).unwrap(), big(65));
        assert!(private_only.encrypt(&big(65)).is_err());
    }

    #[test]
    fn test_single_prime_range_exhausts() {
        let config = ToolkitConfig {
            max_prime_attempts: 50,
            ..ToolkitConfig::default()
        };
        let mut rng = RandomSource::seeded(31);
        let err = RsaScheme::generate(&big(90), &big(100), config, &mut rng).unwrap_err();
        assert!(matches!(err, CryptoError::PrimeSearchExhausted { .. }));
    }

    #[test]
    fn test_attack_textbook() {
        let attacker = RsaScheme::with_config(None, None, ToolkitConfig::default());
        let target = RsaPublicKey::new(big(3233), big(17)).unwrap();
        let mut rng = RandomSource::seeded(32);

        assert_eq!(attacker.attack(&big(2790), &target, &mut rng).unwrap(), big(65));
        assert_eq!(
            attacker.recover_private_key(&target, &mut rng).unwrap().exponent(),
            &big(2753)
        );
    }

    #[test]
    fn test_attack_exponent_without_inverse() {
        // e = 4 shares a factor with phi(3233) = 3120
        let attacker = RsaScheme::with_config(None, None, ToolkitConfig::default());
        let target = RsaPublicKey::new(big(3233), big(4)).unwrap();
        let mut rng = RandomSource::seeded(33);
        assert!(matches!(
            attacker.attack(&big(2790), &target, &mut rng),
            Err(CryptoError::NoModularInverse { .. })
        ));
    }
}
