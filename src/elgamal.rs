//! ElGamal key generation, encryption, decryption and the discrete-log attack

use log::debug;
use num_bigint::BigUint;
use num_traits::Zero;
use rand::RngCore;

use crate::bootstrap::KeyFactory;
use crate::cryptanalysis::baby_step_giant_step;
use crate::error::{CryptoError, Result};
use crate::keys::{ElGamalKeyPair, ElGamalPrivateKey, ElGamalPublicKey};
use crate::random::RandomSource;
use crate::types::{ElGamalCiphertext, ToolkitConfig};
use crate::utils::{find_primitive_root, mod_inverse, mod_pow};

/// Smallest prime with a non-empty exponent range [2, p-2]
const MIN_MODULUS: u32 = 5;

/// ElGamal encryption system over owned key material
#[derive(Clone, Debug)]
pub struct ElGamalScheme {
    public_key: Option<ElGamalPublicKey>,
    private_key: Option<ElGamalPrivateKey>,
    config: ToolkitConfig,
}

impl ElGamalScheme {
    /// Generate fresh keys with p drawn from [min, max]
    pub fn generate<R: RngCore>(
        min: &BigUint,
        max: &BigUint,
        config: ToolkitConfig,
        rng: &mut RandomSource<R>,
    ) -> Result<Self> {
        let mut scheme = ElGamalScheme::with_config(None, None, config);
        scheme.generate_keys(min, max, rng)?;
        Ok(scheme)
    }

    pub fn from_key_pair(key_pair: ElGamalKeyPair) -> Self {
        ElGamalScheme::with_config(
            Some(key_pair.public_key),
            Some(key_pair.private_key),
            ToolkitConfig::default(),
        )
    }

    /// Encrypt-only scheme from (p, g, public_key)
    pub fn from_public(public_key: ElGamalPublicKey) -> Self {
        ElGamalScheme::with_config(Some(public_key), None, ToolkitConfig::default())
    }

    /// Decrypt-only scheme from (p, private_key)
    pub fn from_private(private_key: ElGamalPrivateKey) -> Self {
        ElGamalScheme::with_config(None, Some(private_key), ToolkitConfig::default())
    }

    pub fn with_config(
        public_key: Option<ElGamalPublicKey>,
        private_key: Option<ElGamalPrivateKey>,
        config: ToolkitConfig,
    ) -> Self {
        ElGamalScheme {
            public_key,
            private_key,
            config,
        }
    }

    pub fn public_key(&self) -> Option<&ElGamalPublicKey> {
        self.public_key.as_ref()
    }

    pub fn private_key(&self) -> Option<&ElGamalPrivateKey> {
        self.private_key.as_ref()
    }

    /// Get the configuration
    pub fn config(&self) -> &ToolkitConfig {
        &self.config
    }

    /// Replace the key material with a freshly generated pair
    ///
    /// Primes below 5 are redrawn since they leave no room for a private
    /// exponent in [2, p-2].
    pub fn generate_keys<R: RngCore>(
        &mut self,
        min: &BigUint,
        max: &BigUint,
        rng: &mut RandomSource<R>,
    ) -> Result<()> {
        let factory = KeyFactory::new(&self.config);
        let min_modulus = BigUint::from(MIN_MODULUS);

        if max < &min_modulus {
            return Err(CryptoError::InvalidRange(format!(
                "ElGamal needs a prime of at least {}, max is {}",
                MIN_MODULUS, max
            )));
        }

        let mut p = factory.prime_in_range(min, max, rng)?;
        let mut attempts = 1;
        while p < min_modulus {
            if attempts >= factory.max_attempts() {
                return Err(CryptoError::PrimeSearchExhausted { attempts });
            }
            p = factory.prime_in_range(min, max, rng)?;
            attempts += 1;
        }

        let g = find_primitive_root(&p)?;
        let x = rng.uniform_range(&BigUint::from(2u32), &(&p - 2u32))?;
        debug!("elgamal keygen: p = {}, g = {}", p, g);

        let key_pair = ElGamalKeyPair::from_components(p, g, x)?;
        self.public_key = Some(key_pair.public_key);
        self.private_key = Some(key_pair.private_key);
        Ok(())
    }

    /// Encrypt a plaintext with a fresh ephemeral k in [2, p-2]
    pub fn encrypt<R: RngCore>(
        &self,
        plaintext: &BigUint,
        rng: &mut RandomSource<R>,
    ) -> Result<ElGamalCiphertext> {
        let key = self.require_public()?;
        Self::check_plaintext(plaintext, &key.p)?;

        let k = rng.uniform_range(&BigUint::from(2u32), &(&key.p - 2u32))?;
        self.encrypt_with_randomness(plaintext, &k)
    }

    /// Encrypt with a specific ephemeral exponent (for testing)
    pub fn encrypt_with_randomness(
        &self,
        plaintext: &BigUint,
        k: &BigUint,
    ) -> Result<ElGamalCiphertext> {
        let key = self.require_public()?;
        Self::check_plaintext(plaintext, &key.p)?;

        let c1 = mod_pow(&key.g, k, &key.p);
        let y_k = mod_pow(&key.y, k, &key.p);
        let c2 = (plaintext * y_k) % &key.p;

        Ok(ElGamalCiphertext::new(c1, c2))
    }

    /// Decrypt a ciphertext using the private key
    pub fn decrypt(&self, ciphertext: &ElGamalCiphertext) -> Result<BigUint> {
        let key = self
            .private_key
            .as_ref()
            .ok_or(CryptoError::MissingKey("ElGamal private"))?;
        decrypt_with(&key.p, &key.x, ciphertext)
    }

    /// Solve g^x = public_key (mod p) and rebuild the target's private key
    pub fn recover_private_key(&self, target: &ElGamalPublicKey) -> Result<ElGamalPrivateKey> {
        let x = baby_step_giant_step(&target.g, &target.y, &target.p, &self.config)?;
        debug!("elgamal attack: recovered x = {}", x);
        Ok(ElGamalPrivateKey {
            p: target.p.clone(),
            x,
        })
    }

    /// Decrypt a ciphertext addressed to `target` without its private key
    pub fn attack(
        &self,
        target: &ElGamalPublicKey,
        ciphertext: &ElGamalCiphertext,
    ) -> Result<BigUint> {
        let recovered = self.recover_private_key(target)?;
        let plaintext = decrypt_with(&recovered.p, &recovered.x, ciphertext)?;
        debug!("elgamal attack: plaintext = {}", plaintext);
        Ok(plaintext)
    }

    fn require_public(&self) -> Result<&ElGamalPublicKey> {
        self.public_key
            .as_ref()
            .ok_or(CryptoError::MissingKey("ElGamal public"))
    }

    fn check_plaintext(plaintext: &BigUint, p: &BigUint) -> Result<()> {
        if plaintext.is_zero() || plaintext >= p {
            return Err(CryptoError::PlaintextOutOfRange { modulus: p.clone() });
        }
        Ok(())
    }
}

/// m = c2 * (c1^x)^-1 mod p
fn decrypt_with(p: &BigUint, x: &BigUint, ciphertext: &ElGamalCiphertext) -> Result<BigUint> {
    if ciphertext.c1 >= *p || ciphertext.c2 >= *p {
        return Err(CryptoError::CiphertextOutOfRange { modulus: p.clone() });
    }

    let s = mod_pow(&ciphertext.c1, x, p);
    let s_inv = mod_inverse(&s, p)?;
    Ok((&ciphertext.c2 * s_inv) % p)
}

impl ElGamalKeyPair {
    /// Generate a key pair with p drawn from [min, max]
    pub fn generate<R: RngCore>(
        min: &BigUint,
        max: &BigUint,
        config: &ToolkitConfig,
        rng: &mut RandomSource<R>,
    ) -> Result<Self> {
        let scheme = ElGamalScheme::generate(min, max, config.clone(), rng)?;
        match (scheme.public_key, scheme.private_key) {
            (Some(public_key), Some(private_key)) => Ok(ElGamalKeyPair {
                public_key,
                private_key,
            }),
            _ => Err(CryptoError::MissingKey("ElGamal")),
        }
    }
}
