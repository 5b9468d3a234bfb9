//! Textbook RSA: encrypt, decrypt, then break a small key with Pollard's Rho
//!
//! Run with `RUST_LOG=debug` to follow the factorization.

use num_bigint::BigUint;
use pkc_toolkit::{RandomSource, RsaKeyPair, RsaPublicKey, RsaScheme, ToolkitConfig};

fn main() {
    env_logger::init();

    println!("=== Textbook RSA Demo ===\n");

    let mut rng = RandomSource::from_entropy();
    let config = ToolkitConfig::default();

    // The classic p = 61, q = 53, e = 17 key
    let keys = RsaKeyPair::from_primes(
        &BigUint::from(61u32),
        &BigUint::from(53u32),
        &BigUint::from(17u32),
    )
    .expect("Failed to build keys");
    println!("Public key:  {}", keys.public_key);
    println!("Private key file:\n{}", keys.private_key.to_key_file());

    let rsa = RsaScheme::from_key_pair(keys);
    let message = BigUint::from(65u32);
    let ciphertext = rsa.encrypt(&message).expect("Encryption failed");
    println!("Encrypt {} -> {}", message, ciphertext);
    println!(
        "Decrypt {} -> {}",
        ciphertext,
        rsa.decrypt(&ciphertext).expect("Decryption failed")
    );

    // A victim with freshly generated keys
    println!("\n--- Attack ---");
    let victim = RsaScheme::generate(
        &BigUint::from(1_000_000u32),
        &BigUint::from(10_000_000u32),
        config.clone(),
        &mut rng,
    )
    .expect("Failed to generate victim keys");
    let target: RsaPublicKey = victim
        .public_key()
        .expect("Victim has a public key")
        .clone();
    println!("Target key file:\n{}", target.to_key_file());

    let secret = BigUint::from(424_242_424u32);
    let intercepted = victim.encrypt(&secret).expect("Encryption failed");
    println!("Intercepted ciphertext: {}", intercepted);

    let attacker = RsaScheme::with_config(None, None, config);
    match attacker.attack(&intercepted, &target, &mut rng) {
        Ok(plaintext) => {
            println!("✓ Recovered plaintext: {}", plaintext);
            assert_eq!(plaintext, secret);
        }
        Err(e) => println!("✗ Attack failed: {}", e),
    }
}
