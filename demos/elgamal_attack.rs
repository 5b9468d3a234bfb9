//! ElGamal key generation, encryption and a Baby-Step/Giant-Step break

use num_bigint::BigUint;
use pkc_toolkit::{ElGamalCiphertext, ElGamalScheme, RandomSource, ToolkitConfig};

fn main() {
    env_logger::init();

    println!("=== ElGamal Attack Demo ===\n");

    let mut rng = RandomSource::from_entropy();
    let config = ToolkitConfig::default();

    println!("Generating keys with p in [100000, 1000000]...");
    let victim = ElGamalScheme::generate(
        &BigUint::from(100_000u32),
        &BigUint::from(1_000_000u32),
        config.clone(),
        &mut rng,
    )
    .expect("Failed to generate keys");
    let target = victim.public_key().expect("Victim has a public key").clone();
    println!("✓ Public key: {}", target);

    let secret = BigUint::from(31_337u32);
    let ciphertext = victim.encrypt(&secret, &mut rng).expect("Encryption failed");
    println!("Ciphertext file:\n{}", ciphertext.to_text());

    // Ciphertext read back as an eavesdropper would see it
    let intercepted = ElGamalCiphertext::from_text(&ciphertext.to_text()).expect("Bad ciphertext");

    let attacker = ElGamalScheme::with_config(None, None, config);
    match attacker.recover_private_key(&target) {
        Ok(key) => println!("✓ Recovered x = {}", key.secret_exponent()),
        Err(e) => println!("✗ Discrete log failed: {}", e),
    }
    match attacker.attack(&target, &intercepted) {
        Ok(plaintext) => {
            println!("✓ Recovered plaintext: {}", plaintext);
            assert_eq!(plaintext, secret);
        }
        Err(e) => println!("✗ Attack failed: {}", e),
    }
}
