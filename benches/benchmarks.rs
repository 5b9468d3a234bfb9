//! Performance benchmarks for key generation and the attacks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use num_bigint::BigUint;
use pkc_toolkit::{
    baby_step_giant_step, is_probable_prime, pollard_rho, ElGamalScheme, KeyFactory, RandomSource,
    RsaScheme, ToolkitConfig,
};

fn benchmark_primality(c: &mut Criterion) {
    let mut group = c.benchmark_group("miller_rabin");
    let mut rng = RandomSource::seeded(1);

    // 2^127 - 1 and a Carmichael number
    let mersenne = (BigUint::from(1u32) << 127u32) - 1u32;
    let carmichael = BigUint::from(561u32);

    group.bench_function("m127", |b| {
        b.iter(|| is_probable_prime(black_box(&mersenne), 20, &mut rng));
    });
    group.bench_function("carmichael_561", |b| {
        b.iter(|| is_probable_prime(black_box(&carmichael), 20, &mut rng));
    });

    group.finish();
}

fn benchmark_prime_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("prime_generation");
    let factory = KeyFactory::default();
    let mut rng = RandomSource::seeded(2);

    for bits in [64u64, 128, 256].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(bits), bits, |b, &bits| {
            b.iter(|| factory.prime_with_bits(bits, &mut rng).expect("Prime search failed"));
        });
    }

    group.finish();
}

fn benchmark_key_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("key_generation");
    let config = ToolkitConfig::default();
    let mut rng = RandomSource::seeded(3);

    let (min, max) = (BigUint::from(100_000u32), BigUint::from(1_000_000u32));

    group.bench_function("rsa", |b| {
        b.iter(|| {
            RsaScheme::generate(&min, &max, config.clone(), &mut rng).expect("Keygen failed")
        });
    });
    group.bench_function("elgamal", |b| {
        b.iter(|| {
            ElGamalScheme::generate(&min, &max, config.clone(), &mut rng).expect("Keygen failed")
        });
    });

    group.finish();
}

fn benchmark_pollard_rho(c: &mut Criterion) {
    let mut group = c.benchmark_group("pollard_rho");
    let config = ToolkitConfig::default();
    let mut rng = RandomSource::seeded(4);

    for (p, q) in [(7919u64, 7927u64), (65_537, 65_539), (1_000_003, 1_000_033)].iter() {
        let n = BigUint::from(p * q);
        group.bench_with_input(BenchmarkId::from_parameter(&n), &n, |b, n| {
            b.iter(|| pollard_rho(black_box(n), &config, &mut rng).expect("Factoring failed"));
        });
    }

    group.finish();
}

fn benchmark_bsgs(c: &mut Criterion) {
    let mut group = c.benchmark_group("baby_step_giant_step");
    let config = ToolkitConfig::default();

    // (prime, primitive root, exponent)
    for (p, g, x) in [(8971u64, 2u64, 1234u64), (7919, 7, 4321)].iter() {
        let p = BigUint::from(*p);
        let g = BigUint::from(*g);
        let y = g.modpow(&BigUint::from(*x), &p);

        group.bench_with_input(BenchmarkId::from_parameter(&p), &p, |b, p| {
            b.iter(|| baby_step_giant_step(&g, black_box(&y), p, &config).expect("No log found"));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_primality,
    benchmark_prime_generation,
    benchmark_key_generation,
    benchmark_pollard_rho,
    benchmark_bsgs
);
criterion_main!(benches);
