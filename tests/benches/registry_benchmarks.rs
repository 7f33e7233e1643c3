//! # Quantum Name Service Benchmarks
//!
//! | Operation | Expected cost | Target |
//! |-----------|---------------|--------|
//! | `price` | O(name length) | < 1µs |
//! | `register` | O(log n) map insert | < 10µs |
//! | `owned_domains` | O(k log k) for k owned names | < 100µs at k = 1000 |
//! | `token_uri` | SVG render + base64 | < 50µs |
//! | `decode_document` | base64 + JSON + markup scan | < 100µs |

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use qc_18_name_registry::prelude::*;
use std::time::Duration;

const CONTROLLER: Address = Address::new([0xC0; 20]);
const OWNER: Address = Address::new([0x01; 20]);
const NOW: Timestamp = 1_700_000_000;

fn populated(count: usize) -> RegistryEngine {
    let mut engine = RegistryEngine::new(RegistryConfig::with_controller(CONTROLLER)).unwrap();
    for i in 0..count {
        let name = format!("n{i}");
        let price = engine.price(&name).unwrap();
        engine.register(OWNER, &name, "bench", price, NOW).unwrap();
    }
    engine.drain_events();
    engine
}

// ============================================================================
// Pricing
// ============================================================================

fn bench_pricing(c: &mut Criterion) {
    let mut group = c.benchmark_group("qns-pricing");
    let engine = populated(0);

    for name in ["abc", "test1", "longername"] {
        group.bench_with_input(BenchmarkId::new("price", name), name, |b, name| {
            b.iter(|| black_box(engine.price(black_box(name))))
        });
    }

    group.finish();
}

// ============================================================================
// Registration
// ============================================================================

fn bench_registration(c: &mut Criterion) {
    let mut group = c.benchmark_group("qns-registration");
    group.measurement_time(Duration::from_secs(5));

    for size in [0usize, 1_000, 10_000] {
        let base = populated(size);
        let price = base.price("fresh").unwrap();
        group.bench_with_input(BenchmarkId::new("register", size), &base, |b, base| {
            b.iter_batched(
                || base.clone(),
                |mut engine| black_box(engine.register(OWNER, "fresh", "", price, NOW)),
                BatchSize::LargeInput,
            )
        });
    }

    let base = populated(1_000);
    group.bench_function("owned_domains_1000", |b| {
        b.iter(|| black_box(base.owned_domains(&OWNER, NOW)))
    });

    group.finish();
}

// ============================================================================
// Metadata
// ============================================================================

fn bench_metadata(c: &mut Criterion) {
    let mut group = c.benchmark_group("qns-metadata");
    let mut engine = populated(0);
    let price = engine.price("test").unwrap();
    let receipt = engine
        .register(
            OWNER,
            "test",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            price,
            NOW,
        )
        .unwrap();

    group.bench_function("token_uri", |b| {
        b.iter(|| black_box(engine.token_uri(receipt.id)))
    });

    let uri = engine.token_uri(receipt.id).unwrap();
    group.bench_function("decode_document", |b| {
        b.iter(|| black_box(decode_document(black_box(&uri))))
    });

    group.finish();
}

criterion_group!(benches, bench_pricing, bench_registration, bench_metadata);

criterion_main!(benches);
