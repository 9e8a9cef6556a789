//! Benchmarks for slot aggregation and grammar export

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use home_intent::engine::{aggregate_slots, export_sentences, EnablementPolicy, IntentRegistry};
use home_intent::intents::{Intents, Sentence};

/// Registry with `components` declarations of 8 sentences each
fn create_registry(components: usize) -> IntentRegistry {
    let mut registry = IntentRegistry::new();
    for c in 0..components {
        let mut intents = Intents::component(&format!("bench{c}")).slot(format!("item{c}"), || {
            (0..32).map(|i| format!("value {i}")).collect()
        });
        for s in 0..8 {
            intents = intents.sentence(
                Sentence::new(format!("sentence{s}"), |_| None)
                    .phrase(format!("do thing {s} with ($item{c})"))
                    .phrase(format!("please [do] thing {s}")),
            );
        }
        registry.register(intents).unwrap();
    }
    registry
}

/// Benchmark export for varying registry sizes
fn bench_export(c: &mut Criterion) {
    let mut group = c.benchmark_group("export_sentences");
    let policy = EnablementPolicy {
        enable_all: true,
        enable_beta: false,
    };

    for &size in &[1, 8, 32, 128] {
        let registry = create_registry(size);
        let slots = aggregate_slots(registry.components()).unwrap();
        group.throughput(Throughput::Elements((size * 8) as u64));

        group.bench_function(format!("{}_components", size), |b| {
            b.iter(|| {
                let grammar = export_sentences(registry.components(), &slots, &policy);
                black_box(grammar.render())
            })
        });
    }

    group.finish();
}

/// Benchmark slot aggregation, which re-runs every provider
fn bench_aggregate(c: &mut Criterion) {
    let registry = create_registry(32);

    c.bench_function("aggregate_slots_32", |b| {
        b.iter(|| black_box(aggregate_slots(registry.components()).unwrap()))
    });
}

criterion_group!(benches, bench_export, bench_aggregate);
criterion_main!(benches);
