//! Cortex Benchmark Suite
//!
//! Per-operation latency targets:
//!   memory_add_single ................ < 10μs
//!   recall_from_500_long_term ........ < 500μs
//!   decision_three_options ........... < 1ms
//!   full_turn_free_form .............. < 2ms

use std::hint::black_box;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;

use cortex_core::config::EngineConfig;
use cortex_core::memory::MemoryStore;
use cortex_core::session::{CognitiveSession, TurnSignals};

const TOPICS: [&str; 5] = ["fire safety", "river crossing", "night sky", "garden soil", "mountain pass"];

/// A store with `n` promoted items spread over five topics.
fn populated_store(n: usize) -> MemoryStore {
    let mut store = MemoryStore::default();
    for i in 0..n {
        store.add_memory(
            format!("remember the critical note {i} about {}", TOPICS[i % TOPICS.len()]),
            None,
        );
    }
    store.consolidate();
    store
}

fn bench_memory_add(c: &mut Criterion) {
    let mut store = MemoryStore::default();
    c.bench_function("memory_add_single", |b| {
        b.iter(|| {
            black_box(store.add_memory(black_box("an important detail about the garden"), None));
        });
    });
}

fn bench_recall(c: &mut Criterion) {
    let store = populated_store(500);
    c.bench_function("recall_from_500_long_term", |b| {
        b.iter(|| black_box(store.recall(black_box("critical fire safety"), None)));
    });
}

fn bench_decision(c: &mut Criterion) {
    let mut session = CognitiveSession::new(EngineConfig::default());
    *session.memory_mut() = populated_store(200);
    let options = ["cross the river", "take the safe mountain pass", "wait for daylight"];
    c.bench_function("decision_three_options", |b| {
        b.iter(|| black_box(session.make_decision(black_box("how to reach the village"), &options)));
    });
}

fn bench_full_turn(c: &mut Criterion) {
    let store = populated_store(200);
    let mut rng = StdRng::seed_from_u64(0);
    let signals = TurnSignals {
        latency_secs: Some(0.5),
        user_feedback: Some(0.8),
        emotional_alignment: Some(0.9),
        ..TurnSignals::default()
    };
    c.bench_function("full_turn_free_form", |b| {
        b.iter_batched_ref(
            || {
                let mut session = CognitiveSession::new(EngineConfig::default());
                *session.memory_mut() = store.clone();
                session
            },
            |session| {
                black_box(session.handle_turn(
                    black_box("if the river floods then the garden soil gets wet?"),
                    &signals,
                    &mut rng,
                ))
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_memory_add,
    bench_recall,
    bench_decision,
    bench_full_turn,
);
criterion_main!(benches);
