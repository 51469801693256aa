//! Latency benchmarks for the classification paths
//!
//! The heuristic path and policy retrieval are synchronous and run on every
//! analysis; the lexicon backend shows the ML adapter's own overhead.
//!
//! Run with: cargo bench -p modguard-classifiers

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use modguard_classifiers::{HeuristicClassifier, LexiconBackend, MlAdapter, StaticLoader};
use modguard_policy::{PolicyRetriever, TopicDetector};
use std::sync::Arc;
use tokio::runtime::Runtime;

const TEST_CASES: [(&str, &str); 5] = [
    ("short_clean", "Hello, how are you today?"),
    ("short_profane", "Damn, that was close"),
    ("short_threat", "I will destroy you"),
    (
        "medium_clean",
        "Just finished reading an amazing book about the history of technology and the people who built it.",
    ),
    (
        "medium_hostile",
        "You are a worthless idiot and everyone hates you, get out of this thread before I attack your stupid argument again.",
    ),
];

fn benchmark_heuristic_classifier(c: &mut Criterion) {
    let classifier = HeuristicClassifier::new().expect("Failed to create heuristic classifier");

    let mut group = c.benchmark_group("Heuristic_Classifier");
    group.sample_size(100);

    for (name, text) in TEST_CASES {
        group.bench_with_input(BenchmarkId::new("classify", name), &text, |b, text| {
            b.iter(|| classifier.classify(black_box(text)));
        });
    }

    group.finish();
}

fn benchmark_retrieval(c: &mut Criterion) {
    let retriever = PolicyRetriever::builtin().expect("Failed to build retriever");
    let topics = TopicDetector::default();

    let mut group = c.benchmark_group("Retrieval");
    group.sample_size(100);

    for (name, text) in TEST_CASES {
        group.bench_with_input(BenchmarkId::new("retrieve_top", name), &text, |b, text| {
            b.iter(|| retriever.retrieve_top(black_box(text)));
        });
        group.bench_with_input(BenchmarkId::new("detect_topics", name), &text, |b, text| {
            b.iter(|| topics.detect(black_box(text)));
        });
    }

    group.finish();
}

fn benchmark_ml_adapter(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let backend = Arc::new(LexiconBackend::new().expect("Failed to create lexicon backend"));
    let adapter = MlAdapter::new(Arc::new(StaticLoader::new(backend)));
    rt.block_on(adapter.ensure_loaded()).unwrap();

    let mut group = c.benchmark_group("ML_Adapter_Lexicon");
    group.sample_size(100);

    for (name, text) in TEST_CASES {
        group.bench_with_input(BenchmarkId::new("classify", name), &text, |b, text| {
            b.iter(|| rt.block_on(async { adapter.classify(black_box(text)).await.unwrap() }));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_heuristic_classifier,
    benchmark_retrieval,
    benchmark_ml_adapter
);
criterion_main!(benches);
