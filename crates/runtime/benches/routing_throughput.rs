//! Throughput benchmarks for the hot paths of the quality engine.
//!
//!   1. Classifying a score (pure, no allocation).
//!   2. `submit` end to end: classify, cache, queue, trend, metrics.
//!   3. Paging the review queue with 10,000 pending items.
//!   4. Sweeping 10,000 expired cache entries.

use chrono::{Duration as ChronoDuration, Utc};
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

use docqc_runtime::cache::ConfidenceCache;
use docqc_runtime::review::{ReviewItem, ReviewQueue};
use docqc_runtime::routing::ScoreClassifier;
use docqc_runtime::types::{ConfidenceBand, DocumentId, Metadata, ReviewPriority, ScoredDocument};
use docqc_runtime::{QualityEngine, SubmitRequest};

fn score_for(i: u32) -> f64 {
    (i % 101) as f64 / 100.0
}

fn bench_classify(c: &mut Criterion) {
    let classifier = ScoreClassifier::default();

    c.bench_function("classify: single score", |b| {
        b.iter(|| classifier.classify(std::hint::black_box(0.72), false).unwrap());
    });

    c.bench_function("classify: 10k mixed scores", |b| {
        b.iter(|| {
            for i in 0..10_000u32 {
                classifier.classify(score_for(i), i % 7 == 0).unwrap();
            }
        });
    });
}

fn bench_submit(c: &mut Criterion) {
    c.bench_function("submit: 10k documents", |b| {
        b.iter_batched(
            QualityEngine::default,
            |engine| {
                for i in 0..10_000u32 {
                    let request = SubmitRequest::new(format!("doc-{}", i), score_for(i))
                        .safety_critical(i % 11 == 0);
                    engine.submit(request).unwrap();
                }
                engine
            },
            BatchSize::LargeInput,
        );
    });
}

fn bench_review_queue(c: &mut Criterion) {
    let queue = ReviewQueue::default();
    let now = Utc::now();
    let priorities = [
        ReviewPriority::Urgent,
        ReviewPriority::High,
        ReviewPriority::Medium,
    ];
    for i in 0..10_000usize {
        queue.enqueue(ReviewItem::new(
            DocumentId::new(format!("doc-{}", i)),
            0.5,
            ConfidenceBand::Low,
            priorities[i % 3],
            "bench",
            now + ChronoDuration::milliseconds(i as i64),
        ));
    }

    c.bench_function("review_queue: first 50 of 10k", |b| {
        b.iter(|| queue.dequeue_batch(50));
    });

    c.bench_function("review_queue: 50 MEDIUM of 10k", |b| {
        b.iter(|| queue.dequeue_batch_filtered(50, Some(ReviewPriority::Medium)));
    });
}

fn bench_cache_sweep(c: &mut Criterion) {
    let start = Utc::now();

    c.bench_function("cache: sweep 10k expired", |b| {
        b.iter_batched(
            || {
                let cache = ConfidenceCache::new();
                for i in 0..10_000u32 {
                    let doc = ScoredDocument::new(
                        DocumentId::new(format!("doc-{}", i)),
                        0.9,
                        false,
                        "",
                        Metadata::new(),
                        start,
                    )
                    .unwrap();
                    cache.put_at(doc, 60, start);
                }
                cache
            },
            |cache| cache.sweep_at(start + ChronoDuration::seconds(61)),
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(
    benches,
    bench_classify,
    bench_submit,
    bench_review_queue,
    bench_cache_sweep
);
criterion_main!(benches);
