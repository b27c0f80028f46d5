//! # Firehose Benchmarks
//!
//! | Stage | Measured |
//! |-------|----------|
//! | fh-02 decode | JSON record to `RawEvent` |
//! | fh-02 engine | events through tumbling, hopping and leaderboards |
//! | fh-03 store | leaderboard batch into the in-memory backend |

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use fh_02_aggregation::{decode, AggregationConfig, WindowEngine};
use fh_03_time_store::{InMemoryKVStore, TimeIndexedStore};
use fh_tests::fixtures::FeedLine;
use shared_types::{LeaderboardEntry, LeaderboardKind, RawEvent};

fn feed_lines(n: i64) -> Vec<String> {
    (0..n)
        .map(|i| {
            FeedLine::new(i, i / 4)
                .author(&format!("user{}", i % 97), i % 5_000)
                .mention(&format!("m{}", i % 31))
                .hashtag(&format!("h{}", i % 17))
                .render()
        })
        .collect()
}

fn bench_decode(c: &mut Criterion) {
    let lines = feed_lines(1_000);
    let mut group = c.benchmark_group("fh-02-decode");
    group.throughput(Throughput::Elements(lines.len() as u64));
    group.bench_function("decode_1000", |b| {
        b.iter(|| {
            for line in &lines {
                black_box(decode(line));
            }
        })
    });
    group.finish();
}

fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("fh-02-engine");
    for size in [1_000i64, 10_000] {
        let events: Vec<RawEvent> = feed_lines(size).iter().filter_map(|l| decode(l)).collect();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("push", size), &events, |b, events| {
            b.iter(|| {
                let mut engine = WindowEngine::new(AggregationConfig::default())
                    .expect("default config is valid");
                let mut closed = 0usize;
                for event in events.iter().cloned() {
                    closed += engine.push(event).tumbling_counts.len();
                }
                closed += engine.flush().tumbling_counts.len();
                black_box(closed)
            })
        });
    }
    group.finish();
}

fn bench_store(c: &mut Criterion) {
    let store = TimeIndexedStore::new(Arc::new(InMemoryKVStore::new()));
    let board: Vec<LeaderboardEntry> = (0..10)
        .map(|i| LeaderboardEntry {
            window_time: 1,
            kind: LeaderboardKind::Mentions,
            key: format!("user{i}"),
            score: 100 - i,
            item_count: 1,
            samples: vec![],
            text: None,
        })
        .collect();

    let mut group = c.benchmark_group("fh-03-store");
    let mut window_time = 0i64;
    group.bench_function("put_leaderboard_10", |b| {
        b.iter(|| {
            window_time += 1;
            let board: Vec<_> = board
                .iter()
                .cloned()
                .map(|mut e| {
                    e.window_time = window_time;
                    e
                })
                .collect();
            store
                .put_leaderboard(LeaderboardKind::Mentions, &board)
                .expect("in-memory write");
        })
    });
    group.finish();
}

criterion_group!(benches, bench_decode, bench_engine, bench_store);
criterion_main!(benches);
