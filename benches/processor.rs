use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use tokio::runtime::Runtime;
use tokio::task::JoinSet;
use txproc::{
    Amount, Config, InMemoryIdempotencyStore, InMemoryLedger, Processor, TransactionRequest,
};

fn new_processor() -> Arc<Processor> {
    let ledger = InMemoryLedger::with_accounts([
        ("acc_001", Amount::ZERO),
        ("acc_002", Amount::ZERO),
        ("acc_003", Amount::ZERO),
        ("acc_004", Amount::ZERO),
    ]);
    Arc::new(Processor::new(
        Arc::new(ledger),
        Arc::new(InMemoryIdempotencyStore::new()),
        Config::default(),
    ))
}

/// Credits with distinct keys, spread over four accounts.
fn distinct_requests(count: u32) -> Vec<TransactionRequest> {
    (0..count)
        .map(|i| {
            let account = format!("acc_{:03}", (i % 4) + 1);
            TransactionRequest::credit(format!("key-{i}"), account, Amount::from_float(10.0))
        })
        .collect()
}

fn bench_distinct_keys(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("distinct_keys");

    for count in [100u32, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.to_async(&rt).iter(|| async move {
                let processor = new_processor();
                let mut tasks = JoinSet::new();
                for request in distinct_requests(count) {
                    let processor = processor.clone();
                    tasks.spawn(async move { processor.submit(request).await });
                }
                while let Some(joined) = tasks.join_next().await {
                    joined.unwrap().unwrap();
                }
            });
        });
    }

    group.finish();
}

fn bench_replay_fast_path(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("replays");

    // One real application followed by settled-record replays.
    group.bench_function("1k_replays_of_one_key", |b| {
        b.to_async(&rt).iter(|| async {
            let processor = new_processor();
            for _ in 0..1_000 {
                let request =
                    TransactionRequest::credit("hot-key", "acc_001", Amount::from_float(10.0));
                processor.submit(request).await.unwrap();
            }
        });
    });

    group.finish();
}

fn bench_contended_account(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("contended_account");

    // Distinct keys all hitting one account's lock.
    group.bench_function("1k_credits_one_account", |b| {
        b.to_async(&rt).iter(|| async {
            let processor = new_processor();
            let mut tasks = JoinSet::new();
            for i in 0..1_000 {
                let processor = processor.clone();
                tasks.spawn(async move {
                    let request = TransactionRequest::credit(
                        format!("key-{i}"),
                        "acc_001",
                        Amount::from_float(10.0),
                    );
                    processor.submit(request).await
                });
            }
            while let Some(joined) = tasks.join_next().await {
                joined.unwrap().unwrap();
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_distinct_keys,
    bench_replay_fast_path,
    bench_contended_account
);
criterion_main!(benches);
