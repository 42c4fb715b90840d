use std::env;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use txproc::json::{read_requests, write_results};
use txproc::{Amount, Config, InMemoryIdempotencyStore, InMemoryLedger, Processor};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse().unwrap()))
        .with_writer(std::io::stderr)
        .init();

    let path = env::args()
        .nth(1)
        .expect("usage: txproc <transactions.jsonl>");

    if !path.ends_with(".jsonl") {
        warn!(path, "input file seems to not be a jsonl file");
    }

    let ledger = InMemoryLedger::with_accounts([
        ("acc_001", Amount::from_float(1000.0)),
        ("acc_002", Amount::from_float(500.0)),
        ("acc_003", Amount::from_float(0.0)),
    ]);
    let processor = Arc::new(Processor::new(
        Arc::new(ledger),
        Arc::new(InMemoryIdempotencyStore::new()),
        Config::from_env(),
    ));

    let (req_sender, mut req_receiver) = tokio::sync::mpsc::channel(16);

    tokio::spawn(async move {
        for result in read_requests(&path) {
            match result {
                Ok(request) => {
                    req_sender.send(request).await.unwrap();
                }
                Err(e) => {
                    warn!("{e}");
                }
            }
        }
    });

    // One task per request; duplicates race for their key inside the
    // processor, so submission order carries no meaning here.
    let mut tasks = JoinSet::new();
    while let Some(request) = req_receiver.recv().await {
        let processor = processor.clone();
        tasks.spawn(async move { processor.submit(request).await });
    }

    let mut results = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(result)) => results.push(result),
            Ok(Err(e)) => warn!("{e}"),
            Err(e) => warn!("task failed: {e}"),
        }
    }

    write_results(results);
}
