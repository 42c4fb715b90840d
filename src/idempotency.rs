//! Idempotency-key deduplication.
//!
//! Each key goes through `absent → in-progress → settled` exactly once.
//! `begin` is an atomic insert-if-absent: one caller per key wins a
//! [`CompletionTicket`] and performs the work; every other caller gets a
//! [`ReplayHandle`] and waits for the settled outcome instead of
//! re-executing. Records are kept for the life of the process.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{Mutex, watch};
use tokio::time::timeout;

use crate::model::{IdempotencyKey, TransactionResult};

/// Internal store failure; indicates a broken invariant, not a user error.
#[derive(Debug, Error)]
pub enum IdempotencyError {
    #[error("no in-progress record for key {0}")]
    RecordMissing(IdempotencyKey),
}

/// Failure while waiting for a duplicate in-flight key to settle.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("duplicate request still in flight after {0:?}")]
    Timeout(Duration),

    #[error("in-flight request was abandoned before settling")]
    Abandoned,
}

/// Proof of winning the `begin` race for a key.
///
/// Moving the ticket into [`IdempotencyStore::complete`] is the only way to
/// settle the record, so only the winner can do so, exactly once. Tickets
/// must only ever be issued by a store's `begin`.
#[derive(Debug)]
pub struct CompletionTicket {
    key: IdempotencyKey,
}

impl CompletionTicket {
    pub fn new(key: impl Into<IdempotencyKey>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

/// A subscription to another caller's outcome for the same key.
#[derive(Debug)]
pub struct ReplayHandle {
    rx: watch::Receiver<Option<TransactionResult>>,
}

impl ReplayHandle {
    /// Suspend until the record settles and return the stored result.
    ///
    /// Returns immediately if the record is already settled. Waiters park on
    /// the record's channel; there is no polling. On timeout the underlying
    /// work is never re-executed.
    pub async fn settled(mut self, wait: Duration) -> Result<TransactionResult, ReplayError> {
        match timeout(wait, self.rx.wait_for(|r| r.is_some())).await {
            Ok(Ok(settled)) => (*settled).clone().ok_or(ReplayError::Abandoned),
            Ok(Err(_)) => Err(ReplayError::Abandoned),
            Err(_) => Err(ReplayError::Timeout(wait)),
        }
    }
}

/// Outcome of the `begin` race for a key.
#[derive(Debug)]
pub enum BeginOutcome {
    /// First sight of the key; the caller must perform the work and settle
    /// the record with the ticket.
    Fresh(CompletionTicket),
    /// The key is already known (in-flight or settled); the caller replays
    /// the stored outcome.
    Replay(ReplayHandle),
}

impl BeginOutcome {
    pub fn is_fresh(&self) -> bool {
        matches!(self, BeginOutcome::Fresh(_))
    }
}

/// The mapping from idempotency key to in-flight/settled outcome.
///
/// A durable backend can implement this contract without changes to the
/// processor.
#[async_trait]
pub trait IdempotencyStore: Send + Sync {
    /// Atomically insert an in-progress record if `key` is absent.
    ///
    /// Two concurrent calls with the same key never both observe `Fresh`.
    async fn begin(&self, key: &str) -> BeginOutcome;

    /// Settle the record, storing the outcome every replay will return.
    async fn complete(
        &self,
        ticket: CompletionTicket,
        result: TransactionResult,
    ) -> Result<(), IdempotencyError>;
}

/// Process-memory store. Each record is a watch channel whose value flips
/// `None → Some(result)` exactly once; waiters subscribe and park on it.
#[derive(Default)]
pub struct InMemoryIdempotencyStore {
    records: Mutex<HashMap<IdempotencyKey, watch::Sender<Option<TransactionResult>>>>,
}

impl InMemoryIdempotencyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdempotencyStore for InMemoryIdempotencyStore {
    async fn begin(&self, key: &str) -> BeginOutcome {
        let mut records = self.records.lock().await;
        match records.get(key) {
            Some(record) => BeginOutcome::Replay(ReplayHandle {
                rx: record.subscribe(),
            }),
            None => {
                let (tx, _rx) = watch::channel(None);
                records.insert(key.to_string(), tx);
                BeginOutcome::Fresh(CompletionTicket::new(key))
            }
        }
    }

    async fn complete(
        &self,
        ticket: CompletionTicket,
        result: TransactionResult,
    ) -> Result<(), IdempotencyError> {
        let records = self.records.lock().await;
        let record = records
            .get(ticket.key())
            .ok_or_else(|| IdempotencyError::RecordMissing(ticket.key().to_string()))?;
        record.send_replace(Some(result));
        Ok(())
    }
}
