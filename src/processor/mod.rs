//! Transaction orchestration.
//!
//! The processor ties the two leaf components together: it validates the
//! request, races for the idempotency key, applies the signed delta to the
//! ledger, and records the outcome. Per key, the ledger is mutated at most
//! once no matter how many duplicates arrive.

use std::sync::Arc;

use tracing::info;

use crate::Amount;
use crate::config::Config;
use crate::idempotency::{BeginOutcome, IdempotencyStore};
use crate::ledger::{Ledger, LedgerError};
use crate::model::{RejectReason, TransactionRequest, TransactionResult};

mod error;
pub use error::{ProcessorError, ValidationError};

const MAX_KEY_LEN: usize = 128;

/// Orchestrates idempotent transaction processing over an injected ledger
/// and idempotency store.
pub struct Processor {
    ledger: Arc<dyn Ledger>,
    store: Arc<dyn IdempotencyStore>,
    config: Config,
}

impl Processor {
    pub fn new(ledger: Arc<dyn Ledger>, store: Arc<dyn IdempotencyStore>, config: Config) -> Self {
        Self {
            ledger,
            store,
            config,
        }
    }

    /// Process one transaction request.
    ///
    /// A repeated idempotency key returns the originally recorded result,
    /// success and rejection alike. A duplicate whose original is still in
    /// flight waits up to the configured replay timeout and then fails with
    /// [`ProcessorError::Replay`] without ever re-touching the ledger.
    pub async fn submit(
        &self,
        request: TransactionRequest,
    ) -> Result<TransactionResult, ProcessorError> {
        self.validate(&request)?;

        let ticket = match self.store.begin(&request.idempotency_key).await {
            BeginOutcome::Fresh(ticket) => ticket,
            BeginOutcome::Replay(handle) => {
                let result = handle.settled(self.config.replay_wait).await?;
                info!(
                    key = %request.idempotency_key,
                    txn = %result.transaction_id,
                    status = result.status.as_str(),
                    "replaying recorded outcome"
                );
                return Ok(result);
            }
        };

        let delta = request.kind.signed_delta(request.amount);
        let result = match self.ledger.apply(&request.account_id, delta).await {
            Ok(balance) => TransactionResult::applied(&request.account_id, balance),
            Err(err) => {
                let (reason, balance) = Self::classify(err);
                TransactionResult::rejected(&request.account_id, reason, balance)
            }
        };

        Self::log_outcome(&request, &result);
        self.store.complete(ticket, result.clone()).await?;
        Ok(result)
    }

    fn validate(&self, request: &TransactionRequest) -> Result<(), ValidationError> {
        if request.idempotency_key.is_empty() {
            return Err(ValidationError::EmptyIdempotencyKey);
        }
        if request.idempotency_key.len() > MAX_KEY_LEN {
            return Err(ValidationError::IdempotencyKeyTooLong {
                len: request.idempotency_key.len(),
                max: MAX_KEY_LEN,
            });
        }
        if request.account_id.is_empty() {
            return Err(ValidationError::EmptyAccountId);
        }
        if !request.amount.is_positive() {
            return Err(ValidationError::NonPositiveAmount(request.amount));
        }
        if request.amount < self.config.min_amount {
            return Err(ValidationError::BelowMinimum {
                amount: request.amount,
                min: self.config.min_amount,
            });
        }
        if request.amount > self.config.max_amount {
            return Err(ValidationError::AboveMaximum {
                amount: request.amount,
                max: self.config.max_amount,
            });
        }
        Ok(())
    }

    /// Map a ledger failure to its recorded rejection.
    fn classify(err: LedgerError) -> (RejectReason, Option<Amount>) {
        match err {
            LedgerError::InsufficientFunds { balance, .. } => {
                (RejectReason::InsufficientFunds, Some(balance))
            }
            LedgerError::UnknownAccount(_) => (RejectReason::UnknownAccount, None),
            LedgerError::BalanceOverflow(_) => (RejectReason::BalanceOverflow, None),
        }
    }

    fn log_outcome(request: &TransactionRequest, result: &TransactionResult) {
        match result.reason {
            None => {
                info!(
                    key = %request.idempotency_key,
                    account = %request.account_id,
                    amount = %request.amount,
                    txn = %result.transaction_id,
                    "{} applied",
                    request.kind.as_str()
                );
            }
            Some(reason) => {
                info!(
                    key = %request.idempotency_key,
                    account = %request.account_id,
                    amount = %request.amount,
                    reason = %reason,
                    "{} rejected",
                    request.kind.as_str()
                );
            }
        }
    }
}
