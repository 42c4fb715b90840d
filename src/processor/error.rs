//! Error types for transaction submission.

use thiserror::Error;

use crate::Amount;
use crate::idempotency::{IdempotencyError, ReplayError};

/// Malformed request, rejected before any idempotency record is created.
/// Never recorded, never replayed.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("idempotency key must not be empty")]
    EmptyIdempotencyKey,

    #[error("idempotency key exceeds {max} characters ({len})")]
    IdempotencyKeyTooLong { len: usize, max: usize },

    #[error("account id must not be empty")]
    EmptyAccountId,

    #[error("amount must be positive, got {0}")]
    NonPositiveAmount(Amount),

    #[error("amount {amount} is below the minimum of {min}")]
    BelowMinimum { amount: Amount, min: Amount },

    #[error("amount {amount} exceeds the maximum of {max}")]
    AboveMaximum { amount: Amount, max: Amount },
}

/// Top-level error returned by [`Processor::submit`](super::Processor::submit).
///
/// Business rejections (insufficient funds, unknown account) are not errors:
/// they are recorded outcomes inside a `TransactionResult`.
#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("replay failed: {0}")]
    Replay(#[from] ReplayError),

    #[error("idempotency store failure: {0}")]
    Store(#[from] IdempotencyError),
}
