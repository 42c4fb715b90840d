//! Core domain types for the transaction processor.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::Amount;

/// Account identifier.
pub type AccountId = String;

/// Client-supplied token identifying one logical transaction attempt.
pub type IdempotencyKey = String;

/// Direction of a balance adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    /// Increase the account balance.
    Credit,
    /// Decrease the account balance.
    Debit,
}

impl TransactionKind {
    /// Map a positive request amount to the signed delta applied to the ledger.
    pub fn signed_delta(self, amount: Amount) -> Amount {
        match self {
            TransactionKind::Credit => amount,
            TransactionKind::Debit => -amount,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Credit => "credit",
            TransactionKind::Debit => "debit",
        }
    }
}

/// A transaction submission, one logical attempt per idempotency key.
#[derive(Debug, Clone)]
pub struct TransactionRequest {
    pub idempotency_key: IdempotencyKey,
    pub account_id: AccountId,
    /// Positive amount; `kind` determines the sign of the effect.
    pub amount: Amount,
    pub kind: TransactionKind,
    /// Free-form text, not interpreted by the core.
    pub description: String,
}

impl TransactionRequest {
    pub fn credit(
        key: impl Into<IdempotencyKey>,
        account: impl Into<AccountId>,
        amount: Amount,
    ) -> Self {
        Self {
            idempotency_key: key.into(),
            account_id: account.into(),
            amount,
            kind: TransactionKind::Credit,
            description: String::new(),
        }
    }

    pub fn debit(
        key: impl Into<IdempotencyKey>,
        account: impl Into<AccountId>,
        amount: Amount,
    ) -> Self {
        Self {
            idempotency_key: key.into(),
            account_id: account.into(),
            amount,
            kind: TransactionKind::Debit,
            description: String::new(),
        }
    }
}

/// Whether a processed transaction mutated the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Applied,
    Rejected,
}

impl TransactionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionStatus::Applied => "applied",
            TransactionStatus::Rejected => "rejected",
        }
    }
}

/// Why a transaction was rejected by the ledger.
///
/// Rejections are recorded terminal outcomes: a replay of the same key
/// returns the same reason without touching the ledger again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    InsufficientFunds,
    UnknownAccount,
    BalanceOverflow,
}

impl RejectReason {
    pub fn as_str(self) -> &'static str {
        match self {
            RejectReason::InsufficientFunds => "insufficient_funds",
            RejectReason::UnknownAccount => "unknown_account",
            RejectReason::BalanceOverflow => "balance_overflow",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The settled outcome of one idempotency key.
///
/// Replays return this record verbatim, transaction id and timestamp
/// included.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionResult {
    pub transaction_id: Uuid,
    pub account_id: AccountId,
    pub status: TransactionStatus,
    /// New balance when applied; the unchanged balance on an
    /// insufficient-funds rejection; absent for an unknown account.
    pub balance: Option<Amount>,
    /// Present iff `status` is `Rejected`.
    pub reason: Option<RejectReason>,
    pub timestamp: DateTime<Utc>,
}

impl TransactionResult {
    pub fn applied(account_id: impl Into<AccountId>, balance: Amount) -> Self {
        Self {
            transaction_id: Uuid::new_v4(),
            account_id: account_id.into(),
            status: TransactionStatus::Applied,
            balance: Some(balance),
            reason: None,
            timestamp: Utc::now(),
        }
    }

    pub fn rejected(
        account_id: impl Into<AccountId>,
        reason: RejectReason,
        balance: Option<Amount>,
    ) -> Self {
        Self {
            transaction_id: Uuid::new_v4(),
            account_id: account_id.into(),
            status: TransactionStatus::Rejected,
            balance,
            reason: Some(reason),
            timestamp: Utc::now(),
        }
    }

    pub fn is_applied(&self) -> bool {
        self.status == TransactionStatus::Applied
    }
}
