//! Account balances and atomic balance mutation.
//!
//! The ledger is the sole owner of balance state. `apply` is the single
//! mutation primitive: it checks and commits under a per-account lock, so
//! concurrent callers on the same account are serialized while unrelated
//! accounts proceed independently.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::Amount;
use crate::model::AccountId;

/// Error returned by ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("account {0} does not exist")]
    UnknownAccount(AccountId),

    #[error("insufficient funds for account {account}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        account: AccountId,
        balance: Amount,
        requested: Amount,
    },

    #[error("balance overflow on account {0}")]
    BalanceOverflow(AccountId),
}

/// The authoritative set of account balances.
///
/// A durable backend can implement this contract without changes to the
/// processor.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Read the current balance.
    async fn balance(&self, account: &str) -> Result<Amount, LedgerError>;

    /// Atomically check `balance + delta >= 0`, commit, and return the new
    /// balance. On failure the balance is left unchanged.
    async fn apply(&self, account: &str, delta: Amount) -> Result<Amount, LedgerError>;
}

/// Process-memory ledger with one lock per account.
///
/// The outer map lock is held only to fetch the account entry; the
/// check-and-commit itself runs under the entry's own mutex.
#[derive(Default)]
pub struct InMemoryLedger {
    accounts: Mutex<HashMap<AccountId, Arc<Mutex<Amount>>>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger pre-seeded with the given accounts.
    pub fn with_accounts<I, S>(accounts: I) -> Self
    where
        I: IntoIterator<Item = (S, Amount)>,
        S: Into<AccountId>,
    {
        let accounts = accounts
            .into_iter()
            .map(|(id, balance)| (id.into(), Arc::new(Mutex::new(balance))))
            .collect();
        Self {
            accounts: Mutex::new(accounts),
        }
    }

    /// Establish an account with an initial balance. No-op if the account
    /// already exists; accounts are never deleted.
    pub async fn open_account(&self, account: impl Into<AccountId>, initial: Amount) {
        let mut accounts = self.accounts.lock().await;
        accounts
            .entry(account.into())
            .or_insert_with(|| Arc::new(Mutex::new(initial)));
    }

    async fn entry(&self, account: &str) -> Result<Arc<Mutex<Amount>>, LedgerError> {
        let accounts = self.accounts.lock().await;
        accounts
            .get(account)
            .cloned()
            .ok_or_else(|| LedgerError::UnknownAccount(account.to_string()))
    }
}

#[async_trait]
impl Ledger for InMemoryLedger {
    async fn balance(&self, account: &str) -> Result<Amount, LedgerError> {
        let entry = self.entry(account).await?;
        let balance = entry.lock().await;
        Ok(*balance)
    }

    async fn apply(&self, account: &str, delta: Amount) -> Result<Amount, LedgerError> {
        let entry = self.entry(account).await?;
        let mut balance = entry.lock().await;

        let updated = balance
            .checked_add(delta)
            .ok_or_else(|| LedgerError::BalanceOverflow(account.to_string()))?;

        if updated < Amount::ZERO {
            return Err(LedgerError::InsufficientFunds {
                account: account.to_string(),
                balance: *balance,
                requested: -delta,
            });
        }

        *balance = updated;
        Ok(updated)
    }
}
