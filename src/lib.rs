pub mod amount;
pub mod config;
pub mod idempotency;
pub mod json;
pub mod ledger;
pub mod model;
pub mod processor;

pub use amount::Amount;
pub use config::Config;
pub use idempotency::{IdempotencyStore, InMemoryIdempotencyStore};
pub use ledger::{InMemoryLedger, Ledger};
pub use model::{
    AccountId, IdempotencyKey, RejectReason, TransactionKind, TransactionRequest,
    TransactionResult, TransactionStatus,
};
pub use processor::Processor;
