//! Processing limits and timeouts.

use std::env;
use std::time::Duration;

use crate::Amount;

/// Tunable limits applied by the processor.
#[derive(Debug, Clone)]
pub struct Config {
    /// Smallest accepted transaction amount.
    pub min_amount: Amount,
    /// Largest accepted transaction amount.
    pub max_amount: Amount,
    /// How long a duplicate submission waits for the in-flight original
    /// before giving up.
    pub replay_wait: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_amount: Amount::from_float(0.01),
            max_amount: Amount::from_float(1_000_000.00),
            replay_wait: Duration::from_secs(5),
        }
    }
}

impl Config {
    /// Build a config from environment overrides, falling back to defaults.
    ///
    /// Recognized variables: `MIN_TRANSACTION_AMOUNT`, `MAX_TRANSACTION_AMOUNT`
    /// (decimal amounts) and `REPLAY_WAIT_MS` (milliseconds).
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            min_amount: amount_var("MIN_TRANSACTION_AMOUNT").unwrap_or(defaults.min_amount),
            max_amount: amount_var("MAX_TRANSACTION_AMOUNT").unwrap_or(defaults.max_amount),
            replay_wait: millis_var("REPLAY_WAIT_MS").unwrap_or(defaults.replay_wait),
        }
    }
}

fn amount_var(name: &str) -> Option<Amount> {
    let raw = env::var(name).ok()?;
    raw.parse::<f64>().ok().map(Amount::from_float)
}

fn millis_var(name: &str) -> Option<Duration> {
    let raw = env::var(name).ok()?;
    raw.parse::<u64>().ok().map(Duration::from_millis)
}
