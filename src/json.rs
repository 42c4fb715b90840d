use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use thiserror::Error;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::model::{TransactionKind, TransactionRequest, TransactionResult};
use crate::Amount;

/// Errors that can occur when decoding request lines
#[derive(Debug, Error)]
pub enum JsonError {
    #[error("line {line}: failed to read line: {source}")]
    Read { line: usize, source: io::Error },

    #[error("line {line}: failed to parse request: {source}")]
    Parse {
        line: usize,
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RequestRow {
    idempotency_key: String,
    account_id: String,
    amount: f64,
    #[serde(rename = "type")]
    kind: KindRow,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum KindRow {
    Credit,
    Debit,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResultRow {
    transaction_id: Uuid,
    account_id: String,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    new_balance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'static str>,
    timestamp: DateTime<Utc>,
}

/// Read transaction requests from a JSON-lines file, one request per line.
pub fn read_requests(
    path: impl AsRef<Path>,
) -> impl Iterator<Item = Result<TransactionRequest, JsonError>> {
    let file = File::open(path).expect("failed to open input file");
    let reader = BufReader::new(file);

    reader
        .lines()
        .enumerate()
        .filter(|(_, result)| !matches!(result, Ok(line) if line.trim().is_empty()))
        .map(|(idx, result)| {
            let line = idx + 1;
            let raw = result.map_err(|source| JsonError::Read { line, source })?;
            let row: RequestRow = serde_json::from_str(&raw)
                .map_err(|source| JsonError::Parse { line, source })?;
            Ok(TransactionRequest {
                idempotency_key: row.idempotency_key,
                account_id: row.account_id,
                amount: Amount::from_float(row.amount),
                kind: match row.kind {
                    KindRow::Credit => TransactionKind::Credit,
                    KindRow::Debit => TransactionKind::Debit,
                },
                description: row.description,
            })
        })
}

/// Write transaction results to stdout, one JSON object per line.
pub fn write_results(results: impl IntoIterator<Item = TransactionResult>) {
    let stdout = io::stdout();
    let mut writer = stdout.lock();

    for result in results {
        let row = ResultRow {
            transaction_id: result.transaction_id,
            account_id: result.account_id,
            status: result.status.as_str(),
            new_balance: result.balance.map(|b| b.to_string()),
            reason: result.reason.map(|r| r.as_str()),
            timestamp: result.timestamp,
        };
        let encoded = serde_json::to_string(&row).expect("failed to encode result row");
        writeln!(writer, "{encoded}").expect("failed to write result row");
    }

    writer.flush().expect("failed to flush stdout");
}
