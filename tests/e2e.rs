use std::process::Command;

use serde_json::Value;

fn run(fixture: &str) -> (String, String, bool) {
    let path = format!("tests/fixtures/{fixture}");
    let output = Command::new(env!("CARGO_BIN_EXE_txproc"))
        .arg(&path)
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to run binary");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

fn parse_results(stdout: &str) -> Vec<Value> {
    stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("output line should be json"))
        .collect()
}

#[test]
fn valid_transactions() {
    let (stdout, stderr, success) = run("valid.jsonl");

    assert!(success);
    assert!(stderr.is_empty());

    let results = parse_results(&stdout);
    assert_eq!(results.len(), 3);

    // Both k1 submissions replay the same recorded outcome.
    let k1: Vec<&Value> = results
        .iter()
        .filter(|r| r["accountId"] == "acc_001")
        .collect();
    assert_eq!(k1.len(), 2);
    assert_eq!(k1[0], k1[1]);
    assert_eq!(k1[0]["status"], "applied");
    assert_eq!(k1[0]["newBalance"], "1050.0000");
    assert!(k1[0]["transactionId"].is_string());

    let k2 = results
        .iter()
        .find(|r| r["accountId"] == "acc_002")
        .expect("acc_002 result");
    assert_eq!(k2["status"], "applied");
    assert_eq!(k2["newBalance"], "400.0000");
}

#[test]
fn errors_warn_but_do_not_block() {
    let (stdout, stderr, success) = run("with_errors.jsonl");

    assert!(success);
    // The unsupported type and the garbage line are skipped with warnings.
    assert!(stderr.contains("failed to parse request"));

    let results = parse_results(&stdout);
    assert_eq!(results.len(), 2);

    let applied = results
        .iter()
        .find(|r| r["accountId"] == "acc_001")
        .expect("acc_001 result");
    assert_eq!(applied["status"], "applied");
    assert_eq!(applied["newBalance"], "1025.0000");

    // Unknown accounts are business rejections, not parse errors.
    let rejected = results
        .iter()
        .find(|r| r["accountId"] == "acc_999")
        .expect("acc_999 result");
    assert_eq!(rejected["status"], "rejected");
    assert_eq!(rejected["reason"], "unknown_account");
    assert!(rejected.get("newBalance").is_none());
}
