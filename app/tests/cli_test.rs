//! End-to-end runs of the `sector-risk` binary on an offline price snapshot

use chrono::NaiveDate;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::process::Command;

const TICKERS: [&str; 10] = [
    "AAPL", "MSFT", "META", "GOOG", "AMZN", "NEE", "DUK", "SO", "D", "AEP",
];

fn write_snapshot(path: &Path, tickers: &[&str], days: i64) {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut snapshot = serde_json::Map::new();
    for (k, ticker) in tickers.iter().enumerate() {
        let mut price = 100.0 + k as f64 * 10.0;
        let closes: Vec<Value> = (0..days)
            .map(|i| {
                let step = ((((i as usize) + k * 7) * 31 % 23) as f64 - 11.0) * 0.001;
                price *= 1.0 + step;
                let date = start + chrono::Duration::days(i);
                json!([date.format("%Y-%m-%d").to_string(), price])
            })
            .collect();
        snapshot.insert(ticker.to_string(), Value::Array(closes));
    }
    fs::write(path, serde_json::to_string(&snapshot).unwrap()).unwrap();
}

fn sector_risk() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_sector-risk"));
    cmd.env("RUST_LOG", "warn");
    cmd
}

#[test]
fn test_offline_run_writes_report_and_charts() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = dir.path().join("prices.json");
    let report = dir.path().join("report/analysis.json");
    let charts = dir.path().join("charts");
    write_snapshot(&snapshot, &TICKERS, 120);

    let output = sector_risk()
        .args(["--start", "2024-01-01", "--end", "2024-06-30"])
        .arg("--prices")
        .arg(&snapshot)
        .arg("--json")
        .arg(&report)
        .arg("--output-dir")
        .arg(&charts)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("GAFAM instruments"));
    assert!(stdout.contains("Utilities instruments"));
    assert!(stdout.contains("Pooled sector statistics"));
    assert!(stdout.contains("Value at Risk"));
    assert!(stdout.contains("95% CI for mean return"));

    let parsed: Value = serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    let sectors = parsed["sectors"].as_array().unwrap();
    assert_eq!(sectors.len(), 2);
    assert_eq!(sectors[0]["name"], "GAFAM");
    assert_eq!(parsed["instruments"].as_array().unwrap().len(), 10);
    assert_eq!(parsed["aligned_dates"], 119);
    assert_eq!(sectors[0]["stats"]["count"], 5 * 119);

    let distributions = fs::read_to_string(charts.join("distributions.svg")).unwrap();
    assert!(distributions.starts_with("<svg"));
    assert!(charts.join("var_comparison.svg").exists());
}

#[test]
fn test_no_charts_and_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = dir.path().join("prices.json");
    let config = dir.path().join("config.yaml");
    let charts = dir.path().join("charts");
    write_snapshot(&snapshot, &["AAPL", "DUK"], 60);
    fs::write(
        &config,
        "analysis:\n  period:\n    start: 2024-01-01\n    end: 2024-12-31\n  sectors:\n    - name: Tech\n      tickers: [aapl]\n    - name: Power\n      tickers: [Duk]\n  confidence_levels: [0.9, 0.99]\n",
    )
    .unwrap();

    let output = sector_risk()
        .arg("--config")
        .arg(&config)
        .arg("--prices")
        .arg(&snapshot)
        .arg("--output-dir")
        .arg(&charts)
        .arg("--no-charts")
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Tech instruments"));
    assert!(stdout.contains("AAPL"));
    assert!(stdout.contains("DUK"));
    assert!(stdout.contains("90%"));
    assert!(!charts.exists());
}

#[test]
fn test_empty_snapshot_fails() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = dir.path().join("prices.json");
    fs::write(&snapshot, "{}").unwrap();

    let output = sector_risk()
        .args(["--start", "2024-01-01", "--end", "2024-03-01", "--no-charts"])
        .arg("--prices")
        .arg(&snapshot)
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("holds no series"));
}

#[test]
fn test_missing_ticker_fails() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = dir.path().join("prices.json");
    write_snapshot(&snapshot, &TICKERS[..9], 60);

    let output = sector_risk()
        .args(["--start", "2024-01-01", "--end", "2024-03-01", "--no-charts"])
        .arg("--prices")
        .arg(&snapshot)
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("AEP"));
}

#[test]
fn test_rejects_inverted_period() {
    let output = sector_risk()
        .args(["--start", "2024-06-01", "--end", "2024-01-01", "--no-charts"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}
