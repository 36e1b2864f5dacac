use assert_cmd::Command;
use predicates::prelude::*;

fn ticklens() -> Command {
    let mut cmd = Command::cargo_bin("ticklens").unwrap();
    cmd.env_remove("TICKLENS_USE_MOCK").env_remove("RUST_LOG");
    cmd
}

#[test]
fn text_report_renders_every_section() {
    ticklens()
        .args(["--mock", "aapl", "--period", "1mo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Data fetched successfully."))
        .stdout(predicate::str::contains("Apple Inc."))
        .stdout(predicate::str::contains("AAPL Real-Time Price (Close)"))
        .stdout(predicate::str::contains("Historical Data (since 1999)"))
        .stdout(predicate::str::contains("Balance Sheet"))
        .stdout(predicate::str::contains("AAPL - Monthly Volume Distribution"))
        .stdout(predicate::str::contains("MA(20)"));
}

#[test]
fn json_report_is_machine_readable() {
    let out = ticklens()
        .args(["--mock", "--json", "MSFT", "--window", "10"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let report: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(report["symbol"], "MSFT");
    assert_eq!(report["window"], 10);
    assert_eq!(report["range"]["kind"], "lookback");
    assert_eq!(report["range"]["period"], "6mo");
    assert_eq!(report["notices"][0]["level"], "success");
    assert!(report["price_history"]["overlay"]["points"].is_array());
}

#[test]
fn env_var_selects_mock_connector() {
    ticklens()
        .env("TICKLENS_USE_MOCK", "true")
        .args(["--json", "NVDA"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"source\": \"ticklens-mock\""));
}

#[test]
fn unknown_ticker_warns_but_succeeds() {
    ticklens()
        .args(["--mock", "ZZZZ"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "No data found. Please check the ticker symbol.",
        ))
        .stdout(predicate::str::contains("Real-time price not available."));
}

#[test]
fn failed_fetches_set_exit_status() {
    ticklens()
        .args(["--mock", "FAIL"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "Error fetching data. Please ensure the ticker is correct.",
        ));
}

#[test]
fn window_outside_bounds_is_rejected() {
    ticklens()
        .args(["--mock", "AAPL", "--window", "60"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("outside [5, 50]"));
}

#[test]
fn explicit_dates_replace_period() {
    let out = ticklens()
        .args([
            "--mock", "--json", "MSFT", "--start", "2024-08-01", "--end", "2024-09-01",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let report: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(report["range"]["kind"], "dates");
    assert_eq!(report["price_history"]["table"]["total_rows"], 22);
}

#[test]
fn invalid_period_is_a_usage_error() {
    ticklens()
        .args(["--mock", "AAPL", "--period", "2w"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--period"));
}

#[test]
fn zero_retries_fail_config_validation() {
    ticklens()
        .args(["--mock", "AAPL", "--retries", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("max_attempts"));
}
