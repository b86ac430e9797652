//! E2E tests for the command line driver

use std::process::Command;

fn fincalc(args: &[&str]) -> (bool, String, String) {
    let output = Command::new("cargo")
        .args(["run", "--quiet", "--"])
        .args(args)
        .output()
        .expect("Failed to execute command");
    (
        output.status.success(),
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
    )
}

/// Regime comparison for the 8 lakh income with a full 80C claim
#[test]
fn tax_recommends_new_regime() {
    let (ok, stdout, stderr) = fincalc(&["tax", "tests/data/tax_profile.json", "--year", "2025"]);
    assert!(ok, "Command failed: {stderr}");

    assert!(stdout.contains("FY 2024-25"));
    assert!(stdout.contains("₹6,50,000"));
    assert!(stdout.contains("₹8,00,000"));
    assert!(stdout.contains("₹44,200"));
    assert!(stdout.contains("₹36,400"));
    assert!(stdout.contains("saves ₹7,800"));
    assert!(stdout.contains("ADVANCE TAX"));
}

#[test]
fn tax_json_output() {
    let (ok, stdout, stderr) = fincalc(&[
        "tax",
        "tests/data/tax_profile.json",
        "--year",
        "2025",
        "--json",
    ]);
    assert!(ok, "Command failed: {stderr}");

    let json: serde_json::Value = serde_json::from_str(&stdout).expect("valid json");
    let comparison = &json["comparison"];
    assert_eq!(comparison["recommended_regime"], "new");
    assert_eq!(comparison["advance_tax_schedule"].as_array().map(Vec::len), Some(4));
    assert!(json["tips"].is_array());
}

#[test]
fn tax_clamped_claims_are_reported() {
    let (ok, stdout, stderr) = fincalc(&[
        "tax",
        "tests/data/tax_profile_clamped.json",
        "--year",
        "2025",
    ]);
    assert!(ok, "Command failed: {stderr}");
    assert!(stdout.contains("WARNINGS"));
    assert!(stdout.contains("80C"));
    assert!(stdout.contains("24B"));
}

#[test]
fn credit_recommendations() {
    let (ok, stdout, stderr) = fincalc(&[
        "credit",
        "tests/data/credit_profile.json",
        "--as-of",
        "2024-06-01",
        "--monthly-income",
        "100000",
    ]);
    assert!(ok, "Command failed: {stderr}");

    assert!(stdout.contains("CREDIT SCORE as of 2024-06-01: 615"));
    assert!(stdout.contains("Improve Payment History"));
    assert!(stdout.contains("Reduce Credit Utilization"));
    assert!(stdout.contains("Loan eligibility: up to ₹24,00,000"));
}

#[test]
fn credit_unparseable_date_is_a_warning() {
    let (ok, stdout, stderr) = fincalc(&[
        "credit",
        "tests/data/credit_profile_bad_date.json",
        "--as-of",
        "2024-06-01",
        "--json",
    ]);
    assert!(ok, "Command failed: {stderr}");

    let json: serde_json::Value = serde_json::from_str(&stdout).expect("valid json");
    let warnings = json["report"]["warnings"].as_array().expect("warnings");
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0]["type"], "UnparseableDate");
    let score = json["report"]["score"].as_i64().expect("score");
    assert!((300..=900).contains(&score));
}

#[test]
fn debt_compare_from_json() {
    let (ok, stdout, stderr) = fincalc(&["debt", "tests/data/debts.json"]);
    assert!(ok, "Command failed: {stderr}");

    assert!(stdout.contains("SNOWBALL vs AVALANCHE"));
    assert!(stdout.contains("snowball"));
    assert!(stdout.contains("avalanche"));
    assert!(stdout.contains("A > B"));
}

#[test]
fn debt_snowball_timeline_targets_smallest_balance() {
    let (ok, stdout, stderr) = fincalc(&[
        "debt",
        "tests/data/debts.json",
        "--strategy",
        "snowball",
        "--json",
    ]);
    assert!(ok, "Command failed: {stderr}");

    let json: serde_json::Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(json["strategy"], "snowball");
    assert_eq!(json["timeline"][0]["month"], 1);
    assert_eq!(json["timeline"][0]["target"], "A");
    assert_eq!(json["converged"], true);
}

#[test]
fn debt_csv_skips_bad_rows() {
    let (ok, stdout, stderr) = fincalc(&["debt", "tests/data/debts.csv", "--budget", "15000"]);
    assert!(ok, "Command failed: {stderr}");

    assert!(stdout.contains("HDFC Card"));
    assert!(stdout.contains("WARNINGS"));
    assert!(stdout.contains("row 3"));
}

#[test]
fn debt_budget_below_minimums_fails() {
    let (ok, _, stderr) = fincalc(&["debt", "tests/data/debts.json", "--budget", "1000"]);
    assert!(!ok);
    assert!(stderr.contains("total_monthly_budget") || stderr.contains("budget"));
}

#[test]
fn gains_from_zerodha_tradebook() {
    let (ok, stdout, stderr) = fincalc(&["gains", "tests/data/zerodha_tradebook.csv", "--year", "2024"]);
    assert!(ok, "Command failed: {stderr}");

    assert!(stdout.contains("zerodha export"));
    assert!(stdout.contains("INFY"));
    assert!(stdout.contains("Short"));
    assert!(stdout.contains("Long"));
    assert!(stdout.contains("WARNINGS"));
    assert!(stdout.contains("TCS"));
}

#[test]
fn gains_json_from_groww_statement() {
    let (ok, stdout, stderr) = fincalc(&["gains", "tests/data/groww_gains.csv", "--json"]);
    assert!(ok, "Command failed: {stderr}");

    let json: serde_json::Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(json["source"], "groww");
    assert_eq!(json["trades"].as_array().map(Vec::len), Some(4));
    assert_eq!(json["records"].as_array().map(Vec::len), Some(2));
    assert_eq!(json["records"][0]["term"], "long");
    assert_eq!(json["records"][0]["instrument_class"], "mutual_fund");
    assert_eq!(json["records"][1]["term"], "short");
    assert_eq!(json["records"][1]["instrument_class"], "debt");
    assert!(json["warnings"].as_array().map_or(false, |w| w.is_empty()));
}

#[test]
fn gains_source_override() {
    let (ok, stdout, stderr) = fincalc(&[
        "gains",
        "tests/data/zerodha_tradebook.csv",
        "--source",
        "generic",
        "--json",
    ]);
    assert!(ok, "Command failed: {stderr}");
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(json["source"], "generic");
}

#[test]
fn schema_for_each_input() {
    for kind in ["tax", "credit", "debt"] {
        let (ok, stdout, stderr) = fincalc(&["schema", kind]);
        assert!(ok, "Command failed: {stderr}");
        let json: serde_json::Value = serde_json::from_str(&stdout).expect("valid json");
        assert!(json["properties"].is_object(), "{kind}");
    }
}
