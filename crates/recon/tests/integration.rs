use std::path::PathBuf;

use ledgerlens_recon::config::AuditConfig;
use ledgerlens_recon::engine::{load_csv_rows, run};
use ledgerlens_recon::model::Verdict;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture_config() -> AuditConfig {
    let toml = std::fs::read_to_string(fixtures_dir().join("audit.toml")).unwrap();
    AuditConfig::from_toml(&toml).unwrap()
}

fn load_and_run(csv_name: &str) -> ledgerlens_recon::AuditResult {
    let path = fixtures_dir().join(csv_name);
    let csv_data = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
    let records = load_csv_rows(&csv_data).unwrap();
    run(&fixture_config(), records)
}

// -------------------------------------------------------------------------
// Clean ledger
// -------------------------------------------------------------------------

#[test]
fn clean_ledger_reconciles() {
    let result = load_and_run("ledger-clean.csv");

    assert_eq!(result.verdict, Verdict::Consistent);
    assert_eq!(result.record_count, 9);
    assert_eq!(result.dedup.raw_count, 9);
    assert_eq!(result.dedup.unique_count, 9);
    assert_eq!(result.chain.pairs_checked, 8);
    assert_eq!(result.chain.discrepancy_count, 0);
    assert_eq!(result.meta.config_name, "Fixture Audit");
}

#[test]
fn clean_ledger_balance_and_integrity() {
    let result = load_and_run("ledger-clean.csv");

    assert_eq!(result.balance.start_cents, 100_000);
    assert_eq!(result.balance.end_cents, 93_300);
    assert_eq!(result.balance.net_change_cents, -6_700);

    // Fully consistent and fully classified: the signed category sum
    // explains the entire net change.
    assert!(result.integrity.consistent);
    assert_eq!(result.integrity.category_sum_cents, -6_700);
    assert_eq!(result.integrity.difference_cents, 0);
}

#[test]
fn clean_ledger_metrics() {
    let result = load_and_run("ledger-clean.csv");
    let m = &result.metrics;

    assert_eq!(m.gross_wagered_cents, 60_000);
    assert_eq!(m.cancelled_wagered_cents, 5_000);
    assert_eq!(m.net_wagered_cents, 55_000);
    assert_eq!(m.paid_out_cents, 38_300);
    assert_eq!(m.turnover_cents, 193_300);
    assert_eq!(m.net_pnl_cents, -16_700);
}

#[test]
fn clean_ledger_daily_table() {
    let result = load_and_run("ledger-clean.csv");
    let daily = &result.daily;

    assert_eq!(daily.rows.len(), 2);
    assert_eq!(daily.other_labels, vec!["deposit".to_string(), "withdraw".to_string()]);
    assert_eq!(daily.skipped_timestamps, 0);

    let day1 = &daily.rows[0];
    assert_eq!(day1.date.to_string(), "2024-03-01");
    assert_eq!(day1.count, 5);
    assert_eq!(day1.gross_wagered_cents, 30_000);
    assert_eq!(day1.cancelled_wagered_cents, 5_000);
    assert_eq!(day1.paid_out_cents, 36_000);
    assert_eq!(day1.net_wagered_cents, 25_000);
    assert_eq!(day1.net_pnl_cents, 11_000);
    assert_eq!(day1.other_cents["deposit"], 50_000);

    let day2 = &daily.rows[1];
    assert_eq!(day2.date.to_string(), "2024-03-02");
    assert_eq!(day2.count, 4);
    assert_eq!(day2.paid_out_cents, 2_300);
    assert_eq!(day2.net_pnl_cents, -27_700);
    assert_eq!(day2.other_cents["withdraw"], -40_000);
}

// -------------------------------------------------------------------------
// Broken ledger
// -------------------------------------------------------------------------

#[test]
fn broken_ledger_localizes_the_gap() {
    let result = load_and_run("ledger-broken.csv");

    assert_eq!(result.verdict, Verdict::Inconsistent);
    assert_eq!(result.chain.discrepancy_count, 1);

    let d = &result.chain.sample[0];
    assert_eq!(d.current_id, 9002);
    assert_eq!(d.next_id, 9003);
    assert_eq!(d.expected_cents, 130_000);
    assert_eq!(d.actual_cents, 129_000);
    assert_eq!(d.discrepancy_cents, -1_000);

    // The broken link also throws the integrity check off by the same gap,
    // and the warning carries the amount.
    assert!(!result.integrity.consistent);
    assert_eq!(result.integrity.difference_cents, 1_000);

    // Metrics are still fully reported despite the failure.
    assert_eq!(result.metrics.gross_wagered_cents, 30_000);
    assert_eq!(result.metrics.paid_out_cents, 36_000);
}

// -------------------------------------------------------------------------
// Overlapping pages
// -------------------------------------------------------------------------

#[test]
fn overlapping_pages_dedup_then_reconcile() {
    let result = load_and_run("ledger-overlap.csv");

    assert_eq!(result.dedup.raw_count, 6);
    assert_eq!(result.dedup.unique_count, 4);
    assert_eq!(result.verdict, Verdict::Consistent);
    // Duplicates collapsed before aggregation: bet counted twice, not four
    // times.
    assert_eq!(result.categories.totals["bet"].count, 2);
    assert_eq!(result.metrics.gross_wagered_cents, 30_000);
}

// -------------------------------------------------------------------------
// Result serialization
// -------------------------------------------------------------------------

#[test]
fn result_serializes_to_json() {
    let result = load_and_run("ledger-clean.csv");
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["verdict"], "consistent");
    assert_eq!(json["metrics"]["net_pnl_cents"], -16_700);
    assert_eq!(json["daily"]["rows"][0]["date"], "2024-03-01");
    assert_eq!(json["chain"]["pairs_checked"], 8);
}
