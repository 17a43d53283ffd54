use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One ledger entry as fetched from the reporting API.
///
/// All monetary fields are i64 minor units (cents). The upstream field named
/// `balance` is a signed delta, not an absolute balance; it is stored as
/// `balance_cents` with that meaning intact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerRecord {
    pub id: i64,
    /// Raw `"YYYY-MM-DD HH:MM:SS"` timestamp. Kept unparsed so a malformed
    /// value only affects the time-series stage.
    pub create_time: String,
    pub before_balance_cents: i64,
    pub balance_cents: i64,
    pub dict_name: String,
}

impl LedgerRecord {
    /// Balance after this entry is applied.
    pub fn after_balance_cents(&self) -> i64 {
        self.before_balance_cents + self.balance_cents
    }
}

// ---------------------------------------------------------------------------
// Stage outputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize)]
pub struct DedupSummary {
    pub raw_count: usize,
    pub unique_count: usize,
}

/// One broken link in the balance chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discrepancy {
    pub current_id: i64,
    pub next_id: i64,
    pub expected_cents: i64,
    pub actual_cents: i64,
    pub discrepancy_cents: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChainReport {
    pub pairs_checked: usize,
    pub discrepancy_count: usize,
    /// First [`ChainReport::MAX_SAMPLE`] discrepancies in scan order.
    pub sample: Vec<Discrepancy>,
    pub consistent: bool,
}

impl ChainReport {
    pub const MAX_SAMPLE: usize = 10;
}

impl Default for ChainReport {
    fn default() -> Self {
        Self {
            pairs_checked: 0,
            discrepancy_count: 0,
            sample: Vec::new(),
            consistent: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub total_cents: i64,
    pub count: usize,
}

/// Per-label signed totals. Label-ascending iteration keeps report layout
/// reproducible.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryReport {
    pub totals: BTreeMap<String, CategoryTotal>,
}

impl CategoryReport {
    /// Signed sum across every observed label.
    pub fn signed_sum_cents(&self) -> i64 {
        self.totals.values().map(|t| t.total_cents).sum()
    }

    pub fn total_cents(&self, label: &str) -> i64 {
        self.totals.get(label).map(|t| t.total_cents).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BalanceSummary {
    pub start_cents: i64,
    pub end_cents: i64,
    pub net_change_cents: i64,
}

/// Sum-of-categories vs net-balance-change cross-check. A mismatch is a
/// warning, not a failure: it usually means a transaction type is missing
/// from the fetched window.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IntegrityCheck {
    pub category_sum_cents: i64,
    pub net_change_cents: i64,
    pub difference_cents: i64,
    pub consistent: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricsReport {
    pub gross_wagered_cents: i64,
    pub cancelled_wagered_cents: i64,
    pub net_wagered_cents: i64,
    pub paid_out_cents: i64,
    pub turnover_cents: i64,
    pub net_pnl_cents: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyRow {
    pub date: NaiveDate,
    pub count: usize,
    pub gross_wagered_cents: i64,
    pub cancelled_wagered_cents: i64,
    pub paid_out_cents: i64,
    pub net_wagered_cents: i64,
    pub net_pnl_cents: i64,
    /// Signed totals for labels outside the three core sets. Absent label =
    /// zero for that date.
    pub other_cents: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DailyReport {
    /// One report column per non-core label, alphabetical.
    pub other_labels: Vec<String>,
    /// Date ascending.
    pub rows: Vec<DailyRow>,
    /// Records dropped from time-series only (unparsable `create_time`).
    pub skipped_timestamps: usize,
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Consistent,
    Inconsistent,
    NoData,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Consistent => write!(f, "consistent"),
            Self::Inconsistent => write!(f, "inconsistent"),
            Self::NoData => write!(f, "no data"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditResult {
    pub meta: AuditMeta,
    pub verdict: Verdict,
    pub record_count: usize,
    pub dedup: DedupSummary,
    /// First few records in canonical order, for the report's
    /// sort-confirmation section.
    pub sorted_sample: Vec<LedgerRecord>,
    pub chain: ChainReport,
    pub categories: CategoryReport,
    pub balance: BalanceSummary,
    pub integrity: IntegrityCheck,
    pub metrics: MetricsReport,
    pub daily: DailyReport,
}
