use crate::config::LabelConfig;
use crate::model::{BalanceSummary, CategoryReport, IntegrityCheck, LedgerRecord, MetricsReport};

/// Derive the six game-economics quantities from category totals.
///
/// Wagering and cancellation totals are taken as absolute values (the ledger
/// stores wagers as negative deltas); winnings stay signed (stored positive).
/// Flattening that asymmetry would silently invert the P&L sign.
pub fn compute_metrics(categories: &CategoryReport, labels: &LabelConfig) -> MetricsReport {
    let gross_wagered: i64 = labels
        .wagering
        .iter()
        .map(|l| categories.total_cents(l).abs())
        .sum();
    let cancelled_wagered: i64 = labels
        .cancellation
        .iter()
        .map(|l| categories.total_cents(l).abs())
        .sum();
    let net_wagered = gross_wagered - cancelled_wagered;
    let paid_out: i64 = labels
        .winnings
        .iter()
        .map(|l| categories.total_cents(l))
        .sum();
    let turnover: i64 = categories
        .totals
        .values()
        .map(|t| t.total_cents.abs())
        .sum();

    MetricsReport {
        gross_wagered_cents: gross_wagered,
        cancelled_wagered_cents: cancelled_wagered,
        net_wagered_cents: net_wagered,
        paid_out_cents: paid_out,
        turnover_cents: turnover,
        net_pnl_cents: paid_out - net_wagered,
    }
}

/// Start / end / net-change over the id-sorted ledger. Taken from the full
/// sorted set, first record's before-balance to last record's after-balance.
pub fn balance_summary(sorted: &[LedgerRecord]) -> BalanceSummary {
    match (sorted.first(), sorted.last()) {
        (Some(first), Some(last)) => {
            let start = first.before_balance_cents;
            let end = last.after_balance_cents();
            BalanceSummary {
                start_cents: start,
                end_cents: end,
                net_change_cents: end - start,
            }
        }
        _ => BalanceSummary::default(),
    }
}

/// Cross-check that the signed category sum explains the whole net balance
/// change. A mismatch is a warning: it usually means a transaction-type
/// label missing from the fetched window, not a broken chain.
pub fn integrity_check(categories: &CategoryReport, balance: &BalanceSummary) -> IntegrityCheck {
    let category_sum = categories.signed_sum_cents();
    let difference = category_sum - balance.net_change_cents;
    IntegrityCheck {
        category_sum_cents: category_sum,
        net_change_cents: balance.net_change_cents,
        difference_cents: difference,
        consistent: difference == 0,
    }
}
