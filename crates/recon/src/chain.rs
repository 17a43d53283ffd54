use crate::model::{ChainReport, Discrepancy, LedgerRecord};

/// Walk adjacent pairs of the id-sorted ledger and collect every point where
/// one entry's resulting balance does not carry into the next entry's
/// starting balance.
///
/// Never stops at the first break: callers get every broken link in one
/// pass. Sequences of length 0 or 1 have no adjacent pairs and come back
/// clean.
pub fn check_chain(records: &[LedgerRecord]) -> Vec<Discrepancy> {
    let mut discrepancies = Vec::new();
    for pair in records.windows(2) {
        let (current, next) = (&pair[0], &pair[1]);
        let expected = current.after_balance_cents();
        let actual = next.before_balance_cents;
        if expected != actual {
            discrepancies.push(Discrepancy {
                current_id: current.id,
                next_id: next.id,
                expected_cents: expected,
                actual_cents: actual,
                discrepancy_cents: actual - expected,
            });
        }
    }
    discrepancies
}

/// Bounded-sample report form of [`check_chain`].
pub fn chain_report(records: &[LedgerRecord]) -> ChainReport {
    let discrepancies = check_chain(records);
    let discrepancy_count = discrepancies.len();
    let mut sample = discrepancies;
    sample.truncate(ChainReport::MAX_SAMPLE);
    ChainReport {
        pairs_checked: records.len().saturating_sub(1),
        discrepancy_count,
        sample,
        consistent: discrepancy_count == 0,
    }
}
