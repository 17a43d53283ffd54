use std::collections::BTreeMap;

use crate::model::{CategoryReport, CategoryTotal, LedgerRecord};

/// Sum signed deltas and record counts per transaction-type label. Labels
/// are an open set; whatever shows up in the data gets a bucket.
pub fn aggregate_categories(records: &[LedgerRecord]) -> CategoryReport {
    let mut totals: BTreeMap<String, CategoryTotal> = BTreeMap::new();
    for record in records {
        let entry = totals.entry(record.dict_name.clone()).or_default();
        entry.total_cents += record.balance_cents;
        entry.count += 1;
    }
    CategoryReport { totals }
}
