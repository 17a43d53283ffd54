use std::collections::HashMap;

use crate::model::LedgerRecord;

/// Composite key identifying a logical record across overlapping page
/// fetches.
type DedupKey = (i64, String, i64, i64);

fn key_of(record: &LedgerRecord) -> DedupKey {
    (
        record.id,
        record.create_time.clone(),
        record.balance_cents,
        record.before_balance_cents,
    )
}

/// Collapse exact duplicates; the last-seen copy of each key wins (later
/// fetch order is considered freshest). Output order is unspecified; the
/// sorter establishes canonical order afterwards.
pub fn dedup_records(records: Vec<LedgerRecord>) -> Vec<LedgerRecord> {
    let mut unique: HashMap<DedupKey, LedgerRecord> = HashMap::with_capacity(records.len());
    for record in records {
        unique.insert(key_of(&record), record);
    }
    unique.into_values().collect()
}
