use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};

use crate::config::LabelConfig;
use crate::model::{CategoryReport, DailyReport, DailyRow, LedgerRecord};

pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Default)]
struct DayAccum {
    count: usize,
    gross_wagered: i64,
    cancelled_wagered: i64,
    paid_out: i64,
    other: BTreeMap<String, i64>,
}

/// Bucket records by the date portion of `create_time` and accumulate the
/// core quantities per day, plus a raw signed sum for every non-core label.
///
/// A record with an unparsable timestamp is dropped from the time-series
/// only (counted in `skipped_timestamps`); it still participates in every
/// other stage. The other-label column set comes from the category pass so
/// a label observed only on a bad-timestamp record still gets its column.
pub fn aggregate_daily(
    records: &[LedgerRecord],
    labels: &LabelConfig,
    observed: &CategoryReport,
) -> DailyReport {
    let mut buckets: BTreeMap<NaiveDate, DayAccum> = BTreeMap::new();
    let mut skipped = 0usize;

    for record in records {
        let date = match NaiveDateTime::parse_from_str(&record.create_time, TIME_FORMAT) {
            Ok(dt) => dt.date(),
            Err(_) => {
                skipped += 1;
                continue;
            }
        };

        let bucket = buckets.entry(date).or_default();
        bucket.count += 1;

        let delta = record.balance_cents;
        let label = record.dict_name.as_str();
        if labels.wagering.contains(label) {
            bucket.gross_wagered += delta.abs();
        } else if labels.cancellation.contains(label) {
            bucket.cancelled_wagered += delta.abs();
        } else if labels.winnings.contains(label) {
            bucket.paid_out += delta;
        } else {
            *bucket.other.entry(label.to_string()).or_insert(0) += delta;
        }
    }

    let other_labels: Vec<String> = observed
        .totals
        .keys()
        .filter(|l| !labels.is_core(l))
        .cloned()
        .collect();

    let rows = buckets
        .into_iter()
        .map(|(date, b)| {
            let net_wagered = b.gross_wagered - b.cancelled_wagered;
            DailyRow {
                date,
                count: b.count,
                gross_wagered_cents: b.gross_wagered,
                cancelled_wagered_cents: b.cancelled_wagered,
                paid_out_cents: b.paid_out,
                net_wagered_cents: net_wagered,
                net_pnl_cents: b.paid_out - net_wagered,
                other_cents: b.other,
            }
        })
        .collect();

    DailyReport {
        other_labels,
        rows,
        skipped_timestamps: skipped,
    }
}
