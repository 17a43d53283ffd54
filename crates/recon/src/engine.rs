use crate::category::aggregate_categories;
use crate::chain::chain_report;
use crate::config::AuditConfig;
use crate::dedup::dedup_records;
use crate::error::AuditError;
use crate::metrics::{balance_summary, compute_metrics, integrity_check};
use crate::model::{AuditMeta, AuditResult, DedupSummary, LedgerRecord, Verdict};
use crate::timeseries::aggregate_daily;

/// Records shown in the sort-confirmation section of the report.
const SORT_SAMPLE: usize = 10;

/// Run the full audit pipeline: dedup → sort → chain check → category
/// aggregation → metrics + integrity → time-series.
///
/// Stages run strictly in sequence, each over the full output of the
/// previous one. Empty input yields a `NoData` verdict with zeroed
/// aggregates, never an error; structural problems are rejected earlier by
/// [`load_csv_rows`].
pub fn run(config: &AuditConfig, records: Vec<LedgerRecord>) -> AuditResult {
    let raw_count = records.len();
    let mut records = dedup_records(records);
    let dedup = DedupSummary {
        raw_count,
        unique_count: records.len(),
    };

    records.sort_by_key(|r| r.id);

    if records.is_empty() {
        return AuditResult {
            meta: meta(config),
            verdict: Verdict::NoData,
            record_count: 0,
            dedup,
            sorted_sample: Vec::new(),
            chain: Default::default(),
            categories: Default::default(),
            balance: Default::default(),
            integrity: Default::default(),
            metrics: Default::default(),
            daily: Default::default(),
        };
    }

    let chain = chain_report(&records);
    let categories = aggregate_categories(&records);
    let balance = balance_summary(&records);
    let integrity = integrity_check(&categories, &balance);
    let metrics = compute_metrics(&categories, &config.labels);
    let daily = aggregate_daily(&records, &config.labels, &categories);

    let verdict = if chain.consistent {
        Verdict::Consistent
    } else {
        Verdict::Inconsistent
    };

    AuditResult {
        meta: meta(config),
        verdict,
        record_count: records.len(),
        sorted_sample: records.iter().take(SORT_SAMPLE).cloned().collect(),
        dedup,
        chain,
        categories,
        balance,
        integrity,
        metrics,
        daily,
    }
}

fn meta(config: &AuditConfig) -> AuditMeta {
    AuditMeta {
        config_name: config.name.clone(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        run_at: chrono::Utc::now().to_rfc3339(),
    }
}

/// Load canonical ledger CSV into records.
///
/// Columns: `id,create_time,before_balance_minor,balance_minor,dict_name`.
/// Amounts are i64 minor units. A row missing `id`, `create_time`, or
/// `dict_name`, or with an unparsable id/amount, is a structural error that
/// aborts the whole batch: partial structural failure would make every
/// downstream computation meaningless.
pub fn load_csv_rows(csv_data: &str) -> Result<Vec<LedgerRecord>, AuditError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AuditError::Io(e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let idx = |name: &str| -> Result<usize, AuditError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| AuditError::MissingColumn { column: name.into() })
    };

    let id_idx = idx("id")?;
    let create_time_idx = idx("create_time")?;
    let before_idx = idx("before_balance_minor")?;
    let balance_idx = idx("balance_minor")?;
    let dict_name_idx = idx("dict_name")?;

    let mut rows = Vec::new();

    for (i, record) in reader.records().enumerate() {
        // 1-based, counting the header line.
        let row = i + 2;
        let record = record.map_err(|e| AuditError::Io(e.to_string()))?;

        let field = |idx: usize| record.get(idx).unwrap_or("").trim();

        let id_str = field(id_idx);
        if id_str.is_empty() {
            return Err(AuditError::MissingField { row, field: "id" });
        }
        let id: i64 = id_str
            .parse()
            .map_err(|_| AuditError::IdParse { row, value: id_str.into() })?;

        let create_time = field(create_time_idx);
        if create_time.is_empty() {
            return Err(AuditError::MissingField { row, field: "create_time" });
        }

        let dict_name = field(dict_name_idx);
        if dict_name.is_empty() {
            return Err(AuditError::MissingField { row, field: "dict_name" });
        }

        let amount = |idx: usize, name: &'static str| -> Result<i64, AuditError> {
            field(idx).parse().map_err(|_| AuditError::AmountParse {
                row,
                field: name,
                value: field(idx).into(),
            })
        };
        let before_balance_cents = amount(before_idx, "before_balance_minor")?;
        let balance_cents = amount(balance_idx, "balance_minor")?;

        rows.push(LedgerRecord {
            id,
            create_time: create_time.to_string(),
            before_balance_cents,
            balance_cents,
            dict_name: dict_name.to_string(),
        });
    }

    Ok(rows)
}
