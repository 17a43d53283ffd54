//! Console report rendering over a computed `AuditResult`.
//!
//! Formatting only: every number printed here was computed by the engine.
//! This module never recomputes or reinterprets aggregates.

use std::io;
use std::io::Write;

use ledgerlens_recon::model::{AuditResult, Verdict};

const MONEY_WIDTH: usize = 12;

/// Render cents as a plain decimal string: 123456 -> "1234.56".
fn fmt_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

/// Render cents with an explicit sign: 123456 -> "+1234.56".
fn fmt_cents_signed(cents: i64) -> String {
    if cents < 0 {
        fmt_cents(cents)
    } else {
        format!("+{}", fmt_cents(cents))
    }
}

pub fn render(result: &AuditResult, out: &mut impl Write) -> io::Result<()> {
    writeln!(
        out,
        "ledger audit — {} (engine {}, run at {})",
        result.meta.config_name, result.meta.engine_version, result.meta.run_at,
    )?;
    writeln!(out)?;

    writeln!(
        out,
        "dedup:       {} raw -> {} unique",
        result.dedup.raw_count, result.dedup.unique_count,
    )?;

    if result.verdict == Verdict::NoData {
        writeln!(out, "status:      no data — nothing to analyze")?;
        return Ok(());
    }

    render_sort_sample(result, out)?;
    render_consistency(result, out)?;
    render_categories(result, out)?;
    render_balance(result, out)?;
    render_metrics(result, out)?;
    render_daily(result, out)?;

    Ok(())
}

fn render_sort_sample(result: &AuditResult, out: &mut impl Write) -> io::Result<()> {
    writeln!(
        out,
        "sort:        {} records by id ascending; first {}:",
        result.record_count,
        result.sorted_sample.len(),
    )?;
    for r in &result.sorted_sample {
        writeln!(
            out,
            "  id {:<12} {}  before {:>w$}  delta {:>w$}  after {:>w$}",
            r.id,
            r.create_time,
            fmt_cents(r.before_balance_cents),
            fmt_cents_signed(r.balance_cents),
            fmt_cents(r.after_balance_cents()),
            w = MONEY_WIDTH,
        )?;
    }
    Ok(())
}

fn render_consistency(result: &AuditResult, out: &mut impl Write) -> io::Result<()> {
    let chain = &result.chain;
    if chain.consistent {
        writeln!(out, "consistency: PASS ({} pairs checked)", chain.pairs_checked)?;
        return Ok(());
    }

    writeln!(
        out,
        "consistency: FAIL — {} discontinuities across {} pairs (showing first {})",
        chain.discrepancy_count,
        chain.pairs_checked,
        chain.sample.len(),
    )?;
    for d in &chain.sample {
        writeln!(
            out,
            "  id {} -> {}: expected {}, actual {} (diff {})",
            d.current_id,
            d.next_id,
            fmt_cents(d.expected_cents),
            fmt_cents(d.actual_cents),
            fmt_cents_signed(d.discrepancy_cents),
        )?;
    }
    Ok(())
}

fn render_categories(result: &AuditResult, out: &mut impl Write) -> io::Result<()> {
    let label_width = result
        .categories
        .totals
        .keys()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0)
        .max("label".len());

    writeln!(out, "categories:")?;
    writeln!(
        out,
        "  {:<label_width$}  {:>6}  {:>w$}",
        "label",
        "count",
        "total",
        w = MONEY_WIDTH,
    )?;
    for (label, total) in &result.categories.totals {
        writeln!(
            out,
            "  {:<label_width$}  {:>6}  {:>w$}",
            label,
            total.count,
            fmt_cents_signed(total.total_cents),
            w = MONEY_WIDTH,
        )?;
    }
    Ok(())
}

fn render_balance(result: &AuditResult, out: &mut impl Write) -> io::Result<()> {
    let b = &result.balance;
    writeln!(
        out,
        "balance:     start {}, end {}, net change {}",
        fmt_cents(b.start_cents),
        fmt_cents(b.end_cents),
        fmt_cents_signed(b.net_change_cents),
    )?;

    let check = &result.integrity;
    if check.consistent {
        writeln!(
            out,
            "integrity:   ok (category sum {} matches net change)",
            fmt_cents_signed(check.category_sum_cents),
        )?;
    } else {
        writeln!(
            out,
            "integrity:   WARNING — category sum {} vs net change {} (diff {}; a transaction type may be missing)",
            fmt_cents_signed(check.category_sum_cents),
            fmt_cents_signed(check.net_change_cents),
            fmt_cents_signed(check.difference_cents),
        )?;
    }
    Ok(())
}

fn render_metrics(result: &AuditResult, out: &mut impl Write) -> io::Result<()> {
    let m = &result.metrics;
    writeln!(out, "metrics:")?;
    let rows = [
        ("gross wagered", m.gross_wagered_cents),
        ("cancelled wagered", m.cancelled_wagered_cents),
        ("net wagered", m.net_wagered_cents),
        ("paid out", m.paid_out_cents),
        ("net pnl", m.net_pnl_cents),
        ("turnover", m.turnover_cents),
    ];
    for (name, cents) in rows {
        writeln!(out, "  {:<18} {:>w$}", name, fmt_cents(cents), w = MONEY_WIDTH)?;
    }
    Ok(())
}

fn render_daily(result: &AuditResult, out: &mut impl Write) -> io::Result<()> {
    let daily = &result.daily;
    writeln!(out, "daily:")?;

    let mut header = format!(
        "  {:<10}  {:>6}  {:>w$}  {:>w$}  {:>w$}",
        "date",
        "count",
        "net wagered",
        "paid out",
        "net pnl",
        w = MONEY_WIDTH,
    );
    for label in &daily.other_labels {
        let col_width = label.chars().count().max(MONEY_WIDTH);
        header.push_str(&format!("  {:>col_width$}", label));
    }
    writeln!(out, "{header}")?;

    for row in &daily.rows {
        let mut line = format!(
            "  {:<10}  {:>6}  {:>w$}  {:>w$}  {:>w$}",
            row.date,
            row.count,
            fmt_cents(row.net_wagered_cents),
            fmt_cents(row.paid_out_cents),
            fmt_cents_signed(row.net_pnl_cents),
            w = MONEY_WIDTH,
        );
        for label in &daily.other_labels {
            let col_width = label.chars().count().max(MONEY_WIDTH);
            let cents = row.other_cents.get(label).copied().unwrap_or(0);
            line.push_str(&format!("  {:>col_width$}", fmt_cents_signed(cents)));
        }
        writeln!(out, "{line}")?;
    }

    if daily.skipped_timestamps > 0 {
        writeln!(
            out,
            "  note: {} record(s) excluded (unparsable create_time)",
            daily.skipped_timestamps,
        )?;
    }
    Ok(())
}

// ── Tests ───────────────────────────────────────────────────────────
