//! Shared infrastructure for `llens fetch`.
//!
//! - `FetchClient` — HTTP client with status → exit-code classification
//! - `CanonicalRow` — the 5-column CSV schema the audit pipeline consumes
//! - `resolve_api_token` — flag > env > error
//! - `write_csv` — open output, write header + rows, flush
//! - money conversion — decimal strings and JSON numbers to i64 minor units
//!
//! # CanonicalRow Contract
//!
//! Downstream loading (`ledgerlens_recon::load_csv_rows`) depends on this.
//!
//! ## Columns (in order)
//!
//! | #  | Column                 | Type     | Required | Description                         |
//! |----|------------------------|----------|----------|-------------------------------------|
//! | 1  | `id`                   | `i64`    | Yes      | Unique record id, canonical sort key |
//! | 2  | `create_time`          | `String` | Yes      | `YYYY-MM-DD HH:MM:SS` as upstream sent it |
//! | 3  | `before_balance_minor` | `i64`    | Yes      | Balance before the entry, minor units. Never float. |
//! | 4  | `balance_minor`        | `i64`    | Yes      | Signed delta, minor units. Never float. |
//! | 5  | `dict_name`            | `String` | Yes      | Transaction-type label (open set)    |
//!
//! ## Invariants
//!
//! - **Column order**: Fixed. Serialized by `serde` in struct field order.
//! - **Sort order**: `id` ascending. Two runs over the same data MUST
//!   produce byte-identical CSV.
//! - **Amounts**: Always `i64` minor units. Decimal strings go through
//!   `parse_money_string` (integer math, max 2 decimal places); JSON
//!   numbers are scaled and rounded once at this boundary.
//! - **Encoding**: UTF-8. The `csv` crate handles quoting/escaping.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::exit_codes;
use crate::CliError;

// ── Constants ───────────────────────────────────────────────────────

pub(super) const USER_AGENT: &str = concat!("llens/", env!("CARGO_PKG_VERSION"));

/// Fixed pause between page requests. The upstream reporting API is shared
/// admin infrastructure; this is the only pacing applied (no retry/backoff).
pub(super) const PAGE_DELAY: Duration = Duration::from_millis(500);

// ── Canonical CSV row ───────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(super) struct CanonicalRow {
    pub id: i64,
    pub create_time: String,
    pub before_balance_minor: i64,
    pub balance_minor: i64,
    pub dict_name: String,
}

// ── FetchClient ─────────────────────────────────────────────────────

/// HTTP client that maps upstream status codes to the standard exit codes.
///
/// Each request is a single attempt with a 30 s timeout; the page loop's
/// fixed inter-page delay is the only pacing policy. The adapter owns its
/// token, base URL, and request shape; it passes a request-building closure
/// to [`FetchClient::request`].
pub(super) struct FetchClient {
    pub(super) http: reqwest::blocking::Client,
    source_name: String,
    error_extractor: fn(&serde_json::Value, u16) -> String,
}

impl FetchClient {
    pub(super) fn new(
        source_name: &str,
        error_extractor: fn(&serde_json::Value, u16) -> String,
    ) -> Self {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .expect("failed to build HTTP client");

        Self {
            http,
            source_name: source_name.to_string(),
            error_extractor,
        }
    }

    /// Make one request and parse the JSON response body.
    pub(super) fn request(
        &self,
        build_request: impl Fn(&reqwest::blocking::Client) -> reqwest::blocking::RequestBuilder,
    ) -> Result<serde_json::Value, CliError> {
        let resp = build_request(&self.http).send().map_err(|e| CliError {
            code: exit_codes::EXIT_FETCH_UPSTREAM,
            message: format!("{} request failed: {}", self.source_name, e),
            hint: None,
        })?;

        let status = resp.status().as_u16();

        if status == 401 || status == 403 {
            let body: serde_json::Value = resp.json().unwrap_or(serde_json::Value::Null);
            let msg = (self.error_extractor)(&body, status);
            return Err(CliError {
                code: exit_codes::EXIT_FETCH_AUTH,
                message: format!("{} auth failed ({}): {}", self.source_name, status, msg),
                hint: None,
            });
        }

        if status == 400 {
            let body: serde_json::Value = resp.json().unwrap_or(serde_json::Value::Null);
            let msg = (self.error_extractor)(&body, status);
            return Err(CliError {
                code: exit_codes::EXIT_FETCH_VALIDATION,
                message: format!("{} request rejected ({}): {}", self.source_name, status, msg),
                hint: None,
            });
        }

        if status == 429 {
            return Err(CliError {
                code: exit_codes::EXIT_FETCH_RATE_LIMIT,
                message: format!("{} rate limited (429)", self.source_name),
                hint: Some("lower the page rate or retry later".into()),
            });
        }

        if status >= 400 {
            let body: serde_json::Value = resp.json().unwrap_or(serde_json::Value::Null);
            let msg = (self.error_extractor)(&body, status);
            return Err(CliError {
                code: exit_codes::EXIT_FETCH_UPSTREAM,
                message: format!("{} error ({}): {}", self.source_name, status, msg),
                hint: None,
            });
        }

        // Success: read as text first to tolerate BOM-prefixed responses.
        let text = resp.text().map_err(|e| CliError {
            code: exit_codes::EXIT_FETCH_UPSTREAM,
            message: format!("failed to read {} response body: {}", self.source_name, e),
            hint: None,
        })?;
        let trimmed = text.trim_start_matches('\u{feff}');
        serde_json::from_str(trimmed).map_err(|e| CliError {
            code: exit_codes::EXIT_FETCH_UPSTREAM,
            message: format!(
                "failed to parse {} JSON response: {} (body: {})",
                self.source_name,
                e,
                &trimmed[..trimmed.len().min(200)],
            ),
            hint: None,
        })
    }
}

// ── Shared helpers ──────────────────────────────────────────────────

/// Resolve an API token: flag value > environment variable > error.
pub(super) fn resolve_api_token(
    flag: Option<String>,
    source_name: &str,
    env_var: &str,
) -> Result<String, CliError> {
    if let Some(token) = flag {
        let trimmed = token.trim().to_string();
        if trimmed.is_empty() {
            return Err(CliError {
                code: exit_codes::EXIT_FETCH_NOT_AUTH,
                message: format!(
                    "missing {} token (use --token or set {})",
                    source_name, env_var,
                ),
                hint: None,
            });
        }
        return Ok(trimmed);
    }

    if let Ok(token) = std::env::var(env_var) {
        let trimmed = token.trim().to_string();
        if !trimmed.is_empty() {
            return Ok(trimmed);
        }
    }

    Err(CliError {
        code: exit_codes::EXIT_FETCH_NOT_AUTH,
        message: format!(
            "missing {} token (use --token or set {})",
            source_name, env_var,
        ),
        hint: None,
    })
}

/// Write canonical rows to CSV (file or stdout). Returns the output label
/// for use in progress messages.
pub(super) fn write_csv(
    rows: &[CanonicalRow],
    out: &Option<PathBuf>,
) -> Result<String, CliError> {
    let out_label = out
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "stdout".to_string());

    let writer: Box<dyn Write> = match out {
        Some(path) => {
            let f = std::fs::File::create(path).map_err(|e| {
                CliError::io(format!("cannot create {}: {}", path.display(), e))
            })?;
            Box::new(std::io::BufWriter::new(f))
        }
        None => Box::new(std::io::BufWriter::new(std::io::stdout().lock())),
    };

    let mut csv_writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    // Always write the header, even with zero rows.
    if rows.is_empty() {
        csv_writer
            .write_record([
                "id",
                "create_time",
                "before_balance_minor",
                "balance_minor",
                "dict_name",
            ])
            .map_err(|e| CliError::io(format!("CSV write error: {}", e)))?;
    }

    for row in rows {
        csv_writer
            .serialize(row)
            .map_err(|e| CliError::io(format!("CSV write error: {}", e)))?;
    }

    csv_writer
        .flush()
        .map_err(|e| CliError::io(format!("CSV flush error: {}", e)))?;

    Ok(out_label)
}

// ── Amount parsing (to minor units) ─────────────────────────────────

/// Parse a decimal amount string to i64 minor units (cents).
/// Handles "1234.56", "1234.5", "1234", "-1234.56".
pub(super) fn parse_money_string(s: &str) -> Result<i64, String> {
    let s = s.trim();
    let negative = s.starts_with('-');
    let s = s.trim_start_matches('-');
    let (units, cents) = if let Some(dot) = s.find('.') {
        let u: i64 = s[..dot]
            .parse()
            .map_err(|e| format!("bad units: {}", e))?;
        let frac = &s[dot + 1..];
        let c: i64 = match frac.len() {
            0 => 0,
            1 => {
                frac.parse::<i64>()
                    .map_err(|e| format!("bad cents: {}", e))?
                    * 10
            }
            2 => frac.parse().map_err(|e| format!("bad cents: {}", e))?,
            _ => return Err(format!("too many decimal places: {}", s)),
        };
        (u, c)
    } else {
        (s.parse().map_err(|e| format!("bad amount: {}", e))?, 0)
    };
    let minor = units * 100 + cents;
    Ok(if negative { -minor } else { minor })
}

/// Convert a JSON amount (number or decimal string) to i64 minor units.
/// The upstream reporting API emits balances as JSON numbers with up to
/// 2 decimal places; scaling and rounding happens exactly once, here.
pub(super) fn json_amount_to_cents(value: &serde_json::Value) -> Result<i64, String> {
    match value {
        serde_json::Value::Number(n) => {
            let f = n.as_f64().ok_or_else(|| format!("bad number: {}", n))?;
            Ok((f * 100.0).round() as i64)
        }
        serde_json::Value::String(s) => parse_money_string(s),
        other => Err(format!("not an amount: {}", other)),
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_api_token_flag_priority() {
        let token = resolve_api_token(Some("  token_123  ".into()), "Test", "TEST_TOKEN").unwrap();
        assert_eq!(token, "token_123");
    }

    #[test]
    fn test_resolve_api_token_empty_flag() {
        let err = resolve_api_token(Some("  ".into()), "Test", "TEST_TOKEN").unwrap_err();
        assert_eq!(err.code, exit_codes::EXIT_FETCH_NOT_AUTH);
        assert!(err.message.contains("missing Test token"));
    }

    #[test]
    fn test_resolve_api_token_missing() {
        std::env::remove_var("__LLENS_TEST_TOKEN_MISSING");
        let err = resolve_api_token(None, "Test", "__LLENS_TEST_TOKEN_MISSING").unwrap_err();
        assert_eq!(err.code, exit_codes::EXIT_FETCH_NOT_AUTH);
    }

    #[test]
    fn test_parse_money_string() {
        assert_eq!(parse_money_string("1080.47").unwrap(), 108047);
        assert_eq!(parse_money_string("0.01").unwrap(), 1);
        assert_eq!(parse_money_string("100").unwrap(), 10000);
        assert_eq!(parse_money_string("0").unwrap(), 0);
        assert_eq!(parse_money_string("0.00").unwrap(), 0);
        assert_eq!(parse_money_string("-500.25").unwrap(), -50025);
        assert_eq!(parse_money_string("10.5").unwrap(), 1050);
        assert_eq!(parse_money_string("100.").unwrap(), 10000);
        assert_eq!(parse_money_string("  42  ").unwrap(), 4200);
        assert!(parse_money_string("10.123").is_err());
        assert!(parse_money_string("abc").is_err());
    }

    #[test]
    fn test_json_amount_number() {
        assert_eq!(json_amount_to_cents(&serde_json::json!(1080.47)).unwrap(), 108047);
        assert_eq!(json_amount_to_cents(&serde_json::json!(-500.25)).unwrap(), -50025);
        assert_eq!(json_amount_to_cents(&serde_json::json!(100)).unwrap(), 10000);
        // Values that are not exactly representable still land on the cent.
        assert_eq!(json_amount_to_cents(&serde_json::json!(0.1)).unwrap(), 10);
        assert_eq!(json_amount_to_cents(&serde_json::json!(1049.99)).unwrap(), 104999);
    }

    #[test]
    fn test_json_amount_string_and_garbage() {
        assert_eq!(json_amount_to_cents(&serde_json::json!("12.34")).unwrap(), 1234);
        assert!(json_amount_to_cents(&serde_json::json!(null)).is_err());
        assert!(json_amount_to_cents(&serde_json::json!([1])).is_err());
    }
}
