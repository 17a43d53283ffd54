//! Reporting-API adapter: the paginated `listReport` endpoint.

use std::thread;

use crate::exit_codes;
use crate::CliError;

use super::common::{self, CanonicalRow, FetchClient, PAGE_DELAY};
use super::FetchArgs;

// ── Constants ───────────────────────────────────────────────────────

const LIST_REPORT_PATH: &str = "/api/psndoc/listReport";

// ── Internal record representation ──────────────────────────────────

/// One upstream ledger entry, amounts already in minor units.
#[derive(Debug)]
struct RawEntry {
    id: i64,
    create_time: String,
    before_balance_minor: i64,
    balance_minor: i64,
    dict_name: String,
}

// ── Report client ───────────────────────────────────────────────────

pub struct ReportClient {
    client: FetchClient,
    token: String,
    user_id: String,
    base_url: String,
    page_size: u32,
}

impl ReportClient {
    pub fn new(base_url: String, token: String, user_id: String, page_size: u32) -> Self {
        Self {
            client: FetchClient::new("reporting API", extract_report_error),
            token,
            user_id,
            base_url,
            page_size,
        }
    }

    /// Fetch every page of the user's ledger, in upstream id-ascending
    /// order, pausing a fixed delay between page requests.
    fn fetch_all_pages(&self, quiet: bool) -> Result<Vec<RawEntry>, CliError> {
        let mut all_entries = Vec::new();
        let mut page = 1u32;
        let mut total_pages = 1u32;
        let stderr_tty = atty::is(atty::Stream::Stderr);
        let show_progress = !quiet && stderr_tty;

        loop {
            let url = format!("{}{}", self.base_url, LIST_REPORT_PATH);
            let payload = serde_json::json!({
                "sortOrder": "asc",
                "pageSize": self.page_size,
                "pageNumber": page,
                "id": self.user_id,
                "moneyType": "",
                "lot_type": "0",
            });
            let params = [
                ("pageSize".to_string(), self.page_size.to_string()),
                ("pageNumber".to_string(), page.to_string()),
            ];
            let token = self.token.clone();

            let body = self.client.request(|http| {
                http.post(&url)
                    .header("authorization", format!("Bearer {token}"))
                    .header("x-requested-with", "XMLHttpRequest")
                    .query(&params)
                    .json(&payload)
            })?;

            let data = &body["data"];
            let records = data["records"].as_array().ok_or_else(|| CliError {
                code: exit_codes::EXIT_FETCH_UPSTREAM,
                message: "reporting API response missing 'data.records' array".into(),
                hint: None,
            })?;

            if page == 1 {
                total_pages = data["pages"].as_u64().unwrap_or(1) as u32;
                let total_records = data["total"].as_u64().unwrap_or(0);
                if show_progress {
                    eprintln!(
                        "  {} page(s), {} record(s) reported upstream",
                        total_pages, total_records,
                    );
                }
            }

            if show_progress {
                if let (Some(first), Some(last)) = (records.first(), records.last()) {
                    eprintln!(
                        "  page {}/{}: {} records, id {} -> {}, time {} -> {}",
                        page,
                        total_pages,
                        records.len(),
                        first["id"],
                        last["id"],
                        first["create_time"].as_str().unwrap_or("?"),
                        last["create_time"].as_str().unwrap_or("?"),
                    );
                } else {
                    eprintln!("  page {}/{}: 0 records", page, total_pages);
                }
            }

            // An empty page past the first means the upstream window ended
            // early; stop rather than spin through blank pages.
            if records.is_empty() && page > 1 {
                break;
            }

            for item in records {
                all_entries.push(parse_entry(item)?);
            }

            if page >= total_pages {
                break;
            }
            page += 1;
            thread::sleep(PAGE_DELAY);
        }

        Ok(all_entries)
    }
}

// ── Parse a single upstream entry ───────────────────────────────────

fn parse_entry(item: &serde_json::Value) -> Result<RawEntry, CliError> {
    let upstream_err = |msg: String| CliError {
        code: exit_codes::EXIT_FETCH_UPSTREAM,
        message: msg,
        hint: None,
    };

    let id = item["id"]
        .as_i64()
        .or_else(|| item["id"].as_str().and_then(|s| s.parse().ok()))
        .ok_or_else(|| upstream_err(format!("ledger entry missing usable 'id': {}", item["id"])))?;

    let create_time = item["create_time"]
        .as_str()
        .ok_or_else(|| upstream_err(format!("ledger entry {id} missing 'create_time'")))?
        .to_string();

    let dict_name = item["dict_name"]
        .as_str()
        .ok_or_else(|| upstream_err(format!("ledger entry {id} missing 'dict_name'")))?
        .to_string();

    let before_balance_minor = common::json_amount_to_cents(&item["before_balance"])
        .map_err(|e| upstream_err(format!("ledger entry {id}: bad before_balance ({e})")))?;
    let balance_minor = common::json_amount_to_cents(&item["balance"])
        .map_err(|e| upstream_err(format!("ledger entry {id}: bad balance ({e})")))?;

    Ok(RawEntry {
        id,
        create_time,
        before_balance_minor,
        balance_minor,
        dict_name,
    })
}

fn extract_report_error(body: &serde_json::Value, status: u16) -> String {
    body["message"]
        .as_str()
        .or_else(|| body["msg"].as_str())
        .unwrap_or(&format!("HTTP {}", status))
        .to_string()
}

// ── Entry point ─────────────────────────────────────────────────────

pub fn cmd_fetch_report(args: FetchArgs) -> Result<(), CliError> {
    let token = common::resolve_api_token(args.token, "reporting API", "LEDGERLENS_API_TOKEN")?;

    let stderr_tty = atty::is(atty::Stream::Stderr);
    let show_progress = !args.quiet && stderr_tty;

    if show_progress {
        eprintln!("Fetching ledger for user {} (id ascending)...", args.user);
    }

    let client = ReportClient::new(
        args.base_url.trim_end_matches('/').to_string(),
        token,
        args.user,
        args.page_size,
    );
    let mut entries = client.fetch_all_pages(args.quiet)?;

    // Deterministic output: id ascending regardless of upstream page order.
    entries.sort_by_key(|e| e.id);

    let rows: Vec<CanonicalRow> = entries
        .iter()
        .map(|e| CanonicalRow {
            id: e.id,
            create_time: e.create_time.clone(),
            before_balance_minor: e.before_balance_minor,
            balance_minor: e.balance_minor,
            dict_name: e.dict_name.clone(),
        })
        .collect();

    let out_label = common::write_csv(&rows, &args.out)?;

    if show_progress {
        eprintln!("Done: {} records written to {}", rows.len(), out_label);
    }

    Ok(())
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn test_parse_entry_numeric_id() {
        let item = serde_json::json!({
            "id": 9001,
            "create_time": "2024-03-01 09:15:00",
            "before_balance": 1000.00,
            "balance": -250.50,
            "dict_name": "bet"
        });
        let entry = parse_entry(&item).unwrap();
        assert_eq!(entry.id, 9001);
        assert_eq!(entry.before_balance_minor, 100_000);
        assert_eq!(entry.balance_minor, -25_050);
        assert_eq!(entry.dict_name, "bet");
    }

    #[test]
    fn test_parse_entry_string_id() {
        let item = serde_json::json!({
            "id": "9002",
            "create_time": "2024-03-01 09:16:00",
            "before_balance": "749.50",
            "balance": "10",
            "dict_name": "prize"
        });
        let entry = parse_entry(&item).unwrap();
        assert_eq!(entry.id, 9002);
        assert_eq!(entry.before_balance_minor, 74_950);
        assert_eq!(entry.balance_minor, 1_000);
    }

    #[test]
    fn test_parse_entry_missing_fields() {
        let no_id = serde_json::json!({"create_time": "x", "before_balance": 1, "balance": 1, "dict_name": "bet"});
        assert_eq!(parse_entry(&no_id).unwrap_err().code, exit_codes::EXIT_FETCH_UPSTREAM);

        let no_time = serde_json::json!({"id": 1, "before_balance": 1, "balance": 1, "dict_name": "bet"});
        assert!(parse_entry(&no_time).unwrap_err().message.contains("create_time"));

        let no_label = serde_json::json!({"id": 1, "create_time": "x", "before_balance": 1, "balance": 1});
        assert!(parse_entry(&no_label).unwrap_err().message.contains("dict_name"));
    }

    // ── Helpers: build listReport-shaped responses ──────────────────

    fn mock_entry(id: i64, before: f64, delta: f64, dict_name: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "create_time": "2024-03-01 10:00:00",
            "before_balance": before,
            "balance": delta,
            "dict_name": dict_name
        })
    }

    fn list_response(records: Vec<serde_json::Value>, pages: u32, total: u64) -> serde_json::Value {
        serde_json::json!({
            "code": 200,
            "data": {
                "records": records,
                "pages": pages,
                "total": total
            }
        })
    }

    fn test_client(base_url: String) -> ReportClient {
        ReportClient::new(base_url, "test_token".into(), "user_1".into(), 2)
    }

    // ── Pagination across 2 pages ───────────────────────────────────

    #[test]
    fn test_pagination_two_pages() {
        let server = MockServer::start();

        let page1 = server.mock(|when, then| {
            when.method(POST)
                .path("/api/psndoc/listReport")
                .query_param("pageNumber", "1")
                .header("authorization", "Bearer test_token")
                .json_body_includes(r#"{"pageNumber": 1, "id": "user_1"}"#);
            then.status(200)
                .header("content-type", "application/json")
                .json_body(list_response(
                    vec![
                        mock_entry(1, 1000.0, -100.0, "bet"),
                        mock_entry(2, 900.0, -100.0, "bet"),
                    ],
                    2,
                    3,
                ));
        });

        let page2 = server.mock(|when, then| {
            when.method(POST)
                .path("/api/psndoc/listReport")
                .query_param("pageNumber", "2");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(list_response(vec![mock_entry(3, 800.0, 50.0, "prize")], 2, 3));
        });

        let entries = test_client(server.base_url()).fetch_all_pages(true).unwrap();

        page1.assert();
        page2.assert();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].id, 1);
        assert_eq!(entries[2].id, 3);
        assert_eq!(entries[2].balance_minor, 5_000);
    }

    // ── Empty page past the first stops the loop ────────────────────

    #[test]
    fn test_empty_followup_page_stops() {
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(POST)
                .path("/api/psndoc/listReport")
                .query_param("pageNumber", "1");
            then.status(200)
                .json_body(list_response(vec![mock_entry(1, 1000.0, -100.0, "bet")], 3, 5));
        });
        server.mock(|when, then| {
            when.method(POST)
                .path("/api/psndoc/listReport")
                .query_param("pageNumber", "2");
            then.status(200).json_body(list_response(vec![], 3, 5));
        });

        let entries = test_client(server.base_url()).fetch_all_pages(true).unwrap();
        // Page 3 is never requested once page 2 comes back empty.
        assert_eq!(entries.len(), 1);
    }

    // ── Auth failure → exit 51 ──────────────────────────────────────

    #[test]
    fn test_auth_failure_exit_51() {
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(POST).path("/api/psndoc/listReport");
            then.status(401)
                .json_body(serde_json::json!({"message": "token expired"}));
        });

        let err = test_client(server.base_url()).fetch_all_pages(true).unwrap_err();
        assert_eq!(err.code, exit_codes::EXIT_FETCH_AUTH);
        assert!(err.message.contains("token expired"), "message: {}", err.message);
    }

    // ── Rate limit → exit 53 ────────────────────────────────────────

    #[test]
    fn test_rate_limit_exit_53() {
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(POST).path("/api/psndoc/listReport");
            then.status(429).json_body(serde_json::json!({"message": "slow down"}));
        });

        let err = test_client(server.base_url()).fetch_all_pages(true).unwrap_err();
        assert_eq!(err.code, exit_codes::EXIT_FETCH_RATE_LIMIT);
    }

    // ── Malformed envelope → exit 54 ────────────────────────────────

    #[test]
    fn test_malformed_envelope_exit_54() {
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(POST).path("/api/psndoc/listReport");
            then.status(200).json_body(serde_json::json!({"code": 200, "data": {}}));
        });

        let err = test_client(server.base_url()).fetch_all_pages(true).unwrap_err();
        assert_eq!(err.code, exit_codes::EXIT_FETCH_UPSTREAM);
        assert!(err.message.contains("data.records"), "message: {}", err.message);
    }
}
