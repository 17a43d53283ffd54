//! `llens audit` — config-driven ledger audit.

use std::path::PathBuf;

use clap::Subcommand;

use ledgerlens_recon::{AuditConfig, AuditError, Verdict};

use crate::exit_codes::{
    EXIT_AUDIT_INCONSISTENT, EXIT_AUDIT_INVALID_CONFIG, EXIT_AUDIT_PARSE, EXIT_AUDIT_RUNTIME,
};
use crate::report;
use crate::CliError;

#[derive(Subcommand)]
pub enum AuditCommands {
    /// Run a full audit from a TOML config and a fetched ledger CSV
    #[command(after_help = "\
Examples:
  llens audit run audit.toml --input ledger.csv
  llens audit run audit.toml --input ledger.csv --json
  llens audit run audit.toml --input ledger.csv --output result.json")]
    Run {
        /// Path to the audit .toml config file
        config: PathBuf,

        /// Fetched ledger CSV (canonical columns)
        #[arg(long)]
        input: PathBuf,

        /// Output JSON to stdout instead of the human report
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Validate an audit config without running
    #[command(after_help = "\
Examples:
  llens audit validate audit.toml")]
    Validate {
        /// Path to the audit .toml config file
        config: PathBuf,
    },
}

pub fn cmd_audit(cmd: AuditCommands) -> Result<(), CliError> {
    match cmd {
        AuditCommands::Run { config, input, json, output } => {
            cmd_audit_run(config, input, json, output)
        }
        AuditCommands::Validate { config } => cmd_audit_validate(config),
    }
}

fn audit_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError { code, message: msg.into(), hint: None }
}

/// Map an engine error to its exit code.
fn engine_exit_code(err: &AuditError) -> u8 {
    if err.is_config() {
        EXIT_AUDIT_INVALID_CONFIG
    } else if err.is_structural() {
        EXIT_AUDIT_PARSE
    } else {
        EXIT_AUDIT_RUNTIME
    }
}

fn cmd_audit_run(
    config_path: PathBuf,
    input: PathBuf,
    json_output: bool,
    output_file: Option<PathBuf>,
) -> Result<(), CliError> {
    let config_str = std::fs::read_to_string(&config_path)
        .map_err(|e| audit_err(EXIT_AUDIT_RUNTIME, format!("cannot read config: {e}")))?;
    let config = AuditConfig::from_toml(&config_str)
        .map_err(|e| audit_err(engine_exit_code(&e), e.to_string()))?;

    let csv_data = std::fs::read_to_string(&input).map_err(|e| {
        audit_err(EXIT_AUDIT_RUNTIME, format!("cannot read {}: {e}", input.display()))
    })?;
    let records = ledgerlens_recon::load_csv_rows(&csv_data)
        .map_err(|e| audit_err(engine_exit_code(&e), e.to_string()))?;

    let result = ledgerlens_recon::run(&config, records);

    // JSON output: --output flag, or the config's preset path.
    let json_path = output_file.or_else(|| config.output.json.as_ref().map(PathBuf::from));
    if json_path.is_some() || json_output {
        let json_str = serde_json::to_string_pretty(&result).map_err(|e| {
            audit_err(EXIT_AUDIT_RUNTIME, format!("JSON serialization error: {e}"))
        })?;
        if let Some(ref path) = json_path {
            std::fs::write(path, &json_str).map_err(|e| {
                audit_err(EXIT_AUDIT_RUNTIME, format!("cannot write output: {e}"))
            })?;
            eprintln!("wrote {}", path.display());
        }
        if json_output {
            println!("{json_str}");
        }
    }

    if !json_output {
        report::render(&result, &mut std::io::stdout().lock())
            .map_err(|e| audit_err(EXIT_AUDIT_RUNTIME, format!("report write error: {e}")))?;
    }

    // One-line summary to stderr
    eprintln!(
        "audit '{}': {} records, {} — {} discrepancies across {} pairs, integrity {}",
        result.meta.config_name,
        result.record_count,
        result.verdict,
        result.chain.discrepancy_count,
        result.chain.pairs_checked,
        if result.integrity.consistent { "ok" } else { "MISMATCH" },
    );

    match result.verdict {
        Verdict::Inconsistent => Err(audit_err(
            EXIT_AUDIT_INCONSISTENT,
            format!(
                "{} balance discrepancies found",
                result.chain.discrepancy_count,
            ),
        )),
        Verdict::Consistent | Verdict::NoData => Ok(()),
    }
}

fn cmd_audit_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config_str = std::fs::read_to_string(&config_path)
        .map_err(|e| audit_err(EXIT_AUDIT_RUNTIME, format!("cannot read config: {e}")))?;

    match AuditConfig::from_toml(&config_str) {
        Ok(config) => {
            let l = &config.labels;
            eprintln!(
                "valid: audit '{}' with {} wagering, {} cancellation, {} winnings label(s)",
                config.name,
                l.wagering.len(),
                l.cancellation.len(),
                l.winnings.len(),
            );
            Ok(())
        }
        Err(e) => Err(audit_err(EXIT_AUDIT_INVALID_CONFIG, e.to_string())),
    }
}
