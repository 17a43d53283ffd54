//! `llens fetch` — pull the paginated transaction ledger into canonical CSV.

mod common;
mod report;

use std::path::PathBuf;

use clap::Args;

use crate::CliError;

#[derive(Args)]
#[command(after_help = "\
Examples:
  llens fetch --base-url https://admin.example.net --user c6d22d9c... --out ledger.csv
  llens fetch --base-url https://admin.example.net --user c6d22d9c... --token eyJhbG...
  LEDGERLENS_API_TOKEN=eyJhbG... llens fetch --base-url https://admin.example.net --user c6d22d9c...")]
pub struct FetchArgs {
    /// Reporting API base URL
    #[arg(long, env = "LEDGERLENS_API_URL")]
    pub base_url: String,

    /// Target user id whose ledger to pull
    #[arg(long)]
    pub user: String,

    /// Bearer token (default: LEDGERLENS_API_TOKEN env)
    #[arg(long)]
    pub token: Option<String>,

    /// Records per page
    #[arg(long, default_value_t = 200)]
    pub page_size: u32,

    /// Output CSV file path (default: stdout)
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Suppress progress on stderr
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

pub fn cmd_fetch(args: FetchArgs) -> Result<(), CliError> {
    if args.page_size == 0 {
        return Err(CliError::args("--page-size must be at least 1"));
    }
    report::cmd_fetch_report(args)
}
