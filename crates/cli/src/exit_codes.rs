//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, missing file) |
//! | 3-9     | audit            | Ledger-audit-specific codes              |
//! | 50-59   | fetch            | Reporting-API connector codes            |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors. A ledger with nothing to
/// analyze ("no data") is a success, not a failure.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Audit (3-9)
// =============================================================================

/// Balance chain has discontinuities (consistency check failed).
pub const EXIT_AUDIT_INCONSISTENT: u8 = 3;

/// Audit config failed to parse or validate.
pub const EXIT_AUDIT_INVALID_CONFIG: u8 = 4;

/// Input batch is structurally unusable (missing id/create_time/dict_name,
/// unparsable amount). The whole run aborts.
pub const EXIT_AUDIT_PARSE: u8 = 5;

/// Runtime error during an audit (file IO, serialization).
pub const EXIT_AUDIT_RUNTIME: u8 = 6;

// =============================================================================
// Fetch (50-59) — reporting-API connector
// =============================================================================

/// No API token provided (neither flag nor env var).
pub const EXIT_FETCH_NOT_AUTH: u8 = 50;

/// Auth rejected by upstream (401/403).
pub const EXIT_FETCH_AUTH: u8 = 51;

/// Bad request rejected by upstream (400).
pub const EXIT_FETCH_VALIDATION: u8 = 52;

/// Rate limited by upstream (429).
pub const EXIT_FETCH_RATE_LIMIT: u8 = 53;

/// Upstream error (5xx), malformed response, or network failure.
pub const EXIT_FETCH_UPSTREAM: u8 = 54;
