use std::fmt;

#[derive(Debug)]
pub enum AuditError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (overlapping label sets, etc.).
    ConfigValidation(String),
    /// Missing required column in input data.
    MissingColumn { column: String },
    /// A row is missing a required field value.
    MissingField { row: usize, field: &'static str },
    /// Record id is not a valid integer.
    IdParse { row: usize, value: String },
    /// Amount is not a valid minor-unit integer.
    AmountParse { row: usize, field: &'static str, value: String },
    /// IO error (file read, CSV decode).
    Io(String),
}

impl fmt::Display for AuditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MissingColumn { column } => write!(f, "missing column '{column}'"),
            Self::MissingField { row, field } => {
                write!(f, "row {row}: missing required field '{field}'")
            }
            Self::IdParse { row, value } => {
                write!(f, "row {row}: cannot parse id '{value}'")
            }
            Self::AmountParse { row, field, value } => {
                write!(f, "row {row}: cannot parse {field} '{value}' as minor units")
            }
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for AuditError {}

impl AuditError {
    /// Whether this error originates in the audit config rather than the data.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::ConfigParse(_) | Self::ConfigValidation(_))
    }

    /// Whether this error means the input batch is structurally unusable.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::MissingColumn { .. }
                | Self::MissingField { .. }
                | Self::IdParse { .. }
                | Self::AmountParse { .. }
        )
    }
}
