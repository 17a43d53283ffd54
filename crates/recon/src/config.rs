use std::collections::BTreeSet;

use serde::Deserialize;

use crate::error::AuditError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct AuditConfig {
    pub name: String,
    pub labels: LabelConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// Label classification
// ---------------------------------------------------------------------------

/// The three core game-economics buckets. `dict_name` values are an open
/// set; any label outside these sets falls into the generic "other" bucket
/// automatically.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LabelConfig {
    #[serde(default)]
    pub wagering: BTreeSet<String>,
    #[serde(default)]
    pub cancellation: BTreeSet<String>,
    #[serde(default)]
    pub winnings: BTreeSet<String>,
}

impl LabelConfig {
    /// Whether the label belongs to any of the three core sets.
    pub fn is_core(&self, label: &str) -> bool {
        self.wagering.contains(label)
            || self.cancellation.contains(label)
            || self.winnings.contains(label)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub json: Option<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl AuditConfig {
    pub fn from_toml(input: &str) -> Result<Self, AuditError> {
        let config: AuditConfig =
            toml::from_str(input).map_err(|e| AuditError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// A label classified into two sets would double-count in the metrics
    /// formulas, so the sets must be pairwise disjoint.
    pub fn validate(&self) -> Result<(), AuditError> {
        let l = &self.labels;
        let overlaps = [
            ("wagering", "cancellation", l.wagering.intersection(&l.cancellation).next()),
            ("wagering", "winnings", l.wagering.intersection(&l.winnings).next()),
            ("cancellation", "winnings", l.cancellation.intersection(&l.winnings).next()),
        ];
        for (a, b, overlap) in overlaps {
            if let Some(label) = overlap {
                return Err(AuditError::ConfigValidation(format!(
                    "label '{label}' appears in both {a} and {b}"
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
