use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::error::AllocError;

pub const DEFAULT_RESULT_COLUMN: &str = "assigned_total";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AllocConfig {
    #[serde(default)]
    pub name: Option<String>,
    pub columns: ColumnMapping,
    #[serde(default)]
    pub policy: AllocOptions,
}

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

/// Which table columns feed the allocation, and where the result goes.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnMapping {
    pub total: String,
    pub weight: String,
    /// Tie-break column. Absent = input order breaks ties.
    #[serde(default)]
    pub tie_break: Option<String>,
    /// Grouping dimensions. Empty = one global group.
    #[serde(default)]
    pub group_by: Vec<String>,
    #[serde(default = "default_result")]
    pub result: String,
}

fn default_result() -> String {
    DEFAULT_RESULT_COLUMN.to_string()
}

impl ColumnMapping {
    pub fn new(total: impl Into<String>, weight: impl Into<String>) -> Self {
        Self {
            total: total.into(),
            weight: weight.into(),
            tie_break: None,
            group_by: Vec::new(),
            result: default_result(),
        }
    }

    /// Every input column the mapping reads, in a fixed order.
    pub fn input_columns(&self) -> impl Iterator<Item = &str> {
        [self.total.as_str(), self.weight.as_str()]
            .into_iter()
            .chain(self.tie_break.as_deref())
            .chain(self.group_by.iter().map(String::as_str))
    }
}

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

/// What to do when records of one group carry different totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalPolicy {
    #[default]
    Reject,
    /// The first record's total in input order is the group total.
    FirstObserved,
}

/// What to do when a group's deficit exceeds its record count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortfallPolicy {
    /// Allocate short, log a warning and list the group in the report.
    #[default]
    Warn,
    Reject,
}

/// What to do when a supplied tie-break key repeats within a group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieKeyPolicy {
    /// Break the duplicate by input order, log a warning and list it in the report.
    #[default]
    Warn,
    Reject,
}

/// Behavioral switches for an allocation call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AllocOptions {
    #[serde(default)]
    pub inconsistent_total: TotalPolicy,
    #[serde(default)]
    pub shortfall: ShortfallPolicy,
    #[serde(default)]
    pub duplicate_tie_key: TieKeyPolicy,
}

impl AllocOptions {
    /// Reject every boundary condition instead of reporting it.
    pub fn strict() -> Self {
        Self {
            inconsistent_total: TotalPolicy::Reject,
            shortfall: ShortfallPolicy::Reject,
            duplicate_tie_key: TieKeyPolicy::Reject,
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl AllocConfig {
    pub fn new(columns: ColumnMapping) -> Self {
        Self {
            name: None,
            columns,
            policy: AllocOptions::default(),
        }
    }

    pub fn from_toml(input: &str) -> Result<Self, AllocError> {
        let config: AllocConfig =
            toml::from_str(input).map_err(|e| AllocError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, AllocError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path)
            .map_err(|e| AllocError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml(&input)
    }

    pub fn options(&self) -> AllocOptions {
        self.policy
    }

    pub fn validate(&self) -> Result<(), AllocError> {
        let cols = &self.columns;

        for name in cols.input_columns().chain([cols.result.as_str()]) {
            if name.trim().is_empty() {
                return Err(AllocError::ConfigValidation(
                    "column names must not be empty".into(),
                ));
            }
        }

        if cols.total == cols.weight {
            return Err(AllocError::ConfigValidation(format!(
                "total and weight must be different columns, both are '{}'",
                cols.total
            )));
        }

        let mut seen = HashSet::new();
        for dim in &cols.group_by {
            if !seen.insert(dim.as_str()) {
                return Err(AllocError::ConfigValidation(format!(
                    "group_by column '{dim}' listed more than once"
                )));
            }
            if *dim == cols.total
                || *dim == cols.weight
                || cols.tie_break.as_deref() == Some(dim.as_str())
            {
                return Err(AllocError::ConfigValidation(format!(
                    "group_by column '{dim}' is also used as total, weight or tie_break"
                )));
            }
        }

        if cols.input_columns().any(|c| c == cols.result) {
            return Err(AllocError::ConfigValidation(format!(
                "result column '{}' would overwrite an input column",
                cols.result
            )));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
