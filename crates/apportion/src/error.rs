use std::fmt;

use crate::model::{GroupKey, Value};

#[derive(Debug)]
pub enum AllocError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty column name, result column clash, etc.).
    ConfigValidation(String),
    /// IO error (config file read).
    Io(String),
    /// Report serialization error.
    Serialize(String),
    /// Column referenced by the config is not present in the table.
    MissingColumn { column: String },
    /// Column length differs from the table's row count.
    ColumnLength { column: String, expected: usize, found: usize },
    /// Cell that must be numeric is not.
    NonNumeric { column: String, row: usize, value: String },
    /// Weight is NaN or infinite.
    InvalidWeight { row: usize, weight: f64 },
    /// Total is negative or not an integer.
    InvalidTotal { row: usize, total: String },
    /// `weight * total` floors to a value outside the `i64` range.
    IdealOutOfRange { row: usize, weight: f64, total: i64 },
    /// Records of one group disagree on their total.
    InconsistentTotal { group: GroupKey, first: i64, found: i64, row: usize },
    /// Group deficit exceeds its record count.
    UnderAllocation { group: GroupKey, requested: i64, assigned: i64 },
    /// Tie-break key repeated within a group.
    TieBreakCollision { group: GroupKey, key: Value },
    /// A group's floor sum, deficit or assigned sum does not fit in `i64`.
    Overflow { group: GroupKey },
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
            Self::Serialize(msg) => write!(f, "serialization error: {msg}"),
            Self::MissingColumn { column } => write!(f, "missing column '{column}'"),
            Self::ColumnLength { column, expected, found } => {
                write!(f, "column '{column}' has {found} value(s), expected {expected}")
            }
            Self::NonNumeric { column, row, value } => {
                write!(f, "column '{column}', row {row}: '{value}' is not numeric")
            }
            Self::InvalidWeight { row, weight } => {
                write!(f, "row {row}: weight {weight} is not a finite number")
            }
            Self::InvalidTotal { row, total } => {
                write!(f, "row {row}: total '{total}' must be a non-negative integer")
            }
            Self::IdealOutOfRange { row, weight, total } => write!(
                f,
                "row {row}: weight {weight} times total {total} is outside the integer range"
            ),
            Self::InconsistentTotal { group, first, found, row } => write!(
                f,
                "group {group}: row {row} has total {found}, but the group total is {first}"
            ),
            Self::UnderAllocation { group, requested, assigned } => write!(
                f,
                "group {group}: requested {requested} unit(s), only {assigned} assignable"
            ),
            Self::TieBreakCollision { group, key } => {
                write!(f, "group {group}: tie-break key '{key}' is not unique")
            }
            Self::Overflow { group } => {
                write!(f, "group {group}: unit counts overflow a 64-bit integer")
            }
        }
    }
}

impl std::error::Error for AllocError {}
