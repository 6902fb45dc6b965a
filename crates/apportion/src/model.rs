use std::fmt;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// A single cell value used for group keys and tie-break keys.
///
/// Ordering is total: values of different kinds order by kind first
/// (Null < Bool < Int < Float < Text), then by value. Equality is by kind
/// too, so `Int(1)` and `Float(1.0)` are distinct keys; see
/// [`Value::normalized`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(OrderedFloat<f64>),
    Text(String),
}

impl Value {
    /// Numeric view of the value. Text, Bool and Null are not numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(f.0),
            _ => None,
        }
    }

    /// Integer view: `Int` as-is, `Float` only when finite with no fractional part.
    pub fn as_exact_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Float(f) if f.0.is_finite() && f.0.fract() == 0.0 => {
                if f.0 >= i64::MIN as f64 && f.0 < i64::MAX as f64 {
                    Some(f.0 as i64)
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

impl Value {
    /// Integral floats in `i64` range become `Int`; everything else is kept.
    pub fn normalized(self) -> Value {
        match self.as_exact_i64() {
            Some(n) if matches!(self, Value::Float(_)) => Value::Int(n),
            _ => self,
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(OrderedFloat(f))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{}", x.0),
            Value::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Tuple of values over the grouping dimensions. Empty = the global group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupKey(pub Vec<Value>);

impl GroupKey {
    pub fn global() -> Self {
        Self(Vec::new())
    }

    pub fn is_global(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V: Into<Value>> FromIterator<V> for GroupKey {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_global() {
            return write!(f, "(global)");
        }
        write!(f, "(")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{v}")?;
        }
        write!(f, ")")
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One input row.
///
/// Every record sharing a `group_key` is expected to carry the same `total`.
/// `tie_break` is optional; when absent the record's input index is used.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub group_key: GroupKey,
    pub total: i64,
    pub weight: f64,
    pub tie_break: Option<Value>,
}

impl Record {
    /// Record in the global group.
    pub fn new(total: i64, weight: f64) -> Self {
        Self {
            group_key: GroupKey::global(),
            total,
            weight,
            tie_break: None,
        }
    }

    pub fn in_group(mut self, key: GroupKey) -> Self {
        self.group_key = key;
        self
    }

    pub fn with_tie_break(mut self, key: impl Into<Value>) -> Self {
        self.tie_break = Some(key.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Derived per-record parts
// ---------------------------------------------------------------------------

/// `ideal = weight * total`, split into its floor and fractional remainder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parts {
    pub ideal: f64,
    pub floor: i64,
    pub remainder: f64,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Result of one allocation call: one assigned total per input record, in
/// input order, plus the diagnostics gathered along the way.
#[derive(Debug, Clone, Serialize)]
pub struct Allocation {
    pub assigned: Vec<i64>,
    pub report: AllocationReport,
}

impl Allocation {
    pub fn into_assigned(self) -> Vec<i64> {
        self.assigned
    }

    /// True when every group received exactly its requested total.
    pub fn is_exact(&self) -> bool {
        self.report.shortfalls.is_empty()
            && self.report.groups.iter().all(|g| g.assigned_sum == g.total)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AllocationReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub summary: ReportSummary,
    /// Per-group summaries in first-observed group order.
    pub groups: Vec<GroupSummary>,
    pub shortfalls: Vec<Shortfall>,
    pub tie_collisions: Vec<TieCollision>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub key: GroupKey,
    pub total: i64,
    pub record_count: usize,
    pub sum_floor: i64,
    /// `total - sum_floor`. Zero or negative means nothing was topped up.
    pub deficit: i64,
    /// Records that received the extra unit.
    pub topped_up: usize,
    pub assigned_sum: i64,
}

impl GroupSummary {
    /// Units requested but not assignable because the deficit exceeded the
    /// number of records.
    pub fn shortfall(&self) -> i64 {
        self.deficit.saturating_sub(self.record_count as i64).max(0)
    }
}

/// A group whose deficit exceeded its record count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shortfall {
    pub key: GroupKey,
    pub requested: i64,
    pub assigned: i64,
    pub missing: i64,
}

/// A resolved tie-break key shared by more than one record of a group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TieCollision {
    pub key: GroupKey,
    pub tie_break: Value,
    pub record_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportSummary {
    pub total_groups: usize,
    pub total_records: usize,
    pub adjusted_records: usize,
    pub exact_groups: usize,
    pub short_groups: usize,
    /// Groups whose floors already exceed the requested total.
    pub over_floored_groups: usize,
}
