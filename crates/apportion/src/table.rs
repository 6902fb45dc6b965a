//! Named-column adapter.
//!
//! Projects the configured columns of an in-memory table into records,
//! runs the allocation, and returns the table with the result column
//! appended. Intermediate values (ideal, floor, remainder, rank) are not
//! exposed as columns.

use serde::Serialize;

use crate::config::AllocConfig;
use crate::engine::allocate;
use crate::error::AllocError;
use crate::model::{AllocationReport, Record, Value};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

/// Column-oriented table. All columns have the same length.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Table::push_column`].
    pub fn with_column<V: Into<Value>>(
        mut self,
        name: &str,
        values: impl IntoIterator<Item = V>,
    ) -> Result<Self, AllocError> {
        self.push_column(name, values.into_iter().map(Into::into).collect())?;
        Ok(self)
    }

    /// Append a column, replacing any column of the same name.
    pub fn push_column(&mut self, name: &str, values: Vec<Value>) -> Result<(), AllocError> {
        let others = self.columns.iter().filter(|c| c.name != name).count();
        if others > 0 && values.len() != self.row_count() {
            return Err(AllocError::ColumnLength {
                column: name.to_string(),
                expected: self.row_count(),
                found: values.len(),
            });
        }
        let column = Column {
            name: name.to_string(),
            values,
        };
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
        Ok(())
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    fn require(&self, name: &str) -> Result<&[Value], AllocError> {
        self.column(name).ok_or_else(|| AllocError::MissingColumn {
            column: name.to_string(),
        })
    }
}

/// Input table plus the appended result column.
#[derive(Debug, Clone, Serialize)]
pub struct TableAllocation {
    pub table: Table,
    pub report: AllocationReport,
}

/// Allocate over the columns named in `config`.
pub fn allocate_table(table: &Table, config: &AllocConfig) -> Result<TableAllocation, AllocError> {
    config.validate()?;
    let records = project_records(table, config)?;
    let allocation = allocate(&records, &config.options())?;

    let mut out = table.clone();
    out.push_column(
        &config.columns.result,
        allocation.assigned.into_iter().map(Value::Int).collect(),
    )?;

    let mut report = allocation.report;
    report.name = config.name.clone();
    Ok(TableAllocation { table: out, report })
}

/// Build one record per row from the mapped columns.
///
/// Group-by cells are normalized, so `1` and `1.0` fall in the same group.
pub fn project_records(table: &Table, config: &AllocConfig) -> Result<Vec<Record>, AllocError> {
    let cols = &config.columns;
    let totals = table.require(&cols.total)?;
    let weights = table.require(&cols.weight)?;
    let tie_breaks = cols
        .tie_break
        .as_deref()
        .map(|name| table.require(name))
        .transpose()?;
    let dims = cols
        .group_by
        .iter()
        .map(|name| table.require(name))
        .collect::<Result<Vec<_>, _>>()?;

    (0..table.row_count())
        .map(|row| -> Result<Record, AllocError> {
            Ok(Record {
                group_key: dims.iter().map(|d| d[row].clone().normalized()).collect(),
                total: total_cell(&cols.total, row, &totals[row])?,
                weight: weight_cell(&cols.weight, row, &weights[row])?,
                tie_break: tie_breaks.map(|t| t[row].clone()),
            })
        })
        .collect()
}

fn total_cell(column: &str, row: usize, value: &Value) -> Result<i64, AllocError> {
    if value.as_f64().is_none() {
        return Err(AllocError::NonNumeric {
            column: column.to_string(),
            row,
            value: value.to_string(),
        });
    }
    match value.as_exact_i64() {
        Some(total) if total >= 0 => Ok(total),
        _ => Err(AllocError::InvalidTotal {
            row,
            total: value.to_string(),
        }),
    }
}

fn weight_cell(column: &str, row: usize, value: &Value) -> Result<f64, AllocError> {
    value.as_f64().ok_or_else(|| AllocError::NonNumeric {
        column: column.to_string(),
        row,
        value: value.to_string(),
    })
}
