use std::fmt;

use chrono::{NaiveDateTime, Timelike};
use ordered_float::OrderedFloat;
use serde::Serialize;

use crate::config::MergePolicy;
use crate::quality::FieldScore;

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// A non-null scalar held by a table cell.
///
/// Numbers wrap `OrderedFloat` so cells can be hashed and compared when
/// they take part in a group key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Number(OrderedFloat<f64>),
    Date(NaiveDateTime),
}

/// A nullable value. `None` is null.
pub type Cell = Option<Value>;

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn number(n: f64) -> Self {
        Self::Number(OrderedFloat(n))
    }

    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Date(dt) => Some(*dt),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s}"),
            Self::Number(n) => {
                let n = n.into_inner();
                if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", n as i64)
                } else {
                    write!(f, "{n}")
                }
            }
            Self::Date(dt) => {
                if dt.num_seconds_from_midnight() == 0 && dt.nanosecond() == 0 {
                    write!(f, "{}", dt.format("%Y-%m-%d"))
                } else {
                    // Sub-second digits only when present
                    write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%.f"))
                }
            }
        }
    }
}

/// Date held by a cell, if any. Non-date values count as null.
pub fn cell_date(cell: &Cell) -> Option<NaiveDateTime> {
    cell.as_ref().and_then(Value::as_date)
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// One input row. Cells are addressed by column index into the owning table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub cells: Vec<Cell>,
}

impl Record {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    pub fn get(&self, idx: usize) -> &Cell {
        &self.cells[idx]
    }
}

/// Ordered columns plus ordered rows. A row's position is its original
/// input position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row, padding or truncating it to the column count.
    pub fn push(&mut self, mut cells: Vec<Cell>) {
        cells.resize(self.columns.len(), None);
        self.rows.push(Record::new(cells));
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at (row, column name). `None` when the column does not exist.
    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| r.get(idx))
    }
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Ordered tuple of key-field cells. Null equals null.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey(pub Vec<Cell>);

/// Records sharing one key tuple, in original input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub key: GroupKey,
    pub members: Vec<usize>,
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ResolveMeta {
    pub engine_version: String,
    pub run_at: String,
    pub policy: MergePolicy,
    pub threshold: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolveSummary {
    pub input_rows: usize,
    pub groups: usize,
    pub merged_groups: usize,
    pub golden_rows: usize,
    pub dates_nulled: usize,
    pub dropped_groups: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolveResult {
    pub meta: ResolveMeta,
    pub summary: ResolveSummary,
    pub key_fields: Vec<String>,
    pub scores: Vec<FieldScore>,
    #[serde(skip)]
    pub golden: Table,
}
