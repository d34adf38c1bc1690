use std::collections::HashSet;

use serde::Serialize;

use crate::model::{Table, Value};

/// Raw counts for one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnStats {
    pub total: usize,
    pub non_null: usize,
    pub distinct: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldScore {
    pub field: String,
    pub non_null: usize,
    pub distinct: usize,
    /// Percentage of rows where the field is present.
    pub coverage: f64,
    /// Percentage of present values that are distinct.
    pub distinctiveness: f64,
    /// `coverage * distinctiveness / 100`, in [0, 100].
    pub combined: f64,
}

/// Count present and distinct values in one column.
pub fn column_stats(table: &Table, col: usize) -> ColumnStats {
    let mut seen: HashSet<&Value> = HashSet::new();
    let mut non_null = 0;
    for row in &table.rows {
        if let Some(value) = row.get(col) {
            non_null += 1;
            seen.insert(value);
        }
    }
    ColumnStats {
        total: table.len(),
        non_null,
        distinct: seen.len(),
    }
}

/// Score a field from its column statistics.
///
/// A product rather than a mean: a field that is either rare or
/// repetitive scores near zero.
pub fn score_field(field: &str, stats: &ColumnStats) -> FieldScore {
    let coverage = if stats.total > 0 {
        stats.non_null as f64 / stats.total as f64 * 100.0
    } else {
        0.0
    };
    let distinctiveness = if stats.non_null > 0 {
        stats.distinct as f64 / stats.non_null as f64 * 100.0
    } else {
        0.0
    };
    FieldScore {
        field: field.to_string(),
        non_null: stats.non_null,
        distinct: stats.distinct,
        coverage,
        distinctiveness,
        combined: coverage * distinctiveness / 100.0,
    }
}

/// Score every column, in table column order.
pub fn analyze(table: &Table) -> Vec<FieldScore> {
    table
        .columns
        .iter()
        .enumerate()
        .map(|(col, name)| score_field(name, &column_stats(table, col)))
        .collect()
}
