use rayon::prelude::*;

use crate::config::{MergeConfig, MergePolicy, Schema};
use crate::error::ResolveError;
use crate::model::{cell_date, Cell, Group, Record, Table, Value};

// ---------------------------------------------------------------------------
// Roles + reductions
// ---------------------------------------------------------------------------

/// What a column means to the merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    Key,
    CreateDate,
    UpdateDate,
    Attribute,
}

/// How a group's cells for one column collapse into the golden cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    /// Value of the base record.
    FromBase,
    /// Value of the first member in input order.
    FirstOfGroup,
    /// Earliest valid date in the group.
    MinDate,
    /// Latest valid date in the group.
    MaxDate,
    /// First non-null value in input order.
    FirstNonNull,
    /// Base value, or the first non-null value of the other members when
    /// the base is null.
    BaseThenFill,
}

impl MergePolicy {
    pub fn reduction(self, role: FieldRole) -> Reduction {
        match (self, role) {
            (Self::LatestWithFill, FieldRole::Key) => Reduction::FromBase,
            (Self::LatestWithFill, FieldRole::CreateDate) => Reduction::MinDate,
            (Self::LatestWithFill, FieldRole::UpdateDate) => Reduction::MaxDate,
            (Self::LatestWithFill, FieldRole::Attribute) => Reduction::BaseThenFill,
            (Self::FirstValueAggregate, FieldRole::Key) => Reduction::FirstOfGroup,
            (Self::FirstValueAggregate, FieldRole::CreateDate) => Reduction::MinDate,
            (Self::FirstValueAggregate, FieldRole::UpdateDate) => Reduction::MaxDate,
            (Self::FirstValueAggregate, FieldRole::Attribute) => Reduction::FirstNonNull,
        }
    }
}

/// Role of every column, in table column order.
pub fn assign_roles(table: &Table, schema: &Schema, key_fields: &[String]) -> Vec<FieldRole> {
    table
        .columns
        .iter()
        .map(|name| {
            if *name == schema.create_date {
                FieldRole::CreateDate
            } else if *name == schema.update_date {
                FieldRole::UpdateDate
            } else if key_fields.contains(name) {
                FieldRole::Key
            } else {
                FieldRole::Attribute
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Merger
// ---------------------------------------------------------------------------

pub struct Merger {
    policy: MergePolicy,
    drop_undated: bool,
    update_col: usize,
    reductions: Vec<Reduction>,
}

#[derive(Debug, Clone)]
pub struct MergeOutput {
    pub golden: Table,
    pub dropped_groups: usize,
}

impl Merger {
    pub fn new(
        table: &Table,
        schema: &Schema,
        key_fields: &[String],
        config: &MergeConfig,
    ) -> Result<Self, ResolveError> {
        let update_col = table.column_index(&schema.update_date).ok_or_else(|| {
            ResolveError::MissingRequiredColumn {
                column: schema.update_date.clone(),
            }
        })?;

        let reductions = assign_roles(table, schema, key_fields)
            .into_iter()
            .map(|role| config.policy.reduction(role))
            .collect();

        Ok(Self {
            policy: config.policy,
            drop_undated: config.drop_undated_groups,
            update_col,
            reductions,
        })
    }

    /// Member whose fields seed the golden record.
    ///
    /// Latest-with-fill takes the maximum update date; a null date never
    /// beats a valid one and ties go to the earliest input position.
    fn base(&self, table: &Table, members: &[usize]) -> usize {
        match self.policy {
            MergePolicy::FirstValueAggregate => members[0],
            MergePolicy::LatestWithFill => {
                let mut best = members[0];
                let mut best_date = self.update_date(table, best);
                for &m in &members[1..] {
                    let date = self.update_date(table, m);
                    if date > best_date {
                        best = m;
                        best_date = date;
                    }
                }
                best
            }
        }
    }

    fn update_date(&self, table: &Table, row: usize) -> Option<chrono::NaiveDateTime> {
        cell_date(table.rows[row].get(self.update_col))
    }

    /// Collapse one group. `None` when every member was filtered out.
    pub fn merge_group(&self, table: &Table, members: &[usize]) -> Option<Record> {
        let dated: Vec<usize>;
        let members = if self.drop_undated {
            dated = members
                .iter()
                .copied()
                .filter(|&m| self.update_date(table, m).is_some())
                .collect();
            dated.as_slice()
        } else {
            members
        };

        if members.is_empty() {
            return None;
        }

        let base = self.base(table, members);
        let cells = self
            .reductions
            .iter()
            .enumerate()
            .map(|(col, &reduction)| reduce(table, col, reduction, base, members))
            .collect();

        Some(Record::new(cells))
    }

    /// Merge every group, in parallel. Golden rows follow group order.
    pub fn merge_all(&self, table: &Table, groups: &[Group]) -> MergeOutput {
        let merged: Vec<Option<Record>> = groups
            .par_iter()
            .map(|g| self.merge_group(table, &g.members))
            .collect();

        let mut golden = Table::new(table.columns.clone());
        let mut dropped_groups = 0;
        for record in merged {
            match record {
                Some(r) => golden.rows.push(r),
                None => dropped_groups += 1,
            }
        }

        MergeOutput {
            golden,
            dropped_groups,
        }
    }
}

fn reduce(table: &Table, col: usize, reduction: Reduction, base: usize, members: &[usize]) -> Cell {
    let cell = |row: usize| table.rows[row].get(col);
    match reduction {
        Reduction::FromBase => cell(base).clone(),
        Reduction::FirstOfGroup => cell(members[0]).clone(),
        Reduction::MinDate => members.iter().filter_map(|&m| cell_date(cell(m))).min().map(Value::Date),
        Reduction::MaxDate => members.iter().filter_map(|&m| cell_date(cell(m))).max().map(Value::Date),
        Reduction::FirstNonNull => members.iter().find_map(|&m| cell(m).clone()),
        Reduction::BaseThenFill => cell(base)
            .clone()
            .or_else(|| members.iter().filter(|&&m| m != base).find_map(|&m| cell(m).clone())),
    }
}

/// Merge pre-built groups into the golden table.
pub fn merge_groups(
    table: &Table,
    groups: &[Group],
    schema: &Schema,
    key_fields: &[String],
    config: &MergeConfig,
) -> Result<MergeOutput, ResolveError> {
    let merger = Merger::new(table, schema, key_fields, config)?;
    Ok(merger.merge_all(table, groups))
}
