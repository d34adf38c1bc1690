use std::collections::HashMap;

use crate::error::ResolveError;
use crate::model::{Group, GroupKey, Table};

/// Resolve key field names to column indices.
pub fn key_indices(table: &Table, key_fields: &[String]) -> Result<Vec<usize>, ResolveError> {
    key_fields
        .iter()
        .map(|name| {
            table
                .column_index(name)
                .ok_or_else(|| ResolveError::MissingRequiredColumn { column: name.clone() })
        })
        .collect()
}

/// Build the key tuple for one row. Cells are cloned, so later changes to
/// the table cannot move a record between groups.
pub fn key_of(table: &Table, row: usize, key_cols: &[usize]) -> GroupKey {
    let record = &table.rows[row];
    GroupKey(key_cols.iter().map(|&c| record.get(c).clone()).collect())
}

/// Partition rows by key tuple.
///
/// Groups come out in order of each key's first appearance; members keep
/// input order. Null equals null.
pub fn group_records(table: &Table, key_fields: &[String]) -> Result<Vec<Group>, ResolveError> {
    let key_cols = key_indices(table, key_fields)?;

    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    let mut groups: Vec<Group> = Vec::new();

    for row in 0..table.len() {
        let key = key_of(table, row, &key_cols);
        match index.get(&key) {
            Some(&g) => groups[g].members.push(row),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(Group {
                    key,
                    members: vec![row],
                });
            }
        }
    }

    Ok(groups)
}
