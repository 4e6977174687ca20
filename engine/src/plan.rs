//! Sync planning: diffing source records against a target table.
//!
//! Given the rows currently in a target table and the rows that should be
//! there, this module computes the updates and additions that bring the
//! target in line. It never plans deletions; [`obsolete_ids`] finds rows the
//! caller may remove as a separate step.
//!
//! # Algorithm
//!
//! 1. Check that every filter column is a key column
//! 2. Index existing rows by key (later rows win on collision)
//! 3. For each source row, in order: skip it if it fails the filter,
//!    otherwise look up its key
//! 4. Matched rows yield an update with only the changed columns;
//!    unmatched rows yield an addition
//! 5. Apply updates first, then additions

use crate::{
    key::{make_key, Key},
    record::ID_COLUMN,
    ColumnId, Filter, Record, Result, RowId,
};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// The operations needed to align one target table with its source.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPlan {
    /// Existing rows to patch: `id` plus only the changed columns
    pub updates: Vec<Record>,
    /// New rows, without `id`
    pub additions: Vec<Record>,
    /// Source rows that matched a target row with identical values
    pub unchanged: usize,
    /// Source rows skipped because they fail the filter
    pub filtered_out: usize,
}

impl SyncPlan {
    /// Whether applying the plan would send nothing.
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.additions.is_empty()
    }

    /// Row id and changed column names of each planned update.
    pub fn changed_columns(&self) -> impl Iterator<Item = (RowId, Vec<ColumnId>)> + '_ {
        self.updates
            .iter()
            .map(|u| (u.id().unwrap_or_default(), u.column_set()))
    }
}

impl fmt::Display for SyncPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} updates, {} new, {} unchanged ({} filtered out)",
            self.updates.len(),
            self.additions.len(),
            self.unchanged,
            self.filtered_out
        )
    }
}

/// Builds a [`SyncPlan`] for one table.
pub struct Planner<'a> {
    key_columns: &'a [ColumnId],
    filter: Option<&'a Filter>,
    /// Existing rows by key
    target: HashMap<Key, Record>,
}

impl<'a> Planner<'a> {
    /// Create a planner, rejecting filters on non-key columns.
    pub fn new(key_columns: &'a [ColumnId], filter: Option<&'a Filter>) -> Result<Self> {
        if let Some(filter) = filter {
            filter.check_against_key(key_columns)?;
        }
        Ok(Self {
            key_columns,
            filter,
            target: HashMap::new(),
        })
    }

    /// Index existing target rows. A later row replaces an earlier one with
    /// the same key.
    pub fn load_existing(&mut self, records: impl IntoIterator<Item = Record>) {
        for record in records {
            let key = Key::lenient(&record, self.key_columns);
            self.target.insert(key, record);
        }
    }

    /// Diff `source` against the loaded rows.
    ///
    /// Each source row is compared with the loaded rows only, so a
    /// duplicate key in `source` replaces the plan entry of the earlier row.
    pub fn plan(self, source: &[Record]) -> Result<SyncPlan> {
        let mut plan = SyncPlan::default();
        let mut updates: Vec<Option<Record>> = Vec::new();
        let mut additions: Vec<Record> = Vec::new();
        let mut update_slots: HashMap<RowId, usize> = HashMap::new();
        let mut addition_slots: HashMap<Key, usize> = HashMap::new();

        for record in source {
            if let Some(filter) = self.filter {
                if !filter.matches(record) {
                    plan.filtered_out += 1;
                    continue;
                }
            }

            let key = make_key(record, self.key_columns)?;

            match self.target.get(&key) {
                Some(existing) => {
                    let id = existing.id().unwrap_or_default();
                    let update = diff_row(existing, record);
                    if update.is_none() {
                        plan.unchanged += 1;
                    }
                    match update_slots.get(&id) {
                        Some(&slot) => updates[slot] = update,
                        None => {
                            update_slots.insert(id, updates.len());
                            updates.push(update);
                        }
                    }
                }
                None => {
                    let addition = record.without_id();
                    match addition_slots.get(&key) {
                        Some(&slot) => additions[slot] = addition,
                        None => {
                            addition_slots.insert(key, additions.len());
                            additions.push(addition);
                        }
                    }
                }
            }
        }

        plan.updates = updates.into_iter().flatten().collect();
        plan.additions = additions;
        Ok(plan)
    }
}

/// Update for `existing` carrying only the cells of `source` that differ,
/// or `None` when nothing changed.
fn diff_row(existing: &Record, source: &Record) -> Option<Record> {
    let mut update = Record::new();
    for (column, value) in source.iter() {
        if column == ID_COLUMN {
            continue;
        }
        let unchanged = existing
            .get(column)
            .is_some_and(|current| current.same_as(value));
        if !unchanged {
            update.insert(column.clone(), value.clone());
        }
    }
    if update.is_empty() {
        return None;
    }
    if let Some(id) = existing.get(ID_COLUMN) {
        update.insert(ID_COLUMN, id.clone());
    }
    Some(update)
}

/// Plan the sync of `source` into a table currently holding `existing`.
pub fn plan_sync(
    existing: Vec<Record>,
    source: &[Record],
    key_columns: &[ColumnId],
    filter: Option<&Filter>,
) -> Result<SyncPlan> {
    let mut planner = Planner::new(key_columns, filter)?;
    planner.load_existing(existing);
    planner.plan(source)
}

/// Ids of `existing` rows whose key appears nowhere in `synced`.
///
/// Returned in the order of `existing`. Rows without an id are ignored.
pub fn obsolete_ids(
    existing: &[Record],
    synced: &[Record],
    key_columns: &[ColumnId],
) -> Result<Vec<RowId>> {
    let kept: HashSet<Key> = synced
        .iter()
        .map(|r| make_key(r, key_columns))
        .collect::<Result<_>>()?;

    Ok(existing
        .iter()
        .filter(|r| !kept.contains(&Key::lenient(r, key_columns)))
        .filter_map(Record::id)
        .collect())
}
