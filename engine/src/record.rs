//! Record types for table rows.

use crate::{CellValue, ColumnId, Error, Result, RowId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of the column holding the remote row identifier.
pub const ID_COLUMN: &str = "id";

/// A table row: column identifiers mapped to cell values.
///
/// Columns are kept sorted, so two records with the same columns iterate in
/// the same order no matter how they were built.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    cells: BTreeMap<ColumnId, CellValue>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, column: impl Into<ColumnId>, value: impl Into<CellValue>) -> Self {
        self.insert(column, value);
        self
    }

    /// Set a cell, returning the previous value.
    pub fn insert(
        &mut self,
        column: impl Into<ColumnId>,
        value: impl Into<CellValue>,
    ) -> Option<CellValue> {
        self.cells.insert(column.into(), value.into())
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells.get(column)
    }

    pub fn remove(&mut self, column: &str) -> Option<CellValue> {
        self.cells.remove(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.cells.contains_key(column)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterate over cells in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&ColumnId, &CellValue)> {
        self.cells.iter()
    }

    /// The remote row id, if the record has been created remotely.
    ///
    /// A missing, null or zero `id` means "not yet created".
    pub fn id(&self) -> Option<RowId> {
        self.get(ID_COLUMN)
            .and_then(CellValue::as_i64)
            .filter(|id| *id > 0)
    }

    /// The row id, failing when it is missing or not a positive integer.
    pub fn require_id(&self) -> Result<RowId> {
        match self.get(ID_COLUMN) {
            None => Err(Error::InvalidRowId("missing".to_string())),
            Some(value) => value
                .as_i64()
                .filter(|id| *id > 0)
                .ok_or_else(|| Error::InvalidRowId(value.to_json().to_string())),
        }
    }

    /// Sorted identifiers of all columns other than `id`.
    pub fn column_set(&self) -> Vec<ColumnId> {
        self.cells
            .keys()
            .filter(|c| c.as_str() != ID_COLUMN)
            .cloned()
            .collect()
    }

    /// Copy of this record restricted to the given columns.
    ///
    /// Columns the record lacks are skipped.
    pub fn project<S: AsRef<str>>(&self, columns: &[S]) -> Record {
        let cells = columns
            .iter()
            .filter_map(|c| {
                let c = c.as_ref();
                self.cells.get(c).map(|v| (c.to_string(), v.clone()))
            })
            .collect();
        Record { cells }
    }

    /// Copy of this record without its `id` column.
    pub fn without_id(&self) -> Record {
        let mut record = self.clone();
        record.remove(ID_COLUMN);
        record
    }
}

impl FromIterator<(ColumnId, CellValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (ColumnId, CellValue)>>(iter: I) -> Self {
        Record {
            cells: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Record {
    type Item = (ColumnId, CellValue);
    type IntoIter = std::collections::btree_map::IntoIter<ColumnId, CellValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.into_iter()
    }
}
