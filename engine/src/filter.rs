//! Row filters: column identifiers mapped to acceptable values.

use crate::{key::KeyPart, CellValue, ColumnId, Error, Record, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A record matches when, for every filtered column, its value is one of the
/// listed values. Columns absent from the filter impose no constraint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filter {
    columns: BTreeMap<ColumnId, Vec<CellValue>>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter on a single column.
    pub fn by(column: impl Into<ColumnId>, values: impl IntoIterator<Item = CellValue>) -> Self {
        Self::new().with(column, values)
    }

    /// Builder-style: accept `values` for `column`.
    pub fn with(
        mut self,
        column: impl Into<ColumnId>,
        values: impl IntoIterator<Item = CellValue>,
    ) -> Self {
        self.columns
            .entry(column.into())
            .or_default()
            .extend(values);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &ColumnId> {
        self.columns.keys()
    }

    /// Membership test. A column missing from the record counts as null.
    pub fn matches(&self, record: &Record) -> bool {
        self.columns.iter().all(|(column, accepted)| {
            let value = record
                .get(column)
                .map(KeyPart::from)
                .unwrap_or(KeyPart::Null);
            accepted.iter().any(|v| KeyPart::from(v) == value)
        })
    }

    /// Reject filters that constrain a column outside the key.
    ///
    /// Filtering on a non-key column would let rows outside the filtered
    /// subset pair up with rows inside it.
    pub fn check_against_key(&self, key_columns: &[ColumnId]) -> Result<()> {
        match self.columns().find(|c| !key_columns.contains(c)) {
            Some(column) => Err(Error::FilterColumnNotKey(column.clone())),
            None => Ok(()),
        }
    }

    /// JSON text used as the `filter` query parameter.
    pub fn to_query(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
