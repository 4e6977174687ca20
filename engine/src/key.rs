//! Composite keys pairing source rows with target rows.

use crate::{CellValue, ColumnId, Error, Record, Result};
use std::fmt;

/// One component of a [`Key`].
///
/// Numbers are normalized so that `7` and `7.0` produce the same part, and
/// composites are compared through their JSON text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyPart {
    Null,
    Bool(bool),
    Int(i64),
    /// Bit pattern of a non-integral float
    Float(u64),
    Text(String),
    Composite(String),
}

impl From<&CellValue> for KeyPart {
    fn from(value: &CellValue) -> Self {
        match value {
            CellValue::Null => KeyPart::Null,
            CellValue::Bool(b) => KeyPart::Bool(*b),
            CellValue::Int(n) => KeyPart::Int(*n),
            CellValue::Float(f) => match value.as_i64() {
                Some(n) => KeyPart::Int(n),
                // -0.0 and 0.0 are caught above as integral
                None => KeyPart::Float(f.to_bits()),
            },
            CellValue::Text(s) => KeyPart::Text(s.clone()),
            CellValue::Composite(v) => KeyPart::Composite(v.to_string()),
        }
    }
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPart::Null => write!(f, "null"),
            KeyPart::Bool(b) => write!(f, "{b}"),
            KeyPart::Int(n) => write!(f, "{n}"),
            KeyPart::Float(bits) => write!(f, "{}", f64::from_bits(*bits)),
            KeyPart::Text(s) => write!(f, "{s:?}"),
            KeyPart::Composite(s) => write!(f, "{s}"),
        }
    }
}

/// Ordered tuple of key column values extracted from a record.
///
/// Two records with equal keys are the same logical row, whatever their
/// other columns hold.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(Vec<KeyPart>);

impl Key {
    /// Key of a fetched row; columns the row lacks count as null.
    pub fn lenient(record: &Record, key_columns: &[ColumnId]) -> Self {
        Key(key_columns
            .iter()
            .map(|c| record.get(c).map(KeyPart::from).unwrap_or(KeyPart::Null))
            .collect())
    }

    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{part}")?;
        }
        write!(f, "]")
    }
}

/// Extract the key of `record` for the given key columns, in order.
///
/// Fails when the record lacks one of the key columns.
pub fn make_key(record: &Record, key_columns: &[ColumnId]) -> Result<Key> {
    key_columns
        .iter()
        .map(|c| {
            record
                .get(c)
                .map(KeyPart::from)
                .ok_or_else(|| Error::MissingKeyColumn(c.clone()))
        })
        .collect::<Result<Vec<_>>>()
        .map(Key)
}
