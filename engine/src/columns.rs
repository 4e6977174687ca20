//! Conversion between row records and the column-oriented wire format.
//!
//! The remote service exchanges tables as one JSON object per request, with
//! one array per column: `{"id": [1, 2], "Name": ["a", "b"]}`.

use crate::{record::ID_COLUMN, CellValue, Error, Record, Result};
use serde_json::{Map, Value};

/// Convert a column-oriented payload into records, one per row.
///
/// The payload must be an object whose `id` entry is an array of positive
/// integers, and every column must have one value per row.
pub fn from_columns(payload: Value) -> Result<Vec<Record>> {
    let columns = match payload {
        Value::Object(columns) => columns,
        other => {
            return Err(Error::MalformedPayload(format!(
                "expected an object of columns, got {}",
                json_kind(&other)
            )))
        }
    };

    let rows = match columns.get(ID_COLUMN) {
        Some(Value::Array(ids)) => {
            if let Some(bad) = ids
                .iter()
                .find(|id| id.as_i64().map_or(true, |id| id <= 0))
            {
                return Err(Error::MalformedPayload(format!(
                    "row id {bad} is not a positive integer"
                )));
            }
            ids.len()
        }
        Some(other) => {
            return Err(Error::MalformedPayload(format!(
                "id column is {}, not an array",
                json_kind(other)
            )))
        }
        None => return Err(Error::MalformedPayload("missing id column".to_string())),
    };

    let mut records = vec![Record::new(); rows];
    for (column, values) in columns {
        let values = match values {
            Value::Array(values) => values,
            other => {
                return Err(Error::MalformedPayload(format!(
                    "column {column} is {}, not an array",
                    json_kind(&other)
                )))
            }
        };
        if values.len() != rows {
            return Err(Error::MalformedPayload(format!(
                "column {column} has {} values for {rows} rows",
                values.len()
            )));
        }
        for (record, value) in records.iter_mut().zip(values) {
            record.insert(column.clone(), CellValue::from(value));
        }
    }
    Ok(records)
}

/// Convert records into a column-oriented payload.
///
/// Columns are the union over all records; a record lacking a column
/// contributes `null`. Callers sending bulk requests pass records that share
/// one column set.
pub fn to_columns(records: &[Record]) -> Map<String, Value> {
    let mut names: Vec<&String> = records
        .iter()
        .flat_map(|r| r.iter().map(|(c, _)| c))
        .collect();
    names.sort();
    names.dedup();

    names
        .into_iter()
        .map(|name| {
            let values = records
                .iter()
                .map(|r| r.get(name).map(CellValue::to_json).unwrap_or(Value::Null))
                .collect();
            (name.clone(), Value::Array(values))
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
