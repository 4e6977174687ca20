//! In-memory table service shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use reqwest::Url;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tablesync_engine::{Filter, Record, RowId};
use tablesync_server::client::{DocLocation, TableApi};
use tablesync_server::error::{AppError, Result};

#[derive(Default)]
struct Doc {
    name: String,
    tables: HashMap<String, Vec<Record>>,
    next_id: RowId,
}

/// A [`TableApi`] over documents kept in memory.
///
/// Clones and documents opened with [`TableApi::open_doc`] share the same
/// store and call log. As with the HTTP client, empty batches are not sent
/// and leave no trace in the log.
#[derive(Clone)]
pub struct MemoryApi {
    docs: Arc<Mutex<HashMap<String, Doc>>>,
    calls: Arc<Mutex<Vec<String>>>,
    doc_id: String,
}

impl MemoryApi {
    pub fn new(doc_id: &str, name: &str) -> Self {
        let api = Self {
            docs: Arc::default(),
            calls: Arc::default(),
            doc_id: doc_id.to_string(),
        };
        api.create_doc(doc_id, name);
        api
    }

    pub fn create_doc(&self, doc_id: &str, name: &str) {
        self.docs.lock().unwrap().insert(
            doc_id.to_string(),
            Doc {
                name: name.to_string(),
                ..Doc::default()
            },
        );
    }

    /// Client for another document in the same store.
    pub fn doc(&self, doc_id: &str) -> Self {
        let server = Url::parse("https://example.com").unwrap();
        self.open_doc(&DocLocation::new(server, doc_id))
    }

    /// Insert rows directly, bypassing the call log.
    pub fn seed(&self, table: &str, records: Vec<Record>) -> Vec<RowId> {
        let mut docs = self.docs.lock().unwrap();
        let doc = docs.get_mut(&self.doc_id).unwrap();
        insert(doc, table, records)
    }

    /// Current rows of a table, in id order.
    pub fn rows(&self, table: &str) -> Vec<Record> {
        let docs = self.docs.lock().unwrap();
        docs[&self.doc_id]
            .tables
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Mutating calls made so far, as `"<op> <doc>/<table> <rows>"`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn log(&self, op: &str, table: &str, rows: usize) {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{op} {}/{table} {rows}", self.doc_id));
    }

    fn with_doc<T>(&self, f: impl FnOnce(&mut Doc) -> Result<T>) -> Result<T> {
        let mut docs = self.docs.lock().unwrap();
        match docs.get_mut(&self.doc_id) {
            Some(doc) => f(doc),
            None => Err(AppError::Remote(format!(
                "document {} not found",
                self.doc_id
            ))),
        }
    }
}

fn insert(doc: &mut Doc, table: &str, records: Vec<Record>) -> Vec<RowId> {
    let mut ids = Vec::with_capacity(records.len());
    for record in records {
        doc.next_id += 1;
        let row = record.without_id().with("id", doc.next_id);
        doc.tables.entry(table.to_string()).or_default().push(row);
        ids.push(doc.next_id);
    }
    ids
}

#[async_trait]
impl TableApi for MemoryApi {
    async fn fetch(&self, table: &str, filter: Option<&Filter>) -> Result<Vec<Record>> {
        self.with_doc(|doc| {
            let rows = doc.tables.get(table).map(Vec::as_slice).unwrap_or_default();
            Ok(rows
                .iter()
                .filter(|r| filter.map_or(true, |f| f.matches(r)))
                .cloned()
                .collect())
        })
    }

    async fn add(&self, table: &str, records: &[Record]) -> Result<Vec<RowId>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        let ids = self.with_doc(|doc| Ok(insert(doc, table, records.to_vec())))?;
        self.log("add", table, records.len());
        Ok(ids)
    }

    async fn update(&self, table: &str, records: &[Record]) -> Result<()> {
        for record in records {
            record.require_id()?;
        }
        if records.is_empty() {
            return Ok(());
        }
        self.with_doc(|doc| {
            let rows = doc.tables.entry(table.to_string()).or_default();
            for record in records {
                let id = record.require_id()?;
                let row = rows
                    .iter_mut()
                    .find(|r| r.id() == Some(id))
                    .ok_or_else(|| AppError::Remote(format!("no row {id} in {table}")))?;
                for (column, value) in record.iter() {
                    row.insert(column.clone(), value.clone());
                }
            }
            Ok(())
        })?;
        self.log("update", table, records.len());
        Ok(())
    }

    async fn delete(&self, table: &str, ids: &[RowId]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        self.with_doc(|doc| {
            if let Some(rows) = doc.tables.get_mut(table) {
                rows.retain(|r| !r.id().is_some_and(|id| ids.contains(&id)));
            }
            Ok(())
        })?;
        self.log("delete", table, ids.len());
        Ok(())
    }

    async fn doc_name(&self) -> Result<String> {
        self.with_doc(|doc| Ok(doc.name.clone()))
    }

    fn open_doc(&self, location: &DocLocation) -> Self {
        Self {
            docs: Arc::clone(&self.docs),
            calls: Arc::clone(&self.calls),
            doc_id: location.doc_id.clone(),
        }
    }
}
