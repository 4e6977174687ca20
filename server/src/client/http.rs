//! HTTP implementation of [`TableApi`].

use async_trait::async_trait;
use reqwest::{header, Client, Method, Url};
use serde_json::{json, Value};
use std::sync::Arc;
use tablesync_engine::batch::request_count;
use tablesync_engine::{
    chunks, from_columns, group_by_columns, runs_by_columns, to_columns, Filter, Record, RowId,
};
use tracing::{debug, info};

use super::{ClientSettings, DocLocation, TableApi};
use crate::config::ConfigError;
use crate::error::{AppError, Result};

/// Client for one remote document.
///
/// Cloning is cheap: clones share the connection pool and settings.
#[derive(Debug, Clone)]
pub struct DocApi {
    http: Client,
    settings: Arc<ClientSettings>,
    location: DocLocation,
}

impl DocApi {
    /// Create a client for the document at `location`.
    pub fn new(
        location: DocLocation,
        settings: ClientSettings,
    ) -> std::result::Result<Self, ConfigError> {
        let http = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            http,
            settings: Arc::new(settings),
            location,
        })
    }

    pub fn location(&self) -> &DocLocation {
        &self.location
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    fn table_url(&self, table: &str) -> Url {
        self.location.endpoint(&["tables", table, "data"])
    }

    /// Send a request and decode the JSON reply. An empty body decodes as null.
    async fn call(
        &self,
        method: Method,
        url: Url,
        query: Option<(&str, String)>,
        body: Option<&Value>,
    ) -> Result<Value> {
        debug!(method = %method, url = %url, "Sending request");

        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .header(header::ACCEPT, "application/json")
            .bearer_auth(&self.settings.api_key);
        if let Some(pair) = query {
            request = request.query(&[pair]);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(AppError::Remote(format!(
                "{method} {url} failed with {status}: {}",
                text.trim()
            )));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| AppError::Remote(format!("{method} {url} returned invalid JSON: {e}")))
    }

    /// Send a request that changes remote state, unless in dry-run mode.
    ///
    /// Returns `None` when the request was only logged.
    async fn mutate(&self, method: Method, url: Url, body: Value) -> Result<Option<Value>> {
        if self.settings.dry_run {
            info!(method = %method, url = %url, body = %body, "DRY RUN: not sending request");
            return Ok(None);
        }
        self.call(method, url, None, Some(&body)).await.map(Some)
    }
}

#[async_trait]
impl TableApi for DocApi {
    async fn fetch(&self, table: &str, filter: Option<&Filter>) -> Result<Vec<Record>> {
        let query = filter.map(|f| ("filter", f.to_query()));
        let payload = self
            .call(Method::GET, self.table_url(table), query, None)
            .await?;
        let records = from_columns(payload)?;
        debug!(table, rows = records.len(), "Fetched rows");
        Ok(records)
    }

    async fn add(&self, table: &str, records: &[Record]) -> Result<Vec<RowId>> {
        let mut ids = Vec::with_capacity(records.len());
        for run in runs_by_columns(records) {
            for chunk in chunks(run, self.settings.chunk_size) {
                info!(table, rows = chunk.len(), "Adding rows");
                let body = Value::Object(to_columns(chunk));
                let Some(reply) = self.mutate(Method::POST, self.table_url(table), body).await?
                else {
                    continue;
                };
                let new_ids: Vec<RowId> = serde_json::from_value(reply).map_err(|e| {
                    AppError::Remote(format!("add to {table} returned unexpected ids: {e}"))
                })?;
                if new_ids.len() != chunk.len() {
                    return Err(AppError::Remote(format!(
                        "add to {table} returned {} ids for {} rows",
                        new_ids.len(),
                        chunk.len()
                    )));
                }
                ids.extend(new_ids);
            }
        }
        Ok(ids)
    }

    async fn update(&self, table: &str, records: &[Record]) -> Result<()> {
        for record in records {
            record.require_id()?;
        }
        for (columns, group) in group_by_columns(records) {
            for chunk in chunks(&group, self.settings.chunk_size) {
                info!(table, rows = chunk.len(), ?columns, "Updating rows");
                let body = Value::Object(to_columns(chunk));
                self.mutate(Method::PATCH, self.table_url(table), body)
                    .await?;
            }
        }
        Ok(())
    }

    async fn delete(&self, table: &str, ids: &[RowId]) -> Result<()> {
        if !ids.is_empty() {
            debug!(
                table,
                requests = request_count(ids.len(), self.settings.chunk_size),
                "Removing {} rows",
                ids.len()
            );
        }
        for chunk in chunks(ids, self.settings.chunk_size) {
            info!(table, rows = chunk.len(), "Removing rows");
            let body = json!([["BulkRemoveRecord", table, chunk]]);
            self.mutate(Method::POST, self.location.endpoint(&["apply"]), body)
                .await?;
        }
        Ok(())
    }

    async fn doc_name(&self) -> Result<String> {
        let doc = self
            .call(Method::GET, self.location.endpoint(&[]), None, None)
            .await?;
        doc.get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                AppError::Remote(format!("document {} has no name", self.location.doc_id))
            })
    }

    fn open_doc(&self, location: &DocLocation) -> Self {
        Self {
            http: self.http.clone(),
            settings: Arc::clone(&self.settings),
            location: location.clone(),
        }
    }
}
