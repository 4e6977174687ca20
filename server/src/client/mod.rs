//! Client for the remote table service.
//!
//! [`TableApi`] is the contract the sync code needs from a document:
//! fetch rows by filter, and add, update or delete them in bulk.
//! [`DocApi`] implements it over HTTP, splitting large batches into
//! requests of at most [`ClientSettings::chunk_size`] records.

mod http;
mod location;

pub use http::*;
pub use location::*;

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use tablesync_engine::{Filter, Record, RowId, DEFAULT_CHUNK_SIZE};

use crate::error::Result;

/// Default timeout applied to every remote request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Operations on the tables of one remote document.
#[async_trait]
pub trait TableApi: Send + Sync {
    /// Fetch all rows of `table`, or only those matching `filter`.
    async fn fetch(&self, table: &str, filter: Option<&Filter>) -> Result<Vec<Record>>;

    /// Create rows, returning their new ids in input order.
    async fn add(&self, table: &str, records: &[Record]) -> Result<Vec<RowId>>;

    /// Patch existing rows. Every record must carry its `id`.
    async fn update(&self, table: &str, records: &[Record]) -> Result<()>;

    /// Remove rows by id.
    async fn delete(&self, table: &str, ids: &[RowId]) -> Result<()>;

    /// Display name of the document.
    async fn doc_name(&self) -> Result<String>;

    /// Client for another document, sharing this client's settings.
    fn open_doc(&self, location: &DocLocation) -> Self
    where
        Self: Sized;
}

/// Credentials and batching settings shared by all document clients.
#[derive(Clone)]
pub struct ClientSettings {
    /// Bearer token for the remote service
    pub api_key: String,
    /// Maximum records per request
    pub chunk_size: usize,
    /// Log mutating requests instead of sending them
    pub dry_run: bool,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ClientSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            dry_run: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the maximum records per request (at least one).
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSettings")
            .field("api_key", &"***")
            .field("chunk_size", &self.chunk_size)
            .field("dry_run", &self.dry_run)
            .field("timeout", &self.timeout)
            .finish()
    }
}
