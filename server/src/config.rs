//! Configuration management for the server.

use reqwest::Url;
use std::env;
use std::time::Duration;

use crate::client::{ClientSettings, DocLocation};

/// Default base address of the remote table service.
pub const DEFAULT_API_SERVER: &str = "https://docs.getgrist.com";

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Base address of the remote table service
    pub api_server: Url,
    /// Document holding the source invoices
    pub source_doc_id: String,
    /// Credentials and batching for the remote client
    pub client: ClientSettings,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from any variable lookup.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = var("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let server = var("API_SERVER").unwrap_or_else(|| DEFAULT_API_SERVER.to_string());
        let api_server =
            Url::parse(&server).map_err(|_| ConfigError::InvalidServerUrl(server.clone()))?;
        if api_server.cannot_be_a_base() {
            return Err(ConfigError::InvalidServerUrl(server));
        }

        let api_key = var("API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let source_doc_id = var("SOURCE_DOC_ID")
            .filter(|d| !d.trim().is_empty())
            .ok_or(ConfigError::MissingSourceDoc)?;

        let mut client = ClientSettings::new(api_key);

        if let Some(size) = var("CHUNK_SIZE") {
            let size: usize = size.parse().map_err(|_| ConfigError::InvalidChunkSize)?;
            if size == 0 {
                return Err(ConfigError::InvalidChunkSize);
            }
            client = client.with_chunk_size(size);
        }

        if let Some(flag) = var("DRY_RUN") {
            client = client.with_dry_run(parse_flag(&flag).ok_or(ConfigError::InvalidDryRun)?);
        }

        if let Some(secs) = var("REQUEST_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|_| ConfigError::InvalidTimeout)?;
            client = client.with_timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            host,
            port,
            api_server,
            source_doc_id,
            client,
        })
    }

    /// Location of the source document.
    pub fn source_location(&self) -> DocLocation {
        DocLocation::new(self.api_server.clone(), self.source_doc_id.clone())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("API_KEY environment variable is required")]
    MissingApiKey,

    #[error("SOURCE_DOC_ID environment variable is required")]
    MissingSourceDoc,

    #[error("Invalid PORT value")]
    InvalidPort,

    #[error("Invalid API_SERVER value: {0}")]
    InvalidServerUrl(String),

    #[error("CHUNK_SIZE must be a positive integer")]
    InvalidChunkSize,

    #[error("Invalid DRY_RUN value")]
    InvalidDryRun,

    #[error("REQUEST_TIMEOUT_SECS must be a whole number of seconds")]
    InvalidTimeout,

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}
