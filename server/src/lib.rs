//! Tablesync Server - copies invoices between remote table documents.
//!
//! The server exposes two operations per invoice over HTTP: a read-only
//! `copy-info` describing the destination, and `sync`, which reconciles the
//! invoice and its items into the destination document using the
//! tablesync-engine planning logic.

pub mod client;
pub mod config;
pub mod error;
pub mod invoice;
pub mod routes;
pub mod sync;

use crate::client::DocApi;
use crate::config::Config;
use crate::invoice::InvoiceSync;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub invoices: Arc<InvoiceSync<DocApi>>,
}

impl AppState {
    pub fn new(config: Config, source: DocApi) -> Self {
        Self {
            config: Arc::new(config),
            invoices: Arc::new(InvoiceSync::new(source)),
        }
    }
}

/// Build the application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::create_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
