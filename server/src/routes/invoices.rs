//! Invoice copy endpoints.

use axum::{
    extract::{rejection::PathRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tablesync_engine::RowId;

use crate::error::{AppError, Result};
use crate::invoice::CopyInfo;
use crate::AppState;

/// Response for a completed sync.
#[derive(Debug, Serialize)]
pub struct SyncResponse {
    /// Invoice row id in the destination document
    pub id: RowId,
}

/// Create invoice routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/invoices/{id}/copy-info", get(copy_info_handler))
        .route("/api/invoices/{id}/sync", post(sync_handler))
}

/// Invoice id from the path, reported as a JSON error when unparsable.
fn invoice_id(path: std::result::Result<Path<RowId>, PathRejection>) -> Result<RowId> {
    path.map(|Path(id)| id)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}

/// GET /api/invoices/{id}/copy-info - Describe where an invoice would be copied.
async fn copy_info_handler(
    State(state): State<AppState>,
    path: std::result::Result<Path<RowId>, PathRejection>,
) -> Result<Json<CopyInfo>> {
    let info = state.invoices.copy_info(invoice_id(path)?).await?;
    Ok(Json(info))
}

/// POST /api/invoices/{id}/sync - Copy an invoice to its destination document.
async fn sync_handler(
    State(state): State<AppState>,
    path: std::result::Result<Path<RowId>, PathRejection>,
) -> Result<Json<SyncResponse>> {
    let id = state.invoices.sync(invoice_id(path)?).await?;
    Ok(Json(SyncResponse { id }))
}
