//! Copying invoices between documents.
//!
//! Each source invoice names the document it should be copied to. A sync
//! copies the invoice row and its line items there, then removes destination
//! items that no longer exist in the source.

use serde::Serialize;
use tablesync_engine::{CellValue, ColumnId, Filter, Record, RowId};
use tracing::info;

use crate::client::{DocLocation, TableApi};
use crate::error::{AppError, Result};
use crate::sync::{delete_missing, reconcile};

/// Invoice table, in both documents.
pub const INVOICES: &str = "Invoices";
/// Line item table, in both documents.
pub const ITEMS: &str = "Items";

/// Source invoice column holding the destination document url.
pub const DEST_DOC: &str = "Dest_Doc";
/// Destination invoice column holding the source invoice id.
pub const INVOICE_ID: &str = "Invoice_ID";
/// Destination invoice column holding the time of the last sync.
pub const SYNCED_AT: &str = "Synced_At";
/// Item column referencing its invoice row.
pub const ITEM_INVOICE: &str = "Invoice";

/// Invoice columns carried to the destination.
pub const INVOICE_COLUMNS: [&str; 4] = ["Number", "Date", "Client", "Total"];
/// Item columns carried to the destination.
pub const ITEM_COLUMNS: [&str; 3] = ["Description", "Quantity", "Price"];
/// Columns identifying an item within its invoice.
pub const ITEM_KEY: [&str; 2] = [ITEM_INVOICE, "Description"];

/// What a copy of an invoice would overwrite.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyInfo {
    pub doc_url: String,
    pub doc_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sync_timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_date: Option<CellValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<CellValue>,
}

/// Copies invoices out of the source document.
pub struct InvoiceSync<A> {
    source: A,
}

impl<A: TableApi> InvoiceSync<A> {
    pub fn new(source: A) -> Self {
        Self { source }
    }

    /// Describe the destination of an invoice without changing anything.
    pub async fn copy_info(&self, invoice_id: RowId) -> Result<CopyInfo> {
        let invoice = self.source_invoice(invoice_id).await?;
        let (doc_url, location) = destination(&invoice)?;
        let dest = self.source.open_doc(&location);

        let doc_name = dest.doc_name().await?;
        let last_sync_timestamp = dest
            .fetch(INVOICES, Some(&invoice_filter(invoice_id)))
            .await?
            .last()
            .and_then(|r| r.get(SYNCED_AT))
            .and_then(CellValue::as_i64);

        Ok(CopyInfo {
            doc_url,
            doc_name,
            last_sync_timestamp,
            invoice_date: non_null(invoice.get("Date")),
            total: non_null(invoice.get("Total")),
        })
    }

    /// Copy an invoice and its items, returning the destination invoice id.
    pub async fn sync(&self, invoice_id: RowId) -> Result<RowId> {
        let invoice = self.source_invoice(invoice_id).await?;
        let (doc_url, location) = destination(&invoice)?;
        let dest = self.source.open_doc(&location);
        info!(invoice_id, doc_url = %doc_url, "Syncing invoice");

        let copy = invoice
            .project(&INVOICE_COLUMNS)
            .with(INVOICE_ID, invoice_id)
            .with(SYNCED_AT, chrono::Utc::now().timestamp());
        let filter = invoice_filter(invoice_id);
        reconcile(
            &dest,
            INVOICES,
            &[copy],
            &columns(&[INVOICE_ID]),
            Some(&filter),
        )
        .await?;

        let dest_id = dest
            .fetch(INVOICES, Some(&filter))
            .await?
            .last()
            .and_then(Record::id)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "invoice {invoice_id} in destination document {}",
                    location.doc_id
                ))
            })?;

        let items: Vec<Record> = self
            .source
            .fetch(ITEMS, Some(&Filter::by(ITEM_INVOICE, [CellValue::from(invoice_id)])))
            .await?
            .iter()
            .map(|item| item.project(&ITEM_COLUMNS).with(ITEM_INVOICE, dest_id))
            .collect();

        let item_key = columns(&ITEM_KEY);
        let item_filter = Filter::by(ITEM_INVOICE, [CellValue::from(dest_id)]);
        reconcile(&dest, ITEMS, &items, &item_key, Some(&item_filter)).await?;
        delete_missing(&dest, ITEMS, &items, &item_key, Some(&item_filter)).await?;

        info!(invoice_id, dest_id, items = items.len(), "Invoice synced");
        Ok(dest_id)
    }

    async fn source_invoice(&self, invoice_id: RowId) -> Result<Record> {
        if invoice_id <= 0 {
            return Err(AppError::Validation(format!(
                "invoice id must be positive, got {invoice_id}"
            )));
        }
        self.source
            .fetch(INVOICES, Some(&Filter::by("id", [CellValue::from(invoice_id)])))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("invoice {invoice_id}")))
    }
}

/// Destination document url and location named by a source invoice.
fn destination(invoice: &Record) -> Result<(String, DocLocation)> {
    let url = invoice
        .get(DEST_DOC)
        .and_then(CellValue::as_str)
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| {
            AppError::Validation(format!(
                "invoice {} has no destination document",
                invoice.id().unwrap_or_default()
            ))
        })?;
    Ok((url.to_string(), DocLocation::parse(url)?))
}

fn invoice_filter(invoice_id: RowId) -> Filter {
    Filter::by(INVOICE_ID, [CellValue::from(invoice_id)])
}

fn columns(names: &[&str]) -> Vec<ColumnId> {
    names.iter().map(|s| s.to_string()).collect()
}

fn non_null(value: Option<&CellValue>) -> Option<CellValue> {
    value.filter(|v| !v.is_null()).cloned()
}
