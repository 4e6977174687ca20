//! Reconciling remote tables.
//!
//! Fetches the current target rows, plans the changes with the engine and
//! applies them: updates first, then additions. Remote calls are awaited one
//! at a time. Nothing is rolled back if a call fails; running the sync again
//! re-diffs against whatever was applied and sends only what is left.

use tablesync_engine::{
    make_key, obsolete_ids, ColumnId, Filter, Planner, Record, RowId, SyncPlan,
};
use tracing::{debug, info};

use crate::client::TableApi;
use crate::error::Result;

/// Bring `table` in line with `source` without deleting rows.
///
/// Rows are paired by `key_columns`. When `filter` is given, only target rows
/// matching it are considered and source rows outside it are skipped; every
/// filter column must be a key column. Input errors are reported before any
/// request is sent.
pub async fn reconcile<A: TableApi + ?Sized>(
    api: &A,
    table: &str,
    source: &[Record],
    key_columns: &[ColumnId],
    filter: Option<&Filter>,
) -> Result<SyncPlan> {
    let mut planner = Planner::new(key_columns, filter)?;
    check_keys(source, key_columns, filter)?;

    let existing = api.fetch(table, filter).await?;
    planner.load_existing(existing);
    let plan = planner.plan(source)?;

    info!(table, "Syncing {}: {}", table, plan);
    for (id, columns) in plan.changed_columns() {
        debug!(table, id, ?columns, "Row changed");
    }

    api.update(table, &plan.updates).await?;
    api.add(table, &plan.additions).await?;

    Ok(plan)
}

/// Delete rows of `table` (within `filter`) whose key matches none of `synced`.
///
/// Meant to run right after [`reconcile`] with the same source rows. Returns
/// the ids that were removed.
pub async fn delete_missing<A: TableApi + ?Sized>(
    api: &A,
    table: &str,
    synced: &[Record],
    key_columns: &[ColumnId],
    filter: Option<&Filter>,
) -> Result<Vec<RowId>> {
    if let Some(filter) = filter {
        filter.check_against_key(key_columns)?;
    }
    for record in synced {
        make_key(record, key_columns)?;
    }

    let existing = api.fetch(table, filter).await?;
    let ids = obsolete_ids(&existing, synced, key_columns)?;
    if !ids.is_empty() {
        info!(table, ?ids, "Deleting {} rows missing from source", ids.len());
        api.delete(table, &ids).await?;
    }
    Ok(ids)
}

/// Fail on source rows missing a key column, ignoring rows the filter skips.
fn check_keys(
    source: &[Record],
    key_columns: &[ColumnId],
    filter: Option<&Filter>,
) -> Result<()> {
    for record in source {
        if filter.map_or(true, |f| f.matches(record)) {
            make_key(record, key_columns)?;
        }
    }
    Ok(())
}
