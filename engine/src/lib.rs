//! # Tablesync Engine
//!
//! A deterministic reconciliation engine for remote tables.
//!
//! This crate provides the core logic for copying rows from one table into
//! another: it pairs rows by a caller-chosen key, works out which rows need
//! patching and which are new, and prepares the batches a bulk REST API can
//! accept.
//!
//! ## Design Principles
//!
//! - **No IO**: Engine has no knowledge of files, network, or platform
//! - **Deterministic**: Same inputs always produce the same plan
//! - **Testable**: Pure logic, no mocks needed
//!
//! ## Core Concepts
//!
//! ### Records
//!
//! A [`Record`] is a schema-less row: column identifiers mapped to
//! [`CellValue`]s. The `id` column holds the row id assigned by the remote
//! service; rows without one have not been created yet.
//!
//! ### Keys and Filters
//!
//! A [`Key`] is the tuple of a record's key column values. Records with equal
//! keys are the same logical row. A [`Filter`] restricts a sync to the rows
//! whose values are in an accepted set, and may only name key columns.
//!
//! ### Planning
//!
//! [`plan_sync`] diffs source records against existing target rows and
//! returns a [`SyncPlan`]: updates carrying only changed cells, and new rows.
//! Deletion is left to the caller, helped by [`obsolete_ids`].
//!
//! ### Batching
//!
//! The [`batch`] and [`columns`] modules split plans into request-sized
//! chunks and convert them to the column-oriented wire format.
//!
//! ## Quick Start
//!
//! ```rust
//! use tablesync_engine::{plan_sync, CellValue, Filter, Record};
//!
//! // Rows currently in the target table
//! let existing = vec![Record::new()
//!     .with("id", 3)
//!     .with("Invoice_ID", 7)
//!     .with("Date", 100)];
//!
//! // Rows that should be there
//! let source = vec![
//!     Record::new().with("Invoice_ID", 7).with("Date", 200),
//!     Record::new().with("Invoice_ID", 8).with("Date", 300),
//! ];
//!
//! let keys = vec!["Invoice_ID".to_string()];
//! let plan = plan_sync(existing, &source, &keys, None).unwrap();
//!
//! assert_eq!(plan.updates, vec![Record::new().with("id", 3).with("Date", 200)]);
//! assert_eq!(plan.additions.len(), 1);
//!
//! // Filters may only name key columns
//! let filter = Filter::by("Date", [CellValue::from(200)]);
//! assert!(plan_sync(vec![], &source, &keys, Some(&filter)).is_err());
//! ```

pub mod batch;
pub mod columns;
pub mod error;
pub mod filter;
pub mod key;
pub mod plan;
pub mod record;
pub mod value;

// Re-export main types at crate root
pub use batch::{chunks, group_by_columns, runs_by_columns, DEFAULT_CHUNK_SIZE};
pub use columns::{from_columns, to_columns};
pub use error::{Error, Result};
pub use filter::Filter;
pub use key::{make_key, Key, KeyPart};
pub use plan::{obsolete_ids, plan_sync, Planner, SyncPlan};
pub use record::{Record, ID_COLUMN};
pub use value::CellValue;

/// Type aliases for clarity
pub type ColumnId = String;
pub type RowId = i64;
