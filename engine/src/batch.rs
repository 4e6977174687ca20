//! Splitting record batches into request-sized pieces.

use crate::{ColumnId, Record};
use std::collections::BTreeMap;

/// Default maximum number of records sent in one request.
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Split `items` into consecutive chunks of at most `size` items.
///
/// A `size` of zero is treated as one.
pub fn chunks<T>(items: &[T], size: usize) -> impl Iterator<Item = &[T]> {
    items.chunks(size.max(1))
}

/// Group records by their sorted set of non-id columns.
///
/// A bulk update needs the same columns on every row, so each group becomes
/// its own series of requests. Groups come out ordered by column set; rows
/// keep their input order within a group.
pub fn group_by_columns(records: &[Record]) -> BTreeMap<Vec<ColumnId>, Vec<Record>> {
    let mut groups: BTreeMap<Vec<ColumnId>, Vec<Record>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.column_set())
            .or_default()
            .push(record.clone());
    }
    groups
}

/// Split records into maximal consecutive runs sharing one column set.
///
/// Unlike [`group_by_columns`] this keeps the input order across runs, which
/// lets ids returned for each run be concatenated back in input order.
pub fn runs_by_columns(records: &[Record]) -> Vec<&[Record]> {
    let mut runs = Vec::new();
    let mut start = 0;
    for i in 1..=records.len() {
        if i == records.len() || records[i].column_set() != records[start].column_set() {
            if start < i {
                runs.push(&records[start..i]);
            }
            start = i;
        }
    }
    runs
}

/// Number of requests needed for `count` items at `size` items each.
pub fn request_count(count: usize, size: usize) -> usize {
    count.div_ceil(size.max(1))
}
