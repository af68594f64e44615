//! Single-pass paginated query execution.
//!
//! Counts the total match population and collects the requested window
//! in one scan, so large populations are never materialized beyond the
//! page being returned.

use std::ops::ControlFlow;

use gotham_crime_models::CrimeRecord;
use gotham_store::RecordStore;
use serde::{Deserialize, Serialize};

use crate::QueryError;
use crate::filter::CompiledFilter;

/// One page of query results plus the pagination envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPage {
    /// Records in the `[skip, skip + limit)` window, store order.
    pub records: Vec<CrimeRecord>,
    /// Total matches across the full population, counted before
    /// pagination.
    pub total: usize,
    /// Number of matching records skipped.
    pub skip: usize,
    /// Maximum page size requested.
    pub limit: usize,
    /// Total page count at this limit.
    pub pages: usize,
}

/// Runs a compiled filter against the store with pagination.
///
/// The predicate is applied to every record in the store's stable scan
/// order; `total` counts all matches, and only the `[skip, skip+limit)`
/// window is cloned out. Pure read: the store is never mutated.
///
/// # Errors
///
/// Returns [`QueryError::InvalidPagination`] when `skip` is negative or
/// `limit` is zero or negative.
pub fn run_query(
    store: &dyn RecordStore,
    filter: &CompiledFilter,
    skip: i64,
    limit: i64,
) -> Result<QueryPage, QueryError> {
    if skip < 0 {
        return Err(QueryError::InvalidPagination {
            message: format!("skip must be >= 0, got {skip}"),
        });
    }
    if limit <= 0 {
        return Err(QueryError::InvalidPagination {
            message: format!("limit must be >= 1, got {limit}"),
        });
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let (skip, limit) = (skip as usize, limit as usize);

    let mut total = 0_usize;
    let mut records = Vec::new();

    store.scan(&mut |record| {
        if filter.matches(record) {
            if total >= skip && records.len() < limit {
                records.push(record.clone());
            }
            total += 1;
        }
        ControlFlow::Continue(())
    });

    log::debug!(
        "Query '{}' matched {total} of {} records, returning {}",
        filter.cache_key(),
        store.len(),
        records.len()
    );

    Ok(QueryPage {
        records,
        total,
        skip,
        limit,
        pages: total.div_ceil(limit),
    })
}
