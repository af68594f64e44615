#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Record store boundary for the query engine.
//!
//! The engine only needs a streaming scan in stable insertion order, so
//! the boundary is a visitor-based trait rather than a concrete storage
//! choice. [`MemoryStore`] is the in-process implementation; a database
//! -backed store would implement the same trait.

use std::ops::ControlFlow;
use std::sync::RwLock;

use gotham_crime_models::CrimeRecord;

/// Read boundary over the crime record population.
///
/// Implementations must visit records in a stable order (insertion
/// order for [`MemoryStore`]) so pagination windows are deterministic
/// across repeated scans of unchanged data.
pub trait RecordStore: Send + Sync {
    /// Visits each record in stable order until the visitor breaks or
    /// the population is exhausted. The visitor receives borrowed
    /// records; nothing is materialized beyond what the caller keeps.
    fn scan(&self, visit: &mut dyn FnMut(&CrimeRecord) -> ControlFlow<()>);

    /// Number of records currently held.
    fn len(&self) -> usize;

    /// Whether the store holds no records.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory record store with stable insertion order.
///
/// Batch loads replace or append under a write lock; scans take the
/// read lock for their full duration, so a scan always sees one
/// consistent population.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<CrimeRecord>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-loaded with the given records.
    #[must_use]
    pub fn from_records(records: Vec<CrimeRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Appends a batch of records, preserving existing order.
    ///
    /// Callers that hold a cache over this store must invalidate it
    /// after the load completes.
    ///
    /// # Panics
    ///
    /// Panics if the record lock is poisoned.
    pub fn append(&self, batch: Vec<CrimeRecord>) {
        let mut records = self.records.write().expect("record store lock poisoned");
        let before = records.len();
        records.extend(batch);
        log::info!(
            "Appended {} records to store ({} total)",
            records.len() - before,
            records.len()
        );
    }

    /// Replaces the entire population with a fresh batch.
    ///
    /// # Panics
    ///
    /// Panics if the record lock is poisoned.
    pub fn replace(&self, batch: Vec<CrimeRecord>) {
        let mut records = self.records.write().expect("record store lock poisoned");
        *records = batch;
        log::info!("Replaced store contents ({} records)", records.len());
    }
}

impl RecordStore for MemoryStore {
    fn scan(&self, visit: &mut dyn FnMut(&CrimeRecord) -> ControlFlow<()>) {
        let records = self.records.read().expect("record store lock poisoned");
        for record in records.iter() {
            if visit(record).is_break() {
                break;
            }
        }
    }

    fn len(&self) -> usize {
        self.records.read().expect("record store lock poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use gotham_crime_models::Borough;

    use super::*;

    fn record(id: i64) -> CrimeRecord {
        CrimeRecord {
            id,
            complaint_number: format!("2024{id:06}"),
            offense_description: "PETIT LARCENY".to_string(),
            law_category: Some("MISDEMEANOR".to_string()),
            borough: Borough::Queens,
            occurred_at: None,
            precinct: None,
            latitude: None,
            longitude: None,
            arrest_made: false,
            status: "OPEN".to_string(),
        }
    }

    #[test]
    fn scan_preserves_insertion_order() {
        let store = MemoryStore::from_records(vec![record(3), record(1), record(2)]);
        let mut seen = Vec::new();
        store.scan(&mut |r| {
            seen.push(r.id);
            ControlFlow::Continue(())
        });
        assert_eq!(seen, vec![3, 1, 2]);
    }

    #[test]
    fn scan_stops_on_break() {
        let store = MemoryStore::from_records(vec![record(1), record(2), record(3)]);
        let mut visited = 0;
        store.scan(&mut |_| {
            visited += 1;
            if visited == 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(visited, 2);
    }

    #[test]
    fn append_extends_in_order() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        store.append(vec![record(1)]);
        store.append(vec![record(2), record(3)]);
        assert_eq!(store.len(), 3);

        let mut seen = Vec::new();
        store.scan(&mut |r| {
            seen.push(r.id);
            ControlFlow::Continue(())
        });
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[test]
    fn replace_swaps_population() {
        let store = MemoryStore::from_records(vec![record(1), record(2)]);
        store.replace(vec![record(9)]);
        assert_eq!(store.len(), 1);
    }
}
