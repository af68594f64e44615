#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Crime dashboard core engine.
//!
//! Ties the filter compiler, query engine, aggregation engine, and
//! geospatial binner together behind the narrow interface the excluded
//! transport layer calls: [`CrimeEngine::filtered_query`],
//! [`CrimeEngine::summary`], [`CrimeEngine::timeline`], and
//! [`CrimeEngine::heatmap`]. Aggregate results are memoized in TTL
//! caches; ingestion collaborators call [`CrimeEngine::invalidate`]
//! after loading new data — the only write coupling into this core.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use gotham_analytics_models::{BoroughStats, CrimeSummary, TimelinePoint};
use gotham_cache::ResultCache;
use gotham_crime_models::{Borough, CrimeRecord};
use gotham_geo::{GeoError, HeatPoint};
use gotham_query::engine::{QueryPage, run_query};
use gotham_query::filter::FilterSpec;
use gotham_query::QueryError;
use gotham_store::RecordStore;
use serde::{Deserialize, Serialize};

/// Maximum timeline window the engine will compute.
const MAX_TIMELINE_DAYS: u32 = 365;

/// Unified error type for the engine boundary.
///
/// Every variant except [`Self::NotFound`] indicates a bad request and
/// maps to a 4xx-style category at the transport layer; none of them
/// are system faults, and the engine itself knows nothing about HTTP.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// A filter field could not be interpreted.
    #[error("Invalid filter: {message}")]
    InvalidFilter {
        /// Description of what went wrong.
        message: String,
    },

    /// Pagination parameters were out of range.
    #[error("Invalid pagination: {message}")]
    InvalidPagination {
        /// Description of what went wrong.
        message: String,
    },

    /// The heatmap region name did not resolve to a borough.
    #[error("Unknown region '{name}'")]
    UnknownRegion {
        /// The unmatched region name as supplied.
        name: String,
    },

    /// No record with the requested identifier exists.
    #[error("No record with id {id}")]
    NotFound {
        /// The identifier that was looked up.
        id: i64,
    },
}

impl From<QueryError> for EngineError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::InvalidFilter { message } => Self::InvalidFilter { message },
            QueryError::InvalidPagination { message } => Self::InvalidPagination { message },
        }
    }
}

impl From<GeoError> for EngineError {
    fn from(err: GeoError) -> Self {
        match err {
            GeoError::UnknownRegion { name } => Self::UnknownRegion { name },
        }
    }
}

/// Engine tuning knobs. Callers source this from their own config
/// layer; every field has a sensible default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Seconds a cached aggregate stays valid.
    pub cache_ttl_secs: u64,
    /// Trailing window used for summary timelines and recent counts.
    pub timeline_days: u32,
    /// Largest page size a caller may request.
    pub max_limit: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 300,
            timeline_days: 30,
            max_limit: 1000,
        }
    }
}

/// The query, aggregation, and geospatial summarization core.
///
/// Pure computation over a shared read-mostly record store; the caches
/// are the only shared mutable state, and they serialize
/// check-compute-store per key. Safe to share across request workers
/// behind an `Arc`.
pub struct CrimeEngine<S: RecordStore> {
    store: Arc<S>,
    config: EngineConfig,
    summaries: ResultCache<CrimeSummary>,
    timelines: ResultCache<Vec<TimelinePoint>>,
    heatmaps: ResultCache<Vec<HeatPoint>>,
    boroughs: ResultCache<Vec<BoroughStats>>,
}

impl<S: RecordStore> CrimeEngine<S> {
    /// Creates an engine over the given store.
    #[must_use]
    pub fn new(store: Arc<S>, config: EngineConfig) -> Self {
        let ttl = Duration::from_secs(config.cache_ttl_secs);
        Self {
            store,
            config,
            summaries: ResultCache::with_ttl(ttl),
            timelines: ResultCache::with_ttl(ttl),
            heatmaps: ResultCache::with_ttl(ttl),
            boroughs: ResultCache::with_ttl(ttl),
        }
    }

    /// The underlying record store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs a filtered, paginated record query. Uncached: page windows
    /// vary too much to be worth memoizing.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidFilter`] for malformed filter
    /// fields and [`EngineError::InvalidPagination`] for out-of-range
    /// `skip`/`limit` (including limits above the configured maximum).
    pub fn filtered_query(
        &self,
        spec: &FilterSpec,
        skip: i64,
        limit: i64,
    ) -> Result<QueryPage, EngineError> {
        if limit > self.config.max_limit {
            return Err(EngineError::InvalidPagination {
                message: format!("limit must be <= {}, got {limit}", self.config.max_limit),
            });
        }

        let filter = spec.compile()?;
        Ok(run_query(self.store.as_ref(), &filter, skip, limit)?)
    }

    /// Computes (or serves from cache) the aggregate summary for the
    /// filtered record subset, with the timeline window ending today.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidFilter`] for malformed filter
    /// fields.
    pub fn summary(&self, spec: &FilterSpec) -> Result<CrimeSummary, EngineError> {
        self.summary_at(spec, Utc::now().date_naive())
    }

    /// [`Self::summary`] with an explicit timeline reference date.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidFilter`] for malformed filter
    /// fields.
    pub fn summary_at(
        &self,
        spec: &FilterSpec,
        reference: NaiveDate,
    ) -> Result<CrimeSummary, EngineError> {
        let filter = spec.compile()?;
        let key = format!("summary:{reference}:{}", filter.cache_key());

        Ok(self.summaries.get_or_compute(&key, || {
            let subset = self.collect(|record| filter.matches(record));
            gotham_analytics::summarize(&subset, self.config.timeline_days, reference)
        }))
    }

    /// Day-bucketed crime counts for the trailing `days` window ending
    /// at `reference`: exactly `days` entries, ascending, zero-filled.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidFilter`] when `days` is outside
    /// `1..=365`.
    pub fn timeline(
        &self,
        days: u32,
        reference: NaiveDate,
    ) -> Result<Vec<TimelinePoint>, EngineError> {
        if days == 0 || days > MAX_TIMELINE_DAYS {
            return Err(EngineError::InvalidFilter {
                message: format!("days must be in 1..={MAX_TIMELINE_DAYS}, got {days}"),
            });
        }

        let key = format!("timeline:{days}:{reference}");
        Ok(self.timelines.get_or_compute(&key, || {
            let dated = self.collect(|record| record.occurred_at.is_some());
            gotham_analytics::timeline(&dated, days, reference)
        }))
    }

    /// Heatmap density points, optionally scoped to a named borough
    /// region.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownRegion`] when `region` does not
    /// name one of the five boroughs.
    pub fn heatmap(&self, region: Option<&str>) -> Result<Vec<HeatPoint>, EngineError> {
        let borough: Option<Borough> = region.map(gotham_geo::resolve_region).transpose()?;

        let key = borough.map_or_else(
            || "heatmap:all".to_string(),
            |b| format!("heatmap:{b}"),
        );

        Ok(self.heatmaps.get_or_compute(&key, || {
            let located = self.collect(|record| record.coordinates().is_some());
            gotham_geo::heatmap(&located, borough)
        }))
    }

    /// Looks up a single record by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] when no record matches.
    pub fn record(&self, id: i64) -> Result<CrimeRecord, EngineError> {
        let mut found = None;
        self.store.scan(&mut |record| {
            if record.id == id {
                found = Some(record.clone());
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        found.ok_or(EngineError::NotFound { id })
    }

    /// Per-borough totals, distinct offense counts, and centroids.
    #[must_use]
    pub fn borough_stats(&self) -> Vec<BoroughStats> {
        self.boroughs.get_or_compute("boroughs", || {
            let all = self.collect(|_| true);
            gotham_analytics::borough_stats(&all)
        })
    }

    /// Drops every cached aggregate. Ingestion collaborators must call
    /// this after loading a new batch into the store.
    pub fn invalidate(&self) {
        self.summaries.clear();
        self.timelines.clear();
        self.heatmaps.clear();
        self.boroughs.clear();
        log::info!("Engine caches invalidated ({} records)", self.store.len());
    }

    /// Clones the records matching `keep` out of a single store scan.
    fn collect(&self, mut keep: impl FnMut(&CrimeRecord) -> bool) -> Vec<CrimeRecord> {
        let mut records = Vec::new();
        self.store.scan(&mut |record| {
            if keep(record) {
                records.push(record.clone());
            }
            ControlFlow::Continue(())
        });
        records
    }
}
