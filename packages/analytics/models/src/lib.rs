#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Result shapes for the aggregation engine.
//!
//! Plain serializable values with no framework envelope; the excluded
//! transport layer wraps them however it likes.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day in a dense timeline series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePoint {
    /// Calendar date of the bucket.
    pub date: NaiveDate,
    /// Number of records that occurred on that date.
    pub count: u64,
}

/// Aggregated statistics over a record set.
///
/// Recomputed from scratch or served from cache; never incrementally
/// updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrimeSummary {
    /// Total records in the input set.
    pub total: u64,
    /// Record counts grouped by canonical borough name.
    pub by_borough: BTreeMap<String, u64>,
    /// Record counts grouped by offense description.
    pub by_offense: BTreeMap<String, u64>,
    /// Percentage of records with an arrest, one decimal place.
    /// Zero for an empty input set.
    pub arrest_rate: f64,
    /// Borough with the most records; lexicographically smallest name
    /// wins ties. `None` for an empty input set.
    pub top_borough: Option<String>,
    /// Records whose occurrence date falls inside the timeline window.
    pub recent_count: u64,
    /// Dense day-by-day series covering the trailing window, zero-filled.
    pub timeline: Vec<TimelinePoint>,
}

/// A coordinate centroid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Centroid {
    /// Mean latitude.
    pub lat: f64,
    /// Mean longitude.
    pub lng: f64,
}

/// Per-borough detail statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoroughStats {
    /// Canonical borough name.
    pub borough: String,
    /// Total records attributed to the borough.
    pub total: u64,
    /// Number of distinct offense descriptions observed.
    pub unique_offenses: u64,
    /// Mean position of the borough's validly geocoded records, if any.
    pub centroid: Option<Centroid>,
}
