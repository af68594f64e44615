#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Aggregation engine: summary statistics, dense timelines, and
//! per-borough breakdowns.
//!
//! Every function here is pure and total over any record sequence,
//! including an empty one. Partial data degrades by exclusion: a record
//! with no occurrence date still counts toward totals but never appears
//! in a timeline bucket; a record with bad coordinates never moves a
//! centroid.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Days, NaiveDate};
use gotham_analytics_models::{BoroughStats, Centroid, CrimeSummary, TimelinePoint};
use gotham_crime_models::CrimeRecord;

/// Grouping key for records whose offense description is blank.
const UNKNOWN_OFFENSE: &str = "UNKNOWN";

/// Computes the full summary over a record set.
///
/// The timeline covers the trailing `window_days` calendar days ending
/// at `reference` (inclusive), dense and zero-filled. Records without a
/// parseable occurrence date are excluded from the timeline and
/// `recent_count` but still counted everywhere else.
pub fn summarize<'a>(
    records: impl IntoIterator<Item = &'a CrimeRecord>,
    window_days: u32,
    reference: NaiveDate,
) -> CrimeSummary {
    let window_start = window_start(window_days, reference);

    let mut total = 0_u64;
    let mut arrests = 0_u64;
    let mut by_borough: BTreeMap<String, u64> = BTreeMap::new();
    let mut by_offense: BTreeMap<String, u64> = BTreeMap::new();
    let mut day_counts: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    let mut recent_count = 0_u64;

    for record in records {
        total += 1;
        if record.arrest_made {
            arrests += 1;
        }

        *by_borough.entry(record.borough.to_string()).or_default() += 1;
        *by_offense.entry(offense_key(record)).or_default() += 1;

        if let Some(occurred) = record.occurred_at {
            let date = occurred.date();
            if let Some(start) = window_start {
                if date >= start && date <= reference {
                    *day_counts.entry(date).or_default() += 1;
                    recent_count += 1;
                }
            }
        }
    }

    log::debug!("Summarized {total} records across {} boroughs", by_borough.len());

    CrimeSummary {
        total,
        arrest_rate: arrest_rate(arrests, total),
        top_borough: top_borough(&by_borough),
        recent_count,
        timeline: dense_series(&day_counts, window_days, reference),
        by_borough,
        by_offense,
    }
}

/// Buckets records by occurrence date over the trailing `days` window
/// ending at `reference`, dense and zero-filled, sorted ascending.
pub fn timeline<'a>(
    records: impl IntoIterator<Item = &'a CrimeRecord>,
    days: u32,
    reference: NaiveDate,
) -> Vec<TimelinePoint> {
    let Some(start) = window_start(days, reference) else {
        return Vec::new();
    };

    let mut day_counts: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for record in records {
        if let Some(occurred) = record.occurred_at {
            let date = occurred.date();
            if date >= start && date <= reference {
                *day_counts.entry(date).or_default() += 1;
            }
        }
    }

    dense_series(&day_counts, days, reference)
}

/// Per-borough totals, distinct offense counts, and coordinate
/// centroids. Centroids only average geocodes inside the NYC envelope.
pub fn borough_stats<'a>(records: impl IntoIterator<Item = &'a CrimeRecord>) -> Vec<BoroughStats> {
    #[derive(Default)]
    struct Acc {
        total: u64,
        offenses: BTreeSet<String>,
        lat_sum: f64,
        lng_sum: f64,
        located: u64,
    }

    let mut accs: BTreeMap<String, Acc> = BTreeMap::new();

    for record in records {
        let acc = accs.entry(record.borough.to_string()).or_default();
        acc.total += 1;
        acc.offenses.insert(offense_key(record));

        if let Some((lat, lng)) = record.coordinates() {
            if gotham_geo::in_envelope(lat, lng) {
                acc.lat_sum += lat;
                acc.lng_sum += lng;
                acc.located += 1;
            }
        }
    }

    accs.into_iter()
        .map(|(borough, acc)| {
            #[allow(clippy::cast_precision_loss)]
            let centroid = (acc.located > 0).then(|| Centroid {
                lat: acc.lat_sum / acc.located as f64,
                lng: acc.lng_sum / acc.located as f64,
            });
            BoroughStats {
                borough,
                total: acc.total,
                unique_offenses: acc.offenses.len() as u64,
                centroid,
            }
        })
        .collect()
}

/// First day of a trailing window of `days` ending at `reference`.
/// `None` when the window is empty or would underflow the calendar.
fn window_start(days: u32, reference: NaiveDate) -> Option<NaiveDate> {
    if days == 0 {
        return None;
    }
    reference.checked_sub_days(Days::new(u64::from(days) - 1))
}

fn offense_key(record: &CrimeRecord) -> String {
    let trimmed = record.offense_description.trim();
    if trimmed.is_empty() {
        UNKNOWN_OFFENSE.to_string()
    } else {
        trimmed.to_string()
    }
}

/// `round(100 * arrests / total, 1)`, defined as 0 for an empty set.
fn arrest_rate(arrests: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let rate = 100.0 * arrests as f64 / total as f64;
    (rate * 10.0).round() / 10.0
}

/// Borough with the maximum count; lexicographically smallest name wins
/// ties because the map iterates in ascending key order and only a
/// strictly greater count replaces the leader.
fn top_borough(by_borough: &BTreeMap<String, u64>) -> Option<String> {
    let mut best: Option<(&String, u64)> = None;
    for (name, &count) in by_borough {
        match best {
            Some((_, leading)) if count <= leading => {}
            _ => best = Some((name, count)),
        }
    }
    best.map(|(name, _)| name.clone())
}

/// Expands sparse day buckets into a dense ascending series of exactly
/// `days` entries ending at `reference`.
fn dense_series(
    day_counts: &BTreeMap<NaiveDate, u64>,
    days: u32,
    reference: NaiveDate,
) -> Vec<TimelinePoint> {
    let Some(start) = window_start(days, reference) else {
        return Vec::new();
    };

    start
        .iter_days()
        .take(days as usize)
        .map(|date| TimelinePoint {
            date,
            count: day_counts.get(&date).copied().unwrap_or(0),
        })
        .collect()
}
