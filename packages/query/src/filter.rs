//! Filter specification and compilation.
//!
//! A [`FilterSpec`] carries the raw, optional filter parameters as the
//! caller supplied them. Compiling validates and normalizes them into a
//! [`CompiledFilter`]: a pure predicate over records plus a cache key
//! that is byte-identical for semantically equivalent specs.

use chrono::{NaiveDate, NaiveDateTime};
use gotham_crime_models::{BoundingBox, CrimeRecord};
use serde::{Deserialize, Serialize};

use crate::QueryError;

/// User-supplied filter parameters. All fields are optional; absent
/// fields match every record. Constructed fresh per query and never
/// mutated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    /// Case-insensitive substring match against the record's borough.
    pub borough: Option<String>,
    /// Case-insensitive substring match against the offense description.
    pub offense: Option<String>,
    /// Inclusive lower date bound, `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS`.
    pub start_date: Option<String>,
    /// Inclusive upper date bound, `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS`.
    pub end_date: Option<String>,
    /// Spatial bounding box; records without coordinates fail it.
    pub bbox: Option<BoundingBox>,
}

impl FilterSpec {
    /// Compiles this spec into a normalized predicate and cache key.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidFilter`] if a date bound cannot be
    /// parsed.
    pub fn compile(&self) -> Result<CompiledFilter, QueryError> {
        let borough = normalize_needle(self.borough.as_deref());
        let offense = normalize_needle(self.offense.as_deref());

        let from = self
            .start_date
            .as_deref()
            .map(|s| parse_date_bound(s, Bound::Start))
            .transpose()?;
        let to = self
            .end_date
            .as_deref()
            .map(|s| parse_date_bound(s, Bound::End))
            .transpose()?;

        let cache_key = build_cache_key(
            borough.as_deref(),
            offense.as_deref(),
            from,
            to,
            self.bbox.as_ref(),
        );

        Ok(CompiledFilter {
            borough,
            offense,
            from,
            to,
            bbox: self.bbox,
            cache_key,
        })
    }
}

/// A compiled, normalized filter: predicate plus deterministic cache key.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFilter {
    borough: Option<String>,
    offense: Option<String>,
    from: Option<NaiveDateTime>,
    to: Option<NaiveDateTime>,
    bbox: Option<BoundingBox>,
    cache_key: String,
}

impl CompiledFilter {
    /// Whether the record satisfies every filter dimension (logical AND).
    #[must_use]
    pub fn matches(&self, record: &CrimeRecord) -> bool {
        if let Some(needle) = &self.borough {
            let haystack = record.borough.as_ref().to_ascii_lowercase();
            if !haystack.contains(needle.as_str()) {
                return false;
            }
        }

        if let Some(needle) = &self.offense {
            let haystack = record.offense_description.to_ascii_lowercase();
            if !haystack.contains(needle.as_str()) {
                return false;
            }
        }

        if self.from.is_some() || self.to.is_some() {
            // Undated records fail any date-bounded filter.
            let Some(occurred) = record.occurred_at else {
                return false;
            };
            if self.from.is_some_and(|from| occurred < from) {
                return false;
            }
            if self.to.is_some_and(|to| occurred > to) {
                return false;
            }
        }

        if let Some(bbox) = &self.bbox {
            // Records without full coordinates fail a bbox filter.
            let Some((lat, lng)) = record.coordinates() else {
                return false;
            };
            if !bbox.contains(lat, lng) {
                return false;
            }
        }

        true
    }

    /// Deterministic key derived from the normalized non-default fields
    /// in fixed order. Equivalent specs always share a key.
    #[must_use]
    pub fn cache_key(&self) -> &str {
        &self.cache_key
    }
}

/// Which end of a date range a bound string belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Start,
    End,
}

/// Lowercases and trims a substring filter, dropping empty values so
/// `Some("")` behaves like an absent filter.
fn normalize_needle(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_ascii_lowercase())
    }
}

/// Parses a date bound string.
///
/// Full timestamps are used verbatim. Date-only strings expand to the
/// start or end of that day depending on which bound they are, so date
/// bounds are inclusive at day granularity.
fn parse_date_bound(s: &str, bound: Bound) -> Result<NaiveDateTime, QueryError> {
    let s = s.trim();

    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(dt);
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        let time = match bound {
            Bound::Start => date.and_hms_opt(0, 0, 0),
            Bound::End => date.and_hms_opt(23, 59, 59),
        };
        if let Some(dt) = time {
            return Ok(dt);
        }
    }

    Err(QueryError::InvalidFilter {
        message: format!("Invalid date '{s}': expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS"),
    })
}

fn build_cache_key(
    borough: Option<&str>,
    offense: Option<&str>,
    from: Option<NaiveDateTime>,
    to: Option<NaiveDateTime>,
    bbox: Option<&BoundingBox>,
) -> String {
    let mut parts = Vec::new();

    if let Some(b) = borough {
        parts.push(format!("borough={b}"));
    }
    if let Some(o) = offense {
        parts.push(format!("offense={o}"));
    }
    if let Some(f) = from {
        parts.push(format!("from={f}"));
    }
    if let Some(t) = to {
        parts.push(format!("to={t}"));
    }
    if let Some(bbox) = bbox {
        parts.push(format!(
            "bbox={},{},{},{}",
            bbox.west, bbox.south, bbox.east, bbox.north
        ));
    }

    if parts.is_empty() {
        "all".to_string()
    } else {
        parts.join("|")
    }
}

#[cfg(test)]
mod tests {
    use gotham_crime_models::Borough;

    use super::*;

    fn record(borough: Borough, offense: &str, occurred: Option<&str>) -> CrimeRecord {
        CrimeRecord {
            id: 1,
            complaint_number: "2024000001".to_string(),
            offense_description: offense.to_string(),
            law_category: None,
            borough,
            occurred_at: occurred
                .map(|s| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()),
            precinct: None,
            latitude: None,
            longitude: None,
            arrest_made: false,
            status: "OPEN".to_string(),
        }
    }

    #[test]
    fn empty_spec_matches_everything() {
        let filter = FilterSpec::default().compile().unwrap();
        assert!(filter.matches(&record(Borough::Bronx, "ROBBERY", None)));
        assert_eq!(filter.cache_key(), "all");
    }

    #[test]
    fn borough_match_is_case_insensitive_substring() {
        let filter = FilterSpec {
            borough: Some("bronx".to_string()),
            ..FilterSpec::default()
        }
        .compile()
        .unwrap();

        assert!(filter.matches(&record(Borough::Bronx, "ROBBERY", None)));
        assert!(!filter.matches(&record(Borough::Brooklyn, "ROBBERY", None)));
    }

    #[test]
    fn borough_substring_matches_partial_input() {
        let filter = FilterSpec {
            borough: Some("Staten".to_string()),
            ..FilterSpec::default()
        }
        .compile()
        .unwrap();

        assert!(filter.matches(&record(Borough::StatenIsland, "ROBBERY", None)));
        assert!(!filter.matches(&record(Borough::Queens, "ROBBERY", None)));
    }

    #[test]
    fn offense_match_is_case_insensitive_substring() {
        let filter = FilterSpec {
            offense: Some("larceny".to_string()),
            ..FilterSpec::default()
        }
        .compile()
        .unwrap();

        assert!(filter.matches(&record(Borough::Queens, "GRAND LARCENY", None)));
        assert!(!filter.matches(&record(Borough::Queens, "ASSAULT", None)));
    }

    #[test]
    fn blank_filter_fields_behave_as_absent() {
        let filter = FilterSpec {
            borough: Some("  ".to_string()),
            offense: Some(String::new()),
            ..FilterSpec::default()
        }
        .compile()
        .unwrap();

        assert!(filter.matches(&record(Borough::Bronx, "ROBBERY", None)));
        assert_eq!(filter.cache_key(), "all");
    }

    #[test]
    fn date_bounds_are_inclusive_at_day_granularity() {
        let filter = FilterSpec {
            start_date: Some("2024-03-01".to_string()),
            end_date: Some("2024-03-31".to_string()),
            ..FilterSpec::default()
        }
        .compile()
        .unwrap();

        assert!(filter.matches(&record(Borough::Bronx, "ROBBERY", Some("2024-03-01T00:00:00"))));
        assert!(filter.matches(&record(Borough::Bronx, "ROBBERY", Some("2024-03-31T18:45:00"))));
        assert!(!filter.matches(&record(Borough::Bronx, "ROBBERY", Some("2024-04-01T00:00:00"))));
        assert!(!filter.matches(&record(Borough::Bronx, "ROBBERY", Some("2024-02-29T23:59:59"))));
    }

    #[test]
    fn undated_record_fails_date_bounded_filter() {
        let filter = FilterSpec {
            start_date: Some("2024-01-01".to_string()),
            ..FilterSpec::default()
        }
        .compile()
        .unwrap();

        assert!(!filter.matches(&record(Borough::Bronx, "ROBBERY", None)));
    }

    #[test]
    fn malformed_date_is_rejected() {
        let err = FilterSpec {
            start_date: Some("03/01/2024".to_string()),
            ..FilterSpec::default()
        }
        .compile()
        .unwrap_err();

        assert!(matches!(err, QueryError::InvalidFilter { .. }));
    }

    #[test]
    fn full_timestamps_are_used_verbatim() {
        let filter = FilterSpec {
            end_date: Some("2024-03-15T12:00:00".to_string()),
            ..FilterSpec::default()
        }
        .compile()
        .unwrap();

        assert!(filter.matches(&record(Borough::Bronx, "ROBBERY", Some("2024-03-15T12:00:00"))));
        assert!(!filter.matches(&record(Borough::Bronx, "ROBBERY", Some("2024-03-15T12:00:01"))));
    }

    #[test]
    fn missing_coordinates_fail_bbox_filter() {
        let filter = FilterSpec {
            bbox: Some(BoundingBox::new(-74.02, 40.70, -73.91, 40.88)),
            ..FilterSpec::default()
        }
        .compile()
        .unwrap();

        assert!(!filter.matches(&record(Borough::Manhattan, "ROBBERY", None)));

        let mut located = record(Borough::Manhattan, "ROBBERY", None);
        located.latitude = Some(40.78);
        located.longitude = Some(-73.97);
        assert!(filter.matches(&located));
    }

    #[test]
    fn dimensions_combine_with_and() {
        let filter = FilterSpec {
            borough: Some("queens".to_string()),
            offense: Some("larceny".to_string()),
            ..FilterSpec::default()
        }
        .compile()
        .unwrap();

        assert!(filter.matches(&record(Borough::Queens, "PETIT LARCENY", None)));
        assert!(!filter.matches(&record(Borough::Queens, "ASSAULT", None)));
        assert!(!filter.matches(&record(Borough::Bronx, "PETIT LARCENY", None)));
    }

    #[test]
    fn equivalent_specs_share_a_cache_key() {
        let a = FilterSpec {
            borough: Some("BRONX".to_string()),
            start_date: Some("2024-01-01".to_string()),
            ..FilterSpec::default()
        }
        .compile()
        .unwrap();

        let b = FilterSpec {
            borough: Some("  bronx ".to_string()),
            start_date: Some("2024-01-01T00:00:00".to_string()),
            ..FilterSpec::default()
        }
        .compile()
        .unwrap();

        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn cache_key_field_order_is_stable() {
        let filter = FilterSpec {
            offense: Some("theft".to_string()),
            borough: Some("queens".to_string()),
            ..FilterSpec::default()
        }
        .compile()
        .unwrap();

        assert_eq!(filter.cache_key(), "borough=queens|offense=theft");
    }
}
