#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Core crime record and borough types.
//!
//! These are the shared value types every other crate in the workspace
//! builds on: the immutable [`CrimeRecord`] entity, the fixed [`Borough`]
//! enumeration, and the [`BoundingBox`] rectangle used by spatial filters.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// One of the five NYC boroughs, or `Unknown` for records whose source
/// data carried no recognizable borough.
///
/// The canonical string form is the NYPD-style uppercase name
/// (`"STATEN ISLAND"` with a space). Parsing is case-insensitive and
/// accepts the underscore form as well.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Borough {
    /// Manhattan (New York County)
    Manhattan,
    /// Brooklyn (Kings County)
    Brooklyn,
    /// Queens (Queens County)
    Queens,
    /// The Bronx (Bronx County)
    Bronx,
    /// Staten Island (Richmond County)
    #[serde(rename = "STATEN ISLAND")]
    #[strum(to_string = "STATEN ISLAND", serialize = "STATEN_ISLAND")]
    StatenIsland,
    /// Borough missing or unrecognized in the source data.
    Unknown,
}

impl Borough {
    /// Parses a raw borough string, falling back to [`Self::Unknown`]
    /// for anything unrecognized. Never fails: dirty source data
    /// degrades instead of rejecting the record.
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        raw.trim().parse().unwrap_or(Self::Unknown)
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Manhattan,
            Self::Brooklyn,
            Self::Queens,
            Self::Bronx,
            Self::StatenIsland,
            Self::Unknown,
        ]
    }
}

/// A geographic bounding box in WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western longitude boundary.
    pub west: f64,
    /// Southern latitude boundary.
    pub south: f64,
    /// Eastern longitude boundary.
    pub east: f64,
    /// Northern latitude boundary.
    pub north: f64,
}

impl BoundingBox {
    /// Creates a new bounding box from the given coordinates.
    #[must_use]
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Whether the point lies inside the box. Boundaries are inclusive.
    #[must_use]
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat >= self.south && lat <= self.north && lng >= self.west && lng <= self.east
    }
}

/// A single crime incident. Immutable once ingested; the record store
/// never updates or deletes rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrimeRecord {
    /// Unique record identifier.
    pub id: i64,
    /// Source complaint number.
    pub complaint_number: String,
    /// Short offense description (e.g. `"GRAND LARCENY"`).
    pub offense_description: String,
    /// Law category (`FELONY`, `MISDEMEANOR`, `VIOLATION`), if known.
    pub law_category: Option<String>,
    /// Borough where the incident occurred.
    pub borough: Borough,
    /// When the crime occurred. Missing for some source rows.
    pub occurred_at: Option<NaiveDateTime>,
    /// NYPD precinct number, if known.
    pub precinct: Option<i32>,
    /// Latitude (WGS84), if geocoded.
    pub latitude: Option<f64>,
    /// Longitude (WGS84), if geocoded.
    pub longitude: Option<f64>,
    /// Whether an arrest was made.
    pub arrest_made: bool,
    /// Case status (`OPEN`, `CLOSED`, ...). Free text from the source.
    pub status: String,
}

impl CrimeRecord {
    /// Returns `(lat, lng)` when both coordinates are present.
    ///
    /// Records with only one coordinate are treated as having none;
    /// spatial consumers must additionally envelope-check the pair.
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn borough_parse_is_case_insensitive() {
        assert_eq!(Borough::normalize("bronx"), Borough::Bronx);
        assert_eq!(Borough::normalize("BROOKLYN"), Borough::Brooklyn);
        assert_eq!(Borough::normalize("Queens"), Borough::Queens);
    }

    #[test]
    fn staten_island_accepts_both_forms() {
        assert_eq!(Borough::normalize("STATEN ISLAND"), Borough::StatenIsland);
        assert_eq!(Borough::normalize("staten_island"), Borough::StatenIsland);
    }

    #[test]
    fn unrecognized_borough_is_unknown() {
        assert_eq!(Borough::normalize("JERSEY CITY"), Borough::Unknown);
        assert_eq!(Borough::normalize(""), Borough::Unknown);
    }

    #[test]
    fn canonical_display_forms() {
        assert_eq!(Borough::Manhattan.to_string(), "MANHATTAN");
        assert_eq!(Borough::StatenIsland.to_string(), "STATEN ISLAND");
        assert_eq!(Borough::Unknown.to_string(), "UNKNOWN");
    }

    #[test]
    fn bounding_box_is_inclusive() {
        let bbox = BoundingBox::new(-74.02, 40.70, -73.91, 40.88);
        assert!(bbox.contains(40.70, -74.02));
        assert!(bbox.contains(40.88, -73.91));
        assert!(bbox.contains(40.78, -73.97));
        assert!(!bbox.contains(40.69, -73.97));
        assert!(!bbox.contains(40.78, -73.90));
    }

    #[test]
    fn coordinates_require_both_fields() {
        let mut record = CrimeRecord {
            id: 1,
            complaint_number: "2024000001".to_string(),
            offense_description: "ROBBERY".to_string(),
            law_category: Some("FELONY".to_string()),
            borough: Borough::Bronx,
            occurred_at: None,
            precinct: Some(40),
            latitude: Some(40.84),
            longitude: None,
            arrest_made: false,
            status: "OPEN".to_string(),
        };
        assert!(record.coordinates().is_none());

        record.longitude = Some(-73.86);
        assert_eq!(record.coordinates(), Some((40.84, -73.86)));
    }
}
