#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Geographic envelope, borough regions, and heatmap binning.
//!
//! The envelope and per-borough rectangles are fixed constants covering
//! the five NYC boroughs. Coordinates outside the envelope are treated
//! as bad geocodes and excluded from spatial output; the records
//! themselves are never rejected.

use gotham_crime_models::{Borough, BoundingBox, CrimeRecord};
use serde::{Deserialize, Serialize};

/// Envelope of valid coordinates: the union of the borough rectangles.
pub const NYC_ENVELOPE: BoundingBox = BoundingBox::new(-74.26, 40.47, -73.70, 40.92);

/// Errors from region resolution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeoError {
    /// The region name does not match any borough.
    #[error("Unknown region '{name}': expected one of the five boroughs")]
    UnknownRegion {
        /// The unmatched region name as supplied.
        name: String,
    },
}

/// Resolves a user-supplied region name to a borough.
///
/// Matching is case-insensitive and accepts both `"STATEN ISLAND"` and
/// `"STATEN_ISLAND"` forms.
///
/// # Errors
///
/// Returns [`GeoError::UnknownRegion`] for names that do not resolve to
/// one of the five boroughs.
pub fn resolve_region(name: &str) -> Result<Borough, GeoError> {
    match Borough::normalize(name) {
        Borough::Unknown => Err(GeoError::UnknownRegion {
            name: name.to_string(),
        }),
        borough => Ok(borough),
    }
}

/// Approximate center point `(lat, lng)` of a borough.
#[must_use]
pub const fn region_center(borough: Borough) -> Option<(f64, f64)> {
    match borough {
        Borough::Manhattan => Some((40.7831, -73.9712)),
        Borough::Brooklyn => Some((40.6782, -73.9442)),
        Borough::Queens => Some((40.7282, -73.7949)),
        Borough::Bronx => Some((40.8448, -73.8648)),
        Borough::StatenIsland => Some((40.5795, -74.1502)),
        Borough::Unknown => None,
    }
}

/// Bounding rectangle of a borough.
#[must_use]
pub const fn region_bounds(borough: Borough) -> Option<BoundingBox> {
    match borough {
        Borough::Manhattan => Some(BoundingBox::new(-74.02, 40.70, -73.91, 40.88)),
        Borough::Brooklyn => Some(BoundingBox::new(-74.06, 40.57, -73.84, 40.74)),
        Borough::Queens => Some(BoundingBox::new(-73.96, 40.54, -73.70, 40.80)),
        Borough::Bronx => Some(BoundingBox::new(-73.93, 40.79, -73.76, 40.92)),
        Borough::StatenIsland => Some(BoundingBox::new(-74.26, 40.47, -74.05, 40.65)),
        Borough::Unknown => None,
    }
}

/// Whether the coordinate pair is a plausible geocode for the covered
/// geography.
#[must_use]
pub fn in_envelope(lat: f64, lng: f64) -> bool {
    NYC_ENVELOPE.contains(lat, lng)
}

/// One heatmap density point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatPoint {
    /// Latitude (WGS84).
    pub lat: f64,
    /// Longitude (WGS84).
    pub lng: f64,
    /// Point density weight.
    pub weight: u32,
}

/// Produces heatmap points from record coordinates.
///
/// Records without both coordinates, or with coordinates outside the
/// NYC envelope, are dropped. When a region is given, output is further
/// restricted to points inside that borough's rectangle (inclusive).
/// Each surviving record contributes one point with weight 1 at its
/// exact position. The input is never mutated and the output carries no
/// ordering guarantee beyond scan order.
pub fn heatmap<'a>(
    records: impl IntoIterator<Item = &'a CrimeRecord>,
    region: Option<Borough>,
) -> Vec<HeatPoint> {
    let region_box = region.and_then(region_bounds);

    let mut points = Vec::new();
    let mut skipped = 0_usize;

    for record in records {
        let Some((lat, lng)) = record.coordinates() else {
            continue;
        };
        if !in_envelope(lat, lng) {
            skipped += 1;
            continue;
        }
        if let Some(bounds) = &region_box {
            if !bounds.contains(lat, lng) {
                continue;
            }
        }
        points.push(HeatPoint {
            lat,
            lng,
            weight: 1,
        });
    }

    if skipped > 0 {
        log::debug!("Heatmap dropped {skipped} out-of-envelope geocodes");
    }

    points
}
