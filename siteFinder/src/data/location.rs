use std::fmt;
use geo::{GeodesicDistance, Point};
use serde::{Deserialize, Serialize};
use crate::error::{PlacementError, PlacementResult};

/// A WGS84 point in decimal degrees. Construction rejects non-finite or out-of-range values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLocation")]
pub struct Location {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawLocation {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawLocation> for Location {
    type Error = PlacementError;

    fn try_from(raw: RawLocation) -> Result<Self, Self::Error> {
        Location::new(raw.latitude, raw.longitude)
    }
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> PlacementResult<Self> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(PlacementError::InvalidLocation(format!(
                "non-finite coordinate ({}, {})", latitude, longitude
            )));
        }
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(PlacementError::InvalidLocation(format!(
                "coordinate ({}, {}) outside WGS84 range", latitude, longitude
            )));
        }
        Ok(Self { latitude, longitude })
    }

    // Lattice points are derived from validated bounds, so clamping only absorbs rounding
    pub(crate) fn clamped(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: latitude.clamp(-90.0, 90.0),
            longitude: longitude.clamp(-180.0, 180.0),
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Geodesic (ellipsoidal) distance in kilometres.
    pub fn distance_km(&self, other: &Location) -> f64 {
        self.to_point().geodesic_distance(&other.to_point()) / 1000.0
    }

    /// Distance to the closest of `others`, or infinity when `others` is empty.
    pub fn nearest_distance_km(&self, others: &[Location]) -> f64 {
        others
            .iter()
            .map(|other| self.distance_km(other))
            .fold(f64::INFINITY, f64::min)
    }

    /// Coordinates rounded to `decimals` places, for response payloads.
    pub fn rounded(&self, decimals: i32) -> (f64, f64) {
        let factor = 10f64.powi(decimals);
        (
            (self.latitude * factor).round() / factor,
            (self.longitude * factor).round() / factor,
        )
    }

    // geo points are (x = lon, y = lat)
    pub fn to_point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// A cluster of EV users feeding the road-aware placer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemandCluster {
    pub location: Location,
    pub users: u32,
    pub ev_range_km: f64,
}

impl DemandCluster {
    pub fn new(location: Location, users: u32, ev_range_km: f64) -> Self {
        Self { location, users, ev_range_km }
    }
}
