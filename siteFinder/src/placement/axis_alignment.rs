//! Corridor placement along inferred latitude/longitude lines.
//!
//! Unknown road alignments are approximated by `lines` evenly spaced candidate latitude
//! lines and longitude lines across the bounding box. Each location is counted toward the
//! first line on each axis whose half-step window contains it. The best-supported line
//! (longitude wins ties between axes, lowest index wins ties within an axis) is taken as
//! the corridor, and the new site is placed on it one vehicle range past the last station
//! at the sparser end.
//!
//! Ties between several equally supported lines on the winning axis are not re-split; the
//! first line in index order is used.

use tracing::debug;
use crate::config::constants::{ASSUMED_VEHICLE_RANGE_DEG, CORRIDOR_LINES};
use crate::config::placement_config::AxisAlignmentConfig;
use crate::data::location::Location;
use crate::error::{PlacementError, PlacementResult};
use crate::spatial::lattice::BoundingBox;
use crate::utils::logging::{self, OperationCategory, PlacementType};
use crate::utils::traits::SitePlacer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// A line of constant latitude (runs east-west)
    Latitude,
    /// A line of constant longitude (runs north-south)
    Longitude,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Lower,
    Upper,
}

/// Candidate lines on one axis and how many locations fell on each.
#[derive(Debug, Clone)]
pub struct AxisLines {
    pub lines: Vec<f64>,
    pub counts: Vec<usize>,
    pub half_step: f64,
}

impl AxisLines {
    fn build(min: f64, max: f64, n: usize, values: impl Iterator<Item = f64>) -> Self {
        let step = (max - min) / (n - 1) as f64;
        let half_step = step / 2.0;
        let lines: Vec<f64> = (0..n).map(|k| min + k as f64 * step).collect();
        let mut counts = vec![0; n];

        for value in values {
            if let Some(k) = lines.iter().position(|line| (value - line).abs() <= half_step) {
                counts[k] += 1;
            }
        }

        Self { lines, counts, half_step }
    }

    /// Highest count and the first line index that reaches it.
    pub fn best(&self) -> (usize, usize) {
        let best_count = self.counts.iter().copied().max().unwrap_or(0);
        let index = self.counts.iter().position(|&c| c == best_count).unwrap_or(0);
        (best_count, index)
    }

    pub fn contains(&self, index: usize, value: f64) -> bool {
        (value - self.lines[index]).abs() <= self.half_step
    }
}

/// The chosen corridor and where along it the new site goes.
#[derive(Debug, Clone)]
pub struct Corridor {
    pub axis: Axis,
    pub line_index: usize,
    pub line_value: f64,
    pub support: usize,
    pub side: Side,
    pub end: f64,
}

#[derive(Debug, Clone)]
pub struct AxisAlignmentPlacer {
    lines: usize,
    vehicle_range_deg: f64,
}

impl Default for AxisAlignmentPlacer {
    fn default() -> Self {
        Self::new(CORRIDOR_LINES, ASSUMED_VEHICLE_RANGE_DEG)
    }
}

impl AxisAlignmentPlacer {
    pub fn new(lines: usize, vehicle_range_deg: f64) -> Self {
        Self { lines, vehicle_range_deg }
    }

    pub fn from_config(config: &AxisAlignmentConfig) -> Self {
        Self::new(config.lines, config.vehicle_range_deg)
    }

    pub fn get_vehicle_range_deg(&self) -> f64 {
        self.vehicle_range_deg
    }

    pub fn find_corridor(&self, locations: &[Location]) -> PlacementResult<Corridor> {
        if locations.len() < 2 {
            return Err(PlacementError::DegenerateInput(format!(
                "corridor inference needs at least 2 locations, got {}", locations.len()
            )));
        }
        if self.lines < 2 {
            return Err(PlacementError::DegenerateInput(format!(
                "corridor inference needs at least 2 candidate lines, got {}", self.lines
            )));
        }

        let bounds = BoundingBox::from_locations(locations)?;
        bounds.ensure_extent()?;

        let lat_lines = AxisLines::build(
            bounds.min_lat, bounds.max_lat, self.lines,
            locations.iter().map(|l| l.latitude()),
        );
        let lon_lines = AxisLines::build(
            bounds.min_lon, bounds.max_lon, self.lines,
            locations.iter().map(|l| l.longitude()),
        );

        let (best_lat, lat_index) = lat_lines.best();
        let (best_lon, lon_index) = lon_lines.best();

        debug!(?lat_lines.counts, ?lon_lines.counts, "corridor line support");

        // Ties between axes go to longitude
        let (axis, lines, line_index, support) = if best_lat > best_lon {
            (Axis::Latitude, &lat_lines, lat_index, best_lat)
        } else {
            (Axis::Longitude, &lon_lines, lon_index, best_lon)
        };

        // Latitude lines run east-west so the corridor extends along longitude, and vice versa
        let along = |l: &Location| match axis {
            Axis::Latitude => l.longitude(),
            Axis::Longitude => l.latitude(),
        };
        let across = |l: &Location| match axis {
            Axis::Latitude => l.latitude(),
            Axis::Longitude => l.longitude(),
        };
        let (along_min, along_max) = match axis {
            Axis::Latitude => (bounds.min_lon, bounds.max_lon),
            Axis::Longitude => (bounds.min_lat, bounds.max_lat),
        };

        let sep = (along_min + along_max) / 2.0;
        let lower = locations.iter().filter(|l| along(*l) < sep).count();
        let upper = locations.len() - lower;
        let side = if lower < upper { Side::Lower } else { Side::Upper };

        let on_corridor: Vec<f64> = locations
            .iter()
            .filter(|l| lines.contains(line_index, across(*l)))
            .map(|l| along(l))
            .collect();
        let candidates = if on_corridor.is_empty() {
            locations.iter().map(|l| along(l)).collect()
        } else {
            on_corridor
        };

        let end = match side {
            Side::Lower => candidates.iter().copied().fold(f64::INFINITY, f64::min),
            Side::Upper => candidates.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        };

        Ok(Corridor {
            axis,
            line_index,
            line_value: lines.lines[line_index],
            support,
            side,
            end,
        })
    }
}

impl SitePlacer for AxisAlignmentPlacer {
    fn name(&self) -> &'static str {
        "axis_alignment"
    }

    fn place(&self, locations: &[Location]) -> PlacementResult<Location> {
        let _timing = logging::start_timing("axis_alignment_place",
            OperationCategory::Placement { subcategory: PlacementType::AxisAlignment });

        let corridor = self.find_corridor(locations)?;

        let offset = match corridor.side {
            Side::Lower => -self.vehicle_range_deg,
            Side::Upper => self.vehicle_range_deg,
        };
        let extended = corridor.end + offset;

        debug!(
            axis = ?corridor.axis,
            line = corridor.line_index,
            support = corridor.support,
            side = ?corridor.side,
            "corridor chosen"
        );

        match corridor.axis {
            Axis::Latitude => Location::new(corridor.line_value, wrap_longitude(extended)),
            Axis::Longitude => {
                if !(-90.0..=90.0).contains(&extended) {
                    return Err(PlacementError::NoFeasibleCandidate(format!(
                        "extending the corridor to latitude {:.4} passes the pole", extended
                    )));
                }
                Location::new(extended, corridor.line_value)
            }
        }
    }
}

/// Brings a longitude pushed past the antimeridian back into [-180, 180].
fn wrap_longitude(lon: f64) -> f64 {
    if (-180.0..=180.0).contains(&lon) {
        lon
    } else {
        (lon + 180.0).rem_euclid(360.0) - 180.0
    }
}
