//! Maximin placement on a cell-center lattice.
//!
//! The unpadded bounding box of the existing locations is split into `rows x cols` cells.
//! Cells that already hold a location are skipped. Every other cell is scored by the
//! geodesic distance from its center to the nearest existing location, and the cell with
//! the largest such distance wins (first in row-major order on ties).

use std::collections::HashSet;
use tracing::debug;
use crate::config::constants::{GRID_MAXIMIN_COLS, GRID_MAXIMIN_ROWS};
use crate::config::placement_config::GridMaximinConfig;
use crate::data::location::Location;
use crate::error::{PlacementError, PlacementResult};
use crate::spatial::lattice::{BoundingBox, Candidate, Lattice};
use crate::utils::logging::{self, OperationCategory, PlacementType};
use crate::utils::traits::SitePlacer;

#[derive(Debug, Clone)]
pub struct GridMaximinPlacer {
    rows: usize,
    cols: usize,
}

impl Default for GridMaximinPlacer {
    fn default() -> Self {
        Self::new(GRID_MAXIMIN_ROWS, GRID_MAXIMIN_COLS)
    }
}

impl GridMaximinPlacer {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    pub fn from_config(config: &GridMaximinConfig) -> Self {
        Self::new(config.rows, config.cols)
    }

    pub fn get_grid_size(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// The lattice this placer searches for `locations`.
    pub fn build_lattice(&self, locations: &[Location]) -> PlacementResult<Lattice> {
        let bounds = BoundingBox::from_locations(locations)?;
        Lattice::cell_centers(bounds, self.rows, self.cols)
    }

    /// Cells holding at least one existing location. Collisions merge silently.
    pub fn occupied_cells(lattice: &Lattice, locations: &[Location]) -> HashSet<(usize, usize)> {
        locations
            .iter()
            .filter_map(|loc| lattice.index_of(loc))
            .collect()
    }

    pub fn find_candidate(&self, locations: &[Location]) -> PlacementResult<Candidate> {
        let _timing = logging::start_timing("grid_maximin_place",
            OperationCategory::Placement { subcategory: PlacementType::GridMaximin });

        let lattice = self.build_lattice(locations)?;
        let occupied = Self::occupied_cells(&lattice, locations);

        debug!(
            locations = locations.len(),
            rows = self.rows,
            cols = self.cols,
            occupied = occupied.len(),
            "grid maximin search"
        );

        let best = lattice.best_candidate(|index, point| {
            if occupied.contains(&index) {
                None
            } else {
                Some(point.nearest_distance_km(locations))
            }
        });

        let best = best.ok_or_else(|| PlacementError::NoFeasibleCandidate(format!(
            "all {} lattice cells are occupied", lattice.len()
        )))?;

        debug!(cell = ?best.index, location = %best.location, min_distance_km = best.score, "grid maximin winner");
        Ok(best)
    }
}

impl SitePlacer for GridMaximinPlacer {
    fn name(&self) -> &'static str {
        "grid_maximin"
    }

    fn place(&self, locations: &[Location]) -> PlacementResult<Location> {
        self.find_candidate(locations).map(|c| c.location)
    }
}
