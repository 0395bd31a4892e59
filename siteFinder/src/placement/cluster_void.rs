//! Void detection around k-means demand centers.
//!
//! Existing stations are clustered to approximate where demand concentrates. A fine
//! inclusive lattice over the padded bounding box is then scored per point:
//!
//! ```text
//! score = min_station_dist * 1 / (min_cluster_dist + 1)   if min_station_dist > threshold
//!       = disqualified                                       otherwise
//! ```
//!
//! Distance from existing stations is rewarded linearly, distance from demand centers is
//! penalized with diminishing returns. Only points outside the current coverage radius
//! are eligible. The lattice is scanned longitude-major, so an exact score tie resolves to
//! the lowest longitude column first.

use tracing::debug;
use crate::config::constants::{VOID_CLUSTERS, VOID_GRID_SIZE, VOID_PADDING_DEG, VOID_THRESHOLD_KM};
use crate::config::placement_config::ClusterVoidConfig;
use crate::data::location::Location;
use crate::error::{PlacementError, PlacementResult};
use crate::spatial::kmeans::{kmeans, Clustering, KMeansConfig};
use crate::spatial::lattice::{BoundingBox, Candidate, Lattice, ScanOrder};
use crate::utils::logging::{self, OperationCategory, PlacementType};
use crate::utils::traits::SitePlacer;

#[derive(Debug, Clone)]
pub struct ClusterVoidPlacer {
    n_clusters: usize,
    void_threshold_km: f64,
    grid_size: usize,
    padding_deg: f64,
}

impl Default for ClusterVoidPlacer {
    fn default() -> Self {
        Self::new(VOID_CLUSTERS, VOID_THRESHOLD_KM)
    }
}

/// Void score of a single point, `None` when it lies inside existing coverage.
pub fn void_score(min_station_dist: f64, min_cluster_dist: f64, void_threshold_km: f64) -> Option<f64> {
    if min_station_dist > void_threshold_km {
        Some(min_station_dist * (1.0 / (min_cluster_dist + 1.0)))
    } else {
        None
    }
}

impl ClusterVoidPlacer {
    pub fn new(n_clusters: usize, void_threshold_km: f64) -> Self {
        Self {
            n_clusters,
            void_threshold_km,
            grid_size: VOID_GRID_SIZE,
            padding_deg: VOID_PADDING_DEG,
        }
    }

    pub fn from_config(config: &ClusterVoidConfig) -> Self {
        Self {
            n_clusters: config.n_clusters,
            void_threshold_km: config.void_threshold_km,
            grid_size: config.grid_size,
            padding_deg: config.padding_deg,
        }
    }

    pub fn with_grid(mut self, grid_size: usize, padding_deg: f64) -> Self {
        self.grid_size = grid_size;
        self.padding_deg = padding_deg;
        self
    }

    pub fn get_void_threshold_km(&self) -> f64 {
        self.void_threshold_km
    }

    pub fn cluster(&self, locations: &[Location]) -> PlacementResult<Clustering> {
        kmeans(locations, &KMeansConfig::new(self.n_clusters))
    }

    pub fn build_lattice(&self, locations: &[Location]) -> PlacementResult<Lattice> {
        let bounds = BoundingBox::from_locations(locations)?.padded(self.padding_deg);
        Ok(Lattice::inclusive(bounds, self.grid_size, self.grid_size)?
            .with_scan_order(ScanOrder::LongitudeMajor))
    }

    pub fn find_candidate(&self, locations: &[Location]) -> PlacementResult<Candidate> {
        let _timing = logging::start_timing("cluster_void_place",
            OperationCategory::Placement { subcategory: PlacementType::ClusterVoid });

        if locations.is_empty() {
            return Err(PlacementError::DegenerateInput("no existing locations".to_string()));
        }
        if self.n_clusters > locations.len() {
            return Err(PlacementError::InsufficientData(format!(
                "{} clusters requested but only {} locations available",
                self.n_clusters, locations.len()
            )));
        }

        let clustering = self.cluster(locations)?;
        let centers = &clustering.centers;
        let lattice = self.build_lattice(locations)?;

        debug!(
            locations = locations.len(),
            clusters = centers.len(),
            points = lattice.len(),
            threshold_km = self.void_threshold_km,
            "cluster void search"
        );

        let best = lattice.best_candidate(|_, point| {
            let min_station_dist = point.nearest_distance_km(locations);
            if min_station_dist <= self.void_threshold_km {
                return None;
            }
            let min_cluster_dist = point.nearest_distance_km(centers);
            void_score(min_station_dist, min_cluster_dist, self.void_threshold_km)
        });

        let best = best.ok_or_else(|| PlacementError::NoFeasibleCandidate(format!(
            "every lattice point is within {} km of an existing station", self.void_threshold_km
        )))?;

        debug!(location = %best.location, score = best.score, "cluster void winner");
        Ok(best)
    }
}

impl SitePlacer for ClusterVoidPlacer {
    fn name(&self) -> &'static str {
        "cluster_void"
    }

    fn place(&self, locations: &[Location]) -> PlacementResult<Location> {
        self.find_candidate(locations).map(|c| c.location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(lat: f64, lon: f64) -> Location {
        Location::new(lat, lon).unwrap()
    }

    #[test]
    fn score_is_gated_by_threshold() {
        assert_eq!(void_score(5.0, 0.0, 10.0), None);
        assert_eq!(void_score(10.0, 0.0, 10.0), None);
        assert_eq!(void_score(20.0, 1.0, 10.0), Some(10.0));
        assert_eq!(void_score(20.0, 0.0, 10.0), Some(20.0));
    }

    #[test]
    fn too_many_clusters_is_insufficient_data() {
        let placer = ClusterVoidPlacer::default();
        let result = placer.place(&[loc(33.65, -84.42), loc(33.66, -84.44)]);
        assert!(matches!(result, Err(PlacementError::InsufficientData(_))));
    }

    #[test]
    fn empty_input_is_degenerate() {
        assert!(matches!(ClusterVoidPlacer::default().place(&[]), Err(PlacementError::DegenerateInput(_))));
    }

    #[test]
    fn huge_threshold_leaves_no_candidate() {
        let placer = ClusterVoidPlacer::new(2, 10_000.0);
        let result = placer.place(&[loc(33.65, -84.42), loc(33.66, -84.44)]);
        assert!(matches!(result, Err(PlacementError::NoFeasibleCandidate(_))));
    }

    #[test]
    fn candidate_lies_outside_threshold() {
        let locations = vec![
            loc(33.65, -84.42), loc(33.66, -84.44), loc(33.67, -84.41),
            loc(33.70, -84.38), loc(33.62, -84.45),
        ];
        let placer = ClusterVoidPlacer::new(3, 5.0);
        let best = placer.find_candidate(&locations).unwrap();

        assert!(best.location.nearest_distance_km(&locations) > 5.0);
        assert!(best.score > 0.0);
    }

    #[test]
    fn void_lattice_scans_longitude_first() {
        let placer = ClusterVoidPlacer::new(2, 1.0).with_grid(5, 0.0);
        let lattice = placer.build_lattice(&[loc(33.0, -84.0), loc(34.0, -83.0)]).unwrap();

        assert_eq!(lattice.scan_order(), ScanOrder::LongitudeMajor);
        assert_eq!(lattice.unflatten(1), (1, 0));
        assert_eq!(lattice.point(1, 0).longitude(), -84.0);
    }

    #[test]
    fn same_input_same_answer() {
        let locations = vec![
            loc(33.65, -84.42), loc(33.66, -84.44), loc(33.67, -84.41),
            loc(33.70, -84.38), loc(33.62, -84.45), loc(33.64, -84.40),
        ];
        let placer = ClusterVoidPlacer::new(4, 3.0);
        let a = placer.place(&locations).unwrap();
        let b = placer.place(&locations).unwrap();
        assert_eq!(a, b);
    }
}
