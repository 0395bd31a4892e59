//! Road-aware placement with demand and range constraints.
//!
//! Candidates come from an inclusive lattice over the station bounding box padded by half
//! a degree. A candidate is feasible when:
//! - its nearest station is within the mean EV range of the demand clusters,
//! - demand clusters within that range hold at least `min_ev_users` users,
//! - the supplied road network reaches it within `max_distance_to_road_km`.
//!
//! Among feasible candidates the one farthest from its nearest station is selected.
//! Road geometry comes from the caller through [`RoadNetwork`].

use geo::{Closest, ClosestPoint, LineString};
use tracing::debug;
use crate::config::constants::{
    MAX_DISTANCE_TO_ROAD_KM, MIN_EV_USERS, ROAD_AWARE_COLS, ROAD_AWARE_PADDING_DEG, ROAD_AWARE_ROWS,
};
use crate::config::placement_config::RoadAwareConfig;
use crate::data::location::{DemandCluster, Location};
use crate::error::{PlacementError, PlacementResult};
use crate::spatial::lattice::{BoundingBox, Candidate, Lattice};
use crate::utils::logging::{self, OperationCategory, PlacementType};
use crate::utils::traits::{RoadNetwork, SitePlacer};

/// Road network backed by in-memory polylines in (lon, lat) order.
///
/// The closest point on each line is found in degree space, then measured geodesically.
#[derive(Debug, Clone, Default)]
pub struct LineRoadNetwork {
    roads: Vec<LineString<f64>>,
}

impl LineRoadNetwork {
    pub fn new(roads: Vec<LineString<f64>>) -> Self {
        Self { roads }
    }

    /// Builds one polyline from a sequence of locations.
    pub fn add_road(&mut self, points: &[Location]) {
        let line: LineString<f64> = points.iter().map(|p| (p.longitude(), p.latitude())).collect();
        self.roads.push(line);
    }

    pub fn len(&self) -> usize {
        self.roads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roads.is_empty()
    }
}

impl RoadNetwork for LineRoadNetwork {
    fn nearest_road_distance(&self, point: &Location) -> f64 {
        let target = point.to_point();
        self.roads
            .iter()
            .filter_map(|road| match road.closest_point(&target) {
                Closest::Intersection(p) | Closest::SinglePoint(p) => {
                    Location::new(p.y(), p.x()).ok()
                }
                Closest::Indeterminate => None,
            })
            .map(|closest| point.distance_km(&closest))
            .fold(f64::INFINITY, f64::min)
    }
}

#[derive(Debug, Clone)]
pub struct RoadAwarePlacer<R: RoadNetwork> {
    demand: Vec<DemandCluster>,
    roads: R,
    rows: usize,
    cols: usize,
    padding_deg: f64,
    min_ev_users: u32,
    max_distance_to_road_km: f64,
}

impl<R: RoadNetwork> RoadAwarePlacer<R> {
    pub fn new(demand: Vec<DemandCluster>, roads: R) -> Self {
        Self {
            demand,
            roads,
            rows: ROAD_AWARE_ROWS,
            cols: ROAD_AWARE_COLS,
            padding_deg: ROAD_AWARE_PADDING_DEG,
            min_ev_users: MIN_EV_USERS,
            max_distance_to_road_km: MAX_DISTANCE_TO_ROAD_KM,
        }
    }

    pub fn from_config(demand: Vec<DemandCluster>, roads: R, config: &RoadAwareConfig) -> Self {
        Self {
            demand,
            roads,
            rows: config.rows,
            cols: config.cols,
            padding_deg: config.padding_deg,
            min_ev_users: config.min_ev_users,
            max_distance_to_road_km: config.max_distance_to_road_km,
        }
    }

    pub fn with_min_ev_users(mut self, min_ev_users: u32) -> Self {
        self.min_ev_users = min_ev_users;
        self
    }

    pub fn with_max_distance_to_road(mut self, km: f64) -> Self {
        self.max_distance_to_road_km = km;
        self
    }

    pub fn with_grid(mut self, rows: usize, cols: usize, padding_deg: f64) -> Self {
        self.rows = rows;
        self.cols = cols;
        self.padding_deg = padding_deg;
        self
    }

    /// Mean EV range over the demand clusters.
    pub fn mean_ev_range_km(&self) -> PlacementResult<f64> {
        if self.demand.is_empty() {
            return Err(PlacementError::InsufficientData("no demand clusters supplied".to_string()));
        }
        Ok(self.demand.iter().map(|d| d.ev_range_km).sum::<f64>() / self.demand.len() as f64)
    }

    /// Users in demand clusters reachable from `point` within `range_km`.
    pub fn users_within(&self, point: &Location, range_km: f64) -> u32 {
        self.demand
            .iter()
            .filter(|d| point.distance_km(&d.location) <= range_km)
            .fold(0u32, |total, d| total.saturating_add(d.users))
    }

    pub fn find_candidate(&self, locations: &[Location]) -> PlacementResult<Candidate> {
        let _timing = logging::start_timing("road_aware_place",
            OperationCategory::Placement { subcategory: PlacementType::RoadAware });

        if locations.is_empty() {
            return Err(PlacementError::DegenerateInput("no existing stations".to_string()));
        }
        let ev_range = self.mean_ev_range_km()?;

        let bounds = BoundingBox::from_locations(locations)?.padded(self.padding_deg);
        let lattice = Lattice::inclusive(bounds, self.rows, self.cols)?;

        debug!(
            stations = locations.len(),
            demand_clusters = self.demand.len(),
            ev_range_km = ev_range,
            "road aware search"
        );

        let best = lattice.best_candidate(|_, point| {
            let nearest_station = point.nearest_distance_km(locations);
            if nearest_station > ev_range {
                return None;
            }
            if self.users_within(point, ev_range) < self.min_ev_users {
                return None;
            }
            if self.roads.nearest_road_distance(point) > self.max_distance_to_road_km {
                return None;
            }
            Some(nearest_station)
        });

        best.ok_or_else(|| PlacementError::NoFeasibleCandidate(format!(
            "no candidate satisfies range {:.1} km, {} users and road distance {:.2} km",
            ev_range, self.min_ev_users, self.max_distance_to_road_km
        )))
    }
}

impl<R: RoadNetwork> SitePlacer for RoadAwarePlacer<R> {
    fn name(&self) -> &'static str {
        "road_aware"
    }

    fn place(&self, locations: &[Location]) -> PlacementResult<Location> {
        self.find_candidate(locations).map(|c| c.location)
    }
}
