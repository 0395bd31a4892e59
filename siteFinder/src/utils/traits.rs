// Seams between the drivers and the siting algorithms

use crate::data::location::Location;
use crate::error::PlacementResult;

pub trait SitePlacer: Send + Sync {
    fn name(&self) -> &'static str;
    fn place(&self, locations: &[Location]) -> PlacementResult<Location>;
}

/// Road geometry supplied by an external collaborator.
pub trait RoadNetwork: Send + Sync {
    /// Distance in kilometres from `point` to the closest road.
    fn nearest_road_distance(&self, point: &Location) -> f64;
}
