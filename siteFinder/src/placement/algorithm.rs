use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::config::placement_config::PlacementConfig;
use crate::placement::axis_alignment::AxisAlignmentPlacer;
use crate::placement::cluster_void::ClusterVoidPlacer;
use crate::placement::grid_maximin::GridMaximinPlacer;
use crate::utils::traits::SitePlacer;

/// The station-only siting algorithms, keyed the way responses and exports name them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    GridMaximin,
    AxisAlignment,
    ClusterVoid,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [
        Algorithm::GridMaximin,
        Algorithm::AxisAlignment,
        Algorithm::ClusterVoid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::GridMaximin => "grid_maximin",
            Algorithm::AxisAlignment => "axis_alignment",
            Algorithm::ClusterVoid => "cluster_void",
        }
    }

    pub fn build_placer(&self, config: &PlacementConfig) -> Box<dyn SitePlacer> {
        match self {
            Algorithm::GridMaximin => Box::new(GridMaximinPlacer::from_config(&config.grid_maximin)),
            Algorithm::AxisAlignment => Box::new(AxisAlignmentPlacer::from_config(&config.axis_alignment)),
            Algorithm::ClusterVoid => Box::new(ClusterVoidPlacer::from_config(&config.cluster_void)),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "grid_maximin" | "grid" => Ok(Algorithm::GridMaximin),
            "axis_alignment" | "axis" => Ok(Algorithm::AxisAlignment),
            "cluster_void" | "kmeans" => Ok(Algorithm::ClusterVoid),
            _ => Err(format!("Unknown algorithm: {}", s)),
        }
    }
}
