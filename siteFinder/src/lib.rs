// Main module declarations for siteFinder

// Core drivers
pub mod core {
    pub mod recommend;
    pub mod batch;
}

// Siting algorithms
pub mod placement {
    pub mod grid_maximin;
    pub mod axis_alignment;
    pub mod cluster_void;
    pub mod road_aware;
    pub mod algorithm;
}

// Spatial primitives
pub mod spatial {
    pub mod lattice;
    pub mod kmeans;
}

// Configuration modules
pub mod config {
    pub mod constants;
    pub mod placement_config;
}

// Data types and loaders
pub mod data {
    pub mod location;
    pub mod stations_loader;
    pub mod payload;
}

// Analysis and reporting
pub mod analysis {
    pub mod coverage;
    pub mod reporting;
}

// Utility functions
pub mod utils {
    pub mod logging;
    pub mod csv_export;
    pub mod traits;
}

// CLI interface
pub mod cli {
    pub mod cli;
}

pub mod error;

// Re-export commonly used items
pub use crate::analysis::coverage::{CoverageAnalyzer, CoverageReport};
pub use crate::data::location::{DemandCluster, Location};
pub use crate::error::{PlacementError, PlacementResult};
pub use crate::placement::algorithm::Algorithm;
pub use crate::placement::axis_alignment::AxisAlignmentPlacer;
pub use crate::placement::cluster_void::ClusterVoidPlacer;
pub use crate::placement::grid_maximin::GridMaximinPlacer;
pub use crate::placement::road_aware::{LineRoadNetwork, RoadAwarePlacer};
pub use crate::utils::traits::{RoadNetwork, SitePlacer};
