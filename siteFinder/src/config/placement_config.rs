use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::config::constants::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridMaximinConfig {
    pub rows: usize,
    pub cols: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxisAlignmentConfig {
    pub lines: usize,            // Candidate lines per axis
    pub vehicle_range_deg: f64,  // Offset past the sparse end of the corridor
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterVoidConfig {
    pub n_clusters: usize,
    pub void_threshold_km: f64,
    pub grid_size: usize,
    pub padding_deg: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadAwareConfig {
    pub rows: usize,
    pub cols: usize,
    pub padding_deg: f64,
    pub min_ev_users: u32,
    pub max_distance_to_road_km: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageConfig {
    pub grid_size: usize,
    pub padding_deg: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    pub start_year: i32,
    pub end_year: i32,           // Inclusive
    pub min_region_stations: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementConfig {
    pub grid_maximin: GridMaximinConfig,
    pub axis_alignment: AxisAlignmentConfig,
    pub cluster_void: ClusterVoidConfig,
    pub road_aware: RoadAwareConfig,
    pub coverage: CoverageConfig,
    pub batch: BatchConfig,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            grid_maximin: GridMaximinConfig {
                rows: GRID_MAXIMIN_ROWS,
                cols: GRID_MAXIMIN_COLS,
            },
            axis_alignment: AxisAlignmentConfig {
                lines: CORRIDOR_LINES,
                vehicle_range_deg: ASSUMED_VEHICLE_RANGE_DEG,
            },
            cluster_void: ClusterVoidConfig {
                n_clusters: VOID_CLUSTERS,
                void_threshold_km: VOID_THRESHOLD_KM,
                grid_size: VOID_GRID_SIZE,
                padding_deg: VOID_PADDING_DEG,
            },
            road_aware: RoadAwareConfig {
                rows: ROAD_AWARE_ROWS,
                cols: ROAD_AWARE_COLS,
                padding_deg: ROAD_AWARE_PADDING_DEG,
                min_ev_users: MIN_EV_USERS,
                max_distance_to_road_km: MAX_DISTANCE_TO_ROAD_KM,
            },
            coverage: CoverageConfig {
                grid_size: COVERAGE_GRID_SIZE,
                padding_deg: COVERAGE_PADDING_DEG,
            },
            batch: BatchConfig {
                start_year: BATCH_START_YEAR,
                end_year: BATCH_END_YEAR,
                min_region_stations: MIN_REGION_STATIONS,
            },
        }
    }
}

impl PlacementConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }
}
