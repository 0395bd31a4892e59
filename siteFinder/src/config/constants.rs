// Earth and range constants
pub const EARTH_CIRCUMFERENCE_MILES: f64 = 24_901.92;
pub const DEGREES_PER_MILE: f64 = 360.0 / EARTH_CIRCUMFERENCE_MILES;
pub const ASSUMED_VEHICLE_RANGE_MILES: f64 = 25.0;   // Average EV range, rounded down
pub const ASSUMED_VEHICLE_RANGE_DEG: f64 = ASSUMED_VEHICLE_RANGE_MILES * DEGREES_PER_MILE; // ~0.3614 deg

// Grid maximin placement
pub const GRID_MAXIMIN_ROWS: usize = 25;
pub const GRID_MAXIMIN_COLS: usize = 25;

// Axis alignment placement
pub const CORRIDOR_LINES: usize = 10;                // Candidate lines per axis

// Cluster void placement
pub const VOID_CLUSTERS: usize = 10;
pub const VOID_THRESHOLD_KM: f64 = 10.0;
pub const VOID_GRID_SIZE: usize = 50;
pub const VOID_PADDING_DEG: f64 = 0.1;

// K-means
pub const KMEANS_SEED: u64 = 0;
pub const KMEANS_MAX_ITERATIONS: usize = 300;
pub const KMEANS_TOLERANCE: f64 = 1e-4;

// Coverage analysis
pub const COVERAGE_GRID_SIZE: usize = 20;
pub const COVERAGE_PADDING_DEG: f64 = 0.1;

// Road aware placement
pub const ROAD_AWARE_ROWS: usize = 10;
pub const ROAD_AWARE_COLS: usize = 10;
pub const ROAD_AWARE_PADDING_DEG: f64 = 0.5;
pub const MIN_EV_USERS: u32 = 40;
pub const MAX_DISTANCE_TO_ROAD_KM: f64 = 1.0;

// Response formatting
pub const OUTPUT_DECIMALS: i32 = 5;

// Batch prediction
pub const BATCH_START_YEAR: i32 = 2010;
pub const BATCH_END_YEAR: i32 = 2023;
pub const MIN_REGION_STATIONS: usize = 10;          // Regions need more than this many stations
