use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::config::constants::{COVERAGE_GRID_SIZE, COVERAGE_PADDING_DEG};
use crate::config::placement_config::CoverageConfig;
use crate::data::location::Location;
use crate::spatial::lattice::{BoundingBox, Lattice};
use crate::utils::logging::{self, OperationCategory};

/// Nearest-station distance statistics (km) before and after adding proposed sites.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    pub avg_distance_before: f64,
    pub avg_distance_after: f64,
    pub max_distance_before: f64,
    pub max_distance_after: f64,
    /// `NaN` when the "before" average is zero or not finite.
    pub improvement_percent: f64,
}

impl CoverageReport {
    fn from_distances(before: &[f64], after: &[f64]) -> Self {
        let mean = |d: &[f64]| if d.is_empty() { f64::NAN } else { d.iter().sum::<f64>() / d.len() as f64 };
        let max = |d: &[f64]| d.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let avg_distance_before = mean(before);
        let avg_distance_after = mean(after);

        let improvement_percent = if avg_distance_before == 0.0 {
            f64::NAN
        } else {
            (avg_distance_before - avg_distance_after) / avg_distance_before * 100.0
        };

        Self {
            avg_distance_before,
            avg_distance_after,
            max_distance_before: max(before),
            max_distance_after: max(after),
            improvement_percent,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CoverageAnalyzer {
    grid_size: usize,
    padding_deg: f64,
}

impl Default for CoverageAnalyzer {
    fn default() -> Self {
        Self::new(COVERAGE_GRID_SIZE, COVERAGE_PADDING_DEG)
    }
}

impl CoverageAnalyzer {
    pub fn new(grid_size: usize, padding_deg: f64) -> Self {
        Self { grid_size, padding_deg }
    }

    pub fn from_config(config: &CoverageConfig) -> Self {
        Self::new(config.grid_size, config.padding_deg)
    }

    /// Coverage of `existing` before and after adding a single proposed station.
    pub fn analyze(&self, existing: &[Location], proposed: &Location) -> CoverageReport {
        self.analyze_many(existing, std::slice::from_ref(proposed))
    }

    /// Coverage of `existing` before and after adding every site in `proposed`.
    ///
    /// Never fails: degenerate inputs surface as `NaN` or infinite fields.
    pub fn analyze_many(&self, existing: &[Location], proposed: &[Location]) -> CoverageReport {
        let _timing = logging::start_timing("analyze_coverage", OperationCategory::Coverage);

        let all: Vec<Location> = existing.iter().chain(proposed.iter()).copied().collect();

        let lattice = match BoundingBox::from_locations(&all)
            .and_then(|b| Lattice::inclusive(b.padded(self.padding_deg), self.grid_size, self.grid_size))
        {
            Ok(lattice) => lattice,
            Err(_) => return CoverageReport::from_distances(&[], &[]),
        };

        let (before, after): (Vec<f64>, Vec<f64>) = lattice
            .points()
            .par_iter()
            .map(|point| {
                let before = point.nearest_distance_km(existing);
                let after = before.min(point.nearest_distance_km(proposed));
                (before, after)
            })
            .unzip();

        let report = CoverageReport::from_distances(&before, &after);
        debug!(?report, points = lattice.len(), "coverage analysis");
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(lat: f64, lon: f64) -> Location {
        Location::new(lat, lon).unwrap()
    }

    #[test]
    fn adding_a_station_never_worsens_coverage() {
        let existing = vec![loc(33.65, -84.42), loc(33.66, -84.44), loc(33.67, -84.41)];
        let analyzer = CoverageAnalyzer::default();

        for proposed in [loc(33.80, -84.20), loc(33.655, -84.43), loc(33.40, -84.70)] {
            let report = analyzer.analyze(&existing, &proposed);
            assert!(report.avg_distance_after <= report.avg_distance_before);
            assert!(report.max_distance_after <= report.max_distance_before);
            assert!(report.improvement_percent >= 0.0);
        }
    }

    #[test]
    fn coincident_station_changes_nothing() {
        let existing = vec![loc(33.65, -84.42), loc(33.66, -84.44)];
        let report = CoverageAnalyzer::default().analyze(&existing, &existing[0]);

        assert_eq!(report.avg_distance_before, report.avg_distance_after);
        assert_eq!(report.improvement_percent, 0.0);
    }

    #[test]
    fn zero_before_distance_reports_nan() {
        // One lattice point sitting exactly on the only station
        let existing = vec![loc(10.0, 10.0)];
        let analyzer = CoverageAnalyzer::new(1, 0.0);
        let report = analyzer.analyze(&existing, &loc(10.0, 10.0));

        assert_eq!(report.avg_distance_before, 0.0);
        assert!(report.improvement_percent.is_nan());
    }

    #[test]
    fn empty_existing_set_reports_infinite_before() {
        let report = CoverageAnalyzer::default().analyze(&[], &loc(33.65, -84.42));

        assert!(report.avg_distance_before.is_infinite());
        assert!(report.avg_distance_after.is_finite());
        assert!(report.improvement_percent.is_nan());
    }

    #[test]
    fn improvement_percent_matches_averages() {
        let existing = vec![loc(33.65, -84.42), loc(33.66, -84.44), loc(33.67, -84.41)];
        let report = CoverageAnalyzer::default().analyze(&existing, &loc(33.75, -84.30));
        let expected = (report.avg_distance_before - report.avg_distance_after) / report.avg_distance_before * 100.0;

        assert!((report.improvement_percent - expected).abs() < 1e-12);
        assert!(report.improvement_percent > 0.0);
    }
}
