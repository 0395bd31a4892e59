//! Yearly prediction runs over historical station data.
//!
//! For every target year, stations opened strictly before that year are grouped by
//! `(city, state)`. Regions holding more than `min_region_stations` stations each get one
//! prediction per algorithm. (year, region) jobs are independent and run on the rayon pool.

use std::collections::BTreeMap;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};
use crate::config::placement_config::{BatchConfig, PlacementConfig};
use crate::core::recommend::Recommender;
use crate::data::location::Location;
use crate::data::stations_loader::StationRecord;
use crate::placement::algorithm::Algorithm;
use crate::utils::logging::{self, OperationCategory};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub algorithm: Algorithm,
    pub year: i32,
    pub city: String,
    pub state: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// One (year, region) unit of work.
#[derive(Debug, Clone)]
pub struct RegionJob {
    pub year: i32,
    pub city: String,
    pub state: String,
    pub locations: Vec<Location>,
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub predictions: Vec<Prediction>,
    pub jobs: usize,
    pub failures: usize,
}

/// Regions with more than `min_stations` stations opened before `year`.
///
/// Stations without an open date or region are never counted.
pub fn regions_before(stations: &[StationRecord], year: i32, min_stations: usize) -> Vec<RegionJob> {
    let mut groups: BTreeMap<(&str, &str), Vec<Location>> = BTreeMap::new();

    for station in stations {
        let opened_before = station.open_year().map_or(false, |y| y < year);
        if let (true, Some(region)) = (opened_before, station.region()) {
            groups.entry(region).or_default().push(station.location);
        }
    }

    groups
        .into_iter()
        .filter(|(_, locations)| locations.len() > min_stations)
        .map(|((city, state), locations)| RegionJob {
            year,
            city: city.to_string(),
            state: state.to_string(),
            locations,
        })
        .collect()
}

pub fn plan_jobs(stations: &[StationRecord], batch: &BatchConfig) -> Vec<RegionJob> {
    (batch.start_year..=batch.end_year)
        .flat_map(|year| regions_before(stations, year, batch.min_region_stations))
        .collect()
}

fn progress_bar(len: usize, show: bool) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} {msg}") {
        pb.set_style(style);
    }
    pb
}

pub fn run_batch(
    stations: &[StationRecord],
    config: &PlacementConfig,
    algorithms: &[Algorithm],
    show_progress: bool,
) -> BatchSummary {
    let _timing = logging::start_timing("run_batch", OperationCategory::Batch);

    let jobs = plan_jobs(stations, &config.batch);
    info!(
        stations = stations.len(),
        jobs = jobs.len(),
        start_year = config.batch.start_year,
        end_year = config.batch.end_year,
        "Starting batch predictions"
    );

    let recommender = Recommender::new(config.clone()).with_algorithms(algorithms.to_vec());
    let pb = progress_bar(jobs.len(), show_progress);

    let per_job: Vec<(Vec<Prediction>, usize)> = jobs
        .par_iter()
        .map(|job| {
            let mut predictions = Vec::new();
            let mut failures = 0;

            for (algorithm, result) in recommender.run(&job.locations) {
                match result {
                    Ok(site) => predictions.push(Prediction {
                        algorithm,
                        year: job.year,
                        city: job.city.clone(),
                        state: job.state.clone(),
                        latitude: site.latitude(),
                        longitude: site.longitude(),
                    }),
                    Err(e) => {
                        warn!(year = job.year, city = %job.city, state = %job.state, %algorithm, error = %e,
                            "Batch prediction failed");
                        failures += 1;
                    }
                }
            }

            pb.inc(1);
            (predictions, failures)
        })
        .collect();

    pb.finish_with_message("done");

    let mut summary = BatchSummary { jobs: jobs.len(), ..Default::default() };
    for (predictions, failures) in per_job {
        summary.predictions.extend(predictions);
        summary.failures += failures;
    }

    info!(
        predictions = summary.predictions.len(),
        failures = summary.failures,
        "Batch predictions complete"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn station(lat: f64, lon: f64, year: i32, city: &str) -> StationRecord {
        StationRecord {
            location: Location::new(lat, lon).unwrap(),
            open_date: NaiveDate::from_ymd_opt(year, 6, 1),
            city: Some(city.to_string()),
            state: Some("GA".to_string()),
        }
    }

    fn history() -> Vec<StationRecord> {
        let mut stations = Vec::new();
        for k in 0..12 {
            stations.push(station(33.60 + 0.01 * k as f64, -84.45 + 0.007 * (k % 5) as f64, 2012 + k % 3, "Atlanta"));
        }
        for k in 0..4 {
            stations.push(station(32.80 + 0.01 * k as f64, -83.60, 2012, "Macon"));
        }
        stations
    }

    #[test]
    fn regions_need_more_than_the_minimum() {
        let stations = history();

        // Before 2013 only the 2012 Atlanta stations count: k = 0, 3, 6, 9
        assert!(regions_before(&stations, 2013, 3).iter().any(|j| j.city == "Atlanta"));
        assert!(regions_before(&stations, 2013, 4).iter().all(|j| j.city != "Atlanta"));

        let jobs = regions_before(&stations, 2020, 10);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].locations.len(), 12);
        assert!(regions_before(&stations, 2012, 0).is_empty());
    }

    #[test]
    fn undated_stations_are_ignored() {
        let mut stations = history();
        for s in &mut stations {
            s.open_date = None;
        }
        assert!(regions_before(&stations, 2020, 0).is_empty());
    }

    #[test]
    fn plans_one_job_per_qualifying_year_and_region() {
        let batch = BatchConfig { start_year: 2013, end_year: 2016, min_region_stations: 10 };
        let jobs = plan_jobs(&history(), &batch);

        // Atlanta passes 10 stations from 2015 on
        let years: Vec<i32> = jobs.iter().map(|j| j.year).collect();
        assert_eq!(years, vec![2015, 2016]);
    }

    #[test]
    fn batch_collects_predictions_and_counts_failures() {
        let mut config = PlacementConfig::default();
        config.batch = BatchConfig { start_year: 2015, end_year: 2015, min_region_stations: 10 };
        config.cluster_void.n_clusters = 20;

        let summary = run_batch(&history(), &config, &Algorithm::ALL, false);

        assert_eq!(summary.jobs, 1);
        assert_eq!(summary.predictions.len(), 2);
        assert_eq!(summary.failures, 1);
        assert!(summary.predictions.iter().all(|p| p.year == 2015 && p.city == "Atlanta"));
    }
}
