use rayon::prelude::*;
use tracing::{debug, info, warn};
use crate::analysis::coverage::CoverageAnalyzer;
use crate::config::placement_config::PlacementConfig;
use crate::data::location::Location;
use crate::data::payload::{PlacementOutcome, RecommendationResponse, StationPayload};
use crate::error::PlacementResult;
use crate::placement::algorithm::Algorithm;
use crate::utils::logging::{self, OperationCategory};

/// Runs a set of placers over one station list and assembles the response.
pub struct Recommender {
    config: PlacementConfig,
    algorithms: Vec<Algorithm>,
    with_coverage: bool,
}

impl Recommender {
    pub fn new(config: PlacementConfig) -> Self {
        Self {
            config,
            algorithms: Algorithm::ALL.to_vec(),
            with_coverage: false,
        }
    }

    pub fn with_algorithms(mut self, algorithms: Vec<Algorithm>) -> Self {
        self.algorithms = algorithms;
        self
    }

    pub fn with_coverage(mut self, with_coverage: bool) -> Self {
        self.with_coverage = with_coverage;
        self
    }

    pub fn get_algorithms(&self) -> &[Algorithm] {
        &self.algorithms
    }

    pub fn get_config(&self) -> &PlacementConfig {
        &self.config
    }

    /// Each configured placer's result, in the configured order. Placers run concurrently.
    pub fn run(&self, locations: &[Location]) -> Vec<(Algorithm, PlacementResult<Location>)> {
        self.algorithms
            .par_iter()
            .map(|&algorithm| {
                let placer = algorithm.build_placer(&self.config);
                let result = placer.place(locations);
                match &result {
                    Ok(site) => debug!(%algorithm, %site, "placement succeeded"),
                    Err(e) => warn!(%algorithm, error = %e, "placement failed"),
                }
                (algorithm, result)
            })
            .collect()
    }

    pub fn recommend(&self, locations: &[Location]) -> RecommendationResponse {
        let _timing = logging::start_timing("recommend", OperationCategory::Other);

        info!(
            stations = locations.len(),
            algorithms = self.algorithms.len(),
            coverage = self.with_coverage,
            "Computing recommendations"
        );

        let results = self.run(locations);
        let analyzer = CoverageAnalyzer::from_config(&self.config.coverage);
        let mut response = RecommendationResponse::default();

        for (algorithm, result) in &results {
            response.insert(*algorithm, PlacementOutcome::from_result(result));
            if let (true, Ok(site)) = (self.with_coverage, result) {
                response.insert_coverage(*algorithm, analyzer.analyze(locations, site));
            }
        }

        response
    }

    pub fn recommend_payload(&self, payload: &StationPayload) -> RecommendationResponse {
        let locations = payload.locations();
        let rejected = payload.filtered_station_data.len() - locations.len();
        if rejected > 0 {
            warn!(rejected, "Rejected station rows with invalid coordinates");
        }
        self.recommend(&locations)
    }
}
