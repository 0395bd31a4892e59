use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use tracing::warn;
use crate::analysis::coverage::CoverageReport;
use crate::config::constants::OUTPUT_DECIMALS;
use crate::data::location::Location;
use crate::error::PlacementResult;
use crate::placement::algorithm::Algorithm;

/// One station row as sent by the front end: `[lat, lon]` or `[lat, lon, open date]`.
///
/// The open date is carried through untouched in whatever JSON shape it arrives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StationRow {
    WithDate(f64, f64, serde_json::Value),
    Bare(f64, f64),
}

impl StationRow {
    pub fn coordinates(&self) -> (f64, f64) {
        match self {
            StationRow::WithDate(lat, lon, _) | StationRow::Bare(lat, lon) => (*lat, *lon),
        }
    }

    pub fn to_location(&self) -> PlacementResult<Location> {
        let (lat, lon) = self.coordinates();
        Location::new(lat, lon)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StationPayload {
    pub filtered_station_data: Vec<StationRow>,
}

impl StationPayload {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Valid rows as locations. Rows with out-of-range coordinates are dropped with a warning.
    pub fn locations(&self) -> Vec<Location> {
        self.filtered_station_data
            .iter()
            .enumerate()
            .filter_map(|(idx, row)| match row.to_location() {
                Ok(location) => Some(location),
                Err(e) => {
                    warn!(row = idx, error = %e, "Skipping station row");
                    None
                }
            })
            .collect()
    }
}

/// What a single algorithm produced for the response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlacementOutcome {
    Site { latitude: f64, longitude: f64 },
    Failed { error: String },
}

impl PlacementOutcome {
    pub fn from_result<E: std::fmt::Display>(result: &Result<Location, E>) -> Self {
        match result {
            Ok(location) => {
                let (latitude, longitude) = location.rounded(OUTPUT_DECIMALS);
                PlacementOutcome::Site { latitude, longitude }
            }
            Err(e) => PlacementOutcome::Failed { error: e.to_string() },
        }
    }

    pub fn is_site(&self) -> bool {
        matches!(self, PlacementOutcome::Site { .. })
    }
}

/// Response body keyed by algorithm name, with an optional per-algorithm coverage block.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecommendationResponse {
    #[serde(flatten)]
    pub sites: BTreeMap<String, PlacementOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage: Option<BTreeMap<String, CoverageReport>>,
}

impl RecommendationResponse {
    pub fn insert(&mut self, algorithm: Algorithm, outcome: PlacementOutcome) {
        self.sites.insert(algorithm.as_str().to_string(), outcome);
    }

    pub fn insert_coverage(&mut self, algorithm: Algorithm, report: CoverageReport) {
        self.coverage
            .get_or_insert_with(BTreeMap::new)
            .insert(algorithm.as_str().to_string(), report);
    }

    pub fn get_site(&self, algorithm: Algorithm) -> Option<&PlacementOutcome> {
        self.sites.get(algorithm.as_str())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlacementError;

    #[test]
    fn parses_rows_with_and_without_dates() {
        let payload = StationPayload::from_json(
            r#"{"filtered_station_data": [[33.65, -84.42, "2015-03-01"], [33.66, -84.44], [33.67, -84.41, null]]}"#,
        ).unwrap();

        assert_eq!(payload.filtered_station_data.len(), 3);
        assert_eq!(
            payload.filtered_station_data[0],
            StationRow::WithDate(33.65, -84.42, serde_json::json!("2015-03-01"))
        );
        assert_eq!(payload.filtered_station_data[1], StationRow::Bare(33.66, -84.44));
        assert_eq!(payload.locations().len(), 3);
    }

    #[test]
    fn any_third_field_is_accepted() {
        let payload = StationPayload::from_json(
            r#"{"filtered_station_data": [[33.65, -84.42, 20160702], [33.66, -84.44, {"open": "2016"}], [33.67, -84.41, true]]}"#,
        ).unwrap();

        let locations = payload.locations();
        assert_eq!(locations.len(), 3);
        assert_eq!(locations[0].latitude(), 33.65);
        assert_eq!(payload.filtered_station_data[0].coordinates(), (33.65, -84.42));
    }

    #[test]
    fn out_of_range_rows_are_dropped() {
        let payload = StationPayload::from_json(
            r#"{"filtered_station_data": [[33.65, -84.42], [133.0, -84.44], [33.67, -284.41]]}"#,
        ).unwrap();

        let locations = payload.locations();
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].latitude(), 33.65);
    }

    #[test]
    fn response_rounds_to_five_decimals_and_reports_errors() {
        let mut response = RecommendationResponse::default();
        let site = Location::new(33.6539841, -84.3976527).unwrap();
        response.insert(Algorithm::GridMaximin, PlacementOutcome::from_result::<PlacementError>(&Ok(site)));
        response.insert(
            Algorithm::ClusterVoid,
            PlacementOutcome::from_result(&Err(PlacementError::InsufficientData("2 locations".to_string()))),
        );

        let value: serde_json::Value = serde_json::from_str(&response.to_json().unwrap()).unwrap();

        assert_eq!(value["grid_maximin"]["latitude"], 33.65398);
        assert_eq!(value["grid_maximin"]["longitude"], -84.39765);
        assert_eq!(value["cluster_void"]["error"], "insufficient data: 2 locations");
        assert!(value.get("coverage").is_none());
    }

    #[test]
    fn coverage_block_appears_when_requested() {
        let mut response = RecommendationResponse::default();
        response.insert_coverage(Algorithm::AxisAlignment, CoverageReport {
            avg_distance_before: 10.0,
            avg_distance_after: 8.0,
            max_distance_before: 30.0,
            max_distance_after: 20.0,
            improvement_percent: 20.0,
        });

        let value: serde_json::Value = serde_json::from_str(&response.to_json().unwrap()).unwrap();
        assert_eq!(value["coverage"]["axis_alignment"]["improvement_percent"], 20.0);
    }
}
