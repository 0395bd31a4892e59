use std::fs::File;
use std::io::Read;
use std::path::Path;
use chrono::{Datelike, NaiveDate};
use csv::ReaderBuilder;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use crate::data::location::Location;
use crate::data::payload::StationPayload;
use crate::utils::logging::{self, FileIOType, OperationCategory};

#[derive(Debug, Error)]
pub enum StationLoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid station row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },
}

/// A station row as it appears in the alternative fuel station export.
#[derive(Debug, Clone, Deserialize)]
struct RawStation {
    #[serde(alias = "Latitude")]
    latitude: f64,
    #[serde(alias = "Longitude")]
    longitude: f64,
    #[serde(default, alias = "Open Date")]
    open_date: Option<String>,
    #[serde(default, alias = "City")]
    city: Option<String>,
    #[serde(default, alias = "State")]
    state: Option<String>,
    #[serde(default, alias = "Status Code")]
    status_code: Option<String>,
    #[serde(default, alias = "Fuel Type Code")]
    fuel_type_code: Option<String>,
    #[serde(default, alias = "Groups With Access Code")]
    access_code: Option<String>,
}

impl RawStation {
    // Filter columns are optional; when present only open, public, electric stations pass
    fn is_open_public_electric(&self) -> bool {
        let open = self.status_code.as_deref().map_or(true, |s| s.eq_ignore_ascii_case("E"));
        let electric = self.fuel_type_code.as_deref().map_or(true, |f| f.eq_ignore_ascii_case("ELEC"));
        let public = self.access_code.as_deref().map_or(true, |a| a.contains("Public"));
        open && electric && public
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StationRecord {
    pub location: Location,
    pub open_date: Option<NaiveDate>,
    pub city: Option<String>,
    pub state: Option<String>,
}

impl StationRecord {
    pub fn open_year(&self) -> Option<i32> {
        self.open_date.map(|d| d.year())
    }

    /// `(city, state)` when both are present.
    pub fn region(&self) -> Option<(&str, &str)> {
        match (self.city.as_deref(), self.state.as_deref()) {
            (Some(city), Some(state)) => Some((city, state)),
            _ => None,
        }
    }
}

/// Parses an ISO date, with or without a time part, or a US-style `m/d/Y` date.
pub fn parse_open_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let date_part = value.split(|c: char| c == 'T' || c == ' ').next().unwrap_or(value);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(date_part, "%m/%d/%Y"))
        .ok()
}

fn to_record(row: usize, raw: RawStation) -> Result<StationRecord, StationLoadError> {
    let location = Location::new(raw.latitude, raw.longitude)
        .map_err(|e| StationLoadError::InvalidRow { row, reason: e.to_string() })?;

    let open_date = match raw.open_date.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(s) => Some(parse_open_date(s).ok_or_else(|| StationLoadError::InvalidRow {
            row,
            reason: format!("unparseable open date '{}'", s),
        })?),
        None => None,
    };

    Ok(StationRecord {
        location,
        open_date,
        city: raw.city.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()),
        state: raw.state.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
    })
}

/// Reads station rows from CSV text. Malformed rows are skipped with a warning.
pub fn parse_stations<R: Read>(reader: R) -> Result<Vec<StationRecord>, StationLoadError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_reader(reader);

    let mut stations = Vec::new();
    let mut skipped = 0usize;
    let mut filtered = 0usize;

    for (idx, result) in reader.deserialize::<RawStation>().enumerate() {
        // Header is line 1
        let row = idx + 2;
        let raw = match result {
            Ok(raw) => raw,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                warn!(row, error = %e, "Skipping malformed station row");
                skipped += 1;
                continue;
            }
        };

        if !raw.is_open_public_electric() {
            filtered += 1;
            continue;
        }

        match to_record(row, raw) {
            Ok(record) => stations.push(record),
            Err(e) => {
                warn!(error = %e, "Skipping station row");
                skipped += 1;
            }
        }
    }

    debug!(loaded = stations.len(), skipped, filtered, "parsed station rows");
    Ok(stations)
}

pub fn load_stations(csv_path: impl AsRef<Path>) -> Result<Vec<StationRecord>, StationLoadError> {
    let _timing = logging::start_timing("load_stations",
        OperationCategory::FileIO { subcategory: FileIOType::DataLoad });

    let path = csv_path.as_ref();
    let file = File::open(path)?;
    let stations = parse_stations(file)?;

    info!(path = %path.display(), stations = stations.len(), "Loaded stations");
    Ok(stations)
}

pub fn load_payload(json_path: impl AsRef<Path>) -> Result<StationPayload, StationLoadError> {
    let _timing = logging::start_timing("load_payload",
        OperationCategory::FileIO { subcategory: FileIOType::DataLoad });

    let contents = std::fs::read_to_string(json_path)?;
    Ok(StationPayload::from_json(&contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_lowercase_headers() {
        let csv = "latitude,longitude,open_date,city,state\n\
                   33.65,-84.42,2015-03-01,Atlanta,GA\n\
                   33.66,-84.44,,Atlanta,GA\n";
        let stations = parse_stations(csv.as_bytes()).unwrap();

        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].open_year(), Some(2015));
        assert_eq!(stations[0].region(), Some(("Atlanta", "GA")));
        assert_eq!(stations[1].open_date, None);
    }

    #[test]
    fn reads_station_export_headers_and_filters() {
        let csv = "Station Name,City,State,Status Code,Fuel Type Code,Groups With Access Code,Latitude,Longitude,Open Date\n\
                   A,Decatur,GA,E,ELEC,Public,33.77,-84.29,2012-06-30\n\
                   B,Decatur,GA,P,ELEC,Public,33.78,-84.30,2013-01-01\n\
                   C,Decatur,GA,E,CNG,Public,33.79,-84.31,2013-01-01\n\
                   D,Decatur,GA,E,ELEC,Private,33.80,-84.32,2013-01-01\n";
        let stations = parse_stations(csv.as_bytes()).unwrap();

        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].location.latitude(), 33.77);
        assert_eq!(stations[0].open_date, NaiveDate::from_ymd_opt(2012, 6, 30));
    }

    #[test]
    fn skips_invalid_rows() {
        let csv = "latitude,longitude,open_date\n\
                   not-a-number,-84.42,2015-03-01\n\
                   95.0,-84.42,2015-03-01\n\
                   33.65,-84.42,someday\n\
                   33.66,-84.44,2016-01-01\n";
        let stations = parse_stations(csv.as_bytes()).unwrap();

        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].open_year(), Some(2016));
    }

    #[test]
    fn parses_common_date_shapes() {
        let expected = NaiveDate::from_ymd_opt(2019, 11, 5);
        assert_eq!(parse_open_date("2019-11-05"), expected);
        assert_eq!(parse_open_date("2019-11-05T00:00:00"), expected);
        assert_eq!(parse_open_date("11/5/2019"), expected);
        assert_eq!(parse_open_date("Nov 5"), None);
    }
}
