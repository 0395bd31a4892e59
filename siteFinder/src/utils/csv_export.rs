use std::path::{Path, PathBuf};
use chrono::Local;
use csv::Writer;
use tracing::info;
use crate::core::batch::Prediction;
use crate::data::payload::RecommendationResponse;
use crate::data::stations_loader::StationLoadError;
use crate::utils::logging::{self, FileIOType, OperationCategory};

/// Writes run outputs into a fresh timestamped directory under `output_dir`.
pub struct PredictionExporter {
    output_dir: PathBuf,
    timestamp: String,
}

impl PredictionExporter {
    pub fn new(output_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let full_path = output_dir.as_ref().join(&timestamp);
        std::fs::create_dir_all(&full_path)?;

        Ok(Self {
            output_dir: full_path,
            timestamp,
        })
    }

    pub fn get_output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn get_timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn export_predictions(&self, predictions: &[Prediction]) -> Result<PathBuf, StationLoadError> {
        let _timing = logging::start_timing("export_predictions",
            OperationCategory::FileIO { subcategory: FileIOType::ResultsSave });

        let path = self.output_dir.join("predictions.csv");
        let mut writer = Writer::from_path(&path)?;
        for prediction in predictions {
            writer.serialize(prediction)?;
        }
        writer.flush()?;

        info!(path = %path.display(), rows = predictions.len(), "Exported predictions");
        Ok(path)
    }

    pub fn export_response(&self, response: &RecommendationResponse) -> Result<PathBuf, StationLoadError> {
        let _timing = logging::start_timing("export_response",
            OperationCategory::FileIO { subcategory: FileIOType::ResultsSave });

        let path = self.output_dir.join("recommendation.json");
        std::fs::write(&path, response.to_json()?)?;

        info!(path = %path.display(), "Exported recommendation");
        Ok(path)
    }
}
