use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;

use sitefinder::analysis::reporting;
use sitefinder::cli::cli::Args;
use sitefinder::config::placement_config::PlacementConfig;
use sitefinder::core::batch::run_batch;
use sitefinder::core::recommend::Recommender;
use sitefinder::data::payload::RecommendationResponse;
use sitefinder::data::stations_loader;
use sitefinder::utils::csv_export::PredictionExporter;
use sitefinder::utils::logging::{self, FileIOType, OperationCategory};

fn load_config(args: &Args) -> Result<PlacementConfig> {
    let _timing = logging::start_timing("load_config",
        OperationCategory::FileIO { subcategory: FileIOType::ConfigLoad });

    let mut config = match args.config() {
        Some(path) => PlacementConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => PlacementConfig::default(),
    };

    if let Some(year) = args.start_year() {
        config.batch.start_year = year;
    }
    if let Some(year) = args.end_year() {
        config.batch.end_year = year;
    }
    if config.batch.start_year > config.batch.end_year {
        bail!("start year {} is after end year {}", config.batch.start_year, config.batch.end_year);
    }

    Ok(config)
}

/// The JSON body alone when `json` is set, otherwise the readable summary.
fn render_response(response: &RecommendationResponse, json: bool) -> Result<String> {
    if json {
        Ok(format!("{}\n", response.to_json()?))
    } else {
        Ok(reporting::format_recommendation(response))
    }
}

fn run_single(args: &Args, config: PlacementConfig) -> Result<()> {
    let payload = stations_loader::load_payload(args.input())
        .with_context(|| format!("Failed to read station payload {}", args.input()))?;

    let response = Recommender::new(config)
        .with_algorithms(args.algorithms())
        .with_coverage(args.coverage())
        .recommend_payload(&payload);

    print!("{}", render_response(&response, args.json())?);

    if args.export() {
        let exporter = PredictionExporter::new(args.output_dir())?;
        exporter.export_response(&response)?;
    }
    Ok(())
}

fn run_batch_mode(args: &Args, config: PlacementConfig) -> Result<()> {
    let stations = stations_loader::load_stations(args.input())
        .with_context(|| format!("Failed to load stations from {}", args.input()))?;

    let summary = run_batch(&stations, &config, &args.algorithms(), !args.quiet());
    reporting::print_batch_summary(&summary);

    let exporter = PredictionExporter::new(args.output_dir())?;
    let path = exporter.export_predictions(&summary.predictions)?;
    println!("Predictions written to {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_logging(args.enable_timing(), args.debug_logging())?;

    if !args.json() {
        println!("EV Station Site Finder");
        println!("Mode: {}, Debug logging: {}",
                 if args.batch() { "batch" } else { "single" },
                 if args.debug_logging() { "enabled" } else { "disabled" });
    }

    let config = load_config(&args)?;
    info!(input = args.input(), algorithms = ?args.algorithms(), "Starting");

    if args.batch() {
        run_batch_mode(&args, config)?;
    } else {
        run_single(&args, config)?;
    }

    if logging::is_timing_enabled() && !args.json() {
        logging::print_timing_report();
    }

    Ok(())
}
