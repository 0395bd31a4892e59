use anyhow::{Context, Result};
use clap::Parser;
use sitefinder::analysis::coverage::CoverageAnalyzer;
use sitefinder::analysis::reporting;
use sitefinder::config::placement_config::PlacementConfig;
use sitefinder::data::stations_loader;
use sitefinder::utils::logging;
use sitefinder::Location;

#[derive(Parser)]
#[command(author, version, about = "Coverage of a station payload before and after a proposed site", long_about = None)]
struct Args {
    #[arg(short, long, help = "Station payload (JSON)")]
    input: String,

    #[arg(long, allow_hyphen_values = true)]
    latitude: f64,

    #[arg(long, allow_hyphen_values = true)]
    longitude: f64,

    #[arg(short, long, help = "Placement configuration file (JSON)")]
    config: Option<String>,

    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_logging(false, false)?;

    let config = match &args.config {
        Some(path) => PlacementConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => PlacementConfig::default(),
    };

    let payload = stations_loader::load_payload(&args.input)
        .with_context(|| format!("Failed to read station payload {}", args.input))?;
    let existing = payload.locations();
    let proposed = Location::new(args.latitude, args.longitude)?;

    if !args.json {
        println!("Analyzing coverage of {} stations plus {}", existing.len(), proposed);
    }
    let report = CoverageAnalyzer::from_config(&config.coverage).analyze(&existing, &proposed);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        reporting::print_coverage_report(&proposed.to_string(), &report);
    }

    Ok(())
}
