use clap::Parser;
use crate::placement::algorithm::Algorithm;

#[derive(Parser, Debug)]
#[command(author, version, about = "Recommend sites for new EV charging stations", long_about = None)]
pub struct Args {
    #[arg(short, long, help = "Station payload (JSON) or, with --batch, a station CSV")]
    input: String,

    #[arg(short, long, help = "Placement configuration file (JSON)")]
    config: Option<String>,

    #[arg(short, long, value_delimiter = ',', help = "Algorithms to run (default: all)")]
    algorithm: Vec<Algorithm>,

    #[arg(long, default_value_t = false, help = "Include coverage analysis for each recommended site")]
    coverage: bool,

    #[arg(short, long, default_value_t = false, help = "Run yearly predictions per region over a station CSV")]
    batch: bool,

    #[arg(long, help = "First target year for batch mode")]
    start_year: Option<i32>,

    #[arg(long, help = "Last target year for batch mode (inclusive)")]
    end_year: Option<i32>,

    #[arg(short, long, default_value = "results")]
    output_dir: String,

    #[arg(long, default_value_t = false, help = "Write results into a timestamped directory")]
    export: bool,

    #[arg(long, default_value_t = false, help = "Print only the JSON response on stdout")]
    json: bool,

    #[arg(long, default_value_t = false)]
    enable_timing: bool,

    #[arg(long, default_value_t = false)]
    debug_logging: bool,

    #[arg(long, default_value_t = false, help = "Hide the batch progress bar")]
    quiet: bool,
}

impl Args {
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn config(&self) -> Option<&str> {
        self.config.as_deref()
    }

    /// Requested algorithms, or all of them when none were named.
    pub fn algorithms(&self) -> Vec<Algorithm> {
        if self.algorithm.is_empty() {
            Algorithm::ALL.to_vec()
        } else {
            self.algorithm.clone()
        }
    }

    pub fn coverage(&self) -> bool {
        self.coverage
    }

    pub fn batch(&self) -> bool {
        self.batch
    }

    pub fn start_year(&self) -> Option<i32> {
        self.start_year
    }

    pub fn end_year(&self) -> Option<i32> {
        self.end_year
    }

    pub fn output_dir(&self) -> &str {
        &self.output_dir
    }

    pub fn export(&self) -> bool {
        self.export
    }

    pub fn json(&self) -> bool {
        self.json
    }

    pub fn enable_timing(&self) -> bool {
        self.enable_timing
    }

    pub fn debug_logging(&self) -> bool {
        self.debug_logging
    }

    pub fn quiet(&self) -> bool {
        self.quiet
    }
}
