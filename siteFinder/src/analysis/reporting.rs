use std::fmt::Write;
use crate::analysis::coverage::CoverageReport;
use crate::core::batch::BatchSummary;
use crate::data::payload::{PlacementOutcome, RecommendationResponse};

fn format_improvement(percent: f64) -> String {
    if percent.is_nan() {
        "n/a".to_string()
    } else {
        format!("{:.2}%", percent)
    }
}

pub fn format_coverage_report(label: &str, report: &CoverageReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\nCoverage: {}", label);
    let _ = writeln!(out, "----------------------------------------");
    let _ = writeln!(out, "  Avg distance before: {:.3} km", report.avg_distance_before);
    let _ = writeln!(out, "  Avg distance after:  {:.3} km", report.avg_distance_after);
    let _ = writeln!(out, "  Max distance before: {:.3} km", report.max_distance_before);
    let _ = writeln!(out, "  Max distance after:  {:.3} km", report.max_distance_after);
    let _ = writeln!(out, "  Improvement: {}", format_improvement(report.improvement_percent));
    out
}

pub fn format_recommendation(response: &RecommendationResponse) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\nRecommended Sites");
    let _ = writeln!(out, "----------------------------------------");
    for (algorithm, outcome) in &response.sites {
        match outcome {
            PlacementOutcome::Site { latitude, longitude } => {
                let _ = writeln!(out, "{}: ({:.5}, {:.5})", algorithm, latitude, longitude);
            }
            PlacementOutcome::Failed { error } => {
                let _ = writeln!(out, "{}: failed ({})", algorithm, error);
            }
        }
    }

    if let Some(coverage) = &response.coverage {
        for (algorithm, report) in coverage {
            out.push_str(&format_coverage_report(algorithm, report));
        }
    }
    let _ = writeln!(out, "----------------------------------------");
    out
}

pub fn print_coverage_report(label: &str, report: &CoverageReport) {
    print!("{}", format_coverage_report(label, report));
}

pub fn print_recommendation(response: &RecommendationResponse) {
    print!("{}", format_recommendation(response));
}

pub fn print_batch_summary(summary: &BatchSummary) {
    println!("\nBatch Summary");
    println!("----------------------------------------");
    println!("Jobs: {}", summary.jobs);
    println!("Predictions: {}", summary.predictions.len());
    println!("Failed placements: {}", summary.failures);
    println!("----------------------------------------");
}
