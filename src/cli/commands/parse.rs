//! Parse command implementation
//!
//! Shows what the paste parser made of each input: the accepted rows, and in
//! strict mode why every other data line was dropped.

use colored::*;
use serde::Serialize;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::shared::{
    ProcessingStats, create_progress_bar, csv_field, input_label, is_critical_error,
    load_configuration, read_input, setup_logging,
};
use crate::app::services::paste_parser::{ParseResult, PasteParser};
use crate::cli::args::{OutputFormat, ParseArgs};
use crate::{Error, Result};

/// Parse outcome for one input
#[derive(Debug, Serialize)]
struct ParseReport {
    input: String,
    #[serde(flatten)]
    result: ParseResult,
}

pub async fn run_parse(
    args: ParseArgs,
    cancellation_token: CancellationToken,
) -> Result<ProcessingStats> {
    let start_time = Instant::now();

    setup_logging(&args.common)?;
    debug!("Parse arguments: {:?}", args);
    args.validate()?;

    let config = load_configuration(&args.common)?;
    let parser = PasteParser::new().with_diagnostics(args.strict || config.strict_diagnostics);

    let mut stats = ProcessingStats::default();
    let mut reports = Vec::new();
    let progress_bar = create_progress_bar(&args.inputs, args.common.show_progress());

    for input in &args.inputs {
        if cancellation_token.is_cancelled() {
            return Err(Error::processing_interrupted("Parsing cancelled"));
        }

        let text = match read_input(input).await {
            Ok(text) => text,
            Err(e) if is_critical_error(&e) => return Err(e),
            Err(e) => {
                warn!("Skipping {}: {}", input_label(input), e);
                stats.errors_encountered += 1;
                continue;
            }
        };

        let result = parser.parse(&text);
        stats.record_parse(result.stats.rows_accepted, result.stats.rows_skipped);
        info!(
            "{}: {} rows accepted, {} skipped",
            input_label(input),
            result.stats.rows_accepted,
            result.stats.rows_skipped
        );

        reports.push(ParseReport {
            input: input_label(input),
            result,
        });

        if let Some(pb) = &progress_bar {
            pb.inc(1);
        }
    }

    if let Some(pb) = &progress_bar {
        pb.finish_with_message("Pastes parsed");
    }

    if reports.is_empty() && stats.has_errors() {
        return Err(Error::data_validation("No input could be read"));
    }

    generate_parse_report(args.common.output_format, &reports)?;

    stats.processing_time = start_time.elapsed();
    Ok(stats)
}

fn generate_parse_report(format: OutputFormat, reports: &[ParseReport]) -> Result<()> {
    match format {
        OutputFormat::Human => {
            generate_human_parse_report(reports);
            Ok(())
        }
        OutputFormat::Json => generate_json_parse_report(reports),
        OutputFormat::Csv => {
            generate_csv_parse_report(reports);
            Ok(())
        }
    }
}

fn generate_human_parse_report(reports: &[ParseReport]) {
    for report in reports {
        let stats = &report.result.stats;

        println!("\n{} {}", "Parsed".bold(), report.input.cyan());
        println!(
            "{:<8} {:>5} {:>7} {:>12} {:>12} {:>10}",
            "Product", "Pump", "Nozzle", "Opening", "Closing", "Total"
        );
        for row in &report.result.rows {
            println!(
                "{:<8} {:>5} {:>7} {:>12.2} {:>12.2} {:>10.2}",
                row.product.label(),
                row.pump,
                row.nozzle,
                row.opening,
                row.closing,
                row.total
            );
        }

        println!(
            "{} accepted, {} skipped, {} headers, {} blank, {} pumps inherited ({:.1}% accepted)",
            stats.rows_accepted.to_string().green(),
            if stats.rows_skipped > 0 {
                stats.rows_skipped.to_string().yellow()
            } else {
                stats.rows_skipped.to_string().normal()
            },
            stats.header_lines,
            stats.blank_lines,
            stats.pumps_inherited,
            stats.acceptance_rate()
        );

        for diagnostic in &report.result.diagnostics {
            println!(
                "  {} line {}: {}",
                "skipped".yellow(),
                diagnostic.line_number,
                diagnostic.reason
            );
        }
    }
}

fn generate_json_parse_report(reports: &[ParseReport]) -> Result<()> {
    let json = serde_json::to_string_pretty(reports)
        .map_err(|e| Error::json("Failed to serialize parse report", e))?;
    println!("{}", json);
    Ok(())
}

fn generate_csv_parse_report(reports: &[ParseReport]) {
    println!("input,product,pump,nozzle,opening,closing,total");
    for report in reports {
        for row in &report.result.rows {
            println!(
                "{},{},{},{},{},{},{}",
                csv_field(&report.input),
                row.product.label(),
                row.pump,
                row.nozzle,
                row.opening,
                row.closing,
                row.total
            );
        }
    }
}
