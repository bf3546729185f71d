//! Reconcile command implementation
//!
//! Parses each pasted input, converts the rows into a shift's reading grid,
//! applies manual corrections and reports per-dispenser sales.

use chrono::{Local, NaiveDate};
use colored::*;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::shared::{
    ProcessingStats, apply_cli_overrides, create_progress_bar, csv_field, input_label,
    is_critical_error, load_configuration, read_input, resolve_prices, setup_logging,
};
use crate::app::models::{FuelPrices, ShiftReadingSheet, ShiftTiming};
use crate::app::services::paste_parser::PasteParser;
use crate::app::services::reconciler::ReadingGrid;
use crate::cli::args::{OutputFormat, ReadingEdit, ReconcileArgs};
use crate::config::ReconcileConfig;
use crate::{Error, Result};

/// Reconcile command runner
pub async fn run_reconcile(
    args: ReconcileArgs,
    cancellation_token: CancellationToken,
) -> Result<ProcessingStats> {
    let start_time = Instant::now();

    setup_logging(&args.common)?;
    debug!("Reconcile arguments: {:?}", args);
    args.validate()?;

    let mut config = load_configuration(&args.common)?;
    apply_cli_overrides(&mut config, &args)?;

    let shift_date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let prices = resolve_prices(&config, &args, shift_date).await?;
    info!(
        "Reconciling shift {} on {} at MS {:.2} / HSD {:.2}",
        config.shift_number, shift_date, prices.ms, prices.hsd
    );

    let parser = PasteParser::new().with_diagnostics(config.strict_diagnostics);
    let mut stats = ProcessingStats::default();
    let mut sheets = Vec::new();
    let progress_bar = create_progress_bar(&args.inputs, args.common.show_progress());

    for input in &args.inputs {
        if cancellation_token.is_cancelled() {
            return Err(Error::processing_interrupted("Reconciliation cancelled"));
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
        for diagnostic in &result.diagnostics {
            warn!(
                "{} line {}: {}",
                input_label(input),
                diagnostic.line_number,
                diagnostic.reason
            );
        }

        let mut grid = ReadingGrid::with_pump_test(config.shift_number, prices, config.pump_test_qty);
        if !grid.load_rows(&result.rows) {
            warn!(
                "{}: no usable rows, reporting an empty grid",
                input_label(input)
            );
        }

        stats.edits_applied += apply_edits(&mut grid, &args.edits)?;
        stats.dispensers_reconciled += grid.len();

        let sheet = grid.to_sheet(
            shift_id_for(&args, &config, shift_date, input_label(input)),
            config.operator_name.clone(),
            shift_date,
        );
        sheets.push((input_label(input), sheet));

        if let Some(pb) = &progress_bar {
            pb.inc(1);
        }
    }

    if let Some(pb) = &progress_bar {
        pb.finish_with_message("Readings reconciled");
    }

    if sheets.is_empty() && stats.has_errors() {
        return Err(Error::data_validation("No input could be read"));
    }

    generate_reconcile_report(args.common.output_format, &sheets, prices)?;

    stats.processing_time = start_time.elapsed();
    info!(
        "Reconciled {} dispensers from {} inputs in {:.2}s",
        stats.dispensers_reconciled,
        stats.inputs_processed,
        stats.processing_time.as_secs_f64()
    );
    Ok(stats)
}

/// Apply manual corrections by dispenser name
pub fn apply_edits(grid: &mut ReadingGrid, edits: &[ReadingEdit]) -> Result<usize> {
    for edit in edits {
        let index = grid.position(&edit.dispenser_name).ok_or_else(|| {
            Error::data_validation(format!(
                "No dispenser named '{}' to edit",
                edit.dispenser_name
            ))
        })?;
        grid.update_pump_reading(index, edit.side, edit.field, edit.value)?;
    }
    Ok(edits.len())
}

fn shift_id_for(
    args: &ReconcileArgs,
    config: &ReconcileConfig,
    shift_date: NaiveDate,
    input: String,
) -> String {
    match &args.shift_id {
        Some(shift_id) if args.inputs.len() == 1 => shift_id.clone(),
        Some(shift_id) => format!("{}-{}", shift_id, input),
        None => format!("{}-S{}", shift_date, config.shift_number),
    }
}

fn generate_reconcile_report(
    format: OutputFormat,
    sheets: &[(String, ShiftReadingSheet)],
    prices: FuelPrices,
) -> Result<()> {
    match format {
        OutputFormat::Human => {
            for (input, sheet) in sheets {
                generate_human_sheet_report(input, sheet, prices);
            }
            Ok(())
        }
        OutputFormat::Json => generate_json_sheet_report(sheets),
        OutputFormat::Csv => {
            generate_csv_sheet_report(sheets);
            Ok(())
        }
    }
}

fn generate_human_sheet_report(input: &str, sheet: &ShiftReadingSheet, prices: FuelPrices) {
    let timing = ShiftTiming::for_shift(sheet.shift_number);

    println!("\n{} {}", "Shift readings".bold(), input.cyan());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(
        "{} on {} ({}){}",
        timing.label,
        sheet.shift_date,
        sheet.shift_id,
        if sheet.operator_name.is_empty() {
            String::new()
        } else {
            format!(", operator {}", sheet.operator_name)
        }
    );
    println!("Rates: MS {:.2}, HSD {:.2}", prices.ms, prices.hsd);
    println!();
    println!(
        "{:<10} {:<8} {:>12} {:>12} {:>10} {:>6} {:>8} {:>10} {:>12}",
        "Dispenser", "Pump", "Opening", "Closing", "Dispensed", "Test", "Own use", "Net", "Amount"
    );

    for dispenser in &sheet.dispensers {
        for pump in dispenser.sides() {
            let net = format!("{:.2}", pump.net_dispensed_qty);
            println!(
                "{:<10} {:<8} {:>12.2} {:>12.2} {:>10.2} {:>6.2} {:>8.2} {:>10} {:>12.2}",
                dispenser.dispenser_name,
                pump.pump_name,
                pump.opening_reading,
                pump.closing_reading,
                pump.dispensed_qty,
                pump.pump_test_qty,
                pump.own_use_qty,
                if pump.net_dispensed_qty < 0.0 {
                    net.red()
                } else {
                    net.normal()
                },
                pump.amount
            );
        }
    }

    let totals = &sheet.totals;
    println!();
    println!(
        "{} dispensed {:.2} L, pump test {:.2} L, own use {:.2} L, net {:.2} L",
        "Totals:".bold(),
        totals.total_dispensed,
        totals.total_pump_test,
        totals.total_own_use,
        totals.total_net_dispensed
    );
    println!(
        "{} {}",
        "Amount:".bold(),
        format!("{:.2}", totals.total_amount).green()
    );
}

fn generate_json_sheet_report(sheets: &[(String, ShiftReadingSheet)]) -> Result<()> {
    let sheets: Vec<&ShiftReadingSheet> = sheets.iter().map(|(_, sheet)| sheet).collect();
    let json = if sheets.len() == 1 {
        serde_json::to_string_pretty(sheets[0])
    } else {
        serde_json::to_string_pretty(&sheets)
    }
    .map_err(|e| Error::json("Failed to serialize shift sheet", e))?;
    println!("{}", json);
    Ok(())
}

fn generate_csv_sheet_report(sheets: &[(String, ShiftReadingSheet)]) {
    println!(
        "input,shift_id,dispenser,pump,fuel_type,opening_reading,closing_reading,dispensed_qty,pump_test_qty,own_use_qty,net_dispensed_qty,rate_per_litre,amount"
    );
    for (input, sheet) in sheets {
        for dispenser in &sheet.dispensers {
            for pump in dispenser.sides() {
                println!(
                    "{},{},{},{},{},{},{},{},{},{},{},{},{:.2}",
                    csv_field(input),
                    csv_field(&sheet.shift_id),
                    csv_field(&dispenser.dispenser_name),
                    csv_field(&pump.pump_name),
                    pump.fuel_type,
                    pump.opening_reading,
                    pump.closing_reading,
                    pump.dispensed_qty,
                    pump.pump_test_qty,
                    pump.own_use_qty,
                    pump.net_dispensed_qty,
                    pump.rate_per_litre,
                    pump.amount
                );
            }
        }
    }
}
