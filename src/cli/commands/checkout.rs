//! Checkout command implementation
//!
//! Builds a checkout sheet from counted denominations and payment totals and
//! reports its short or excess against the fuel sold.

use chrono::Local;
use colored::*;
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::shared::{ProcessingStats, load_configuration, setup_logging};
use crate::app::models::{CheckoutSheet, ShiftReadingSheet, ShiftSummary};
use crate::app::services::checkout::{Variance, summarize_shift};
use crate::cli::args::{CheckoutArgs, OutputFormat};
use crate::{Error, Result};

#[derive(Debug, Serialize)]
struct CheckoutReport {
    expected_amount: f64,
    checkout: CheckoutSheet,
    #[serde(skip_serializing_if = "Option::is_none")]
    shift_summary: Option<ShiftSummary>,
}

pub async fn run_checkout(
    args: CheckoutArgs,
    cancellation_token: CancellationToken,
) -> Result<ProcessingStats> {
    let start_time = Instant::now();

    setup_logging(&args.common)?;
    debug!("Checkout arguments: {:?}", args);
    args.validate()?;

    let config = load_configuration(&args.common)?;

    let sheet = match &args.sheet {
        Some(path) => Some(load_reading_sheet(path).await?),
        None => None,
    };

    if cancellation_token.is_cancelled() {
        return Err(Error::processing_interrupted("Checkout cancelled"));
    }

    let expected_amount = match (&sheet, args.expected_amount) {
        (_, Some(expected)) => expected,
        (Some(sheet), None) => sheet.totals.total_amount,
        (None, None) => {
            return Err(Error::configuration(
                "Give the expected amount with --expected or --sheet",
            ));
        }
    };

    let shift_id = args
        .shift_id
        .clone()
        .or_else(|| sheet.as_ref().map(|s| s.shift_id.clone()))
        .unwrap_or_else(|| format!("{}-S{}", Local::now().date_naive(), config.shift_number));
    let operator_name = args
        .operator_name
        .clone()
        .unwrap_or_else(|| config.operator_name.clone());

    let checkout = build_checkout(&args, shift_id, operator_name, expected_amount)?;
    info!(
        "Checkout {} of {}: received {:.2} against {:.2}, variance {:.2}",
        checkout.checkout_number,
        checkout.shift_id,
        checkout.total_received(),
        expected_amount,
        checkout.short_excess
    );
    if let Variance::Short(short) = checkout.variance() {
        warn!("Checkout {} is short by {:.2}", checkout.checkout_number, short);
    }

    let report = CheckoutReport {
        expected_amount,
        shift_summary: sheet
            .as_ref()
            .map(|s| summarize_shift(s, std::slice::from_ref(&checkout))),
        checkout,
    };

    match args.common.output_format {
        OutputFormat::Human => generate_human_checkout_report(&report),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| Error::json("Failed to serialize checkout report", e))?;
            println!("{}", json);
        }
        OutputFormat::Csv => generate_csv_checkout_report(&report),
    }

    Ok(ProcessingStats {
        inputs_processed: usize::from(sheet.is_some()),
        processing_time: start_time.elapsed(),
        ..Default::default()
    })
}

/// Read a shift sheet saved from the reconcile command's JSON output
async fn load_reading_sheet(path: &Path) -> Result<ShiftReadingSheet> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::io(format!("Failed to read sheet '{}'", path.display()), e))?;
    serde_json::from_str(&content)
        .map_err(|e| Error::json(format!("Invalid shift sheet '{}'", path.display()), e))
}

fn build_checkout(
    args: &CheckoutArgs,
    shift_id: String,
    operator_name: String,
    expected_amount: f64,
) -> Result<CheckoutSheet> {
    let mut checkout = CheckoutSheet::new(shift_id, args.checkout_number, operator_name)?;

    for count in &args.counts {
        checkout.set_denomination_count(count.kind, count.denomination, count.count)?;
    }
    checkout.card_payments = args.card_payments;
    checkout.upi_payments = args.upi_payments;
    checkout.other_payments = args.other_payments;
    checkout.opening_balance = args.opening_balance;
    checkout.closing_balance = args.closing_balance;
    checkout.notes = args.notes.clone();

    checkout.reconcile(expected_amount, args.variance_mode());
    Ok(checkout)
}

fn generate_human_checkout_report(report: &CheckoutReport) {
    let checkout = &report.checkout;

    println!(
        "\n{} {} of {}",
        "Checkout".bold(),
        checkout.checkout_number,
        checkout.shift_id.cyan()
    );
    if !checkout.operator_name.is_empty() {
        println!("Operator: {}", checkout.operator_name);
    }

    println!();
    for denomination in checkout.cash_denominations.iter().filter(|d| d.count > 0) {
        println!(
            "  {:>4} {:<4} x {:>4} = {:>10.2}",
            denomination.denomination,
            denomination.kind.to_string(),
            denomination.count,
            denomination.total
        );
    }
    println!(
        "  Cash {:.2} in {} pieces",
        checkout.cash_received,
        checkout.total_pieces()
    );
    println!(
        "  Card {:.2}, UPI {:.2}, other {:.2}",
        checkout.card_payments, checkout.upi_payments, checkout.other_payments
    );
    println!(
        "  Drawer opening {:.2}, closing {:.2}",
        checkout.opening_balance, checkout.closing_balance
    );

    println!();
    println!("Expected: {:.2}", report.expected_amount);
    let variance = match checkout.variance() {
        Variance::Short(amount) => format!("SHORT {:.2}", amount).red(),
        Variance::Excess(amount) => format!("EXCESS {:.2}", amount).green(),
        Variance::Exact => "EXACT".normal(),
    };
    println!("{} {} ({:?})", "Variance:".bold(), variance, checkout.status);

    if let Some(summary) = &report.shift_summary {
        println!(
            "\nShift fuel sales {:.2}, cash {:.2}, digital {:.2}, net variance {:.2}",
            summary.total_fuel_sales,
            summary.total_cash_collections,
            summary.total_digital_payments,
            summary.net_variance
        );
    }
}

fn generate_csv_checkout_report(report: &CheckoutReport) {
    let checkout = &report.checkout;

    println!("metric,value");
    println!("checkout_number,{}", checkout.checkout_number);
    println!("expected_amount,{}", report.expected_amount);
    println!("cash_received,{}", checkout.cash_received);
    println!("card_payments,{}", checkout.card_payments);
    println!("upi_payments,{}", checkout.upi_payments);
    println!("other_payments,{}", checkout.other_payments);
    println!("opening_balance,{}", checkout.opening_balance);
    println!("closing_balance,{}", checkout.closing_balance);
    println!("short_excess,{}", checkout.short_excess);
    for denomination in &checkout.cash_denominations {
        println!(
            "{}_{},{}",
            denomination.kind, denomination.denomination, denomination.count
        );
    }
}
