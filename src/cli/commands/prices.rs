//! Prices command implementation
//!
//! Resolves the MS and HSD prices in force on a date from the dated price
//! book, falling back to the configured prices when no book is available.

use chrono::{Local, NaiveDate};
use colored::*;
use serde::Serialize;
use std::fmt;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::shared::{ProcessingStats, load_configuration, setup_logging};
use crate::app::models::{FuelPriceEntry, FuelPrices};
use crate::app::services::fuel_prices::FuelPriceBook;
use crate::cli::args::{OutputFormat, PricesArgs};
use crate::{Error, Result};

/// Where the reported prices came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum PriceSource {
    PriceBook,
    Configuration,
}

impl fmt::Display for PriceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceSource::PriceBook => f.write_str("price_book"),
            PriceSource::Configuration => f.write_str("configuration"),
        }
    }
}

#[derive(Debug, Serialize)]
struct PriceReport {
    date: NaiveDate,
    source: PriceSource,
    prices: FuelPrices,
    /// Recorded changes, newest first
    history: Vec<FuelPriceEntry>,
}

pub async fn run_prices(
    args: PricesArgs,
    cancellation_token: CancellationToken,
) -> Result<ProcessingStats> {
    let start_time = Instant::now();

    setup_logging(&args.common)?;
    debug!("Prices arguments: {:?}", args);
    args.common.validate()?;

    let config = load_configuration(&args.common)?;
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());

    if cancellation_token.is_cancelled() {
        return Err(Error::processing_interrupted("Price lookup cancelled"));
    }

    let report = match args.price_file.as_ref().or(config.price_file.as_ref()) {
        Some(price_file) => {
            info!("Resolving prices from {}", price_file.display());
            let book = FuelPriceBook::load(price_file).await?;
            build_price_report(&book, date)?
        }
        None => {
            info!("No price file configured, using configured prices");
            PriceReport {
                date,
                source: PriceSource::Configuration,
                prices: config.prices,
                history: Vec::new(),
            }
        }
    };

    match args.common.output_format {
        OutputFormat::Human => generate_human_price_report(&report),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| Error::json("Failed to serialize price report", e))?;
            println!("{}", json);
        }
        OutputFormat::Csv => {
            println!("fuel_type,price,effective_date,source");
            println!("MS,{},{},{}", report.prices.ms, report.date, report.source);
            println!("HSD,{},{},{}", report.prices.hsd, report.date, report.source);
        }
    }

    Ok(ProcessingStats {
        processing_time: start_time.elapsed(),
        ..Default::default()
    })
}

fn build_price_report(book: &FuelPriceBook, date: NaiveDate) -> Result<PriceReport> {
    let prices = book.effective_on(date)?;

    let mut history = book.entries().to_vec();
    history.sort_by(|a, b| {
        b.effective_date
            .cmp(&a.effective_date)
            .then_with(|| a.fuel_type.code().cmp(b.fuel_type.code()))
    });

    Ok(PriceReport {
        date,
        source: PriceSource::PriceBook,
        prices,
        history,
    })
}

fn generate_human_price_report(report: &PriceReport) {
    println!("\n{} {}", "Fuel prices on".bold(), report.date.to_string().cyan());
    println!("  MS  {}", format!("{:.2}", report.prices.ms).green());
    println!("  HSD {}", format!("{:.2}", report.prices.hsd).green());

    if report.source == PriceSource::Configuration {
        println!("  {}", "(configured prices, no price file)".dimmed());
    }

    if !report.history.is_empty() {
        println!("\n{}", "Price history:".bold());
        for entry in &report.history {
            println!(
                "  {}  {:<3} {:.2}",
                entry.effective_date, entry.fuel_type, entry.price
            );
        }
    }
}
