//! Shared components for CLI commands
//!
//! This module contains common types, utilities, and functions used across
//! multiple CLI command implementations.

use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

use crate::app::models::FuelPrices;
use crate::app::services::fuel_prices::FuelPriceBook;
use crate::cli::args::{CommonArgs, ReconcileArgs};
use crate::config::ReconcileConfig;
use crate::{Error, Result};

/// Processing statistics for reporting across all commands
#[derive(Debug, Clone, Default)]
pub struct ProcessingStats {
    /// Number of pasted inputs read
    pub inputs_processed: usize,
    /// Rows accepted by the parser
    pub rows_accepted: usize,
    /// Data lines the parser dropped
    pub rows_skipped: usize,
    /// Dispensers reconciled
    pub dispensers_reconciled: usize,
    /// Manual corrections applied to grids
    pub edits_applied: usize,
    /// Number of errors encountered
    pub errors_encountered: usize,
    /// Total processing time
    pub processing_time: std::time::Duration,
}

impl ProcessingStats {
    /// Fold one parsed input into the running totals
    pub fn record_parse(&mut self, rows_accepted: usize, rows_skipped: usize) {
        self.inputs_processed += 1;
        self.rows_accepted += rows_accepted;
        self.rows_skipped += rows_skipped;
    }

    pub fn has_errors(&self) -> bool {
        self.errors_encountered > 0
    }
}

/// Set up structured logging on stderr
pub fn setup_logging(common: &CommonArgs) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = common.get_log_level();

    // Create filter
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("fuel_reconcile={}", log_level)));

    let initialized = if common.quiet {
        // Minimal logging for quiet mode
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        // Standard logging with timestamps
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    if initialized.is_err() {
        debug!("Logging already initialized");
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Load configuration using layered approach (defaults -> file)
pub fn load_configuration(common: &CommonArgs) -> Result<ReconcileConfig> {
    info!("Loading configuration");

    if let Some(config_path) = &common.config_file {
        info!("Using config file: {}", config_path.display());
    }

    ReconcileConfig::load_layered(common.config_file.as_deref())
}

/// Apply reconcile argument overrides to configuration
pub fn apply_cli_overrides(config: &mut ReconcileConfig, args: &ReconcileArgs) -> Result<()> {
    if let Some(shift_number) = args.shift_number {
        config.shift_number = shift_number;
    }
    if let Some(operator_name) = &args.operator_name {
        config.operator_name = operator_name.clone();
    }
    if let Some(price_file) = &args.price_file {
        config.price_file = Some(price_file.clone());
    }
    if args.strict {
        config.strict_diagnostics = true;
    }

    config.prices = args.override_prices(config.prices);

    // Final validation
    config.validate()
}

/// Resolve the prices in force for a shift date
///
/// Explicit prices on both fuel types win outright. Otherwise the price book
/// supplies the date's prices and any single explicit price overrides it.
/// Without a price book the configured prices are used.
pub async fn resolve_prices(
    config: &ReconcileConfig,
    args: &ReconcileArgs,
    date: NaiveDate,
) -> Result<FuelPrices> {
    if args.has_explicit_prices() {
        debug!("Using explicit prices from the command line");
        return Ok(config.prices);
    }

    match &config.price_file {
        Some(price_file) => {
            let book = FuelPriceBook::load(price_file).await?;
            let prices = book.effective_on(date)?;
            info!(
                "Prices effective {}: MS {:.2}, HSD {:.2}",
                date, prices.ms, prices.hsd
            );
            Ok(args.override_prices(prices))
        }
        None => Ok(config.prices),
    }
}

/// Read a whole paste from a file, or stdin for `-`
pub async fn read_input(input: &Path) -> Result<String> {
    if is_stdin(input) {
        debug!("Reading paste from stdin");
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .map_err(|e| Error::io("Failed to read stdin", e))?;
        return Ok(text);
    }

    debug!("Reading paste from {}", input.display());
    tokio::fs::read_to_string(input)
        .await
        .map_err(|e| Error::io(format!("Failed to read '{}'", input.display()), e))
}

pub fn is_stdin(input: &Path) -> bool {
    input.as_os_str() == "-"
}

/// Display name of an input for reports
pub fn input_label(input: &Path) -> String {
    if is_stdin(input) {
        "stdin".to_string()
    } else {
        input.display().to_string()
    }
}

/// Check if an error is critical enough to stop processing
pub fn is_critical_error(error: &Error) -> bool {
    matches!(
        error,
        Error::Configuration { .. }
            | Error::PriceNotFound { .. }
            | Error::ProcessingInterrupted { .. }
    )
}

/// Create a progress bar when several inputs are processed
pub fn create_progress_bar(inputs: &[PathBuf], show_progress: bool) -> Option<ProgressBar> {
    if !show_progress || inputs.len() < 2 {
        return None;
    }

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb.set_message("Reading pastes");
    Some(pb)
}

/// Quote a CSV field when it needs it
pub fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
