//! Command-line argument definitions for the fuel reconciler
//!
//! This module defines the CLI interface using the clap derive API.

use chrono::NaiveDate;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::str::FromStr;

use crate::app::models::{DenominationKind, FuelPrices, PumpSide};
use crate::app::services::checkout::VarianceMode;
use crate::app::services::reconciler::ReadingField;
use crate::constants::{MAX_SHIFTS_PER_DAY, NOTE_DENOMINATIONS};
use crate::{Error, Result};

/// CLI arguments for the fuel pump reading reconciler
///
/// Parses pump meter readings pasted from the shift spreadsheet and turns
/// them into per-dispenser sales with pump test deductions and amounts.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "fuel-reconcile",
    version,
    about = "Reconcile pasted fuel pump readings into per-dispenser shift sales",
    long_about = "Parses tab- or space-separated pump meter readings copied from the shift \
                  spreadsheet, infers the pump number petrol rows leave blank, and computes \
                  dispensed, pump test, net and amount figures per dispenser using the \
                  effective MS and HSD prices."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Parse pasted readings and show the accepted rows
    Parse(ParseArgs),
    /// Parse pasted readings and reconcile them into dispenser sales
    Reconcile(ReconcileArgs),
    /// Show the fuel prices in force on a date
    Prices(PricesArgs),
    /// Reconcile a checkout's counted cash against the fuel sold
    Checkout(CheckoutArgs),
}

/// Options shared by every subcommand
#[derive(Debug, Clone, Default, ClapArgs)]
pub struct CommonArgs {
    /// Path to configuration file
    ///
    /// JSON configuration file. If not specified, looks for
    /// <config dir>/fuel-reconcile/config.json
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (JSON format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Only show errors and critical messages. Overrides verbose settings.
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    /// Output format for results
    #[arg(
        long = "output-format",
        value_enum,
        default_value = "human",
        help = "Output format for results"
    )]
    pub output_format: OutputFormat,
}

/// Arguments for the parse command
#[derive(Debug, Clone, Parser)]
pub struct ParseArgs {
    /// Files containing pasted readings; `-` reads stdin
    #[arg(value_name = "FILE", default_value = "-")]
    pub inputs: Vec<PathBuf>,

    /// Report why each skipped line was skipped
    #[arg(long = "strict", help = "Collect a diagnostic for every skipped line")]
    pub strict: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Arguments for the reconcile command
#[derive(Debug, Clone, Parser)]
pub struct ReconcileArgs {
    /// Files containing pasted readings; `-` reads stdin
    #[arg(value_name = "FILE", default_value = "-")]
    pub inputs: Vec<PathBuf>,

    /// Shift number (1-3); shift 1 carries the pump test deduction
    #[arg(short = 's', long = "shift", value_name = "N")]
    pub shift_number: Option<u32>,

    /// Petrol price per litre
    #[arg(long = "ms", value_name = "PRICE")]
    pub ms_price: Option<f64>,

    /// Diesel price per litre
    #[arg(long = "hsd", value_name = "PRICE")]
    pub hsd_price: Option<f64>,

    /// JSON price book with dated entries
    #[arg(short = 'p', long = "prices", value_name = "FILE")]
    pub price_file: Option<PathBuf>,

    /// Shift date, used for the price book and the saved sheet (default: today)
    #[arg(short = 'd', long = "date", value_name = "YYYY-MM-DD")]
    pub date: Option<NaiveDate>,

    /// Manual correction applied after conversion, e.g. `Pump-1.hsd.own_use=10`
    #[arg(short = 'e', long = "edit", value_name = "EDIT")]
    pub edits: Vec<ReadingEdit>,

    /// Operator recorded on the sheet
    #[arg(long = "operator", value_name = "NAME")]
    pub operator_name: Option<String>,

    /// Shift identifier recorded on the sheet
    #[arg(long = "shift-id", value_name = "ID")]
    pub shift_id: Option<String>,

    /// Report why each skipped line was skipped
    #[arg(long = "strict", help = "Collect a diagnostic for every skipped line")]
    pub strict: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Arguments for the prices command
#[derive(Debug, Clone, Parser)]
pub struct PricesArgs {
    /// JSON price book with dated entries (default: configured price file)
    #[arg(short = 'p', long = "prices", value_name = "FILE")]
    pub price_file: Option<PathBuf>,

    /// Date to resolve prices for (default: today)
    #[arg(short = 'd', long = "date", value_name = "YYYY-MM-DD")]
    pub date: Option<NaiveDate>,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Arguments for the checkout command
#[derive(Debug, Clone, Parser)]
pub struct CheckoutArgs {
    /// Amount the checkout should hand over
    #[arg(
        long = "expected",
        value_name = "AMOUNT",
        conflicts_with = "sheet",
        required_unless_present = "sheet"
    )]
    pub expected_amount: Option<f64>,

    /// Saved shift sheet (reconcile JSON output); its total amount is expected
    #[arg(long = "sheet", value_name = "FILE")]
    pub sheet: Option<PathBuf>,

    /// Counted pieces, e.g. `500=12`, `coin:20=5` (notes unless prefixed)
    #[arg(long = "count", value_name = "[note:|coin:]VALUE=COUNT")]
    pub counts: Vec<DenominationCount>,

    /// Card payments taken
    #[arg(long = "card", value_name = "AMOUNT", default_value_t = 0.0)]
    pub card_payments: f64,

    /// UPI payments taken
    #[arg(long = "upi", value_name = "AMOUNT", default_value_t = 0.0)]
    pub upi_payments: f64,

    /// Other payments taken
    #[arg(long = "other", value_name = "AMOUNT", default_value_t = 0.0)]
    pub other_payments: f64,

    /// Drawer float at the start of the checkout
    #[arg(long = "opening-balance", value_name = "AMOUNT", default_value_t = 0.0)]
    pub opening_balance: f64,

    /// Drawer float left behind at the end of the checkout
    #[arg(long = "closing-balance", value_name = "AMOUNT", default_value_t = 0.0)]
    pub closing_balance: f64,

    /// Compare all payments instead of the cash drawer
    #[arg(long = "all-payments")]
    pub all_payments: bool,

    /// Checkout within the shift (1-4)
    #[arg(short = 'n', long = "checkout-number", value_name = "N", default_value_t = 1)]
    pub checkout_number: u32,

    /// Shift identifier (default: taken from the sheet)
    #[arg(long = "shift-id", value_name = "ID")]
    pub shift_id: Option<String>,

    /// Operator handing over the checkout
    #[arg(long = "operator", value_name = "NAME")]
    pub operator_name: Option<String>,

    /// Free-text remark kept on the checkout
    #[arg(long = "notes", value_name = "TEXT")]
    pub notes: Option<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Output format options for machine-readable results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    #[default]
    Human,
    /// JSON format for scripting
    Json,
    /// CSV format for spreadsheets
    Csv,
}

/// A single grid correction: `DISPENSER.SIDE.FIELD=VALUE`
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingEdit {
    pub dispenser_name: String,
    pub side: PumpSide,
    pub field: ReadingField,
    pub value: f64,
}

impl FromStr for ReadingEdit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (target, value) = s.split_once('=').ok_or_else(|| {
            Error::data_validation(format!(
                "Edit '{}' must look like DISPENSER.SIDE.FIELD=VALUE",
                s
            ))
        })?;

        let mut parts = target.rsplitn(3, '.');
        let (Some(field), Some(side), Some(dispenser_name)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(Error::data_validation(format!(
                "Edit target '{}' must look like DISPENSER.SIDE.FIELD",
                target
            )));
        };

        let value = value.trim().parse::<f64>().map_err(|e| {
            Error::data_validation(format!("Invalid edit value '{}': {}", value.trim(), e))
        })?;

        Ok(ReadingEdit {
            dispenser_name: dispenser_name.trim().to_string(),
            side: side.parse()?,
            field: field.parse()?,
            value,
        })
    }
}

/// Counted pieces of one denomination: `[note:|coin:]VALUE=COUNT`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DenominationCount {
    pub kind: DenominationKind,
    pub denomination: u32,
    pub count: u32,
}

impl FromStr for DenominationCount {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || {
            Error::data_validation(format!(
                "Count '{}' must look like VALUE=COUNT, e.g. 500=12 or coin:5=3",
                s
            ))
        };

        let (target, count) = s.split_once('=').ok_or_else(invalid)?;
        let (kind, value) = match target.split_once(':') {
            Some(("note", value)) => (Some(DenominationKind::Note), value),
            Some(("coin", value)) => (Some(DenominationKind::Coin), value),
            Some(_) => return Err(invalid()),
            None => (None, target),
        };

        let denomination: u32 = value.trim().parse().map_err(|_| invalid())?;
        let count: u32 = count.trim().parse().map_err(|_| invalid())?;
        let kind = kind.unwrap_or(if NOTE_DENOMINATIONS.contains(&denomination) {
            DenominationKind::Note
        } else {
            DenominationKind::Coin
        });

        Ok(DenominationCount {
            kind,
            denomination,
            count,
        })
    }
}

impl CommonArgs {
    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(config_file) = &self.config_file {
            if !config_file.exists() {
                return Err(Error::configuration(format!(
                    "Config file does not exist: {}",
                    config_file.display()
                )));
            }
        }
        Ok(())
    }
}

impl Args {
    /// Get the command if one was specified
    pub fn get_command(&self) -> Result<Commands> {
        self.command
            .clone()
            .ok_or_else(|| Error::configuration("No subcommand given"))
    }
}

/// Reject missing input files before any work starts
fn validate_inputs(inputs: &[PathBuf]) -> Result<()> {
    for input in inputs {
        if input.as_os_str() != "-" && !input.exists() {
            return Err(Error::file_not_found(input.display().to_string()));
        }
    }
    Ok(())
}

impl ParseArgs {
    pub fn validate(&self) -> Result<()> {
        self.common.validate()?;
        validate_inputs(&self.inputs)
    }
}

impl ReconcileArgs {
    /// Validate the reconcile command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        self.common.validate()?;
        validate_inputs(&self.inputs)?;

        if let Some(shift) = self.shift_number {
            if shift == 0 || shift > MAX_SHIFTS_PER_DAY {
                return Err(Error::configuration(format!(
                    "Shift number must be between 1 and {}",
                    MAX_SHIFTS_PER_DAY
                )));
            }
        }

        for (code, price) in [("MS", self.ms_price), ("HSD", self.hsd_price)] {
            if let Some(price) = price {
                if !price.is_finite() || price <= 0.0 {
                    return Err(Error::configuration(format!(
                        "{} price must be a positive number",
                        code
                    )));
                }
            }
        }

        if let Some(price_file) = &self.price_file {
            if !price_file.exists() {
                return Err(Error::file_not_found(price_file.display().to_string()));
            }
        }

        Ok(())
    }

    /// Explicit prices override the configured ones field by field
    pub fn override_prices(&self, base: FuelPrices) -> FuelPrices {
        FuelPrices {
            ms: self.ms_price.unwrap_or(base.ms),
            hsd: self.hsd_price.unwrap_or(base.hsd),
        }
    }

    /// Explicit prices given for both fuel types
    pub fn has_explicit_prices(&self) -> bool {
        self.ms_price.is_some() && self.hsd_price.is_some()
    }
}

impl CheckoutArgs {
    pub fn validate(&self) -> Result<()> {
        self.common.validate()?;

        if let Some(sheet) = &self.sheet {
            if !sheet.exists() {
                return Err(Error::file_not_found(sheet.display().to_string()));
            }
        }

        for (name, amount) in [
            ("Card payments", self.card_payments),
            ("UPI payments", self.upi_payments),
            ("Other payments", self.other_payments),
            ("Opening balance", self.opening_balance),
            ("Closing balance", self.closing_balance),
        ] {
            if !amount.is_finite() || amount < 0.0 {
                return Err(Error::configuration(format!(
                    "{} must not be negative",
                    name
                )));
            }
        }

        Ok(())
    }

    pub fn variance_mode(&self) -> VarianceMode {
        if self.all_payments {
            VarianceMode::AllPayments
        } else {
            VarianceMode::CashDrawer
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reconcile_args() {
        let args = Args::try_parse_from([
            "fuel-reconcile",
            "reconcile",
            "sheet.tsv",
            "--shift",
            "1",
            "--ms",
            "101.66",
            "--edit",
            "Pump-1.hsd.own_use=10",
            "-vv",
        ])
        .unwrap();

        let Some(Commands::Reconcile(reconcile)) = args.command else {
            panic!("expected reconcile command");
        };
        assert_eq!(reconcile.inputs, vec![PathBuf::from("sheet.tsv")]);
        assert_eq!(reconcile.shift_number, Some(1));
        assert_eq!(reconcile.ms_price, Some(101.66));
        assert_eq!(reconcile.hsd_price, None);
        assert_eq!(reconcile.edits.len(), 1);
        assert_eq!(reconcile.common.get_log_level(), "debug");
        assert!(!reconcile.has_explicit_prices());
    }

    #[test]
    fn test_inputs_default_to_stdin() {
        let args = Args::try_parse_from(["fuel-reconcile", "parse", "--strict"]).unwrap();

        let Some(Commands::Parse(parse)) = args.command else {
            panic!("expected parse command");
        };
        assert_eq!(parse.inputs, vec![PathBuf::from("-")]);
        assert!(parse.strict);
        assert!(parse.validate().is_ok());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Args::try_parse_from(["fuel-reconcile", "parse", "-q", "-v"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_log_levels() {
        let mut common = CommonArgs::default();
        assert_eq!(common.get_log_level(), "warn");
        common.verbose = 1;
        assert_eq!(common.get_log_level(), "info");
        common.verbose = 5;
        assert_eq!(common.get_log_level(), "trace");
        common.quiet = true;
        assert_eq!(common.get_log_level(), "error");
        assert!(!common.show_progress());
    }

    #[test]
    fn test_reading_edit_parsing() {
        let edit: ReadingEdit = "Pump-12.ms.pump_test_qty=0".parse().unwrap();
        assert_eq!(edit.dispenser_name, "Pump-12");
        assert_eq!(edit.side, PumpSide::MsPump);
        assert_eq!(edit.field, ReadingField::PumpTestQty);
        assert_eq!(edit.value, 0.0);

        // Dispenser names may contain dots
        let dotted: ReadingEdit = "DS.A.hsd.closing=1200.5".parse().unwrap();
        assert_eq!(dotted.dispenser_name, "DS.A");
        assert_eq!(dotted.value, 1200.5);

        assert!("Pump-1.hsd.own_use".parse::<ReadingEdit>().is_err());
        assert!("hsd.own_use=1".parse::<ReadingEdit>().is_err());
        assert!("Pump-1.lpg.own_use=1".parse::<ReadingEdit>().is_err());
        assert!("Pump-1.hsd.own_use=lots".parse::<ReadingEdit>().is_err());
    }

    #[test]
    fn test_reconcile_validation() {
        let args = Args::try_parse_from(["fuel-reconcile", "reconcile", "--shift", "4"]).unwrap();
        let Some(Commands::Reconcile(reconcile)) = args.command else {
            panic!("expected reconcile command");
        };
        assert!(reconcile.validate().is_err());

        let args =
            Args::try_parse_from(["fuel-reconcile", "reconcile", "/no/such/paste.tsv"]).unwrap();
        let Some(Commands::Reconcile(reconcile)) = args.command else {
            panic!("expected reconcile command");
        };
        assert!(matches!(
            reconcile.validate(),
            Err(Error::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_price_overrides() {
        let args = Args::try_parse_from([
            "fuel-reconcile",
            "reconcile",
            "--ms",
            "105",
            "--hsd",
            "95",
        ])
        .unwrap();
        let Some(Commands::Reconcile(reconcile)) = args.command else {
            panic!("expected reconcile command");
        };

        assert!(reconcile.has_explicit_prices());
        assert_eq!(
            reconcile.override_prices(FuelPrices::new(1.0, 2.0)),
            FuelPrices::new(105.0, 95.0)
        );
    }

    #[test]
    fn test_denomination_count_parsing() {
        let note: DenominationCount = "500=12".parse().unwrap();
        assert_eq!(note.kind, DenominationKind::Note);
        assert_eq!((note.denomination, note.count), (500, 12));

        // Ambiguous values default to notes unless prefixed
        let twenty: DenominationCount = "20=3".parse().unwrap();
        assert_eq!(twenty.kind, DenominationKind::Note);
        let coin: DenominationCount = "coin:20=3".parse().unwrap();
        assert_eq!(coin.kind, DenominationKind::Coin);
        let five: DenominationCount = "5=7".parse().unwrap();
        assert_eq!(five.kind, DenominationKind::Coin);

        assert!("500".parse::<DenominationCount>().is_err());
        assert!("gold:5=1".parse::<DenominationCount>().is_err());
        assert!("500=-1".parse::<DenominationCount>().is_err());
    }

    #[test]
    fn test_checkout_args() {
        let args = Args::try_parse_from([
            "fuel-reconcile",
            "checkout",
            "--expected",
            "2070",
            "--count",
            "500=4",
            "--count",
            "coin:5=2",
            "--upi",
            "40",
            "--all-payments",
        ])
        .unwrap();
        let Some(Commands::Checkout(checkout)) = args.command else {
            panic!("expected checkout command");
        };

        assert_eq!(checkout.expected_amount, Some(2070.0));
        assert_eq!(checkout.counts.len(), 2);
        assert_eq!(checkout.upi_payments, 40.0);
        assert_eq!(checkout.checkout_number, 1);
        assert_eq!(checkout.variance_mode(), VarianceMode::AllPayments);
        assert!(checkout.validate().is_ok());
    }

    #[test]
    fn test_checkout_needs_expected_amount() {
        assert!(Args::try_parse_from(["fuel-reconcile", "checkout"]).is_err());
        assert!(
            Args::try_parse_from([
                "fuel-reconcile",
                "checkout",
                "--expected",
                "10",
                "--sheet",
                "sheet.json"
            ])
            .is_err()
        );

        let args = Args::try_parse_from([
            "fuel-reconcile",
            "checkout",
            "--expected",
            "10",
            "--card=-5",
        ])
        .unwrap();
        let Some(Commands::Checkout(checkout)) = args.command else {
            panic!("expected checkout command");
        };
        assert!(checkout.validate().is_err());
    }
}
