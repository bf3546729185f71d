//! Integration tests for the paste-to-sales pipeline
//!
//! These tests drive the public API the way the entry sheet does: parse a
//! pasted block, convert it into dispenser readings, then edit and reprice.

use chrono::NaiveDate;
use fuel_reconcile::app::models::{CheckoutStatus, DenominationKind, PumpSide, ShiftStatus};
use fuel_reconcile::app::services::checkout::{Variance, VarianceMode, summarize_shift};
use fuel_reconcile::app::services::fuel_prices::FuelPriceBook;
use fuel_reconcile::app::services::paste_parser::{PasteParser, SkipReason};
use fuel_reconcile::app::services::reconciler::{ReadingField, compute_totals};
use fuel_reconcile::{
    CheckoutSheet, FuelPrices, Product, ReadingGrid, ReconcileConfig, convert_to_dispenser_readings,
    parse_pasted_data,
};
use std::io::Write;
use tempfile::NamedTempFile;

const SINGLE_PUMP_SHEET: &str = "PRODUCT\tPUMP\tNOZZLE\tOPENING\tCLOSING\tTOTAL\n\
Diesel\t1\t1\t226928.6\t227183.59\t254.99\n\
PETROL\t\t2\t96221.4\t96526.27\t304.87\n";

const EVENING_SHEET: &str = "\r\n\
PRODUCT PUMP NOZZLE OPENING CLOSING TOTAL\r\n\
Diesel 1 1 1000 1100 100\r\n\
PETROL 2 500 540 40\r\n\
Diesel 2 3 2000 2003 3\r\n\
PETROL 4 800 820 20\r\n\
\r\n";

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {}, got {}",
        expected,
        actual
    );
}

/// Pasted sheet from the first shift, end to end
///
/// Purpose: Check the documented single-pump scenario through parse and convert
/// Benefit: Pins pump inheritance and the first-shift pump test deduction together
#[test]
fn test_first_shift_single_pump_sheet() {
    let rows = parse_pasted_data(SINGLE_PUMP_SHEET);

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].product, Product::Diesel);
    assert_eq!(rows[0].pump, 1);
    assert_eq!(rows[0].opening, 226928.6);
    assert_eq!(rows[0].total, 254.99);
    assert_eq!(rows[1].product, Product::Petrol);
    assert_eq!(rows[1].pump, 1);
    assert_eq!(rows[1].nozzle, 2);
    assert_eq!(rows[1].closing, 96526.27);

    let prices = FuelPrices::new(93.26, 93.26);
    let dispensers = convert_to_dispenser_readings(&rows, prices, Some(1));

    assert_eq!(dispensers.len(), 1);
    let dispenser = &dispensers[0];
    assert_close(dispenser.hsd_pump.net_dispensed_qty, 249.99);
    assert_close(dispenser.ms_pump.net_dispensed_qty, 299.87);
    assert_close(dispenser.hsd_pump.amount, 249.99 * 93.26);
    assert_close(dispenser.ms_pump.amount, 299.87 * 93.26);
}

/// Space-separated paste with Windows line endings from a later shift
///
/// Purpose: Exercise whitespace column realignment and CRLF tolerance
/// Benefit: Later shifts carry no pump test and nothing is clamped away
#[test]
fn test_space_separated_evening_sheet() {
    let rows = parse_pasted_data(EVENING_SHEET);

    assert_eq!(rows.len(), 4);
    assert_eq!(
        rows.iter().map(|r| r.pump).collect::<Vec<_>>(),
        vec![1, 1, 2, 2]
    );

    let dispensers = convert_to_dispenser_readings(&rows, FuelPrices::new(101.66, 93.26), Some(2));
    let totals = compute_totals(&dispensers);

    assert_eq!(dispensers.len(), 2);
    assert_eq!(totals.total_pump_test, 0.0);
    assert_close(totals.total_net_dispensed, 163.0);
    assert_close(totals.total_amount, 60.0 * 101.66 + 103.0 * 93.26);
}

/// Repeated conversion of identical input
///
/// Purpose: Conversion keeps no state between calls
/// Benefit: Price polling can re-run the pipeline freely
#[test]
fn test_conversion_is_idempotent() {
    let prices = FuelPrices::new(101.66, 93.26);

    let first = convert_to_dispenser_readings(&parse_pasted_data(EVENING_SHEET), prices, Some(1));
    let second = convert_to_dispenser_readings(&parse_pasted_data(EVENING_SHEET), prices, Some(1));

    assert_eq!(first, second);
    // Pump 2 diesel dispensed only 3 litres against a 5 litre test
    assert_eq!(first[1].hsd_pump.net_dispensed_qty, 0.0);
    for pump in first.iter().flat_map(|d| d.sides()) {
        assert!(pump.net_dispensed_qty >= 0.0);
        assert!((pump.amount - pump.net_dispensed_qty * pump.rate_per_litre).abs() < 1e-9);
    }
}

/// Header and blank lines only
///
/// Purpose: A copied header row without data yields nothing
/// Benefit: The grid is left alone rather than wiped
#[test]
fn test_header_only_paste_leaves_grid() {
    let text = "PRODUCT\tPUMP\tNOZZLE\tOPENING\tCLOSING\tTOTAL\n\n   \n";
    assert!(parse_pasted_data(text).is_empty());

    let mut grid = ReadingGrid::new(1, FuelPrices::new(101.66, 93.26));
    let before = grid.clone();
    assert!(!grid.load_rows(&parse_pasted_data(text)));
    assert_eq!(grid, before);
}

/// Strict mode explains what lenient mode drops
///
/// Purpose: Orphan petrol rows and unknown products are reported by line
/// Benefit: Operators can see why a reading vanished
#[test]
fn test_strict_diagnostics_for_orphan_rows() {
    let text = "PETROL\t\t2\t10\t20\t10\nKerosene\t1\t1\t5\t6\t1\nDiesel\t3\t1\t0\t10\t10";

    let lenient = PasteParser::new().parse(text);
    let strict = PasteParser::new().with_diagnostics(true).parse(text);

    assert_eq!(lenient.rows, strict.rows);
    assert_eq!(strict.rows.len(), 1);
    assert!(lenient.diagnostics.is_empty());
    assert_eq!(strict.diagnostics.len(), 2);
    assert_eq!(strict.diagnostics[0].line_number, 1);
    assert_eq!(strict.diagnostics[0].reason, SkipReason::MissingPump);
    assert_eq!(
        strict.diagnostics[1].reason,
        SkipReason::UnknownProduct {
            label: "Kerosene".to_string()
        }
    );
}

/// Paste, correct own use, then take a price change
///
/// Purpose: Follow the live grid through an operator's shift
/// Benefit: Edits and price refreshes combine without losing manual figures
#[test]
fn test_grid_edit_and_price_refresh() {
    let mut grid = ReadingGrid::new(1, FuelPrices::new(101.66, 93.26));
    assert!(grid.load_rows(&parse_pasted_data(SINGLE_PUMP_SHEET)));

    let index = grid.position("Pump-1").unwrap();
    grid.update_pump_reading(index, PumpSide::HsdPump, ReadingField::OwnUseQty, 20.0)
        .unwrap();
    grid.apply_prices(FuelPrices::new(105.0, 95.0));

    let hsd = &grid.dispensers()[index].hsd_pump;
    assert_eq!(hsd.own_use_qty, 20.0);
    assert_close(hsd.net_dispensed_qty, 229.99);
    assert_close(hsd.amount, 229.99 * 95.0);

    let sheet = grid.to_sheet(
        "2024-04-01-S1",
        "Ravi",
        NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
    );
    assert_close(sheet.totals.total_own_use, 20.0);
    assert_close(
        sheet.totals.total_amount,
        229.99 * 95.0 + 299.87 * 105.0,
    );
}

/// Prices resolved from a dated price file feed the conversion
///
/// Purpose: Check the price book and config layering against real files
/// Benefit: Catches format drift in the JSON files operators edit by hand
#[tokio::test]
async fn test_price_file_and_config_drive_conversion() {
    let mut price_file = NamedTempFile::new().unwrap();
    write!(
        price_file,
        r#"[
            {{"fuel_type": "MS", "price": 100.0, "effective_date": "2024-01-01"}},
            {{"fuel_type": "HSD", "price": 90.0, "effective_date": "2024-01-01"}},
            {{"fuel_type": "HSD", "price": 92.5, "effective_date": "2024-04-01"}}
        ]"#
    )
    .unwrap();

    let mut config_file = NamedTempFile::new().unwrap();
    write!(
        config_file,
        r#"{{"shift_number": 1, "pump_test_qty": 2.0, "price_file": "{}"}}"#,
        price_file.path().display()
    )
    .unwrap();

    let config = ReconcileConfig::load_layered(Some(config_file.path())).unwrap();
    let book = FuelPriceBook::load(config.price_file.as_ref().unwrap())
        .await
        .unwrap();
    let prices = book
        .effective_on(NaiveDate::from_ymd_opt(2024, 4, 2).unwrap())
        .unwrap();
    assert_eq!(prices, FuelPrices::new(100.0, 92.5));

    let mut grid = ReadingGrid::with_pump_test(config.shift_number, prices, config.pump_test_qty);
    grid.load_rows(&parse_pasted_data(SINGLE_PUMP_SHEET));

    let dispenser = &grid.dispensers()[0];
    assert_close(dispenser.hsd_pump.net_dispensed_qty, 252.99);
    assert_close(dispenser.hsd_pump.amount, 252.99 * 92.5);
    assert_close(dispenser.ms_pump.amount, 302.87 * 100.0);
}

/// Cash counted at checkout against an evening sheet
///
/// Purpose: Carry a reconciled sheet's amount into checkout and the shift summary
/// Benefit: A short drawer is caught before the shift is closed
#[test]
fn test_evening_checkout_against_sheet() {
    let mut grid = ReadingGrid::new(2, FuelPrices::new(100.0, 90.0));
    assert!(grid.load_rows(&parse_pasted_data(EVENING_SHEET)));
    let sheet = grid.to_sheet("2024-04-01-S2", "Ravi", NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
    assert_close(sheet.totals.total_amount, 60.0 * 100.0 + 103.0 * 90.0);

    let mut checkout = CheckoutSheet::new(sheet.shift_id.clone(), 1, "Ravi").unwrap();
    checkout.set_denomination_count(DenominationKind::Note, 500, 30).unwrap();
    checkout.set_denomination_count(DenominationKind::Note, 200, 1).unwrap();
    checkout.set_denomination_count(DenominationKind::Note, 50, 1).unwrap();
    checkout.set_denomination_count(DenominationKind::Coin, 20, 1).unwrap();

    checkout.reconcile(sheet.totals.total_amount, VarianceMode::CashDrawer);
    assert_eq!(checkout.variance(), Variance::Exact);
    assert_eq!(checkout.status, CheckoutStatus::Completed);

    // One 50 note miscounted
    checkout.set_denomination_count(DenominationKind::Note, 50, 0).unwrap();
    checkout.reconcile(sheet.totals.total_amount, VarianceMode::CashDrawer);
    assert_eq!(checkout.variance(), Variance::Short(50.0));

    let summary = summarize_shift(&sheet, std::slice::from_ref(&checkout));
    assert_eq!(summary.status, ShiftStatus::Ongoing);
    assert_close(summary.net_variance, -50.0);
}
