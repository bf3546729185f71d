//! Test utilities for reconciler testing

use crate::app::models::{FuelPrices, Product, PumpReading, RawRow};
use crate::constants::AMOUNT_TOLERANCE;


/// Prices used by the meter printout samples
pub fn create_test_prices() -> FuelPrices {
    FuelPrices::new(101.66, 93.26)
}

pub fn create_row(product: Product, pump: i64, nozzle: i64, total: f64) -> RawRow {
    RawRow {
        product,
        pump,
        nozzle,
        opening: 1000.0,
        closing: 1000.0 + total,
        total,
    }
}

/// Diesel and petrol for pumps 1 and 2, plus diesel only on pump 3
pub fn create_test_rows() -> Vec<RawRow> {
    vec![
        create_row(Product::Diesel, 1, 1, 254.99),
        create_row(Product::Petrol, 1, 2, 304.87),
        create_row(Product::Diesel, 2, 3, 192.25),
        create_row(Product::Petrol, 2, 4, 220.5),
        create_row(Product::Diesel, 3, 5, 3.0),
    ]
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < AMOUNT_TOLERANCE.max(expected.abs() * 1e-12),
        "expected {} to be close to {}",
        actual,
        expected
    );
}

/// amount == net * rate for a pump side
pub fn assert_amount_consistent(pump: &PumpReading) {
    assert_close(pump.amount, pump.net_dispensed_qty * pump.rate_per_litre);
}
