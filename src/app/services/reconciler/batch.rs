//! Batch conversion of parsed rows into dispenser readings
//!
//! Used on the paste path. The meter printout already carries the
//! dispensed total per nozzle, so opening and closing readings are carried
//! through for display but never used to derive quantities here.

use std::collections::HashMap;
use tracing::debug;

use super::pump_test::pump_test_for;
use crate::app::models::{DispenserReading, FuelPrices, FuelType, Product, PumpReading, RawRow};
use crate::constants::PASTED_DISPENSER_PREFIX;

/// Diesel and petrol rows seen for one pump
#[derive(Debug, Default)]
struct PumpPair<'a> {
    diesel: Option<&'a RawRow>,
    petrol: Option<&'a RawRow>,
}

/// Convert parsed rows into one dispenser reading per pump
///
/// Rows are grouped by pump number in first-seen order. A later row of the
/// same product for the same pump replaces the earlier one. Net dispensed
/// quantities are clamped at zero.
pub fn convert_to_dispenser_readings(
    rows: &[RawRow],
    prices: FuelPrices,
    shift_number: Option<u32>,
) -> Vec<DispenserReading> {
    convert_with_pump_test(rows, prices, pump_test_for(shift_number))
}

/// Convert with an explicit pump test quantity applied to every pump side
pub fn convert_with_pump_test(
    rows: &[RawRow],
    prices: FuelPrices,
    pump_test_qty: f64,
) -> Vec<DispenserReading> {
    let mut order: Vec<i64> = Vec::new();
    let mut pairs: HashMap<i64, PumpPair<'_>> = HashMap::new();

    for row in rows {
        let pair = pairs.entry(row.pump).or_insert_with(|| {
            order.push(row.pump);
            PumpPair::default()
        });
        match row.product {
            Product::Diesel => pair.diesel = Some(row),
            Product::Petrol => pair.petrol = Some(row),
        }
    }

    debug!(
        "Converting {} rows into {} dispensers (pump test {} L)",
        rows.len(),
        order.len(),
        pump_test_qty
    );

    order
        .into_iter()
        .map(|pump| {
            let pair = &pairs[&pump];
            DispenserReading {
                dispenser_name: format!("{}-{}", PASTED_DISPENSER_PREFIX, pump),
                ms_pump: batch_reading(pump, FuelType::Ms, pair.petrol, pump_test_qty, prices),
                hsd_pump: batch_reading(pump, FuelType::Hsd, pair.diesel, pump_test_qty, prices),
            }
        })
        .collect()
}

fn batch_reading(
    pump: i64,
    fuel_type: FuelType,
    row: Option<&RawRow>,
    pump_test_qty: f64,
    prices: FuelPrices,
) -> PumpReading {
    let rate_per_litre = prices.rate_for(fuel_type);
    let dispensed_qty = row.map_or(0.0, |r| r.total);
    let net_dispensed_qty = (dispensed_qty - pump_test_qty).max(0.0);

    PumpReading {
        pump_name: format!("{}-{}", fuel_type.code(), pump),
        fuel_type,
        opening_reading: row.map_or(0.0, |r| r.opening),
        closing_reading: row.map_or(0.0, |r| r.closing),
        dispensed_qty,
        pump_test_qty,
        own_use_qty: 0.0,
        net_dispensed_qty,
        rate_per_litre,
        amount: net_dispensed_qty * rate_per_litre,
    }
}
