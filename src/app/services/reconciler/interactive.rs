//! Live reading grid with per-field recompute
//!
//! The entry sheet keeps a mutable set of dispenser readings and re-derives
//! dependent fields after every edit. Unlike the batch path, net dispensed
//! quantities are not clamped here: an over-deduction shows up as a
//! negative figure for the operator to correct. Opening and closing edits
//! re-derive dispensed first, then net and amount follow from it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use super::batch::convert_with_pump_test;
use super::pump_test::pump_test_with;
use super::totals::compute_totals;
use crate::app::models::{
    DispenserReading, FuelPrices, FuelType, PumpReading, PumpSide, RawRow, ReadingTotals,
    ShiftReadingSheet,
};
use crate::constants::{DEFAULT_DISPENSER_COUNT, GRID_DISPENSER_PREFIX, SHIFT_ONE_PUMP_TEST_QTY};
use crate::{Error, Result};

/// Editable fields of a pump reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingField {
    OpeningReading,
    ClosingReading,
    DispensedQty,
    PumpTestQty,
    OwnUseQty,
    NetDispensedQty,
    RatePerLitre,
    Amount,
}

impl ReadingField {
    pub fn name(&self) -> &'static str {
        match self {
            ReadingField::OpeningReading => "opening_reading",
            ReadingField::ClosingReading => "closing_reading",
            ReadingField::DispensedQty => "dispensed_qty",
            ReadingField::PumpTestQty => "pump_test_qty",
            ReadingField::OwnUseQty => "own_use_qty",
            ReadingField::NetDispensedQty => "net_dispensed_qty",
            ReadingField::RatePerLitre => "rate_per_litre",
            ReadingField::Amount => "amount",
        }
    }
}

impl fmt::Display for ReadingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReadingField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "opening_reading" | "opening" => Ok(ReadingField::OpeningReading),
            "closing_reading" | "closing" => Ok(ReadingField::ClosingReading),
            "dispensed_qty" | "dispensed" => Ok(ReadingField::DispensedQty),
            "pump_test_qty" | "pump_test" => Ok(ReadingField::PumpTestQty),
            "own_use_qty" | "own_use" => Ok(ReadingField::OwnUseQty),
            "net_dispensed_qty" | "net_dispensed" => Ok(ReadingField::NetDispensedQty),
            "rate_per_litre" | "rate" => Ok(ReadingField::RatePerLitre),
            "amount" => Ok(ReadingField::Amount),
            other => Err(Error::data_validation(format!(
                "Unknown reading field '{}'",
                other
            ))),
        }
    }
}

impl FromStr for PumpSide {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ms" | "ms_pump" | "petrol" => Ok(PumpSide::MsPump),
            "hsd" | "hsd_pump" | "diesel" => Ok(PumpSide::HsdPump),
            other => Err(Error::data_validation(format!(
                "Unknown pump side '{}' (expected ms or hsd)",
                other
            ))),
        }
    }
}

impl PumpReading {
    /// Set one field and re-derive the fields that depend on it
    ///
    /// - opening/closing: dispensed = max(0, closing - opening), then net and
    ///   amount follow from the new dispensed quantity
    /// - dispensed/pump test/own use: net = dispensed - pump test - own use
    ///   (unclamped) and amount = net * rate
    /// - net/rate: amount = net * rate
    pub fn apply_edit(&mut self, field: ReadingField, value: f64) {
        match field {
            ReadingField::OpeningReading => self.opening_reading = value,
            ReadingField::ClosingReading => self.closing_reading = value,
            ReadingField::DispensedQty => self.dispensed_qty = value,
            ReadingField::PumpTestQty => self.pump_test_qty = value,
            ReadingField::OwnUseQty => self.own_use_qty = value,
            ReadingField::NetDispensedQty => self.net_dispensed_qty = value,
            ReadingField::RatePerLitre => self.rate_per_litre = value,
            ReadingField::Amount => self.amount = value,
        }

        match field {
            ReadingField::OpeningReading | ReadingField::ClosingReading => {
                self.dispensed_qty = (self.closing_reading - self.opening_reading).max(0.0);
                self.recompute_net();
            }
            ReadingField::DispensedQty | ReadingField::PumpTestQty | ReadingField::OwnUseQty => {
                self.recompute_net();
            }
            ReadingField::NetDispensedQty | ReadingField::RatePerLitre => {
                self.recompute_amount();
            }
            ReadingField::Amount => {}
        }
    }

    /// Take a new rate and re-derive the amount, leaving quantities alone
    pub fn apply_rate(&mut self, rate_per_litre: f64) {
        self.rate_per_litre = rate_per_litre;
        self.recompute_amount();
    }

    fn recompute_net(&mut self) {
        self.net_dispensed_qty = self.dispensed_qty - self.pump_test_qty - self.own_use_qty;
        self.recompute_amount();
    }

    fn recompute_amount(&mut self) {
        self.amount = self.net_dispensed_qty * self.rate_per_litre;
    }
}

/// Mutable set of dispenser readings for one shift
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingGrid {
    shift_number: u32,
    prices: FuelPrices,
    pump_test_qty: f64,
    dispensers: Vec<DispenserReading>,
}

impl ReadingGrid {
    /// Empty grid of the default dispensers for a shift
    pub fn new(shift_number: u32, prices: FuelPrices) -> Self {
        Self::with_pump_test(shift_number, prices, SHIFT_ONE_PUMP_TEST_QTY)
    }

    /// Empty grid using a configured first-shift pump test quantity
    pub fn with_pump_test(shift_number: u32, prices: FuelPrices, first_shift_qty: f64) -> Self {
        let pump_test_qty = pump_test_with(Some(shift_number), first_shift_qty);
        let dispensers = (1..=DEFAULT_DISPENSER_COUNT)
            .map(|n| DispenserReading {
                dispenser_name: format!("{}-{}", GRID_DISPENSER_PREFIX, n),
                ms_pump: PumpReading::empty(
                    format!("{}-{}", FuelType::Ms.code(), n),
                    FuelType::Ms,
                    pump_test_qty,
                    prices.ms,
                ),
                hsd_pump: PumpReading::empty(
                    format!("{}-{}", FuelType::Hsd.code(), n),
                    FuelType::Hsd,
                    pump_test_qty,
                    prices.hsd,
                ),
            })
            .collect();

        Self {
            shift_number,
            prices,
            pump_test_qty,
            dispensers,
        }
    }

    /// Wrap existing readings, e.g. a loaded sheet
    pub fn from_readings(
        shift_number: u32,
        prices: FuelPrices,
        dispensers: Vec<DispenserReading>,
    ) -> Self {
        Self::from_readings_with_pump_test(
            shift_number,
            prices,
            SHIFT_ONE_PUMP_TEST_QTY,
            dispensers,
        )
    }

    /// Wrap existing readings, keeping a configured first-shift pump test
    /// for later pastes into the grid
    pub fn from_readings_with_pump_test(
        shift_number: u32,
        prices: FuelPrices,
        first_shift_qty: f64,
        dispensers: Vec<DispenserReading>,
    ) -> Self {
        Self {
            shift_number,
            prices,
            pump_test_qty: pump_test_with(Some(shift_number), first_shift_qty),
            dispensers,
        }
    }

    /// Replace the grid with readings converted from pasted rows
    ///
    /// Leaves the grid untouched and returns `false` when the rows produce
    /// no dispensers.
    pub fn load_rows(&mut self, rows: &[RawRow]) -> bool {
        let converted = convert_with_pump_test(rows, self.prices, self.pump_test_qty);
        if converted.is_empty() {
            debug!("Paste produced no dispensers, keeping current grid");
            return false;
        }
        debug!("Replacing grid with {} pasted dispensers", converted.len());
        self.dispensers = converted;
        true
    }

    pub fn shift_number(&self) -> u32 {
        self.shift_number
    }

    pub fn prices(&self) -> FuelPrices {
        self.prices
    }

    pub fn dispensers(&self) -> &[DispenserReading] {
        &self.dispensers
    }

    pub fn len(&self) -> usize {
        self.dispensers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dispensers.is_empty()
    }

    /// Position of a dispenser by name
    pub fn position(&self, dispenser_name: &str) -> Option<usize> {
        self.dispensers
            .iter()
            .position(|d| d.dispenser_name == dispenser_name)
    }

    /// Apply a field edit to one side of one dispenser
    pub fn update_pump_reading(
        &mut self,
        dispenser_index: usize,
        side: PumpSide,
        field: ReadingField,
        value: f64,
    ) -> Result<&PumpReading> {
        let len = self.dispensers.len();
        let dispenser = self
            .dispensers
            .get_mut(dispenser_index)
            .ok_or_else(|| Error::reading_not_found(dispenser_index, len))?;

        debug!(
            "Edit {} {:?} {} = {}",
            dispenser.dispenser_name, side, field, value
        );

        let pump = dispenser.side_mut(side);
        pump.apply_edit(field, value);
        Ok(pump)
    }

    /// Take refreshed prices; only rates and amounts change
    pub fn apply_prices(&mut self, prices: FuelPrices) {
        self.prices = prices;
        for dispenser in &mut self.dispensers {
            dispenser.ms_pump.apply_rate(prices.ms);
            dispenser.hsd_pump.apply_rate(prices.hsd);
        }
    }

    pub fn totals(&self) -> ReadingTotals {
        compute_totals(&self.dispensers)
    }

    /// Snapshot the grid for saving
    pub fn to_sheet(
        &self,
        shift_id: impl Into<String>,
        operator_name: impl Into<String>,
        shift_date: NaiveDate,
    ) -> ShiftReadingSheet {
        ShiftReadingSheet {
            shift_id: shift_id.into(),
            shift_number: self.shift_number,
            shift_date,
            operator_name: operator_name.into(),
            dispensers: self.dispensers.clone(),
            totals: self.totals(),
        }
    }
}
