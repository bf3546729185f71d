//! Domain models for pump readings and dispenser sales
//!
//! These types flow from the paste parser through the reconciler to the
//! reports. They are plain values: every parse or conversion builds them
//! afresh.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{DIESEL_LABEL, PETROL_LABEL, SHIFT_TIMINGS};

/// Product label carried by a pasted row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Product {
    #[serde(rename = "Diesel")]
    Diesel,
    #[serde(rename = "PETROL")]
    Petrol,
}

impl Product {
    /// Recognise a product from its exact source label
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            DIESEL_LABEL => Some(Product::Diesel),
            PETROL_LABEL => Some(Product::Petrol),
            _ => None,
        }
    }

    /// Source label as it appears in pasted data
    pub fn label(&self) -> &'static str {
        match self {
            Product::Diesel => DIESEL_LABEL,
            Product::Petrol => PETROL_LABEL,
        }
    }

    /// Fuel type billed for this product
    pub fn fuel_type(&self) -> FuelType {
        match self {
            Product::Diesel => FuelType::Hsd,
            Product::Petrol => FuelType::Ms,
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Billed fuel type: MS (motor spirit, petrol) or HSD (high speed diesel)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FuelType {
    #[serde(rename = "MS")]
    Ms,
    #[serde(rename = "HSD")]
    Hsd,
}

impl FuelType {
    pub fn code(&self) -> &'static str {
        match self {
            FuelType::Ms => "MS",
            FuelType::Hsd => "HSD",
        }
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One accepted line of pasted meter data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    pub product: Product,
    /// Dispenser island number, possibly inherited from the preceding diesel row
    pub pump: i64,
    pub nozzle: i64,
    pub opening: f64,
    pub closing: f64,
    /// Dispensed litres as printed by the meter, not derived from opening/closing
    pub total: f64,
}

/// Effective price per litre for each fuel type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FuelPrices {
    #[serde(rename = "MS")]
    pub ms: f64,
    #[serde(rename = "HSD")]
    pub hsd: f64,
}

impl FuelPrices {
    pub fn new(ms: f64, hsd: f64) -> Self {
        Self { ms, hsd }
    }

    /// Price for a fuel type
    pub fn rate_for(&self, fuel_type: FuelType) -> f64 {
        match fuel_type {
            FuelType::Ms => self.ms,
            FuelType::Hsd => self.hsd,
        }
    }
}

/// Readings and derived sales for one fuel side of a dispenser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PumpReading {
    pub pump_name: String,
    pub fuel_type: FuelType,
    pub opening_reading: f64,
    pub closing_reading: f64,
    /// Gross litres before deductions
    pub dispensed_qty: f64,
    pub pump_test_qty: f64,
    pub own_use_qty: f64,
    /// Billable litres after pump test and own use
    pub net_dispensed_qty: f64,
    pub rate_per_litre: f64,
    pub amount: f64,
}

impl PumpReading {
    /// Zeroed reading carrying only its name, pump test deduction and rate
    pub fn empty(
        pump_name: impl Into<String>,
        fuel_type: FuelType,
        pump_test_qty: f64,
        rate_per_litre: f64,
    ) -> Self {
        Self {
            pump_name: pump_name.into(),
            fuel_type,
            opening_reading: 0.0,
            closing_reading: 0.0,
            dispensed_qty: 0.0,
            pump_test_qty,
            own_use_qty: 0.0,
            net_dispensed_qty: 0.0,
            rate_per_litre,
            amount: 0.0,
        }
    }
}

/// Which fuel side of a dispenser an edit targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PumpSide {
    MsPump,
    HsdPump,
}

/// One physical dispenser with its petrol and diesel sides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispenserReading {
    pub dispenser_name: String,
    pub ms_pump: PumpReading,
    pub hsd_pump: PumpReading,
}

impl DispenserReading {
    pub fn side(&self, side: PumpSide) -> &PumpReading {
        match side {
            PumpSide::MsPump => &self.ms_pump,
            PumpSide::HsdPump => &self.hsd_pump,
        }
    }

    pub fn side_mut(&mut self, side: PumpSide) -> &mut PumpReading {
        match side {
            PumpSide::MsPump => &mut self.ms_pump,
            PumpSide::HsdPump => &mut self.hsd_pump,
        }
    }

    /// Both sides, petrol first
    pub fn sides(&self) -> [&PumpReading; 2] {
        [&self.ms_pump, &self.hsd_pump]
    }
}

/// Sums of every pump side in a set of readings
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadingTotals {
    pub total_dispensed: f64,
    pub total_pump_test: f64,
    pub total_own_use: f64,
    pub total_net_dispensed: f64,
    pub total_amount: f64,
}

/// Saved snapshot of a shift's reading grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftReadingSheet {
    pub shift_id: String,
    pub shift_number: u32,
    pub shift_date: NaiveDate,
    pub operator_name: String,
    pub dispensers: Vec<DispenserReading>,
    pub totals: ReadingTotals,
}

/// Working hours of a shift
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftTiming {
    pub start: String,
    pub end: String,
    pub label: String,
}

impl ShiftTiming {
    /// Timing for a shift number; unknown shifts get a placeholder
    pub fn for_shift(shift_number: u32) -> Self {
        SHIFT_TIMINGS
            .iter()
            .find(|(number, ..)| *number == shift_number)
            .map(|(_, start, end, label)| Self {
                start: start.to_string(),
                end: end.to_string(),
                label: label.to_string(),
            })
            .unwrap_or_else(|| Self {
                start: "00:00".to_string(),
                end: "00:00".to_string(),
                label: format!("Shift {}", shift_number),
            })
    }
}

/// A dated price change for one fuel type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelPriceEntry {
    pub fuel_type: FuelType,
    pub price: f64,
    pub effective_date: NaiveDate,
}

/// Whether a cash denomination is a note or a coin
///
/// 20 and 10 exist as both, so the kind is part of a denomination's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenominationKind {
    Note,
    Coin,
}

impl fmt::Display for DenominationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenominationKind::Note => f.write_str("note"),
            DenominationKind::Coin => f.write_str("coin"),
        }
    }
}

/// Counted pieces of one note or coin value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashDenomination {
    pub kind: DenominationKind,
    pub denomination: u32,
    pub count: u32,
    /// count * denomination
    pub total: f64,
}

/// Checkout sheet lifecycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStatus {
    #[default]
    Pending,
    Completed,
    Verified,
}

/// Cash count and payment totals handed over at one checkout of a shift
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutSheet {
    pub shift_id: String,
    /// 1 to 4 within a shift
    pub checkout_number: u32,
    pub operator_name: String,
    /// Sum of the denomination totals
    pub cash_received: f64,
    pub card_payments: f64,
    pub upi_payments: f64,
    pub other_payments: f64,
    pub opening_balance: f64,
    pub closing_balance: f64,
    /// Positive is excess, negative is short
    pub short_excess: f64,
    pub cash_denominations: Vec<CashDenomination>,
    pub status: CheckoutStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Shift state derived from its checkouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftStatus {
    Ongoing,
    Completed,
    Verified,
}

/// Fuel sales of a shift set against the money its checkouts collected
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftSummary {
    pub shift_id: String,
    pub shift_number: u32,
    pub shift_date: NaiveDate,
    pub total_checkout_sheets: usize,
    pub completed_checkouts: usize,
    pub total_fuel_sales: f64,
    pub total_cash_collections: f64,
    pub total_digital_payments: f64,
    pub net_variance: f64,
    pub status: ShiftStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_labels_are_exact() {
        assert_eq!(Product::from_label("Diesel"), Some(Product::Diesel));
        assert_eq!(Product::from_label("PETROL"), Some(Product::Petrol));
        assert_eq!(Product::from_label("diesel"), None);
        assert_eq!(Product::from_label("Petrol"), None);
        assert_eq!(Product::from_label(""), None);
    }

    #[test]
    fn test_product_fuel_type_mapping() {
        assert_eq!(Product::Diesel.fuel_type(), FuelType::Hsd);
        assert_eq!(Product::Petrol.fuel_type(), FuelType::Ms);
    }

    #[test]
    fn test_fuel_prices_serialize_with_codes() {
        let prices = FuelPrices::new(101.66, 93.26);
        let json = serde_json::to_value(prices).unwrap();
        assert_eq!(json["MS"], 101.66);
        assert_eq!(json["HSD"], 93.26);
        assert_eq!(prices.rate_for(FuelType::Hsd), 93.26);
    }

    #[test]
    fn test_shift_timing_lookup() {
        let first = ShiftTiming::for_shift(1);
        assert_eq!(first.start, "06:00");
        assert_eq!(first.label, "Shift I (6AM - 2PM)");

        let night = ShiftTiming::for_shift(3);
        assert_eq!(night.end, "06:00");

        let unknown = ShiftTiming::for_shift(7);
        assert_eq!(unknown.start, "00:00");
        assert_eq!(unknown.label, "Shift 7");
    }

    #[test]
    fn test_price_entry_deserializes_fuel_code() {
        let entry: FuelPriceEntry = serde_json::from_str(
            r#"{"fuel_type":"HSD","price":93.26,"effective_date":"2024-04-01"}"#,
        )
        .unwrap();
        assert_eq!(entry.fuel_type, FuelType::Hsd);
        assert_eq!(
            entry.effective_date,
            NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
        );

        let bad = serde_json::from_str::<FuelPriceEntry>(
            r#"{"fuel_type":"LPG","price":1.0,"effective_date":"2024-04-01"}"#,
        );
        assert!(bad.is_err());
    }
}
