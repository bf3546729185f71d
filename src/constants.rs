//! Application constants for fuel reconciliation
//!
//! This module contains the paste format markers, fuel labels, shift policy
//! tables, checkout denominations and default values used throughout the
//! application.

// =============================================================================
// Paste Format
// =============================================================================

/// Source label for diesel rows (exact, case-sensitive)
pub const DIESEL_LABEL: &str = "Diesel";

/// Source label for petrol rows (exact, case-sensitive)
pub const PETROL_LABEL: &str = "PETROL";

/// Substrings that mark a header line
pub const HEADER_MARKERS: &[&str] = &["PRODUCT", "PUMP"];

/// Column layout: product, pump, nozzle, opening, closing, total
pub const EXPECTED_COLUMNS: usize = 6;

/// Whitespace-split petrol rows with this many fields are missing the pump column
pub const PETROL_FIELDS_WITHOUT_PUMP: usize = 5;

pub mod columns {
    pub const PRODUCT: usize = 0;
    pub const PUMP: usize = 1;
    pub const NOZZLE: usize = 2;
    pub const OPENING: usize = 3;
    pub const CLOSING: usize = 4;
    pub const TOTAL: usize = 5;
}

// =============================================================================
// Shift Policy
// =============================================================================

/// Litres dispensed for calibration during the first shift of the day
pub const SHIFT_ONE_PUMP_TEST_QTY: f64 = 5.0;

/// Shift that carries the pump test deduction
pub const PUMP_TEST_SHIFT: u32 = 1;

/// Maximum number of shifts in one day
pub const MAX_SHIFTS_PER_DAY: u32 = 3;

/// Shift timings as (shift number, start, end, label)
pub const SHIFT_TIMINGS: &[(u32, &str, &str, &str)] = &[
    (1, "06:00", "14:00", "Shift I (6AM - 2PM)"),
    (2, "14:00", "22:00", "Shift II (2PM - 10PM)"),
    (3, "22:00", "06:00", "Shift III (10PM - 6AM)"),
];

// =============================================================================
// Reading Grid
// =============================================================================

/// Dispensers on an empty entry grid
pub const DEFAULT_DISPENSER_COUNT: usize = 4;

/// Name prefix for dispensers on an empty entry grid
pub const GRID_DISPENSER_PREFIX: &str = "DS";

/// Name prefix for dispensers built from pasted readings
pub const PASTED_DISPENSER_PREFIX: &str = "Pump";

// =============================================================================
// Prices and Configuration
// =============================================================================

/// Default petrol (MS) price per litre
pub const DEFAULT_MS_PRICE: f64 = 101.66;

/// Default diesel (HSD) price per litre
pub const DEFAULT_HSD_PRICE: f64 = 93.26;

/// Directory name under the platform config dir
pub const CONFIG_DIR_NAME: &str = "fuel-reconcile";

/// Config file name inside [`CONFIG_DIR_NAME`]
pub const CONFIG_FILE_NAME: &str = "config.json";

// =============================================================================
// Checkout
// =============================================================================

/// Note values counted at checkout, largest first
pub const NOTE_DENOMINATIONS: &[u32] = &[500, 200, 100, 50, 20, 10];

/// Coin values counted at checkout, largest first
pub const COIN_DENOMINATIONS: &[u32] = &[20, 10, 5, 2, 1];

/// Checkouts a single shift can hand over
pub const MAX_CHECKOUTS_PER_SHIFT: u32 = 4;

/// Variances smaller than this count as an exact cash match
pub const AMOUNT_TOLERANCE: f64 = 1e-9;
