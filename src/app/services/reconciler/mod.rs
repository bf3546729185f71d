//! Reading reconciler for dispenser sales
//!
//! Pairs the diesel and petrol rows of each pump and derives billable
//! quantities and amounts. Two entry points share the data model but not
//! the arithmetic:
//!
//! - [`batch`] - paste conversion; net dispensed is clamped at zero
//! - [`interactive`] - live grid edits; net dispensed may go negative
//!
//! Supporting pieces:
//! - [`pump_test`] - shift pump test policy
//! - [`totals`] - aggregate totals across pump sides

pub mod batch;
pub mod interactive;
pub mod pump_test;
pub mod totals;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use batch::{convert_to_dispenser_readings, convert_with_pump_test};
pub use interactive::{ReadingField, ReadingGrid};
pub use pump_test::{pump_test_for, pump_test_with};
pub use totals::compute_totals;
