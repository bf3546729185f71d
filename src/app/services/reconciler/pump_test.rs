//! Pump test deduction policy
//!
//! Each nozzle dispenses a fixed calibration quantity at the start of the
//! first shift of the day. That quantity is not sold and comes off the
//! billable litres.

use crate::constants::{PUMP_TEST_SHIFT, SHIFT_ONE_PUMP_TEST_QTY};

/// Pump test litres deducted per pump side for a shift
///
/// The first shift carries the deduction; other shifts, and conversions
/// with no shift at all, deduct nothing.
pub fn pump_test_for(shift_number: Option<u32>) -> f64 {
    pump_test_with(shift_number, SHIFT_ONE_PUMP_TEST_QTY)
}

/// Same policy with a configured first-shift quantity
pub fn pump_test_with(shift_number: Option<u32>, first_shift_qty: f64) -> f64 {
    match shift_number {
        Some(PUMP_TEST_SHIFT) => first_shift_qty,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_shift_deducts_five_litres() {
        assert_eq!(pump_test_for(Some(1)), 5.0);
    }

    #[test]
    fn test_other_shifts_deduct_nothing() {
        assert_eq!(pump_test_for(Some(2)), 0.0);
        assert_eq!(pump_test_for(Some(3)), 0.0);
        assert_eq!(pump_test_for(Some(0)), 0.0);
        assert_eq!(pump_test_for(None), 0.0);
    }

    #[test]
    fn test_configured_quantity() {
        assert_eq!(pump_test_with(Some(1), 2.5), 2.5);
        assert_eq!(pump_test_with(Some(2), 2.5), 0.0);
    }
}
