//! Aggregate totals across every pump side

use crate::app::models::{DispenserReading, ReadingTotals};

/// Sum every pump side of the given dispensers
///
/// Always recomputed from the readings; nothing is cached between edits.
pub fn compute_totals(dispensers: &[DispenserReading]) -> ReadingTotals {
    dispensers
        .iter()
        .flat_map(|dispenser| dispenser.sides())
        .fold(ReadingTotals::default(), |mut totals, pump| {
            totals.total_dispensed += pump.dispensed_qty;
            totals.total_pump_test += pump.pump_test_qty;
            totals.total_own_use += pump.own_use_qty;
            totals.total_net_dispensed += pump.net_dispensed_qty;
            totals.total_amount += pump.amount;
            totals
        })
}
