//! Test utilities for paste parser testing
//!
//! Sample pastes in the shapes operators actually produce: tab-separated
//! copies from the sheet, whitespace-separated retyped copies, and mixed
//! garbage.


/// Header used by the meter printout sheet
pub const SHEET_HEADER: &str = "PRODUCT\tPUMP\tNOZZLE\tOPENING\tCLOSING\tTOTAL";

/// Single dispenser, tab-separated, petrol row with empty pump cell
pub fn create_single_pump_paste() -> String {
    format!(
        "{}\nDiesel\t1\t1\t226928.6\t227183.59\t254.99\nPETROL\t\t2\t96221.4\t96526.27\t304.87",
        SHEET_HEADER
    )
}

/// Three dispensers, tab-separated
pub fn create_three_pump_paste() -> String {
    [
        SHEET_HEADER,
        "Diesel\t1\t1\t226928.6\t227183.59\t254.99",
        "PETROL\t\t2\t96221.4\t96526.27\t304.87",
        "Diesel\t2\t3\t185420.1\t185612.35\t192.25",
        "PETROL\t\t4\t88410\t88630.5\t220.5",
        "Diesel\t3\t5\t50210.75\t50213.75\t3",
        "PETROL\t\t6\t41000\t41410.1\t410.1",
    ]
    .join("\n")
}

/// Same readings as [`create_single_pump_paste`], retyped with spaces
pub fn create_space_separated_paste() -> String {
    "PRODUCT PUMP NOZZLE OPENING CLOSING TOTAL\n\
     Diesel 1 1 226928.6 227183.59 254.99\n\
     PETROL 2 96221.4 96526.27 304.87\n"
        .to_string()
}
