//! Line classification and column extraction for pasted readings
//!
//! Pastes arrive either tab-separated (empty cells survive as empty
//! columns) or whitespace-separated (empty cells vanish). Petrol rows share
//! the pump column of the diesel row above them and leave it blank, so the
//! whitespace path has to put the missing slot back.

use crate::constants::{EXPECTED_COLUMNS, HEADER_MARKERS, PETROL_FIELDS_WITHOUT_PUMP, PETROL_LABEL};

/// Header lines mention one of the column titles anywhere on the line
pub fn is_header_line(line: &str) -> bool {
    HEADER_MARKERS.iter().any(|marker| line.contains(marker))
}

pub fn is_blank_line(line: &str) -> bool {
    line.trim().is_empty()
}

/// Split a data line into at least [`EXPECTED_COLUMNS`] trimmed columns
///
/// Column positions are product, pump, nozzle, opening, closing, total.
/// A whitespace-separated petrol row with fewer than five fields yields
/// only empty columns and is rejected downstream as an unknown product.
pub fn split_columns(line: &str) -> Vec<String> {
    let raw: Vec<&str> = if line.contains('\t') {
        line.split('\t').collect()
    } else if line.trim().starts_with(PETROL_LABEL) {
        let mut parts: Vec<&str> = line.split_whitespace().collect();
        match parts.len() {
            n if n == PETROL_FIELDS_WITHOUT_PUMP => {
                parts.insert(1, "");
                parts
            }
            n if n > PETROL_FIELDS_WITHOUT_PUMP => parts,
            _ => Vec::new(),
        }
    } else {
        line.split_whitespace().collect()
    };

    let mut columns: Vec<String> = raw.iter().map(|column| column.trim().to_string()).collect();

    while columns.len() < EXPECTED_COLUMNS {
        columns.push(String::new());
    }

    columns
}
