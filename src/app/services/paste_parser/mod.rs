//! Paste parser for pump meter readings copied from a spreadsheet
//!
//! Turns ragged tab- or whitespace-delimited text into a flat list of
//! [`RawRow`] values. The source layout is one line per nozzle with the
//! columns product, pump, nozzle, opening, closing and total; petrol lines
//! leave the pump column empty and belong to the diesel line above them.
//!
//! ## Architecture
//!
//! - [`parser`] - Line loop, pump carry-forward and acceptance checks
//! - [`columns`] - Header detection and column extraction
//! - [`field_parsers`] - Lenient numeric field parsing
//! - [`stats`] - Parse statistics, diagnostics and result structures
//!
//! ## Usage
//!
//! ```rust
//! use fuel_reconcile::app::services::paste_parser::PasteParser;
//!
//! let text = "Diesel\t1\t1\t226928.6\t227183.59\t254.99\nPETROL\t\t2\t96221.4\t96526.27\t304.87";
//! let result = PasteParser::new().parse(text);
//!
//! assert_eq!(result.rows.len(), 2);
//! assert_eq!(result.rows[1].pump, 1);
//! ```

pub mod columns;
pub mod field_parsers;
pub mod parser;
pub mod stats;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use parser::PasteParser;
pub use stats::{LineDiagnostic, ParseResult, ParseStats, SkipReason};

use crate::app::models::RawRow;

/// Parse pasted text with the default lenient parser
pub fn parse_pasted_data(text: &str) -> Vec<RawRow> {
    PasteParser::new().parse(text).rows
}
