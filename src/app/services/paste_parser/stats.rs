//! Parsing statistics and result structures for pasted readings
//!
//! Row rejection is never an error. Callers that want to know why a line
//! vanished enable strict mode and read the diagnostics instead.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::app::models::RawRow;

/// Parsing result with accepted rows and statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParseResult {
    /// Accepted rows in input order
    pub rows: Vec<RawRow>,

    pub stats: ParseStats,

    /// Why each data line was skipped (strict mode only)
    pub diagnostics: Vec<LineDiagnostic>,
}

/// Why a data line produced no row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// First column is not a recognised product label
    UnknownProduct { label: String },
    /// Diesel row without an explicit pump, or petrol row with no diesel row above it
    MissingPump,
    /// Opening or closing meter reading below zero
    NegativeReading { opening: f64, closing: f64 },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnknownProduct { label } if label.is_empty() => {
                write!(f, "no product label")
            }
            SkipReason::UnknownProduct { label } => write!(f, "unknown product '{}'", label),
            SkipReason::MissingPump => write!(f, "no pump number could be determined"),
            SkipReason::NegativeReading { opening, closing } => write!(
                f,
                "negative meter reading (opening {}, closing {})",
                opening, closing
            ),
        }
    }
}

/// A skipped line and the reason it was skipped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineDiagnostic {
    /// 1-based line number in the pasted text
    pub line_number: usize,
    pub reason: SkipReason,
}

/// Simple parsing statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseStats {
    /// Lines examined after trimming the whole paste
    pub total_lines: usize,

    pub header_lines: usize,

    pub blank_lines: usize,

    /// Rows retained in the output
    pub rows_accepted: usize,

    /// Data lines dropped by the acceptance checks
    pub rows_skipped: usize,

    /// Petrol rows whose pump came from the diesel row above
    pub pumps_inherited: usize,
}

impl ParseStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines that were neither headers nor blank
    pub fn data_lines(&self) -> usize {
        self.rows_accepted + self.rows_skipped
    }

    /// Accepted share of data lines as a percentage
    pub fn acceptance_rate(&self) -> f64 {
        let data_lines = self.data_lines();
        if data_lines == 0 {
            0.0
        } else {
            (self.rows_accepted as f64 / data_lines as f64) * 100.0
        }
    }
}
