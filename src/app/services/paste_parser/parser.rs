//! Core paste parsing orchestration
//!
//! A single forward pass over the lines of a paste. The only state carried
//! between lines is the pump number of the last diesel row that named one,
//! which petrol rows without a pump inherit.

use tracing::debug;

use super::columns::{is_blank_line, is_header_line, split_columns};
use super::field_parsers::{float_or_zero, int_or_zero};
use super::stats::{LineDiagnostic, ParseResult, ParseStats, SkipReason};
use crate::app::models::{Product, RawRow};
use crate::constants::columns;

/// Parser for pump reading pastes
#[derive(Debug, Clone, Default)]
pub struct PasteParser {
    strict: bool,
}

/// Outcome of classifying one data line
enum LineOutcome {
    Accepted { row: RawRow, inherited: bool },
    Skipped(SkipReason),
}

impl PasteParser {
    /// Create a lenient parser
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect a diagnostic for every skipped data line
    ///
    /// Strict mode only adds diagnostics; the accepted rows are identical.
    pub fn with_diagnostics(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Parse pasted text into accepted rows
    ///
    /// Never fails: malformed lines are skipped and unparseable numbers read
    /// as zero.
    pub fn parse(&self, text: &str) -> ParseResult {
        let mut stats = ParseStats::new();
        let mut rows = Vec::new();
        let mut diagnostics = Vec::new();
        let mut current_pump: i64 = 0;

        let trimmed = text.trim();
        let leading = &text[..text.len() - text.trim_start().len()];
        let line_offset = leading.matches('\n').count();

        for (index, line) in trimmed.split('\n').enumerate() {
            let line_number = index + line_offset + 1;
            stats.total_lines += 1;

            if is_header_line(line) {
                debug!("Line {}: skipping header", line_number);
                stats.header_lines += 1;
                continue;
            }
            if is_blank_line(line) {
                stats.blank_lines += 1;
                continue;
            }

            match classify_line(line, &mut current_pump) {
                LineOutcome::Accepted { row, inherited } => {
                    debug!(
                        "Line {}: accepted {} pump {} nozzle {}{}",
                        line_number,
                        row.product,
                        row.pump,
                        row.nozzle,
                        if inherited { " (inherited pump)" } else { "" }
                    );
                    if inherited {
                        stats.pumps_inherited += 1;
                    }
                    stats.rows_accepted += 1;
                    rows.push(row);
                }
                LineOutcome::Skipped(reason) => {
                    debug!("Line {}: skipped, {}", line_number, reason);
                    stats.rows_skipped += 1;
                    if self.strict {
                        diagnostics.push(LineDiagnostic {
                            line_number,
                            reason,
                        });
                    }
                }
            }
        }

        debug!(
            "Parsed {} rows from {} lines ({} skipped)",
            stats.rows_accepted, stats.total_lines, stats.rows_skipped
        );

        ParseResult {
            rows,
            stats,
            diagnostics,
        }
    }
}

/// Parse one non-header, non-blank line, threading the carried pump number
fn classify_line(line: &str, current_pump: &mut i64) -> LineOutcome {
    let fields = split_columns(line);

    let label = fields[columns::PRODUCT].as_str();
    let mut pump = int_or_zero(&fields[columns::PUMP]);
    let nozzle = int_or_zero(&fields[columns::NOZZLE]);
    let opening = float_or_zero(&fields[columns::OPENING]);
    let closing = float_or_zero(&fields[columns::CLOSING]);
    let total = float_or_zero(&fields[columns::TOTAL]);

    let Some(product) = Product::from_label(label) else {
        return LineOutcome::Skipped(SkipReason::UnknownProduct {
            label: label.to_string(),
        });
    };

    let mut inherited = false;
    match product {
        Product::Diesel if pump > 0 => *current_pump = pump,
        Product::Petrol if pump == 0 => {
            pump = *current_pump;
            inherited = pump > 0;
        }
        _ => {}
    }

    if pump <= 0 {
        return LineOutcome::Skipped(SkipReason::MissingPump);
    }
    if opening < 0.0 || closing < 0.0 {
        return LineOutcome::Skipped(SkipReason::NegativeReading { opening, closing });
    }

    LineOutcome::Accepted {
        row: RawRow {
            product,
            pump,
            nozzle,
            opening,
            closing,
            total,
        },
        inherited,
    }
}
