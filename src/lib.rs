//! Fuel Reconcile Library
//!
//! A Rust library for turning fuel pump meter readings pasted from a
//! spreadsheet into per-dispenser shift sales figures.
//!
//! This library provides tools for:
//! - Parsing ragged tab/space-delimited pump reading pastes, inferring the
//!   pump number that petrol rows omit
//! - Converting parsed rows into per-pump dispenser readings with pump test
//!   deductions and amounts
//! - Applying live edits to a reading grid with the same recompute rules the
//!   entry sheet uses
//! - Resolving the effective fuel prices from a dated price book
//! - Reconciling the cash counted at checkout against the fuel sold

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod checkout;
        pub mod fuel_prices;
        pub mod paste_parser;
        pub mod reconciler;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{
    CheckoutSheet, DispenserReading, FuelPrices, FuelType, Product, PumpReading, RawRow,
};
pub use app::services::paste_parser::parse_pasted_data;
pub use app::services::reconciler::{ReadingGrid, convert_to_dispenser_readings, pump_test_for};
pub use config::ReconcileConfig;

/// Result type alias for fuel reconciliation
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for reconciliation operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON encoding or decoding failed
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Data validation error
    #[error("Data validation error: {message}")]
    DataValidation { message: String },

    /// No effective price for a fuel type
    #[error("No effective {fuel_type} price on or before {date}")]
    PriceNotFound { fuel_type: String, date: String },

    /// Edit addressed a dispenser that is not in the grid
    #[error("Dispenser index {index} out of range (grid has {len} dispensers)")]
    ReadingNotFound { index: usize, len: usize },

    /// File not found
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    /// Processing interrupted
    #[error("Processing interrupted: {reason}")]
    ProcessingInterrupted { reason: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a JSON error with context
    pub fn json(message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a data validation error
    pub fn data_validation(message: impl Into<String>) -> Self {
        Self::DataValidation {
            message: message.into(),
        }
    }

    /// Create a missing price error
    pub fn price_not_found(fuel_type: impl Into<String>, date: impl Into<String>) -> Self {
        Self::PriceNotFound {
            fuel_type: fuel_type.into(),
            date: date.into(),
        }
    }

    /// Create an out-of-range dispenser error
    pub fn reading_not_found(index: usize, len: usize) -> Self {
        Self::ReadingNotFound { index, len }
    }

    /// Create a file not found error
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a processing interrupted error
    pub fn processing_interrupted(reason: impl Into<String>) -> Self {
        Self::ProcessingInterrupted {
            reason: reason.into(),
        }
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Json {
            message: "JSON processing failed".to_string(),
            source: error,
        }
    }
}
