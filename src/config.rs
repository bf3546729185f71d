//! Configuration management and validation.
//!
//! Settings are layered: built-in defaults, then an optional JSON config
//! file, then command-line overrides applied by the CLI.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::app::models::FuelPrices;
use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_HSD_PRICE, DEFAULT_MS_PRICE, MAX_SHIFTS_PER_DAY,
    SHIFT_ONE_PUMP_TEST_QTY,
};
use crate::{Error, Result};

/// Global configuration for reading reconciliation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Prices used when no price book or explicit price is given
    pub prices: FuelPrices,

    /// Shift the readings belong to (1-3)
    pub shift_number: u32,

    /// Pump test litres deducted per side on the first shift
    pub pump_test_qty: f64,

    /// Report why each pasted line was skipped
    pub strict_diagnostics: bool,

    /// Operator recorded on saved sheets
    pub operator_name: String,

    /// Dated price book, overrides `prices` when present
    pub price_file: Option<PathBuf>,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            prices: FuelPrices::new(DEFAULT_MS_PRICE, DEFAULT_HSD_PRICE),
            shift_number: 1,
            pump_test_qty: SHIFT_ONE_PUMP_TEST_QTY,
            strict_diagnostics: false,
            operator_name: String::new(),
            price_file: None,
        }
    }
}

impl ReconcileConfig {
    /// Platform config location, e.g. `~/.config/fuel-reconcile/config.json`
    pub fn default_config_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or_else(|| Error::configuration("Could not determine config directory"))
    }

    /// Read a config file; missing fields take their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::io(format!("Failed to read config file '{}'", path.display()), e)
        })?;
        serde_json::from_str(&content)
            .map_err(|e| Error::json(format!("Invalid config file '{}'", path.display()), e))
    }

    /// Defaults, overlaid with the given file or the default file if it exists
    pub fn load_layered(config_file: Option<&Path>) -> Result<Self> {
        let config = match config_file {
            Some(path) => {
                debug!("Loading config from {}", path.display());
                Self::from_file(path)?
            }
            None => match Self::default_config_path() {
                Ok(path) if path.exists() => {
                    debug!("Loading config from default location {}", path.display());
                    Self::from_file(&path)?
                }
                _ => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn with_prices(mut self, prices: FuelPrices) -> Self {
        self.prices = prices;
        self
    }

    pub fn with_shift_number(mut self, shift_number: u32) -> Self {
        self.shift_number = shift_number;
        self
    }

    pub fn with_pump_test_qty(mut self, pump_test_qty: f64) -> Self {
        self.pump_test_qty = pump_test_qty;
        self
    }

    pub fn with_strict_diagnostics(mut self) -> Self {
        self.strict_diagnostics = true;
        self
    }

    pub fn with_operator_name(mut self, operator_name: impl Into<String>) -> Self {
        self.operator_name = operator_name.into();
        self
    }

    pub fn with_price_file(mut self, price_file: PathBuf) -> Self {
        self.price_file = Some(price_file);
        self
    }

    /// Check values for consistency
    pub fn validate(&self) -> Result<()> {
        if self.shift_number == 0 || self.shift_number > MAX_SHIFTS_PER_DAY {
            return Err(Error::configuration(format!(
                "Shift number must be between 1 and {}, got {}",
                MAX_SHIFTS_PER_DAY, self.shift_number
            )));
        }

        for (code, price) in [("MS", self.prices.ms), ("HSD", self.prices.hsd)] {
            if !price.is_finite() || price <= 0.0 {
                return Err(Error::configuration(format!(
                    "{} price must be a positive number, got {}",
                    code, price
                )));
            }
        }

        if !self.pump_test_qty.is_finite() || self.pump_test_qty < 0.0 {
            return Err(Error::configuration(format!(
                "Pump test quantity must not be negative, got {}",
                self.pump_test_qty
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        let config = ReconcileConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.shift_number, 1);
        assert_eq!(config.pump_test_qty, 5.0);
        assert_eq!(config.prices, FuelPrices::new(101.66, 93.26));
    }

    #[test]
    fn test_builders() {
        let config = ReconcileConfig::default()
            .with_prices(FuelPrices::new(100.0, 90.0))
            .with_shift_number(3)
            .with_pump_test_qty(2.0)
            .with_strict_diagnostics()
            .with_operator_name("Anita")
            .with_price_file(PathBuf::from("prices.json"));

        assert_eq!(config.prices.ms, 100.0);
        assert_eq!(config.shift_number, 3);
        assert_eq!(config.pump_test_qty, 2.0);
        assert!(config.strict_diagnostics);
        assert_eq!(config.operator_name, "Anita");
        assert_eq!(config.price_file, Some(PathBuf::from("prices.json")));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(ReconcileConfig::default().with_shift_number(0).validate().is_err());
        assert!(ReconcileConfig::default().with_shift_number(4).validate().is_err());
        assert!(
            ReconcileConfig::default()
                .with_prices(FuelPrices::new(0.0, 90.0))
                .validate()
                .is_err()
        );
        assert!(
            ReconcileConfig::default()
                .with_pump_test_qty(-1.0)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_partial_config_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"shift_number": 2, "prices": {{"MS": 105.5, "HSD": 94.0}}}}"#).unwrap();

        let config = ReconcileConfig::load_layered(Some(file.path())).unwrap();

        assert_eq!(config.shift_number, 2);
        assert_eq!(config.prices, FuelPrices::new(105.5, 94.0));
        assert_eq!(config.pump_test_qty, 5.0);
        assert!(!config.strict_diagnostics);
    }

    #[test]
    fn test_invalid_config_file_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"shift_number": 9}}"#).unwrap();

        let result = ReconcileConfig::load_layered(Some(file.path()));
        assert!(matches!(result, Err(Error::Configuration { .. })));

        let mut garbage = NamedTempFile::new().unwrap();
        write!(garbage, "shift_number = 2").unwrap();
        assert!(matches!(
            ReconcileConfig::from_file(garbage.path()),
            Err(Error::Json { .. })
        ));
    }
}
