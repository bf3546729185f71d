//! Dated fuel price book
//!
//! Admins record a new price per fuel type with the date it takes effect.
//! The reconciler only ever needs the pair of prices in force on the shift
//! date, which this module resolves.

use chrono::NaiveDate;
use std::path::Path;
use tracing::{debug, info};

use crate::app::models::{FuelPriceEntry, FuelPrices, FuelType};
use crate::{Error, Result};

/// All recorded price changes
#[derive(Debug, Clone, Default)]
pub struct FuelPriceBook {
    entries: Vec<FuelPriceEntry>,
}

impl FuelPriceBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<FuelPriceEntry>) -> Result<Self> {
        let mut book = Self::new();
        for entry in entries {
            book.set_price(entry.fuel_type, entry.price, entry.effective_date)?;
        }
        Ok(book)
    }

    /// Load a JSON array of price entries
    pub async fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::file_not_found(path.display().to_string()));
        }

        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::io(format!("Failed to read price file '{}'", path.display()), e)
        })?;
        let entries: Vec<FuelPriceEntry> = serde_json::from_str(&content).map_err(|e| {
            Error::json(format!("Invalid price file '{}'", path.display()), e)
        })?;

        info!("Loaded {} price entries from {}", entries.len(), path.display());
        Self::from_entries(entries)
    }

    /// Record a price change
    ///
    /// A second entry for the same fuel type and date replaces the first.
    pub fn set_price(
        &mut self,
        fuel_type: FuelType,
        price: f64,
        effective_date: NaiveDate,
    ) -> Result<()> {
        if !price.is_finite() || price <= 0.0 {
            return Err(Error::data_validation(format!(
                "{} price must be a positive number, got {}",
                fuel_type, price
            )));
        }

        self.entries
            .retain(|e| !(e.fuel_type == fuel_type && e.effective_date == effective_date));
        self.entries.push(FuelPriceEntry {
            fuel_type,
            price,
            effective_date,
        });
        debug!("Set {} price {} from {}", fuel_type, price, effective_date);
        Ok(())
    }

    pub fn entries(&self) -> &[FuelPriceEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Price of one fuel type in force on a date
    pub fn price_on(&self, fuel_type: FuelType, date: NaiveDate) -> Result<f64> {
        self.entries
            .iter()
            .filter(|e| e.fuel_type == fuel_type && e.effective_date <= date)
            .max_by_key(|e| e.effective_date)
            .map(|e| e.price)
            .ok_or_else(|| Error::price_not_found(fuel_type.code(), date.to_string()))
    }

    /// Both prices in force on a date
    pub fn effective_on(&self, date: NaiveDate) -> Result<FuelPrices> {
        Ok(FuelPrices {
            ms: self.price_on(FuelType::Ms, date)?,
            hsd: self.price_on(FuelType::Hsd, date)?,
        })
    }
}
