//! Checkout cash reconciliation
//!
//! At each checkout an operator counts the drawer by denomination and
//! records card, UPI and other payments. The counted money is set against
//! the amount the dispenser readings say was sold; the difference is the
//! short (negative) or excess (positive) for that checkout.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::app::models::{
    CashDenomination, CheckoutSheet, CheckoutStatus, DenominationKind, ShiftReadingSheet,
    ShiftStatus, ShiftSummary,
};
use crate::constants::{
    AMOUNT_TOLERANCE, COIN_DENOMINATIONS, MAX_CHECKOUTS_PER_SHIFT, NOTE_DENOMINATIONS,
};
use crate::{Error, Result};

/// How the variance of a checkout is computed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarianceMode {
    /// cash + opening balance - closing balance - expected
    #[default]
    CashDrawer,
    /// cash + card + UPI + other - expected
    AllPayments,
}

/// Outcome of a reconciled checkout
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Variance {
    Short(f64),
    Excess(f64),
    Exact,
}

/// Zero counts for every note then every coin
pub fn default_denominations() -> Vec<CashDenomination> {
    let notes = NOTE_DENOMINATIONS
        .iter()
        .map(|&d| (DenominationKind::Note, d));
    let coins = COIN_DENOMINATIONS
        .iter()
        .map(|&d| (DenominationKind::Coin, d));

    notes
        .chain(coins)
        .map(|(kind, denomination)| CashDenomination {
            kind,
            denomination,
            count: 0,
            total: 0.0,
        })
        .collect()
}

impl CheckoutSheet {
    /// Empty pending checkout with every denomination at zero
    pub fn new(
        shift_id: impl Into<String>,
        checkout_number: u32,
        operator_name: impl Into<String>,
    ) -> Result<Self> {
        if checkout_number == 0 || checkout_number > MAX_CHECKOUTS_PER_SHIFT {
            return Err(Error::data_validation(format!(
                "Checkout number must be between 1 and {}, got {}",
                MAX_CHECKOUTS_PER_SHIFT, checkout_number
            )));
        }

        Ok(Self {
            shift_id: shift_id.into(),
            checkout_number,
            operator_name: operator_name.into(),
            cash_received: 0.0,
            card_payments: 0.0,
            upi_payments: 0.0,
            other_payments: 0.0,
            opening_balance: 0.0,
            closing_balance: 0.0,
            short_excess: 0.0,
            cash_denominations: default_denominations(),
            status: CheckoutStatus::Pending,
            notes: None,
        })
    }

    /// Record the counted pieces of one note or coin
    pub fn set_denomination_count(
        &mut self,
        kind: DenominationKind,
        denomination: u32,
        count: u32,
    ) -> Result<()> {
        let entry = self
            .cash_denominations
            .iter_mut()
            .find(|d| d.kind == kind && d.denomination == denomination)
            .ok_or_else(|| {
                Error::data_validation(format!("No {} of value {}", kind, denomination))
            })?;

        entry.count = count;
        entry.total = f64::from(count) * f64::from(denomination);
        debug!(
            "Checkout {}: {} x {} {} = {}",
            self.checkout_number, count, denomination, kind, entry.total
        );
        Ok(())
    }

    pub fn cash_from_denominations(&self) -> f64 {
        self.cash_denominations.iter().map(|d| d.total).sum()
    }

    pub fn total_pieces(&self) -> u64 {
        self.cash_denominations
            .iter()
            .map(|d| u64::from(d.count))
            .sum()
    }

    pub fn digital_payments(&self) -> f64 {
        self.card_payments + self.upi_payments + self.other_payments
    }

    /// Counted cash plus every other payment
    pub fn total_received(&self) -> f64 {
        self.cash_received + self.digital_payments()
    }

    /// Recompute cash received, the variance and the status
    ///
    /// The checkout completes only when the money matches the expected
    /// amount exactly; any short or excess leaves it pending.
    pub fn reconcile(&mut self, expected_amount: f64, mode: VarianceMode) -> f64 {
        self.cash_received = self.cash_from_denominations();
        self.short_excess = match mode {
            VarianceMode::CashDrawer => {
                self.cash_received + self.opening_balance - self.closing_balance - expected_amount
            }
            VarianceMode::AllPayments => self.total_received() - expected_amount,
        };
        self.status = if self.short_excess.abs() < AMOUNT_TOLERANCE {
            CheckoutStatus::Completed
        } else {
            CheckoutStatus::Pending
        };

        debug!(
            "Checkout {} reconciled against {:.2}: variance {:.2} ({:?})",
            self.checkout_number, expected_amount, self.short_excess, self.status
        );
        self.short_excess
    }

    pub fn variance(&self) -> Variance {
        if self.short_excess.abs() < AMOUNT_TOLERANCE {
            Variance::Exact
        } else if self.short_excess < 0.0 {
            Variance::Short(-self.short_excess)
        } else {
            Variance::Excess(self.short_excess)
        }
    }

    /// Mark a completed checkout as checked by a supervisor
    pub fn verify(&mut self) -> Result<()> {
        match self.status {
            CheckoutStatus::Pending => Err(Error::data_validation(format!(
                "Checkout {} has an open variance of {:.2} and cannot be verified",
                self.checkout_number, self.short_excess
            ))),
            CheckoutStatus::Completed | CheckoutStatus::Verified => {
                self.status = CheckoutStatus::Verified;
                Ok(())
            }
        }
    }
}

/// Roll a shift's checkouts up against its fuel sales
///
/// The shift stays ongoing while it has no checkouts or any checkout is
/// pending; it is verified once every checkout is.
pub fn summarize_shift(sheet: &ShiftReadingSheet, checkouts: &[CheckoutSheet]) -> ShiftSummary {
    let completed_checkouts = checkouts
        .iter()
        .filter(|c| c.status != CheckoutStatus::Pending)
        .count();

    let status = if checkouts.is_empty() || completed_checkouts < checkouts.len() {
        ShiftStatus::Ongoing
    } else if checkouts
        .iter()
        .all(|c| c.status == CheckoutStatus::Verified)
    {
        ShiftStatus::Verified
    } else {
        ShiftStatus::Completed
    };

    ShiftSummary {
        shift_id: sheet.shift_id.clone(),
        shift_number: sheet.shift_number,
        shift_date: sheet.shift_date,
        total_checkout_sheets: checkouts.len(),
        completed_checkouts,
        total_fuel_sales: sheet.totals.total_amount,
        total_cash_collections: checkouts.iter().map(|c| c.cash_received).sum(),
        total_digital_payments: checkouts.iter().map(|c| c.digital_payments()).sum(),
        net_variance: checkouts.iter().map(|c| c.short_excess).sum(),
        status,
    }
}
