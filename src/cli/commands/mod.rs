//! Command implementations for the fuel reconciler CLI
//!
//! Each command is implemented in its own module; shared setup such as
//! logging, configuration and input reading lives in [`shared`].

pub mod checkout;
pub mod parse;
pub mod prices;
pub mod reconcile;
pub mod shared;

pub use shared::ProcessingStats;

use tokio_util::sync::CancellationToken;

use crate::Result;
use crate::cli::args::{Args, Commands};

/// Main command runner
///
/// Dispatches to the appropriate subcommand handler:
/// - `parse`: show the rows a paste yields
/// - `reconcile`: turn pastes into per-dispenser shift sales
/// - `prices`: show the prices in force on a date
/// - `checkout`: reconcile counted cash against the fuel sold
pub async fn run(args: Args, cancellation_token: CancellationToken) -> Result<ProcessingStats> {
    match args.get_command()? {
        Commands::Parse(parse_args) => parse::run_parse(parse_args, cancellation_token).await,
        Commands::Reconcile(reconcile_args) => {
            reconcile::run_reconcile(reconcile_args, cancellation_token).await
        }
        Commands::Prices(prices_args) => prices::run_prices(prices_args, cancellation_token).await,
        Commands::Checkout(checkout_args) => {
            checkout::run_checkout(checkout_args, cancellation_token).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[tokio::test]
    async fn test_run_without_command_is_an_error() {
        let result = run(Args { command: None }, CancellationToken::new()).await;

        assert!(matches!(result, Err(Error::Configuration { .. })));
    }

    #[tokio::test]
    async fn test_cancelled_run_stops_before_reading() {
        let token = CancellationToken::new();
        token.cancel();
        let args = <Args as clap::Parser>::try_parse_from([
            "fuel-reconcile",
            "parse",
            "-q",
            "Cargo.toml",
        ])
        .unwrap();

        let result = run(args, token).await;

        assert!(matches!(result, Err(Error::ProcessingInterrupted { .. })));
    }
}
