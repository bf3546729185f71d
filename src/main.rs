use clap::Parser;
use fuel_reconcile::cli::{args::Args, commands};
use std::process;
use tokio_util::sync::CancellationToken;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        // Create cancellation token for coordinating graceful shutdown
        let cancellation_token = CancellationToken::new();

        let shutdown_signal = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("Failed to install CTRL+C signal handler: {}", e);
                std::future::pending::<()>().await;
            }
            cancellation_token.cancel();
        };

        tokio::select! {
            result = commands::run(args, cancellation_token.clone()) => {
                result
            }
            _ = shutdown_signal => {
                eprintln!("\nReceived CTRL+C, shutting down...");
                Err(fuel_reconcile::Error::processing_interrupted(
                    "Interrupted by user"
                ))
            }
        }
    });

    match result {
        Ok(stats) if stats.has_errors() => {
            // Some inputs could not be read; the report covers the rest
            process::exit(2);
        }
        Ok(_stats) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("Fuel Reconcile - Pump Reading Reconciliation");
    println!("============================================");
    println!();
    println!("Turn pump meter readings pasted from the shift spreadsheet into");
    println!("per-dispenser sales with pump test deductions and amounts.");
    println!();
    println!("USAGE:");
    println!("    fuel-reconcile <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    parse       Show the rows a paste yields");
    println!("    reconcile   Reconcile pasted readings into dispenser sales");
    println!("    prices      Show the fuel prices in force on a date");
    println!("    checkout    Reconcile counted cash against the fuel sold");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("EXAMPLES:");
    println!("    # Reconcile a first-shift paste at explicit prices:");
    println!("    fuel-reconcile reconcile shift1.tsv --shift 1 --ms 101.66 --hsd 93.26");
    println!();
    println!("    # Read from the clipboard and correct own use on one dispenser:");
    println!("    xclip -o | fuel-reconcile reconcile - --edit Pump-2.hsd.own_use=20");
    println!();
    println!("    # Count a checkout against a saved shift sheet:");
    println!("    fuel-reconcile checkout --sheet shift1.json --count 500=12 --count coin:5=3");
    println!();
    println!("    # Explain skipped lines:");
    println!("    fuel-reconcile parse shift1.tsv --strict");
    println!();
    println!("For detailed help on any command, use:");
    println!("    fuel-reconcile <COMMAND> --help");
}
