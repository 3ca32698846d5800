mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde_json::Value;
use std::process;

use commands::loan::{CompareArgs, DocumentArgs, ExportArgs, LoanArgs};

/// Loan EMI and amortization calculator
#[derive(Parser)]
#[command(
    name = "finbuddy",
    version,
    about = "Loan EMI and amortization calculator",
    long_about = "Computes level EMIs and month-by-month amortization schedules with \
                  decimal precision. Supports extra monthly payments, lump-sum \
                  prepayments, loan comparison, chart data and CSV export."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the EMI and month-by-month amortization schedule
    Schedule(LoanArgs),
    /// Compare a loan against a plain alternative
    Compare(CompareArgs),
    /// Evaluate a list of loan options and pick the cheapest
    Options(DocumentArgs),
    /// Interest and months saved by extra and lump-sum payments
    Savings(LoanArgs),
    /// Principal vs interest split and balance-over-time series
    Breakdown(LoanArgs),
    /// Export the schedule as CSV
    Export(ExportArgs),
    /// Validate a loan form and report per-field errors
    Validate(DocumentArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Schedule(args) => commands::loan::run_schedule(args),
        Commands::Compare(args) => commands::loan::run_compare(args),
        Commands::Options(args) => commands::loan::run_options(args),
        Commands::Savings(args) => commands::loan::run_savings(args),
        Commands::Breakdown(args) => commands::loan::run_breakdown(args),
        Commands::Export(args) => commands::loan::run_export(args),
        Commands::Validate(args) => commands::loan::run_validate(args),
        Commands::Version => {
            println!("finbuddy {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(Value::Null) => process::exit(0),
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
