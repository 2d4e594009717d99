//! Horcrux - split a file into encrypted fragments.
//!
//! A CLI for threshold file splitting: any T of the N produced horcruxes
//! resurrect the original; fewer reveal nothing.

mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use commands::{BindCommand, CommandExecutor, SplitCommand};

/// Horcrux - resilient, private storage for a single sensitive file.
///
/// Split encrypts a file and spreads it over N fragments; bind gathers at
/// least T of them and restores the original, byte for byte. Fragments can
/// be plain container files, headerless noise, or hidden inside images.
#[derive(Parser)]
#[command(name = "horcrux")]
#[command(version)]
#[command(about = "Split a file into encrypted horcruxes, bind them back together")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a file into encrypted horcruxes
    Split(SplitCommand),

    /// Reconstruct the original file from a set of horcruxes
    Bind(BindCommand),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Split(cmd) => cmd.execute(),
        Commands::Bind(cmd) => cmd.execute(),
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
