//! qsync CLI - GPS-to-controller clock synchronization daemon.
//!
//! This binary provides a command-line interface to the qsync library.

use clap::{Parser, Subcommand};

mod commands;
mod error;

#[derive(Parser)]
#[command(name = "qsync")]
#[command(version = qsync::VERSION)]
#[command(about = "Sync lighting controller clocks from a GPS receiver", long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true, default_value = "qsync.ini")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Listen for GPS fixes and keep all controllers in sync (daemon mode)
    Run,
    /// Push one position to all controllers immediately, then exit
    Sync {
        /// Latitude in decimal degrees
        #[arg(long)]
        lat: f64,
        /// Longitude in decimal degrees
        #[arg(long)]
        lon: f64,
    },
    /// Open an interactive command session with one controller
    Shell {
        /// Name of the controller (a [controller:<name>] config section)
        #[arg(long)]
        target: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Run => commands::run::run(&cli.config),
        Command::Sync { lat, lon } => {
            if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
                eprintln!("Error: latitude must be in [-90, 90] and longitude in [-180, 180]");
                std::process::exit(1);
            }
            commands::sync::run(&cli.config, lat, lon)
        }
        Command::Shell { target } => commands::shell::run(&cli.config, &target),
    };

    if let Err(e) = result {
        e.exit();
    }
}
