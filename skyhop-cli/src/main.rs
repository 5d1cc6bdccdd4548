//! Skyhop CLI - Command-line interface
//!
//! Plans short-hop air routes, compares them with driving, and runs headless
//! map sessions against an in-memory render surface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use skyhop::geo::NamedPoint;
use skyhop::logging::{self, LogOptions};

mod commands;
mod error;

use commands::config::ConfigCommands;
use commands::routes::RoutesCommands;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "skyhop", version, about = "Simulated short-hop aerial routes")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Also write daily rolling log files to this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Plan a route and compare flying with driving
    Plan {
        /// Departure as NAME:LAT,LNG (or LAT,LNG)
        #[arg(long)]
        from: NamedPoint,

        /// Arrival as NAME:LAT,LNG (or LAT,LNG)
        #[arg(long)]
        to: NamedPoint,

        /// Skip the directions service and estimate driving time
        #[arg(long)]
        no_directions: bool,
    },

    /// Run a headless map session
    Simulate {
        /// JSON file of public routes
        #[arg(long)]
        routes: Option<PathBuf>,

        /// Departure of the animated route (defaults to the top leaderboard route)
        #[arg(long, requires = "to")]
        from: Option<NamedPoint>,

        /// Arrival of the animated route
        #[arg(long, requires = "from")]
        to: Option<NamedPoint>,

        /// How long to run, in seconds
        #[arg(long, default_value_t = 30)]
        seconds: u64,

        /// Map zoom level to simulate
        #[arg(long)]
        zoom: Option<f64>,
    },

    /// Query a routes file
    Routes {
        #[command(subcommand)]
        command: RoutesCommands,
    },

    /// View or change configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    let mut log_options = LogOptions::default().with_verbose(cli.verbose);
    if let Some(dir) = &cli.log_dir {
        log_options = log_options.with_directory(dir);
    }
    let _log_guard = match logging::init(log_options) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: {}", e);
            None
        }
    };

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Plan {
            from,
            to,
            no_directions,
        } => commands::plan::run(commands::plan::PlanArgs {
            from,
            to,
            no_directions,
        }),
        Commands::Simulate {
            routes,
            from,
            to,
            seconds,
            zoom,
        } => commands::simulate::run(commands::simulate::SimulateArgs {
            routes,
            endpoints: from.zip(to),
            seconds,
            zoom,
        }),
        Commands::Routes { command } => commands::routes::run(command),
        Commands::Config { command } => commands::config::run(command),
    }
}
