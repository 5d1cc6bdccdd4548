//! Routes commands - leaderboard and public wall from a routes file.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use skyhop::route::{
    leaderboard, public_wall, MemoryRouteStore, Route, DEFAULT_LEADERBOARD_SIZE,
    DEFAULT_WALL_SIZE,
};

use super::plan::format_minutes;
use super::{load_config, runtime};
use crate::error::CliError;

/// Routes subcommands.
#[derive(Debug, Subcommand)]
pub enum RoutesCommands {
    /// Most popular routes, or the most recent if none has been picked yet
    Leaderboard {
        /// JSON file of routes
        #[arg(long)]
        file: PathBuf,

        /// Number of routes to show
        #[arg(long, default_value_t = DEFAULT_LEADERBOARD_SIZE)]
        size: usize,
    },

    /// Most recent routes with their time savings
    Wall {
        /// JSON file of routes
        #[arg(long)]
        file: PathBuf,

        /// Number of routes to show
        #[arg(long, default_value_t = DEFAULT_WALL_SIZE)]
        size: usize,
    },
}

/// Run a routes subcommand.
pub fn run(command: RoutesCommands) -> Result<(), CliError> {
    match command {
        RoutesCommands::Leaderboard { file, size } => run_leaderboard(&file, size),
        RoutesCommands::Wall { file, size } => run_wall(&file, size),
    }
}

fn run_leaderboard(file: &Path, size: usize) -> Result<(), CliError> {
    let store = MemoryRouteStore::from_json_file(file)?;
    let routes = runtime()?.block_on(leaderboard(&store, size))?;

    println!("Leaderboard");
    println!("===========");
    if routes.is_empty() {
        println!("  (no routes)");
    }
    for (rank, route) in routes.iter().enumerate() {
        println!(
            "  {}. {:<40} {} picks",
            rank + 1,
            route.to_string(),
            route.popularity
        );
    }
    Ok(())
}

fn run_wall(file: &Path, size: usize) -> Result<(), CliError> {
    let config = load_config()?;
    let store = MemoryRouteStore::from_json_file(file)?;
    let entries = runtime()?.block_on(public_wall(&store, size, config.speed_profile()))?;

    println!("Recent Routes");
    println!("=============");
    if entries.is_empty() {
        println!("  (no routes)");
    }
    for entry in &entries {
        println!(
            "  {:<40} {:>5} km  saves {:>7}  ({})",
            entry.route.to_string(),
            entry.comparison.distance_km,
            format_minutes(entry.comparison.minutes_saved),
            created(&entry.route)
        );
    }
    Ok(())
}

fn created(route: &Route) -> String {
    route.created_at.format("%Y-%m-%d %H:%M").to_string()
}
