//! Plan command - plan a route and print the time comparison.

use std::sync::Arc;

use skyhop::geo::NamedPoint;
use skyhop::render::RecordingSurface;
use skyhop::route::MemoryRouteStore;
use skyhop::session::MapSession;
use skyhop::timing::{DrivingSource, TimeComparison};

use super::{directions, load_config, runtime};
use crate::error::CliError;

/// Arguments for the plan command.
pub struct PlanArgs {
    pub from: NamedPoint,
    pub to: NamedPoint,
    pub no_directions: bool,
}

/// Run the plan command.
pub fn run(args: PlanArgs) -> Result<(), CliError> {
    args.from.validate()?;
    args.to.validate()?;

    let config = load_config()?;
    let surface = Arc::new(RecordingSurface::new());
    let store = Arc::new(MemoryRouteStore::new());
    let mut session = MapSession::new(surface, store, config.session_config());
    if let Some(service) = directions(&config, args.no_directions)? {
        session = session.with_directions(service);
    }

    let rt = runtime()?;
    let plan = rt.block_on(async {
        let plan = session.plan_route(args.from, args.to).await;
        session.shutdown().await?;
        plan
    })?;

    println!("Route: {}", plan.route);
    println!("========================================");
    println!();
    print_comparison(&plan.comparison);
    Ok(())
}

fn print_comparison(comparison: &TimeComparison) {
    let source = match comparison.driving_source {
        DrivingSource::Directions => "directions",
        DrivingSource::Estimate => "estimated",
    };

    println!("  Distance:  {} km", comparison.distance_km);
    println!("  Flying:    {}", format_minutes(i64::from(comparison.flying_minutes)));
    println!(
        "  Driving:   {} ({})",
        format_minutes(i64::from(comparison.driving_minutes)),
        source
    );
    if comparison.minutes_saved >= 0 {
        println!("  Saved:     {}", format_minutes(comparison.minutes_saved));
    } else {
        println!(
            "  Saved:     none (driving is {} faster)",
            format_minutes(-comparison.minutes_saved)
        );
    }
}

/// Format minutes as `Hh MMm`, or `Mm` under an hour.
pub fn format_minutes(minutes: i64) -> String {
    if minutes >= 60 {
        format!("{}h {:02}m", minutes / 60, minutes % 60)
    } else {
        format!("{}m", minutes)
    }
}
