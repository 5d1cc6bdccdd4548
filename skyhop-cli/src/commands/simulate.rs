//! Simulate command - run a headless map session.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use skyhop::animation::IntervalFrameSource;
use skyhop::geo::NamedPoint;
use skyhop::render::RecordingSurface;
use skyhop::route::{leaderboard, MemoryRouteStore, DEFAULT_LEADERBOARD_SIZE};
use skyhop::session::MapSession;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::{directions, load_config, runtime};
use crate::error::CliError;

/// How often the status line is printed.
const STATUS_INTERVAL: Duration = Duration::from_secs(1);

/// Arguments for the simulate command.
pub struct SimulateArgs {
    pub routes: Option<PathBuf>,
    /// Animated route endpoints; the top leaderboard route when absent.
    pub endpoints: Option<(NamedPoint, NamedPoint)>,
    pub seconds: u64,
    pub zoom: Option<f64>,
}

/// Run the simulate command.
pub fn run(args: SimulateArgs) -> Result<(), CliError> {
    let SimulateArgs {
        routes,
        endpoints,
        seconds,
        zoom,
    } = args;

    let config = load_config()?;
    let store = Arc::new(match &routes {
        Some(path) => MemoryRouteStore::from_json_file(path)?,
        None => MemoryRouteStore::new(),
    });
    let surface = Arc::new(RecordingSurface::new());

    let mut session = MapSession::new(surface.clone(), store.clone(), config.session_config());
    if let Some(service) = directions(&config, false)? {
        session = session.with_directions(service);
    }
    let session = Arc::new(session);

    let token = CancellationToken::new();
    let ctrlc_token = token.clone();
    ctrlc::set_handler(move || {
        println!();
        println!("Received shutdown signal, stopping session...");
        ctrlc_token.cancel();
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    println!("Skyhop Headless Session v{}", skyhop::VERSION);
    println!("==============================");
    println!();
    println!("Public routes: {}", store.len());
    println!("Duration:      {}s", seconds);
    println!();

    let rt = runtime()?;
    rt.block_on(async {
        if let Err(e) = session.refresh_public_routes().await {
            warn!(error = %e, "Initial public route refresh failed");
        }

        match endpoints {
            Some((from, to)) => {
                let plan = session.plan_route(from, to).await?;
                println!(
                    "Active route: {} ({} min flying, {} min driving)",
                    plan.route, plan.comparison.flying_minutes, plan.comparison.driving_minutes
                );
            }
            None => match leaderboard(store.as_ref(), DEFAULT_LEADERBOARD_SIZE).await?.first() {
                Some(route) => {
                    println!("Active route: {}", route);
                    session.select_public_route(route.clone()).await?;
                }
                None => println!("Active route: none (no routes loaded)"),
            },
        }
        if let Some(zoom) = zoom {
            session.on_zoom(zoom);
        }
        println!();

        let frames = IntervalFrameSource::new(session.config().animation.frame_interval);
        let deadline = {
            let token = token.clone();
            async move {
                tokio::select! {
                    _ = token.cancelled() => {}
                    _ = tokio::time::sleep(Duration::from_secs(seconds)) => token.cancel(),
                }
            }
        };

        let (result, _, _) = tokio::join!(
            session.run(frames, token.clone()),
            deadline,
            print_status(&session, &surface, token.clone()),
        );
        result.map_err(CliError::from)
    })?;

    println!();
    println!("Session closed; {} surface resources remaining.", surface.resource_count());
    Ok(())
}

async fn print_status(session: &MapSession, surface: &RecordingSurface, token: CancellationToken) {
    let mut ticker = tokio::time::interval(STATUS_INTERVAL);
    let mut elapsed = 0u64;
    loop {
        tokio::select! {
            biased;

            _ = token.cancelled() => break,

            _ = ticker.tick() => {
                match session.marker_pose() {
                    Some(pose) => println!(
                        "[{:>3}s] progress {:>5.1}%  at {}  heading {:>5.1}°  | public {}  resources {}",
                        elapsed,
                        pose.progress * 100.0,
                        pose.position,
                        pose.bearing,
                        session.public_route_keys().len(),
                        surface.resource_count()
                    ),
                    None => println!(
                        "[{:>3}s] idle  | public {}  resources {}",
                        elapsed,
                        session.public_route_keys().len(),
                        surface.resource_count()
                    ),
                }
                elapsed += STATUS_INTERVAL.as_secs();
            }
        }
    }
}
