//! Integration tests for the map session.
//!
//! These tests drive a complete `MapSession` against the in-memory render
//! surface and routes store:
//! - Active-route dedup against the refreshed public set
//! - Resource stability across repeated refresh cycles
//! - Failed refetches keeping the rendered state
//! - Route switching and teardown leaving nothing behind
//!
//! Run with: `cargo test --test session_integration`

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use tokio_util::sync::CancellationToken;

use skyhop::animation::{AnimationConfig, ManualFrameSource};
use skyhop::geo::NamedPoint;
use skyhop::overlay::{DuplicatePolicy, OverlayId};
use skyhop::render::{RecordingSurface, RenderSurface, SurfaceEvent};
use skyhop::route::{BoxFuture, MemoryRouteStore, Route, RouteQuery, RouteStore, StoreError};
use skyhop::session::{MapSession, RefreshOutcome, SessionConfig};

// ============================================================================
// Helper Functions
// ============================================================================

fn bengaluru() -> NamedPoint {
    NamedPoint::new("Bengaluru", 12.9716, 77.5946)
}

fn mumbai() -> NamedPoint {
    NamedPoint::new("Mumbai", 19.076, 72.8777)
}

fn delhi() -> NamedPoint {
    NamedPoint::new("Delhi", 28.6139, 77.209)
}

fn jaipur() -> NamedPoint {
    NamedPoint::new("Jaipur", 26.9124, 75.7873)
}

fn chennai() -> NamedPoint {
    NamedPoint::new("Chennai", 13.0827, 80.2707)
}

fn at(minutes: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_717_000_000 + minutes * 60, 0).unwrap()
}

fn route(id: &str, from: NamedPoint, to: NamedPoint, minutes: i64) -> Route {
    Route::planned_at(from, to, 30, at(minutes)).with_id(id)
}

/// Public routes: one twin of Bengaluru → Mumbai in each direction plus two
/// unrelated routes.
fn public_routes() -> Vec<Route> {
    vec![
        route("r1", bengaluru(), mumbai(), 1),
        route("r2", mumbai(), bengaluru(), 2),
        route("r3", delhi(), jaipur(), 3),
        route("r4", chennai(), bengaluru(), 4),
    ]
}

/// Routes store that can be switched into failing.
struct FlakyStore {
    inner: MemoryRouteStore,
    failing: AtomicBool,
}

impl FlakyStore {
    fn new(routes: Vec<Route>) -> Self {
        Self {
            inner: MemoryRouteStore::with_routes(routes),
            failing: AtomicBool::new(false),
        }
    }

    fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl RouteStore for FlakyStore {
    fn fetch(&self, query: &RouteQuery) -> BoxFuture<'_, Result<Vec<Route>, StoreError>> {
        if self.failing.load(Ordering::SeqCst) {
            return Box::pin(async { Err(StoreError::Unavailable("connection reset".into())) });
        }
        self.inner.fetch(query)
    }

    fn record_selection(&self, id: &str) -> BoxFuture<'_, Result<u32, StoreError>> {
        self.inner.record_selection(id)
    }
}

struct Harness {
    surface: Arc<RecordingSurface>,
    store: Arc<FlakyStore>,
    session: MapSession,
}

fn harness(routes: Vec<Route>) -> Harness {
    let surface = Arc::new(RecordingSurface::new());
    let store = Arc::new(FlakyStore::new(routes));
    let session = MapSession::new(
        surface.clone(),
        store.clone(),
        SessionConfig::default()
            .with_duplicate_policy(DuplicatePolicy::Fail)
            .with_refresh_interval(Duration::from_secs(10)),
    );
    Harness {
        surface,
        store,
        session,
    }
}

fn applied(outcome: RefreshOutcome) -> bool {
    matches!(outcome, RefreshOutcome::Applied(report) if report.failed == 0)
}

// ============================================================================
// Dedup and reconciliation
// ============================================================================

#[tokio::test]
async fn test_active_route_twins_not_drawn_as_public() {
    let h = harness(public_routes());

    h.session.plan_route(bengaluru(), mumbai()).await.unwrap();
    let outcome = h.session.refresh_public_routes().await.unwrap();
    assert!(applied(outcome));

    let expected = {
        let mut keys = vec![public_routes()[2].key(), public_routes()[3].key()];
        keys.sort();
        keys
    };
    assert_eq!(h.session.public_route_keys(), expected);
}

#[tokio::test]
async fn test_activation_removes_existing_public_twin() {
    let h = harness(public_routes());
    h.session.refresh_public_routes().await.unwrap();
    assert_eq!(h.session.public_route_keys().len(), 4);

    h.session.plan_route(mumbai(), bengaluru()).await.unwrap();

    assert_eq!(h.session.public_route_keys().len(), 2);
}

#[tokio::test]
async fn test_clearing_active_route_restores_public_twins() {
    let h = harness(public_routes());
    h.session.plan_route(bengaluru(), mumbai()).await.unwrap();
    h.session.refresh_public_routes().await.unwrap();

    h.session.clear_active_route().await.unwrap();

    assert_eq!(h.session.public_route_keys().len(), 4);
}

#[tokio::test]
async fn test_ten_refresh_cycles_do_not_leak() {
    let h = harness(public_routes());
    h.session.plan_route(bengaluru(), mumbai()).await.unwrap();

    h.session.refresh_public_routes().await.unwrap();
    let after_first = h.surface.resource_count();
    let owned_after_first = h.session.resource_count();

    for _ in 0..10 {
        h.session.refresh_public_routes().await.unwrap();
        assert_eq!(h.surface.resource_count(), after_first);
    }
    assert_eq!(h.session.resource_count(), owned_after_first);
    assert_eq!(owned_after_first, after_first);
}

#[tokio::test]
async fn test_new_public_route_added_on_next_refresh() {
    let h = harness(public_routes());
    h.session.refresh_public_routes().await.unwrap();

    h.store
        .inner
        .insert(route("r5", jaipur(), delhi(), 5));
    h.session.refresh_public_routes().await.unwrap();

    assert_eq!(h.session.public_route_keys().len(), 5);
}

#[tokio::test]
async fn test_failed_refetch_keeps_rendered_state() {
    let h = harness(public_routes());
    h.session.refresh_public_routes().await.unwrap();
    let keys = h.session.public_route_keys();
    let resources = h.surface.resource_count();

    h.store.set_failing(true);
    assert!(h.session.refresh_public_routes().await.is_err());

    assert_eq!(h.session.public_route_keys(), keys);
    assert_eq!(h.surface.resource_count(), resources);

    h.store.set_failing(false);
    assert!(applied(h.session.refresh_public_routes().await.unwrap()));
    assert_eq!(h.session.public_route_keys(), keys);
}

// ============================================================================
// Active route switching
// ============================================================================

#[tokio::test]
async fn test_switching_routes_leaves_no_stale_resources() {
    let h = harness(Vec::new());

    let first = h.session.plan_route(bengaluru(), mumbai()).await.unwrap();
    let second = h.session.plan_route(delhi(), jaipur()).await.unwrap();

    let old = OverlayId::active(first.route.key());
    let new = OverlayId::active(second.route.key());
    assert!(!h.surface.has_layer(&old.resource("line")));
    assert!(!h.surface.has_source(&old.resource("line-source")));
    assert!(h.surface.has_layer(&new.resource("line")));
    assert_eq!(h.surface.marker_count(), 1);
    assert_eq!(h.session.pending_ticks(), 1);
    assert_eq!(h.session.active_route(), Some(second.route));
}

#[tokio::test]
async fn test_reactivating_same_route_keeps_single_tick() {
    let h = harness(Vec::new());
    let route = route("r1", bengaluru(), mumbai(), 1);

    h.session.set_active_route(route.clone()).await.unwrap();
    h.session.on_frame(0.0);
    h.session.set_active_route(route).await.unwrap();

    assert_eq!(h.session.pending_ticks(), 1);
    assert_eq!(h.surface.marker_count(), 1);
    // Progress restarts rather than resuming.
    let pose = h.session.on_frame(7_000.0).unwrap();
    assert_eq!(pose.progress, 0.0);
}

#[tokio::test]
async fn test_select_public_route_counts_pick() {
    let h = harness(public_routes());
    let picked = public_routes()[2].clone();

    h.session.select_public_route(picked.clone()).await.unwrap();

    let popular = h
        .store
        .fetch(&RouteQuery::popular().with_popularity_above(0))
        .await
        .unwrap();
    assert_eq!(popular.len(), 1);
    assert_eq!(popular[0].id, picked.id);
    assert_eq!(popular[0].popularity, 1);
}

#[tokio::test]
async fn test_clear_twice_is_idempotent() {
    let h = harness(public_routes());
    h.session.plan_route(bengaluru(), mumbai()).await.unwrap();

    assert!(h.session.clear_active_route().await.unwrap().is_some());
    let ops = h.surface.operations();
    let resources = h.surface.resource_count();

    assert!(h.session.clear_active_route().await.unwrap().is_none());
    assert_eq!(h.surface.operations(), ops);
    assert_eq!(h.surface.resource_count(), resources);
}

// ============================================================================
// Loops and teardown
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_run_animates_and_tears_down() {
    let surface = Arc::new(RecordingSurface::new());
    let store = Arc::new(MemoryRouteStore::with_routes(public_routes()));
    let session = MapSession::new(
        surface.clone(),
        store,
        SessionConfig::default()
            .with_animation(AnimationConfig::default().with_duration_ms(10_000.0)),
    );
    session.plan_route(bengaluru(), mumbai()).await.unwrap();

    let (frames_tx, frames) = ManualFrameSource::channel();
    let token = CancellationToken::new();

    let driver = async {
        frames_tx.send(1_000.0).unwrap();
        frames_tx.send(3_500.0).unwrap();
        for _ in 0..100 {
            tokio::task::yield_now().await;
            let progressed = session
                .marker_pose()
                .is_some_and(|pose| (pose.progress - 0.25).abs() < 1e-9);
            if progressed && !session.public_route_keys().is_empty() {
                break;
            }
        }
        assert_eq!(surface.emit(SurfaceEvent::Zoom(4.0)), 1);
        tokio::task::yield_now().await;

        let pose = session.marker_pose().unwrap();
        assert!((pose.progress - 0.25).abs() < 1e-9);
        assert_eq!(session.public_route_keys().len(), 2);
        token.cancel();
    };

    let (result, ()) = tokio::join!(session.run(frames, token.clone()), driver);
    result.unwrap();

    assert!(session.is_closed());
    assert_eq!(surface.resource_count(), 0);
    assert_eq!(surface.subscriber_count(), 0);
    assert_eq!(session.pending_ticks(), 0);
}

#[tokio::test]
async fn test_shutdown_removes_everything() {
    let h = harness(public_routes());
    let _events = h.session.subscribe_events().unwrap();
    h.session.plan_route(delhi(), chennai()).await.unwrap();
    h.session.refresh_public_routes().await.unwrap();
    assert!(h.surface.resource_count() > 0);

    h.session.shutdown().await.unwrap();

    assert_eq!(h.surface.resource_count(), 0);
    assert_eq!(h.surface.subscriber_count(), 0);
    assert!(h.session.active_route().is_none());
    assert!(h.session.refresh_public_routes().await.is_err());
}

#[tokio::test]
async fn test_frames_after_shutdown_do_nothing() {
    let h = harness(Vec::new());
    h.session.plan_route(bengaluru(), mumbai()).await.unwrap();
    h.session.shutdown().await.unwrap();

    assert!(h.session.on_frame(100.0).is_none());
    assert_eq!(h.surface.marker_count(), 0);
}
