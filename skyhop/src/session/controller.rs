//! The map session controller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::error::SessionError;
use super::lock::OverlayLock;
use crate::animation::{
    self, AnimationConfig, AnimationScheduler, FrameSource, MarkerPose, SchedulerState,
};
use crate::geo::{GeoPoint, NamedPoint};
use crate::overlay::{
    DuplicatePolicy, OverlayId, OverlayLayerManager, OverlayNamespace, RouteStyle,
};
use crate::path::generate;
use crate::reconcile::{ApplyReport, RouteSetReconciler};
use crate::render::{RenderSurface, Subscription, SurfaceEvent, SurfaceEventKind};
use crate::route::{Route, RouteKey, RouteQuery, RouteStore};
use crate::timing::{
    compare_times, fetch_driving_estimate, DirectionsService, DrivingEstimate, SpeedProfile,
    TimeComparison,
};

/// Period of the public route refresh.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(10);

/// Session tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub animation: AnimationConfig,
    pub refresh_interval: Duration,
    /// Query used for every public route refresh.
    pub refresh_query: RouteQuery,
    pub speeds: SpeedProfile,
    pub duplicate_policy: DuplicatePolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            animation: AnimationConfig::default(),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            refresh_query: RouteQuery::recent(),
            speeds: SpeedProfile::default(),
            duplicate_policy: DuplicatePolicy::default(),
        }
    }
}

impl SessionConfig {
    pub fn with_animation(mut self, animation: AnimationConfig) -> Self {
        self.animation = animation;
        self
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn with_refresh_query(mut self, query: RouteQuery) -> Self {
        self.refresh_query = query;
        self
    }

    pub fn with_speeds(mut self, speeds: SpeedProfile) -> Self {
        self.speeds = speeds;
        self
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }
}

/// A planned and activated route with its time comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePlan {
    pub route: Route,
    pub comparison: TimeComparison,
}

/// What a refresh cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Public overlays were reconciled.
    Applied(ApplyReport),
    /// An active-route switch held the overlays; candidates were stored and
    /// are applied by the switch or the next cycle.
    Deferred,
}

/// The animated route and everything it owns.
struct ActiveRoute {
    route: Route,
    overlay: OverlayId,
    color: String,
    scheduler: AnimationScheduler,
    last_pose: Option<MarkerPose>,
}

/// Controller for one map view.
pub struct MapSession {
    surface: Arc<dyn RenderSurface>,
    store: Arc<dyn RouteStore>,
    directions: Option<Arc<dyn DirectionsService>>,
    config: SessionConfig,
    reconciler: RouteSetReconciler,
    overlays: Mutex<OverlayLayerManager>,
    // Lock order: `active` before `overlays`.
    active: Mutex<Option<ActiveRoute>>,
    candidates: RwLock<Vec<Route>>,
    subscriptions: Mutex<Vec<Subscription>>,
    overlay_lock: OverlayLock,
    token: CancellationToken,
    closed: AtomicBool,
}

impl MapSession {
    pub fn new(
        surface: Arc<dyn RenderSurface>,
        store: Arc<dyn RouteStore>,
        config: SessionConfig,
    ) -> Self {
        let overlays = OverlayLayerManager::with_policy(surface.clone(), config.duplicate_policy);
        Self {
            surface,
            store,
            directions: None,
            config,
            reconciler: RouteSetReconciler::new(),
            overlays: Mutex::new(overlays),
            active: Mutex::new(None),
            candidates: RwLock::new(Vec::new()),
            subscriptions: Mutex::new(Vec::new()),
            overlay_lock: OverlayLock::new(),
            token: CancellationToken::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Use `service` for driving directions.
    pub fn with_directions(mut self, service: Arc<dyn DirectionsService>) -> Self {
        self.directions = Some(service);
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Token cancelled when the session shuts down.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        if self.is_closed() {
            Err(SessionError::Closed)
        } else {
            Ok(())
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Inspection
    // ─────────────────────────────────────────────────────────────────────────

    pub fn active_route(&self) -> Option<Route> {
        self.active.lock().as_ref().map(|a| a.route.clone())
    }

    pub fn scheduler_state(&self) -> Option<SchedulerState> {
        self.active.lock().as_ref().map(|a| a.scheduler.state())
    }

    /// Animation ticks currently scheduled across the session.
    pub fn pending_ticks(&self) -> usize {
        self.active
            .lock()
            .as_ref()
            .map_or(0, |a| a.scheduler.pending_ticks())
    }

    /// Marker pose from the most recent frame of the active route.
    pub fn marker_pose(&self) -> Option<MarkerPose> {
        self.active.lock().as_ref().and_then(|a| a.last_pose)
    }

    /// Surface resources owned by all overlays.
    pub fn resource_count(&self) -> usize {
        self.overlays.lock().resource_count()
    }

    /// Keys of the public routes currently drawn, sorted.
    pub fn public_route_keys(&self) -> Vec<RouteKey> {
        let mut keys = self.overlays.lock().rendered_keys(OverlayNamespace::Public);
        keys.sort();
        keys
    }

    /// Routes from the last successful refresh.
    pub fn candidates(&self) -> Vec<Route> {
        self.candidates.read().clone()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Active route
    // ─────────────────────────────────────────────────────────────────────────

    /// Plan a route between two places and make it the active route.
    pub async fn plan_route(
        &self,
        from: NamedPoint,
        to: NamedPoint,
    ) -> Result<RoutePlan, SessionError> {
        self.ensure_open()?;
        from.validate()?;
        to.validate()?;

        let estimate = self.driving_estimate(from.point(), to.point()).await;
        let comparison = compare_times(
            from.point(),
            to.point(),
            self.config.speeds,
            estimate.as_ref(),
        );
        let route = Route::planned(from, to, comparison.flying_minutes);

        self.activate(route.clone(), estimate).await?;
        Ok(RoutePlan { route, comparison })
    }

    /// Make `route` the active route, replacing any previous one.
    pub async fn set_active_route(&self, route: Route) -> Result<TimeComparison, SessionError> {
        self.ensure_open()?;
        route.validate()?;

        let estimate = self.driving_estimate(route.start(), route.end()).await;
        let comparison = compare_times(
            route.start(),
            route.end(),
            self.config.speeds,
            estimate.as_ref(),
        );

        self.activate(route, estimate).await?;
        Ok(comparison)
    }

    /// Activate a route picked from the public list, counting the pick.
    pub async fn select_public_route(&self, route: Route) -> Result<TimeComparison, SessionError> {
        match self.store.record_selection(&route.id).await {
            Ok(popularity) => debug!(route = %route.id, popularity, "Selection recorded"),
            Err(e) => warn!(route = %route.id, error = %e, "Failed to record selection"),
        }
        self.set_active_route(route).await
    }

    /// Stop the animation and remove the active route's overlay.
    pub async fn clear_active_route(&self) -> Result<Option<Route>, SessionError> {
        let _guard = self.overlay_lock.acquire().await;
        self.ensure_open()?;

        let previous = self.clear_active_locked();
        self.reconcile_locked();
        Ok(previous)
    }

    async fn driving_estimate(
        &self,
        from: GeoPoint,
        to: GeoPoint,
    ) -> Option<DrivingEstimate> {
        fetch_driving_estimate(self.directions.as_deref(), from, to).await
    }

    async fn activate(
        &self,
        route: Route,
        estimate: Option<DrivingEstimate>,
    ) -> Result<(), SessionError> {
        let _guard = self.overlay_lock.acquire().await;
        self.ensure_open()?;

        // The previous route is fully gone before any new resource exists.
        self.clear_active_locked();

        let id = OverlayId::active(route.key());
        let style = RouteStyle::active();
        let path = generate(route.start(), route.end(), style.mode);
        {
            let mut overlays = self.overlays.lock();
            overlays.add_route(&id, &path, &style)?;

            let polyline = estimate.as_ref().map(|e| e.polyline.as_slice());
            if let Some(polyline) = polyline.filter(|p| !p.is_empty()) {
                if let Err(e) = overlays.add_driving_route(&id, polyline) {
                    warn!(route = %id, error = %e, "Driving route not drawn");
                }
            }
        }

        let mut scheduler = AnimationScheduler::new(
            route.start(),
            route.end(),
            self.config.animation.clone(),
            self.token.child_token(),
        );
        scheduler.start();

        info!(route = %id, name = %route, "Route activated");
        *self.active.lock() = Some(ActiveRoute {
            route,
            overlay: id,
            color: style.color,
            scheduler,
            last_pose: None,
        });

        // Twins of the new active route leave the public set.
        self.reconcile_locked();
        Ok(())
    }

    /// Cancel the scheduler and remove the active overlay.
    ///
    /// Caller holds the overlay lock.
    fn clear_active_locked(&self) -> Option<Route> {
        let mut previous = self.active.lock().take()?;
        previous.scheduler.cancel();

        match self.overlays.lock().remove_route(&previous.overlay) {
            Ok(_) => info!(route = %previous.overlay, "Active route cleared"),
            Err(e) => warn!(route = %previous.overlay, error = %e, "Active overlay removal failed"),
        }
        Some(previous.route)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Public routes
    // ─────────────────────────────────────────────────────────────────────────

    /// Refetch public routes and reconcile their overlays.
    ///
    /// A store failure leaves every drawn overlay untouched.
    pub async fn refresh_public_routes(&self) -> Result<RefreshOutcome, SessionError> {
        self.ensure_open()?;
        let routes = self.store.fetch(&self.config.refresh_query).await?;
        debug!(routes = routes.len(), "Public routes fetched");
        *self.candidates.write() = routes;

        let Some(_guard) = self.overlay_lock.try_acquire() else {
            debug!("Active route switch in progress, deferring public routes");
            return Ok(RefreshOutcome::Deferred);
        };
        self.ensure_open()?;

        Ok(RefreshOutcome::Applied(self.reconcile_locked()))
    }

    /// Reconcile public overlays against the stored candidates.
    ///
    /// Caller holds the overlay lock.
    fn reconcile_locked(&self) -> ApplyReport {
        let candidates = self.candidates.read().clone();
        let active = self.active_route();

        let mut overlays = self.overlays.lock();
        let rendered = overlays.rendered_keys(OverlayNamespace::Public);
        let plan = self
            .reconciler
            .reconcile(&candidates, active.as_ref(), &rendered);
        if plan.is_empty() {
            return ApplyReport::default();
        }

        let report = plan.apply(&mut overlays, &RouteStyle::public());
        debug!(
            added = report.added,
            removed = report.removed,
            failed = report.failed,
            "Public routes reconciled"
        );
        report
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Frame and surface events
    // ─────────────────────────────────────────────────────────────────────────

    /// Advance the active animation for frame timestamp `ts` (milliseconds).
    pub fn on_frame(&self, ts: f64) -> Option<MarkerPose> {
        let mut active = self.active.lock();
        let current = active.as_mut()?;
        let pose = current.scheduler.on_frame(ts)?;

        let overlays = self.overlays.lock();
        let updated = overlays
            .update_marker_pose(&current.overlay, pose.position, pose.bearing)
            .and_then(|()| overlays.update_progress(&current.overlay, pose.progress, &current.color));
        if let Err(e) = updated {
            debug!(route = %current.overlay, error = %e, "Active overlay gone, stopping animation");
            current.scheduler.cancel();
            return None;
        }
        current.last_pose = Some(pose);
        Some(pose)
    }

    /// Resize overlays for a new zoom level.
    pub fn on_zoom(&self, zoom: f64) {
        if let Err(e) = self.overlays.lock().apply_zoom(zoom) {
            warn!(zoom, error = %e, "Failed to resize overlays");
        }
    }

    /// Subscribe to the surface events the session reacts to.
    ///
    /// The subscriptions are released on shutdown.
    pub fn subscribe_events(&self) -> Result<mpsc::UnboundedReceiver<SurfaceEvent>, SessionError> {
        self.ensure_open()?;
        let (tx, rx) = mpsc::unbounded_channel();
        let style = Subscription::new(self.surface.clone(), SurfaceEventKind::StyleLoaded, tx.clone())?;
        let zoom = Subscription::new(self.surface.clone(), SurfaceEventKind::Zoom, tx)?;

        let mut subscriptions = self.subscriptions.lock();
        subscriptions.push(style);
        subscriptions.push(zoom);
        Ok(rx)
    }

    /// Handle one surface event.
    pub async fn handle_event(&self, event: SurfaceEvent) {
        match event {
            SurfaceEvent::StyleLoaded => {
                debug!("Map style loaded, refreshing public routes");
                if let Err(e) = self.refresh_public_routes().await {
                    warn!(error = %e, "Public route refresh failed, keeping current routes");
                }
            }
            SurfaceEvent::Zoom(zoom) => self.on_zoom(zoom),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Loops
    // ─────────────────────────────────────────────────────────────────────────

    /// Refresh public routes every `refresh_interval` until cancelled.
    pub async fn run_refresh_loop(&self, token: CancellationToken) {
        let mut ticker = time::interval(self.config.refresh_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            interval_ms = self.config.refresh_interval.as_millis() as u64,
            "Public route refresh started"
        );

        loop {
            tokio::select! {
                biased;

                _ = token.cancelled() => break,

                _ = ticker.tick() => {
                    match self.refresh_public_routes().await {
                        Ok(outcome) => debug!(?outcome, "Refresh cycle complete"),
                        Err(SessionError::Closed) => break,
                        Err(e) => warn!(error = %e, "Public route refresh failed, keeping current routes"),
                    }
                }
            }
        }

        info!("Public route refresh stopped");
    }

    /// Feed frames from `frames` to [`on_frame`](Self::on_frame) until cancelled.
    pub async fn run_frame_loop<S: FrameSource>(&self, frames: S, token: CancellationToken) -> u64 {
        animation::run_frame_loop(frames, token, |ts| {
            self.on_frame(ts);
        })
        .await
    }

    /// Dispatch surface events until cancelled or the channel closes.
    pub async fn run_event_loop(
        &self,
        mut events: mpsc::UnboundedReceiver<SurfaceEvent>,
        token: CancellationToken,
    ) {
        loop {
            tokio::select! {
                biased;

                _ = token.cancelled() => break,

                event = events.recv() => {
                    let Some(event) = event else { break };
                    self.handle_event(event).await;
                }
            }
        }
        debug!("Surface event loop stopped");
    }

    /// Run the refresh, frame and event loops until `token` or the session
    /// token is cancelled, then shut down.
    pub async fn run<S: FrameSource>(
        &self,
        frames: S,
        token: CancellationToken,
    ) -> Result<(), SessionError> {
        let events = self.subscribe_events()?;

        // Either token stops all three loops.
        let stop = self.token.child_token();
        let outer = token.clone();
        let stop_on_outer = {
            let stop = stop.clone();
            async move {
                tokio::select! {
                    _ = outer.cancelled() => stop.cancel(),
                    _ = stop.cancelled() => {}
                }
            }
        };

        let (_, _, frames_delivered, _) = tokio::join!(
            stop_on_outer,
            self.run_refresh_loop(stop.clone()),
            self.run_frame_loop(frames, stop.clone()),
            self.run_event_loop(events, stop.clone()),
        );

        info!(frames = frames_delivered, "Session loops stopped");
        self.shutdown().await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Teardown
    // ─────────────────────────────────────────────────────────────────────────

    /// Cancel all animation, remove every overlay and release subscriptions.
    ///
    /// Calling it again has no effect.
    pub async fn shutdown(&self) -> Result<(), SessionError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.token.cancel();

        let _guard = self.overlay_lock.acquire().await;
        self.teardown_locked()
    }

    fn teardown_locked(&self) -> Result<(), SessionError> {
        self.clear_active_locked();
        let removed = self.overlays.lock().remove_all();
        self.subscriptions.lock().clear();
        self.candidates.write().clear();

        let removed = removed?;
        info!(public_routes = removed, "Session shut down");
        Ok(())
    }
}

impl Drop for MapSession {
    fn drop(&mut self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        warn!("Session dropped without shutdown, releasing overlays");
        self.token.cancel();
        if let Err(e) = self.teardown_locked() {
            warn!(error = %e, "Teardown on drop incomplete");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{PaintValue, RecordingSurface};
    use crate::route::MemoryRouteStore;
    use crate::timing::{DirectionsError, DrivingSource, MockDirections};

    fn bengaluru() -> NamedPoint {
        NamedPoint::new("Bengaluru", 12.9716, 77.5946)
    }

    fn mumbai() -> NamedPoint {
        NamedPoint::new("Mumbai", 19.076, 72.8777)
    }

    fn session() -> (Arc<RecordingSurface>, Arc<MemoryRouteStore>, MapSession) {
        let surface = Arc::new(RecordingSurface::new());
        let store = Arc::new(MemoryRouteStore::new());
        let session = MapSession::new(
            surface.clone(),
            store.clone(),
            SessionConfig::default().with_duplicate_policy(DuplicatePolicy::Fail),
        );
        (surface, store, session)
    }

    #[tokio::test]
    async fn test_plan_route_activates_and_compares() {
        let (surface, _store, session) = session();

        let plan = session.plan_route(bengaluru(), mumbai()).await.unwrap();

        assert_eq!(plan.comparison.flying_minutes, 203);
        assert_eq!(plan.comparison.driving_source, DrivingSource::Estimate);
        assert_eq!(plan.route.duration_minutes, 203);
        assert_eq!(session.active_route(), Some(plan.route));
        assert_eq!(session.pending_ticks(), 1);
        assert_eq!(surface.marker_count(), 1);
    }

    #[tokio::test]
    async fn test_plan_route_rejects_invalid_point() {
        let (_surface, _store, session) = session();
        let result = session
            .plan_route(NamedPoint::new("Nowhere", 91.0, 0.0), mumbai())
            .await;
        assert!(matches!(result, Err(SessionError::InvalidRoute(_))));
        assert!(session.active_route().is_none());
    }

    #[tokio::test]
    async fn test_directions_polyline_drawn() {
        let (surface, _store, session) = session();
        let directions = MockDirections {
            response: Ok(DrivingEstimate {
                duration_minutes: Some(900),
                polyline: vec![GeoPoint::new(12.9716, 77.5946), GeoPoint::new(19.076, 72.8777)],
            }),
        };
        let session = session.with_directions(Arc::new(directions));

        let plan = session.plan_route(bengaluru(), mumbai()).await.unwrap();

        assert_eq!(plan.comparison.driving_minutes, 900);
        assert_eq!(plan.comparison.minutes_saved, 900 - 203);
        assert!(surface.layer_ids().iter().any(|l| l.ends_with("-driving")));
    }

    #[tokio::test]
    async fn test_directions_failure_falls_back() {
        let (surface, _store, session) = session();
        let session = session.with_directions(Arc::new(MockDirections {
            response: Err(DirectionsError::Status(503)),
        }));

        let plan = session.plan_route(bengaluru(), mumbai()).await.unwrap();

        assert_eq!(plan.comparison.driving_source, DrivingSource::Estimate);
        assert!(!surface.layer_ids().iter().any(|l| l.ends_with("-driving")));
    }

    #[tokio::test]
    async fn test_on_frame_moves_marker() {
        let (surface, _store, session) = session();
        session.plan_route(bengaluru(), mumbai()).await.unwrap();

        session.on_frame(0.0).unwrap();
        let pose = session.on_frame(5_000.0).unwrap();

        assert!((pose.progress - 0.5).abs() < 1e-12);
        let marker = surface.marker(surface.marker_ids()[0]).unwrap();
        assert_eq!(marker.position, pose.position);
        assert_eq!(marker.rotation, pose.bearing);
    }

    #[tokio::test]
    async fn test_on_frame_without_route_is_noop() {
        let (_surface, _store, session) = session();
        assert!(session.on_frame(0.0).is_none());
    }

    #[tokio::test]
    async fn test_clear_active_route() {
        let (surface, _store, session) = session();
        session.plan_route(bengaluru(), mumbai()).await.unwrap();

        let cleared = session.clear_active_route().await.unwrap();

        assert!(cleared.is_some());
        assert_eq!(surface.resource_count(), 0);
        assert_eq!(session.pending_ticks(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_closes_session() {
        let (surface, _store, session) = session();
        let _events = session.subscribe_events().unwrap();
        session.plan_route(bengaluru(), mumbai()).await.unwrap();

        session.shutdown().await.unwrap();
        session.shutdown().await.unwrap();

        assert!(session.is_closed());
        assert_eq!(surface.resource_count(), 0);
        assert_eq!(surface.subscriber_count(), 0);
        assert!(matches!(
            session.plan_route(bengaluru(), mumbai()).await,
            Err(SessionError::Closed)
        ));
    }

    #[tokio::test]
    async fn test_drop_releases_overlays() {
        let (surface, _store, session) = session();
        session.plan_route(bengaluru(), mumbai()).await.unwrap();

        drop(session);
        assert_eq!(surface.resource_count(), 0);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Overlay lock
    // ─────────────────────────────────────────────────────────────────────────

    fn public_pair() -> (Route, Route) {
        let a = Route::planned(
            NamedPoint::new("Koramangala", 12.9352, 77.6245),
            NamedPoint::new("Airport", 13.1986, 77.7066),
            8,
        );
        let b = Route::planned(
            NamedPoint::new("Whitefield", 12.9698, 77.75),
            NamedPoint::new("Hebbal", 13.0358, 77.597),
            6,
        );
        (a, b)
    }

    #[tokio::test]
    async fn test_refresh_deferred_while_switch_holds_overlays() {
        let (surface, store, session) = session();
        let (a, b) = public_pair();
        store.insert(a.clone());
        store.insert(b.clone());

        let guard = session.overlay_lock.try_acquire().unwrap();
        let outcome = session.refresh_public_routes().await.unwrap();

        assert_eq!(outcome, RefreshOutcome::Deferred);
        assert!(session.public_route_keys().is_empty());
        assert_eq!(surface.resource_count(), 0);
        assert_eq!(session.candidates().len(), 2);

        drop(guard);

        // The switch reconciles the stored candidates, minus the active twin.
        let twin = Route::planned(a.to.clone(), a.from.clone(), 8);
        session.set_active_route(twin).await.unwrap();
        assert_eq!(session.public_route_keys(), vec![b.key()]);
    }

    #[tokio::test]
    async fn test_deferred_candidates_applied_by_next_refresh() {
        let (_surface, store, session) = session();
        let (a, b) = public_pair();
        store.insert(a.clone());
        store.insert(b.clone());

        {
            let _guard = session.overlay_lock.try_acquire().unwrap();
            assert_eq!(
                session.refresh_public_routes().await.unwrap(),
                RefreshOutcome::Deferred
            );
        }

        let outcome = session.refresh_public_routes().await.unwrap();
        assert!(matches!(
            outcome,
            RefreshOutcome::Applied(report) if report.added == 2 && report.failed == 0
        ));
        let mut expected = vec![a.key(), b.key()];
        expected.sort();
        assert_eq!(session.public_route_keys(), expected);
    }

    #[tokio::test]
    async fn test_switch_waits_for_overlay_lock() {
        let (surface, _store, session) = session();
        let route = Route::planned(bengaluru(), mumbai(), 203);

        let guard = session.overlay_lock.try_acquire().unwrap();
        let waited = time::timeout(
            Duration::from_millis(50),
            session.set_active_route(route.clone()),
        )
        .await;
        assert!(waited.is_err());
        assert!(session.active_route().is_none());
        assert_eq!(surface.resource_count(), 0);

        drop(guard);
        session.set_active_route(route.clone()).await.unwrap();
        assert_eq!(session.active_route(), Some(route));
    }

    #[tokio::test]
    async fn test_zoom_event_resizes_active_route() {
        let (surface, _store, session) = session();
        let plan = session.plan_route(bengaluru(), mumbai()).await.unwrap();

        session.handle_event(SurfaceEvent::Zoom(4.0)).await;

        let id = OverlayId::active(plan.route.key());
        assert_eq!(
            surface.paint(&id.resource("line"), "line-width"),
            Some(PaintValue::Number(0.75))
        );
    }
}
