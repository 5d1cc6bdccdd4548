//! Animation scheduler state machine.

use std::fmt;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::geo::{bearing, GeoPoint};
use crate::path::QuadraticCurve;

/// Time for one full pass along the route, in milliseconds.
pub const DEFAULT_DURATION_MS: f64 = 10_000.0;

/// Progress offset of the point used to orient the marker.
pub const DEFAULT_LOOKAHEAD: f64 = 0.01;

/// Frame period of the built-in frame source (~60 Hz).
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Animation timing parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationConfig {
    pub duration_ms: f64,
    pub lookahead: f64,
    pub frame_interval: Duration,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration_ms: DEFAULT_DURATION_MS,
            lookahead: DEFAULT_LOOKAHEAD,
            frame_interval: DEFAULT_FRAME_INTERVAL,
        }
    }
}

impl AnimationConfig {
    pub fn with_duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn with_lookahead(mut self, lookahead: f64) -> Self {
        self.lookahead = lookahead;
        self
    }

    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }
}

/// Lifecycle state of a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Created, never started.
    Idle,
    /// Producing poses.
    Running,
    /// Stopped for good.
    Cancelled,
}

impl SchedulerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchedulerState::Idle => "idle",
            SchedulerState::Running => "running",
            SchedulerState::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Marker placement for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerPose {
    pub position: GeoPoint,
    /// Heading in degrees, `[0, 360)`.
    pub bearing: f64,
    /// Progress along the route, `[0, 1)`.
    pub progress: f64,
}

/// Advances a marker along one route.
///
/// Holds at most one pending tick. Each [`on_frame`](Self::on_frame) consumes
/// it and, unless the scheduler was cancelled meanwhile, arms the next one.
pub struct AnimationScheduler {
    curve: QuadraticCurve,
    config: AnimationConfig,
    state: SchedulerState,
    start_ts: Option<f64>,
    pending: bool,
    token: CancellationToken,
}

impl AnimationScheduler {
    /// Scheduler for the curve from `start` to `end`.
    ///
    /// `token` is usually a child of the owning session's token, so
    /// cancelling the session stops every scheduler it created.
    pub fn new(
        start: GeoPoint,
        end: GeoPoint,
        config: AnimationConfig,
        token: CancellationToken,
    ) -> Self {
        Self {
            curve: QuadraticCurve::between(start, end),
            config,
            state: SchedulerState::Idle,
            start_ts: None,
            pending: false,
            token,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    /// Number of scheduled ticks, 0 or 1.
    pub fn pending_ticks(&self) -> usize {
        usize::from(self.pending)
    }

    pub fn is_cancelled(&self) -> bool {
        self.state == SchedulerState::Cancelled || self.token.is_cancelled()
    }

    /// Start, or restart from progress 0.
    ///
    /// A pending tick from an earlier start is dropped first. Returns `false`
    /// if the scheduler was already cancelled.
    pub fn start(&mut self) -> bool {
        if self.is_cancelled() {
            self.mark_cancelled();
            debug!("Start ignored, scheduler cancelled");
            return false;
        }
        if self.pending {
            warn!("Scheduler restarted while running; dropping pending tick");
            self.pending = false;
        }
        self.start_ts = None;
        self.pending = true;
        self.state = SchedulerState::Running;
        true
    }

    /// Stop for good. Calling it again has no effect.
    pub fn cancel(&mut self) {
        if self.state == SchedulerState::Cancelled {
            return;
        }
        self.token.cancel();
        self.mark_cancelled();
        debug!("Scheduler cancelled");
    }

    fn mark_cancelled(&mut self) {
        self.pending = false;
        self.state = SchedulerState::Cancelled;
    }

    /// Run the pending tick for frame timestamp `ts` (milliseconds).
    ///
    /// Returns `None` when no tick is pending or the scheduler was cancelled.
    pub fn on_frame(&mut self, ts: f64) -> Option<MarkerPose> {
        if self.token.is_cancelled() {
            self.mark_cancelled();
            return None;
        }
        if !self.pending {
            return None;
        }
        self.pending = false;

        let start = *self.start_ts.get_or_insert(ts);
        let progress = self.progress_at(ts - start);
        let position = self.curve.point_at(progress);
        let ahead = self
            .curve
            .point_at((progress + self.config.lookahead).min(1.0));
        let pose = MarkerPose {
            position,
            bearing: bearing(position, ahead),
            progress,
        };

        // Checked again: the token may be cancelled from another owner.
        if !self.token.is_cancelled() {
            self.pending = true;
        }
        Some(pose)
    }

    fn progress_at(&self, elapsed_ms: f64) -> f64 {
        if !elapsed_ms.is_finite() || elapsed_ms <= 0.0 || self.config.duration_ms <= 0.0 {
            return 0.0;
        }
        (elapsed_ms / self.config.duration_ms).rem_euclid(1.0)
    }
}

impl fmt::Debug for AnimationScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationScheduler")
            .field("state", &self.state)
            .field("start_ts", &self.start_ts)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}
