//! Frame-driven marker animation.
//!
//! An [`AnimationScheduler`] advances a marker along the active route's
//! quadratic curve. It never schedules itself: a frame loop owns the
//! recurrence and asks the scheduler for a pose once per frame, and the
//! scheduler only answers when it holds a pending tick.
//!
//! ```text
//!          start()                on_frame(ts)
//!   Idle ─────────► Running ◄──────────────┐
//!                     │  │   pose, reschedule
//!                     │  └─────────────────┘
//!            cancel() ▼
//!                 Cancelled   (terminal)
//! ```
//!
//! Progress loops: `((ts - start_ts) / duration) mod 1`. Restarting resets
//! `start_ts`, so progress restarts at 0 instead of resuming.

mod frames;
mod scheduler;

pub use frames::{run_frame_loop, FrameSource, IntervalFrameSource, ManualFrameSource};
pub use scheduler::{
    AnimationConfig, AnimationScheduler, MarkerPose, SchedulerState, DEFAULT_DURATION_MS,
    DEFAULT_FRAME_INTERVAL, DEFAULT_LOOKAHEAD,
};
