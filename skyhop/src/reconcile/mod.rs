//! Public route set reconciliation.
//!
//! Each refresh yields a fresh candidate list. The reconciler turns it into
//! the minimal diff against what is already drawn:
//!
//! ```text
//! candidates ──► drop invalid / repeated keys ──► drop active-route twins
//!                                                        │
//!                  rendered keys ──────────────► diff ◄──┘
//!                                                  │
//!                                 to_remove ◄──────┴──────► to_add
//! ```
//!
//! Consumers always apply removals before additions.

mod reconciler;

pub use reconciler::{
    is_active_twin, ApplyReport, ReconcilePlan, RouteSetReconciler, ENDPOINT_TOLERANCE_DEG,
};
