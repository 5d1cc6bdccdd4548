//! Mutual exclusion for overlay mutation sequences.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// Flag serialising overlay mutation sequences across await points.
///
/// Active-route switches wait for the flag; periodic refreshes only try it
/// and skip their cycle when it is taken.
#[derive(Debug, Default)]
pub struct OverlayLock {
    busy: AtomicBool,
    released: Notify,
}

impl OverlayLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the flag if it is free.
    pub fn try_acquire(&self) -> Option<OverlayGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| OverlayGuard { lock: self })
    }

    /// Wait until the flag is free and take it.
    pub async fn acquire(&self) -> OverlayGuard<'_> {
        loop {
            let notified = self.released.notified();
            tokio::pin!(notified);
            // Register before checking so a release in between is not missed.
            notified.as_mut().enable();

            if let Some(guard) = self.try_acquire() {
                return guard;
            }
            notified.await;
        }
    }

    pub fn is_locked(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Holds the [`OverlayLock`] until dropped.
#[derive(Debug)]
pub struct OverlayGuard<'a> {
    lock: &'a OverlayLock,
}

impl Drop for OverlayGuard<'_> {
    fn drop(&mut self) {
        self.lock.busy.store(false, Ordering::Release);
        self.lock.released.notify_waiters();
    }
}
