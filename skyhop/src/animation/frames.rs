//! Frame sources and the frame loop.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::route::BoxFuture;

/// Produces frame timestamps in milliseconds.
pub trait FrameSource: Send {
    /// Wait for the next frame. `None` means no more frames will come.
    fn next_frame(&mut self) -> BoxFuture<'_, Option<f64>>;
}

/// Frames from a fixed-period tokio interval.
///
/// Timestamps are milliseconds since the source was created. Missed frames
/// are skipped rather than replayed in a burst.
pub struct IntervalFrameSource {
    interval: Interval,
    origin: Instant,
}

impl IntervalFrameSource {
    pub fn new(period: Duration) -> Self {
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self {
            interval,
            origin: Instant::now(),
        }
    }
}

impl FrameSource for IntervalFrameSource {
    fn next_frame(&mut self) -> BoxFuture<'_, Option<f64>> {
        Box::pin(async move {
            let tick = self.interval.tick().await;
            Some(tick.duration_since(self.origin).as_secs_f64() * 1000.0)
        })
    }
}

/// Frames pushed by hand through a channel.
pub struct ManualFrameSource {
    rx: mpsc::UnboundedReceiver<f64>,
}

impl ManualFrameSource {
    /// Create a source and the sender that feeds it.
    pub fn channel() -> (mpsc::UnboundedSender<f64>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { rx })
    }
}

impl FrameSource for ManualFrameSource {
    fn next_frame(&mut self) -> BoxFuture<'_, Option<f64>> {
        Box::pin(self.rx.recv())
    }
}

/// Drive `on_frame` once per frame until cancelled or the source ends.
///
/// Returns the number of frames delivered.
pub async fn run_frame_loop<S, F>(mut frames: S, token: CancellationToken, mut on_frame: F) -> u64
where
    S: FrameSource,
    F: FnMut(f64) + Send,
{
    let mut delivered = 0u64;

    loop {
        tokio::select! {
            biased;

            _ = token.cancelled() => break,

            frame = frames.next_frame() => {
                let Some(ts) = frame else { break };
                on_frame(ts);
                delivered += 1;
            }
        }
    }

    debug!(frames = delivered, "Frame loop stopped");
    delivered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_manual_source_ends_when_sender_dropped() {
        let (tx, frames) = ManualFrameSource::channel();
        tx.send(0.0).unwrap();
        tx.send(16.0).unwrap();
        drop(tx);

        let mut seen = Vec::new();
        let count = run_frame_loop(frames, CancellationToken::new(), |ts| seen.push(ts)).await;

        assert_eq!(count, 2);
        assert_eq!(seen, vec![0.0, 16.0]);
    }

    #[tokio::test]
    async fn test_cancelled_loop_delivers_nothing() {
        let (tx, frames) = ManualFrameSource::channel();
        tx.send(0.0).unwrap();
        let token = CancellationToken::new();
        token.cancel();

        let count = run_frame_loop(frames, token, |_| {}).await;
        assert_eq!(count, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_source_timestamps_increase() {
        let mut frames = IntervalFrameSource::new(Duration::from_millis(16));
        let first = frames.next_frame().await.unwrap();
        let second = frames.next_frame().await.unwrap();
        assert_eq!(first, 0.0);
        assert!((second - 16.0).abs() < 1e-9);
    }
}
