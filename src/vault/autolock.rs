//! Inactivity auto-lock timer.
//!
//! One cancellable one-shot task per engine instance.  Re-arming aborts
//! the pending task and starts a new one, so the lock fires only after a
//! full quiet window.  Each arm bumps a generation counter that the fire
//! callback receives; the engine compares it under its own mutex before
//! locking, which closes the gap between "timer woke up" and "activity
//! re-armed it while the timer waited for the mutex".

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::trace;

/// Default inactivity window (5 minutes).
pub const DEFAULT_AUTO_LOCK: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Default)]
pub struct AutoLockTimer {
    task: Option<JoinHandle<()>>,
    generation: u64,
}

impl AutoLockTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel any pending timer and schedule `on_fire` after `window`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn arm<F, Fut>(&mut self, window: Duration, on_fire: F)
    where
        F: FnOnce(u64) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.disarm();
        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;

        self.task = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            on_fire(generation).await;
        }));
        trace!(generation, ?window, "auto-lock timer armed");
    }

    /// Cancel the pending timer, if any.
    pub fn disarm(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            trace!(generation = self.generation, "auto-lock timer disarmed");
        }
        // Invalidate a callback that already woke up but has not been
        // accepted yet.
        self.generation = self.generation.wrapping_add(1);
    }

    /// Called by the fire callback.  Returns `true` when `generation` is
    /// still current, and detaches the task so the lock it is about to
    /// perform is not aborted by a later `disarm`.
    pub fn accept_fire(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        // Dropping a JoinHandle detaches the task without cancelling it.
        self.task = None;
        true
    }

    /// `true` while a timer is pending.
    pub fn is_armed(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for AutoLockTimer {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn fires_after_window() {
        let fired = Arc::new(AtomicU64::new(0));
        let mut timer = AutoLockTimer::new();

        let seen = fired.clone();
        timer.arm(Duration::from_millis(20), move |generation| async move {
            seen.store(generation, Ordering::SeqCst);
        });
        assert!(timer.is_armed());

        tokio::time::sleep(Duration::from_millis(150)).await;
        let generation = fired.load(Ordering::SeqCst);
        assert_ne!(generation, 0);
        assert!(timer.accept_fire(generation));
    }

    #[tokio::test]
    async fn disarm_prevents_fire() {
        let fired = Arc::new(AtomicU64::new(0));
        let mut timer = AutoLockTimer::new();

        let seen = fired.clone();
        timer.arm(Duration::from_millis(20), move |generation| async move {
            seen.store(generation, Ordering::SeqCst);
        });
        timer.disarm();
        assert!(!timer.is_armed());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rearm_invalidates_previous_generation() {
        let mut timer = AutoLockTimer::new();
        timer.arm(Duration::from_secs(60), |_| async {});
        let first = timer.generation;
        timer.arm(Duration::from_secs(60), |_| async {});

        assert!(!timer.accept_fire(first));
        assert!(timer.accept_fire(timer.generation));
    }
}
