//! Injectable clock and scheduler.
//!
//! Every time-dependent component (history debounce, job polling) reads time
//! and suspends through a [`Clock`]. Production code uses [`SystemClock`];
//! tests use [`ManualClock`], whose `sleep` advances virtual time instantly so
//! a 60-second polling budget runs in microseconds.

use async_trait::async_trait;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Source of wall-clock time and cooperative delays.
#[async_trait]
pub trait Clock: Send + Sync + fmt::Debug {
    /// Milliseconds since an arbitrary, fixed epoch.
    fn now_ms(&self) -> u64;

    /// Suspend the calling task for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Real time backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        chrono::Utc::now().timestamp_millis().max(0) as u64
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Virtual time for deterministic tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicU64,
    sleeps: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(now_ms: u64) -> Self {
        Self {
            now_ms: AtomicU64::new(now_ms),
            sleeps: AtomicU64::new(0),
        }
    }

    /// Move virtual time forward.
    pub fn advance(&self, duration: Duration) {
        self.now_ms
            .fetch_add(duration.as_millis() as u64, Ordering::SeqCst);
    }

    /// Number of completed `sleep` calls.
    pub fn sleep_count(&self) -> u64 {
        self.sleeps.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }

    async fn sleep(&self, duration: Duration) {
        self.advance(duration);
        self.sleeps.fetch_add(1, Ordering::SeqCst);
        // Give other tasks on the runtime a chance to observe the new time.
        tokio::task::yield_now().await;
    }
}
