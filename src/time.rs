//! Time abstraction for testability.
//!
//! This module provides a [`Clock`] trait that allows injecting mock
//! clocks in tests while using the real system clock in production.
//! Monotonic staleness arithmetic uses `tokio::time::Instant` (paused in
//! tests); this trait covers wall-clock timestamps shown to consumers.

use std::time::SystemTime;

/// Abstraction over system time for testability.
pub trait Clock: Send + Sync {
    /// Returns the current wall-clock time.
    fn now(&self) -> SystemTime;
}

/// Production clock using actual system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}
