// src/clock.rs

//! Time source used for log file names and tailer timestamps.
//!
//! Components take an `Arc<dyn Clock>` instead of calling `Local::now()`
//! directly, so tests can pin the timestamp to a known value.

use std::fmt::Debug;

use chrono::{DateTime, Local};

/// Abstract wall clock.
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> DateTime<Local>;
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Clock that always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Local>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}
