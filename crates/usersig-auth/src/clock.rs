//! Issue-time source.

use crate::{Error, Result};
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of the issue time, in whole seconds since the Unix epoch.
pub trait Clock: Send + Sync {
    /// Current time, truncated to whole seconds.
    fn now_unix_secs(&self) -> Result<u64>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix_secs(&self) -> Result<u64> {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .map_err(|e| Error::Clock(e.to_string()))
    }
}

/// A clock pinned to one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now_unix_secs(&self) -> Result<u64> {
        Ok(self.0)
    }
}
