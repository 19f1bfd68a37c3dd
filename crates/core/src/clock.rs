//! Injectable time source.
//!
//! Invitation expiry and default timesheet periods depend on "now"; engines
//! take a [`Clock`] so tests can pin it.

use crate::types::Timestamp;

pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;

    fn today(&self) -> chrono::NaiveDate {
        self.now().date_naive()
    }
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        chrono::Utc::now()
    }
}
