//! Workflow engines driven by the HTTP handlers.
//!
//! Engines borrow their collaborators (pool, storage, notifier, clock) from
//! [`AppState`](crate::state::AppState) per request, so tests can build them
//! over fakes.

pub mod onboarding;
pub mod provisioning;
pub mod timesheet;

pub use onboarding::OnboardingEngine;
pub use timesheet::TimesheetEngine;
