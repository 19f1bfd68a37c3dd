//! Domain logic for the HRFlow onboarding platform.
//!
//! Everything in this crate is free of I/O: status enums and their
//! transition rules, request field validation, template merge planning, and
//! the collaborator traits (storage, notification, clock) that the API layer
//! injects into its engines.

pub mod clock;
pub mod document;
pub mod error;
pub mod notification;
pub mod onboarding;
pub mod pagination;
pub mod roles;
pub mod storage;
pub mod templates;
pub mod timesheet;
pub mod types;
