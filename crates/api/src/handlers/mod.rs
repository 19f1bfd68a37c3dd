//! Request handlers, one submodule per resource.
//!
//! Handlers extract the caller via [`crate::middleware`], delegate to a
//! repository in `hrflow_db` or to an [`crate::engine`] for multi-step
//! workflows, and map errors via [`crate::error::AppError`].

pub mod auth;
pub mod departments;
pub mod designations;
pub mod document_templates;
pub mod employees;
pub mod onboarding;
pub mod onboarding_templates;
pub mod timesheets;
