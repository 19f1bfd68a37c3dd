//! Row models and DTOs, one module per table family.

pub mod company;
pub mod department;
pub mod designation;
pub mod document_submission;
pub mod document_template;
pub mod onboarding_session;
pub mod onboarding_task;
pub mod onboarding_template;
pub mod timesheet;
pub mod user;
