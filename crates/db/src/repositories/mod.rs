//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Company scoping is explicit:
//! every lookup of a tenant-owned row takes the caller's `company_id`.

pub mod company_repo;
pub mod department_repo;
pub mod designation_repo;
pub mod document_submission_repo;
pub mod document_template_repo;
pub mod onboarding_session_repo;
pub mod onboarding_task_repo;
pub mod onboarding_template_repo;
pub mod timesheet_repo;
pub mod user_repo;

pub use company_repo::CompanyRepo;
pub use department_repo::DepartmentRepo;
pub use designation_repo::DesignationRepo;
pub use document_submission_repo::DocumentSubmissionRepo;
pub use document_template_repo::DocumentTemplateRepo;
pub use onboarding_session_repo::OnboardingSessionRepo;
pub use onboarding_task_repo::OnboardingTaskRepo;
pub use onboarding_template_repo::OnboardingTemplateRepo;
pub use timesheet_repo::TimesheetRepo;
pub use user_repo::UserRepo;
