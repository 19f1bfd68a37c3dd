//! Turning an activated onboarding session into a permanent user account.

use hrflow_core::error::CoreError;
use hrflow_core::roles;
use hrflow_core::types::DbId;
use hrflow_db::models::onboarding_session::OnboardingSession;
use hrflow_db::models::user::CreateUser;
use hrflow_db::repositories::{DepartmentRepo, DesignationRepo, UserRepo};
use sqlx::PgPool;

use crate::error::AppResult;

/// Copy the session's profile into a new, inactive user row.
///
/// The role falls back to `employee` when the invitation named none.
pub fn new_user_fields(session: &OnboardingSession, password_hash: String) -> CreateUser {
    CreateUser {
        company_id: session.company_id,
        email: session.new_employee_email.clone(),
        password_hash,
        role: session
            .user_role
            .clone()
            .filter(|r| roles::is_valid_role(r))
            .unwrap_or_else(|| roles::DEFAULT_ROLE.to_string()),
        is_active: false,
        emp_id: session.emp_id.clone(),
        first_name: session.first_name.clone(),
        last_name: session.last_name.clone(),
        phone: session.phone.clone(),
        gender: session.gender.clone(),
        department_id: session.department_id,
        designation_id: session.designation_id,
        job_type: session.job_type.clone(),
        hiring_date: session.hiring_date,
        report_to: session.report_to.clone(),
        grade: session.grade.clone(),
        probation_period: session.probation_period.clone(),
        date_of_birth: session.date_of_birth,
        marital_status: session.marital_status.clone(),
        nationality: session.nationality.clone(),
        profile_picture_url: session.profile_picture_url.clone(),
    }
}

/// Fail with `BadRequest` unless the referenced department and designation
/// exist in `company_id`.
pub async fn ensure_org_refs(
    pool: &PgPool,
    company_id: DbId,
    department_id: Option<DbId>,
    designation_id: Option<DbId>,
) -> AppResult<()> {
    if let Some(id) = department_id {
        if !DepartmentRepo::exists(pool, company_id, id).await? {
            return Err(CoreError::BadRequest(format!(
                "Department {id} does not exist in this company"
            ))
            .into());
        }
    }
    if let Some(id) = designation_id {
        if !DesignationRepo::exists(pool, company_id, id).await? {
            return Err(CoreError::BadRequest(format!(
                "Designation {id} does not exist in this company"
            ))
            .into());
        }
    }
    Ok(())
}

/// Validate and build the user a session provisions.
///
/// Does not insert: the insert happens inside the session's activation
/// transaction so it can only ever run once per session.
pub async fn create_user_from_session(
    pool: &PgPool,
    session: &OnboardingSession,
    password_hash: String,
) -> AppResult<CreateUser> {
    ensure_org_refs(
        pool,
        session.company_id,
        session.department_id,
        session.designation_id,
    )
    .await?;

    if UserRepo::find_by_email(pool, &session.new_employee_email)
        .await?
        .is_some()
    {
        return Err(CoreError::Conflict(format!(
            "A user with email {} is already registered",
            session.new_employee_email
        ))
        .into());
    }

    Ok(new_user_fields(session, password_hash))
}
