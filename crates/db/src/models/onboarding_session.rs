//! Onboarding session model and DTOs.
//!
//! One row per invited employee. The invitation token is never serialized.

use chrono::NaiveDate;
use hrflow_core::onboarding::OnboardingStatus;
use hrflow_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `onboarding_sessions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OnboardingSession {
    pub id: DbId,
    pub company_id: DbId,
    pub new_employee_email: String,
    #[serde(skip_serializing)]
    pub invitation_token: String,
    pub status: String,
    pub current_step: i32,
    pub expires_at: Timestamp,
    pub template_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub emp_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub user_role: Option<String>,
    pub designation_id: Option<DbId>,
    pub department_id: Option<DbId>,
    pub job_type: Option<String>,
    pub hiring_date: Option<NaiveDate>,
    pub report_to: Option<String>,
    pub grade: Option<String>,
    pub probation_period: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub marital_status: Option<String>,
    pub nationality: Option<String>,
    pub profile_picture_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl OnboardingSession {
    /// Parsed status. The column is CHECK-constrained, so this only fails on
    /// schema drift.
    pub fn status(&self) -> Result<OnboardingStatus, hrflow_core::error::CoreError> {
        OnboardingStatus::from_str_db(&self.status)
    }
}

/// Summary returned to the inviting admin and in the session list.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub id: DbId,
    pub company_id: DbId,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub status: String,
    pub current_step: i32,
    pub template_id: Option<DbId>,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}

impl From<&OnboardingSession> for SessionSummary {
    fn from(s: &OnboardingSession) -> Self {
        Self {
            id: s.id,
            company_id: s.company_id,
            email: s.new_employee_email.clone(),
            first_name: s.first_name.clone(),
            last_name: s.last_name.clone(),
            status: s.status.clone(),
            current_step: s.current_step,
            template_id: s.template_id,
            expires_at: s.expires_at,
            created_at: s.created_at,
        }
    }
}

/// DTO for inserting a new pending session.
#[derive(Debug, Clone)]
pub struct CreateOnboardingSession {
    pub company_id: DbId,
    pub new_employee_email: String,
    pub invitation_token: String,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
    pub template_id: Option<DbId>,
    pub emp_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub gender: String,
    pub user_role: String,
    pub designation_id: Option<DbId>,
    pub department_id: Option<DbId>,
    pub job_type: Option<String>,
    pub hiring_date: Option<NaiveDate>,
    pub report_to: Option<String>,
    pub grade: Option<String>,
    pub probation_period: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub marital_status: Option<String>,
    pub nationality: Option<String>,
    pub profile_picture_url: Option<String>,
}
