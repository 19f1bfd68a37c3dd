//! User entity model and DTOs.

use chrono::NaiveDate;
use hrflow_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub company_id: DbId,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
    pub emp_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub department_id: Option<DbId>,
    pub designation_id: Option<DbId>,
    pub job_type: Option<String>,
    pub hiring_date: Option<NaiveDate>,
    pub report_to: Option<String>,
    pub grade: Option<String>,
    pub probation_period: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub marital_status: Option<String>,
    pub nationality: Option<String>,
    pub profile_picture_url: Option<String>,
    pub failed_login_count: i32,
    pub locked_until: Option<Timestamp>,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe user representation for API responses (no password hash, no
/// lockout bookkeeping).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub company_id: DbId,
    pub email: String,
    pub role: String,
    pub is_active: bool,
    pub emp_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub department_id: Option<DbId>,
    pub designation_id: Option<DbId>,
    pub job_type: Option<String>,
    pub hiring_date: Option<NaiveDate>,
    pub report_to: Option<String>,
    pub grade: Option<String>,
    pub probation_period: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub marital_status: Option<String>,
    pub nationality: Option<String>,
    pub profile_picture_url: Option<String>,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            company_id: u.company_id,
            email: u.email,
            role: u.role,
            is_active: u.is_active,
            emp_id: u.emp_id,
            first_name: u.first_name,
            last_name: u.last_name,
            phone: u.phone,
            gender: u.gender,
            department_id: u.department_id,
            designation_id: u.designation_id,
            job_type: u.job_type,
            hiring_date: u.hiring_date,
            report_to: u.report_to,
            grade: u.grade,
            probation_period: u.probation_period,
            date_of_birth: u.date_of_birth,
            marital_status: u.marital_status,
            nationality: u.nationality,
            profile_picture_url: u.profile_picture_url,
            last_login_at: u.last_login_at,
            created_at: u.created_at,
        }
    }
}

/// DTO for inserting a user. Profile fields default to `None`.
#[derive(Debug, Clone, Default)]
pub struct CreateUser {
    pub company_id: DbId,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
    pub emp_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub department_id: Option<DbId>,
    pub designation_id: Option<DbId>,
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
