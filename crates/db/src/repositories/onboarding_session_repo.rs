//! Repository for the `onboarding_sessions` table.
//!
//! Every status transition is a conditional `UPDATE ... WHERE status = ...`
//! so concurrent requests cannot move a session twice. A transition that
//! lost the race returns `None`.

use hrflow_core::onboarding::{OnboardingStatus, ProfilePatch};
use hrflow_core::types::DbId;
use sqlx::PgPool;

use crate::models::onboarding_session::{CreateOnboardingSession, OnboardingSession};
use crate::models::user::{CreateUser, User};
use crate::repositories::user_repo::UserRepo;

const COLUMNS: &str = "id, company_id, new_employee_email, invitation_token, status, \
    current_step, expires_at, template_id, user_id, emp_id, first_name, last_name, phone, \
    gender, user_role, designation_id, department_id, job_type, hiring_date, report_to, \
    grade, probation_period, date_of_birth, marital_status, nationality, \
    profile_picture_url, created_at, updated_at";

/// Provides lifecycle operations for onboarding sessions.
pub struct OnboardingSessionRepo;

impl OnboardingSessionRepo {
    /// Insert a new `pending` session.
    ///
    /// A second pending session for the same (company, email) violates
    /// `uq_onboarding_sessions_pending_email`.
    pub async fn create(
        pool: &PgPool,
        input: &CreateOnboardingSession,
    ) -> Result<OnboardingSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO onboarding_sessions (company_id, new_employee_email, invitation_token, \
                status, current_step, created_at, expires_at, template_id, emp_id, first_name, \
                last_name, phone, gender, user_role, designation_id, department_id, job_type, \
                hiring_date, report_to, grade, probation_period, date_of_birth, marital_status, \
                nationality, profile_picture_url) \
             VALUES ($1, $2, $3, 'pending', 0, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, \
                $14, $15, $16, $17, $18, $19, $20, $21, $22, $23) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OnboardingSession>(&query)
            .bind(input.company_id)
            .bind(&input.new_employee_email)
            .bind(&input.invitation_token)
            .bind(input.created_at)
            .bind(input.expires_at)
            .bind(input.template_id)
            .bind(&input.emp_id)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.phone)
            .bind(&input.gender)
            .bind(&input.user_role)
            .bind(input.designation_id)
            .bind(input.department_id)
            .bind(&input.job_type)
            .bind(input.hiring_date)
            .bind(&input.report_to)
            .bind(&input.grade)
            .bind(&input.probation_period)
            .bind(input.date_of_birth)
            .bind(&input.marital_status)
            .bind(&input.nationality)
            .bind(&input.profile_picture_url)
            .fetch_one(pool)
            .await
    }

    /// Find a session by exact invitation token.
    pub async fn find_by_token(
        pool: &PgPool,
        token: &str,
    ) -> Result<Option<OnboardingSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM onboarding_sessions WHERE invitation_token = $1");
        sqlx::query_as::<_, OnboardingSession>(&query)
            .bind(token)
            .fetch_optional(pool)
            .await
    }

    /// Whether a `pending` session exists for (company, email).
    pub async fn has_pending(
        pool: &PgPool,
        company_id: DbId,
        email: &str,
    ) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM onboarding_sessions \
             WHERE company_id = $1 AND new_employee_email = $2 AND status = 'pending')",
        )
        .bind(company_id)
        .bind(email)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Count sessions for (company, email) in `status`.
    pub async fn count_with_status(
        pool: &PgPool,
        company_id: DbId,
        email: &str,
        status: OnboardingStatus,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM onboarding_sessions \
             WHERE company_id = $1 AND new_employee_email = $2 AND status = $3",
        )
        .bind(company_id)
        .bind(email)
        .bind(status.as_str())
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Flip a `pending` session to `expired`. No-op for any other status.
    pub async fn mark_expired(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE onboarding_sessions SET status = 'expired' \
             WHERE id = $1 AND status = 'pending'",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Move a `pending` session to `in_progress` and provision its user in
    /// one transaction.
    ///
    /// Returns `None` (and creates nothing) if the session was no longer
    /// pending.
    pub async fn activate(
        pool: &PgPool,
        session_id: DbId,
        user: &CreateUser,
    ) -> Result<Option<(OnboardingSession, User)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let claimed = sqlx::query(
            "UPDATE onboarding_sessions SET status = 'in_progress' \
             WHERE id = $1 AND status = 'pending'",
        )
        .bind(session_id)
        .execute(&mut *tx)
        .await?;
        if claimed.rows_affected() == 0 {
            return Ok(None);
        }

        let created = UserRepo::create_in_tx(&mut tx, user).await?;

        let query = format!(
            "UPDATE onboarding_sessions SET user_id = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        let session = sqlx::query_as::<_, OnboardingSession>(&query)
            .bind(session_id)
            .bind(created.id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some((session, created)))
    }

    /// The `in_progress` session for `email`, newest first.
    pub async fn find_active_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<OnboardingSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM onboarding_sessions \
             WHERE new_employee_email = $1 AND status = 'in_progress' \
             ORDER BY created_at DESC, id DESC LIMIT 1"
        );
        sqlx::query_as::<_, OnboardingSession>(&query)
            .bind(email.to_lowercase())
            .fetch_optional(pool)
            .await
    }

    /// The most recent session for `email`, whatever its status.
    pub async fn find_latest_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<OnboardingSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM onboarding_sessions WHERE new_employee_email = $1 \
             ORDER BY created_at DESC, id DESC LIMIT 1"
        );
        sqlx::query_as::<_, OnboardingSession>(&query)
            .bind(email.to_lowercase())
            .fetch_optional(pool)
            .await
    }

    /// Set `current_step` if the session is still open and the step does not
    /// go backwards.
    pub async fn update_step(
        pool: &PgPool,
        id: DbId,
        step: i32,
    ) -> Result<Option<OnboardingSession>, sqlx::Error> {
        let query = format!(
            "UPDATE onboarding_sessions SET current_step = $2 \
             WHERE id = $1 AND status IN ('pending', 'in_progress') AND current_step <= $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OnboardingSession>(&query)
            .bind(id)
            .bind(step)
            .fetch_optional(pool)
            .await
    }

    /// Apply a profile patch (and optional new picture URL) to an
    /// `in_progress` session. An email change is mirrored onto the linked
    /// user in the same transaction.
    pub async fn apply_review(
        pool: &PgPool,
        id: DbId,
        patch: &ProfilePatch,
        profile_picture_url: Option<&str>,
    ) -> Result<Option<OnboardingSession>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE onboarding_sessions SET \
                first_name = COALESCE($2, first_name), \
                last_name = COALESCE($3, last_name), \
                new_employee_email = COALESCE($4, new_employee_email), \
                phone = COALESCE($5, phone), \
                gender = COALESCE($6, gender), \
                date_of_birth = COALESCE($7, date_of_birth), \
                marital_status = COALESCE($8, marital_status), \
                nationality = COALESCE($9, nationality), \
                profile_picture_url = COALESCE($10, profile_picture_url) \
             WHERE id = $1 AND status = 'in_progress' \
             RETURNING {COLUMNS}"
        );
        let session = sqlx::query_as::<_, OnboardingSession>(&query)
            .bind(id)
            .bind(&patch.first_name)
            .bind(&patch.last_name)
            .bind(&patch.email)
            .bind(&patch.phone)
            .bind(&patch.gender)
            .bind(patch.date_of_birth)
            .bind(&patch.marital_status)
            .bind(&patch.nationality)
            .bind(profile_picture_url)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(session) = session else {
            return Ok(None);
        };

        if let (Some(email), Some(user_id)) = (&patch.email, session.user_id) {
            sqlx::query("UPDATE users SET email = $2 WHERE id = $1")
                .bind(user_id)
                .bind(email)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(Some(session))
    }

    /// Terminal transition `in_progress -> submitted`; the linked user is
    /// activated in the same transaction.
    pub async fn submit(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<OnboardingSession>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE onboarding_sessions SET status = 'submitted' \
             WHERE id = $1 AND status = 'in_progress' RETURNING {COLUMNS}"
        );
        let session = sqlx::query_as::<_, OnboardingSession>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(session) = session else {
            return Ok(None);
        };

        if let Some(user_id) = session.user_id {
            sqlx::query("UPDATE users SET is_active = true WHERE id = $1")
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(Some(session))
    }

    /// List a company's sessions, newest first, optionally by status.
    pub async fn list(
        pool: &PgPool,
        company_id: DbId,
        status: Option<OnboardingStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<OnboardingSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM onboarding_sessions \
             WHERE company_id = $1 AND ($2::TEXT IS NULL OR status = $2) \
             ORDER BY created_at DESC, id DESC LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, OnboardingSession>(&query)
            .bind(company_id)
            .bind(status.map(|s| s.as_str()))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
