//! Repository for the `users` table.

use hrflow_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::user::{CreateUser, User};

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str = "id, company_id, email, password_hash, role, is_active, \
    emp_id, first_name, last_name, phone, gender, department_id, designation_id, job_type, \
    hiring_date, report_to, grade, probation_period, date_of_birth, marital_status, \
    nationality, profile_picture_url, failed_login_count, locked_until, last_login_at, \
    created_at, updated_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let user = Self::create_in_tx(&mut tx, input).await?;
        tx.commit().await?;
        Ok(user)
    }

    /// Insert a new user within an existing transaction.
    pub(crate) async fn create_in_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        input: &CreateUser,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (company_id, email, password_hash, role, is_active, \
                emp_id, first_name, last_name, phone, gender, department_id, designation_id, \
                job_type, hiring_date, report_to, grade, probation_period, date_of_birth, \
                marital_status, nationality, profile_picture_url) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
                $17, $18, $19, $20, $21) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(input.company_id)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.role)
            .bind(input.is_active)
            .bind(&input.emp_id)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.phone)
            .bind(&input.gender)
            .bind(input.department_id)
            .bind(input.designation_id)
            .bind(&input.job_type)
            .bind(input.hiring_date)
            .bind(&input.report_to)
            .bind(&input.grade)
            .bind(&input.probation_period)
            .bind(input.date_of_birth)
            .bind(&input.marital_status)
            .bind(&input.nationality)
            .bind(&input.profile_picture_url)
            .fetch_one(&mut **tx)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by ID within a company.
    pub async fn find_in_company(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1 AND company_id = $2");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(company_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email. Emails are stored lowercased.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email.to_lowercase())
            .fetch_optional(pool)
            .await
    }

    /// List a company's users, newest first.
    pub async fn list_by_company(
        pool: &PgPool,
        company_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users WHERE company_id = $1 \
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(company_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Set or clear a user's department. Returns `None` if the user is not
    /// in `company_id`.
    pub async fn set_department(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
        department_id: Option<DbId>,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET department_id = $3 WHERE id = $1 AND company_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(company_id)
            .bind(department_id)
            .fetch_optional(pool)
            .await
    }

    /// Set or clear a user's designation. Returns `None` if the user is not
    /// in `company_id`.
    pub async fn set_designation(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
        designation_id: Option<DbId>,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET designation_id = $3 WHERE id = $1 AND company_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(company_id)
            .bind(designation_id)
            .fetch_optional(pool)
            .await
    }

    /// Increment the failed login counter by 1.
    pub async fn increment_failed_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET failed_login_count = failed_login_count + 1 WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Lock a user account until the specified timestamp.
    pub async fn lock_account(
        pool: &PgPool,
        id: DbId,
        until: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET locked_until = $2 WHERE id = $1")
            .bind(id)
            .bind(until)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Record a successful login: reset `failed_login_count` to 0, clear `locked_until`,
    /// and set `last_login_at` to now.
    pub async fn record_successful_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET
                failed_login_count = 0,
                locked_until = NULL,
                last_login_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }
}
