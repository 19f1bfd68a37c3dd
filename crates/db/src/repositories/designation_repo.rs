//! Repository for the `designations` table.

use hrflow_core::types::DbId;
use sqlx::PgPool;

use crate::models::designation::Designation;

const COLUMNS: &str = "id, company_id, name, created_at, updated_at";

/// Company-scoped CRUD for designations.
pub struct DesignationRepo;

impl DesignationRepo {
    pub async fn create(
        pool: &PgPool,
        company_id: DbId,
        name: &str,
    ) -> Result<Designation, sqlx::Error> {
        let query = format!(
            "INSERT INTO designations (company_id, name) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Designation>(&query)
            .bind(company_id)
            .bind(name.trim())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
    ) -> Result<Option<Designation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM designations WHERE id = $1 AND company_id = $2");
        sqlx::query_as::<_, Designation>(&query)
            .bind(id)
            .bind(company_id)
            .fetch_optional(pool)
            .await
    }

    /// List a company's designations ordered by name.
    pub async fn list(pool: &PgPool, company_id: DbId) -> Result<Vec<Designation>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM designations WHERE company_id = $1 ORDER BY name, id");
        sqlx::query_as::<_, Designation>(&query)
            .bind(company_id)
            .fetch_all(pool)
            .await
    }

    /// Rename a designation. Returns `None` if it does not exist in the company.
    pub async fn update(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
        name: &str,
    ) -> Result<Option<Designation>, sqlx::Error> {
        let query = format!(
            "UPDATE designations SET name = $3 WHERE id = $1 AND company_id = $2 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Designation>(&query)
            .bind(id)
            .bind(company_id)
            .bind(name.trim())
            .fetch_optional(pool)
            .await
    }

    /// Delete a designation. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, company_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM designations WHERE id = $1 AND company_id = $2")
            .bind(id)
            .bind(company_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether a designation with `id` exists in `company_id`.
    pub async fn exists(pool: &PgPool, company_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM designations WHERE id = $1 AND company_id = $2)",
        )
        .bind(id)
        .bind(company_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }
}
