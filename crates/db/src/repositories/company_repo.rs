//! Repository for the `companies` table.

use hrflow_core::types::DbId;
use sqlx::PgPool;

use crate::models::company::Company;
use crate::models::user::{CreateUser, User};
use crate::repositories::user_repo::UserRepo;

const COLUMNS: &str = "id, name, created_at, updated_at";

pub struct CompanyRepo;

impl CompanyRepo {
    /// Insert a company together with its first user in one transaction.
    ///
    /// `admin.company_id` is ignored and replaced with the new company's id.
    pub async fn create_with_admin(
        pool: &PgPool,
        name: &str,
        admin: &CreateUser,
    ) -> Result<(Company, User), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!("INSERT INTO companies (name) VALUES ($1) RETURNING {COLUMNS}");
        let company = sqlx::query_as::<_, Company>(&query)
            .bind(name)
            .fetch_one(&mut *tx)
            .await?;

        let admin = CreateUser {
            company_id: company.id,
            ..admin.clone()
        };
        let user = UserRepo::create_in_tx(&mut tx, &admin).await?;

        tx.commit().await?;
        Ok((company, user))
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Company>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM companies WHERE id = $1");
        sqlx::query_as::<_, Company>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
