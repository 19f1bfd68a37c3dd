//! Repository for the `onboarding_templates` table and its children
//! (`todo_items` and the required/optional document join tables).

use hrflow_core::templates::{ResolvedTodo, TodoSyncPlan};
use hrflow_core::types::DbId;
use sqlx::PgPool;

use crate::models::onboarding_template::{
    DocumentRef, OnboardingTemplate, OnboardingTemplateDetail, TodoItem,
};

const COLUMNS: &str = "id, company_id, name, created_at, updated_at";

const TODO_COLUMNS: &str =
    "id, template_id, title, description, order_index, created_at, updated_at";

/// Which of the two document join tables to use.
#[derive(Debug, Clone, Copy)]
enum DocumentKind {
    Required,
    Optional,
}

impl DocumentKind {
    fn table(self) -> &'static str {
        match self {
            Self::Required => "onboarding_template_required_documents",
            Self::Optional => "onboarding_template_optional_documents",
        }
    }
}

/// Company-scoped CRUD for onboarding templates.
pub struct OnboardingTemplateRepo;

impl OnboardingTemplateRepo {
    /// Insert a template with its todos and document requirements.
    ///
    /// Todos must already be resolved; document ids must already be checked
    /// against the company.
    pub async fn create(
        pool: &PgPool,
        company_id: DbId,
        name: &str,
        todos: &[ResolvedTodo],
        required_document_ids: &[DbId],
        optional_document_ids: &[DbId],
    ) -> Result<OnboardingTemplate, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO onboarding_templates (company_id, name) VALUES ($1, $2) \
             RETURNING {COLUMNS}"
        );
        let template = sqlx::query_as::<_, OnboardingTemplate>(&query)
            .bind(company_id)
            .bind(name.trim())
            .fetch_one(&mut *tx)
            .await?;

        for todo in todos {
            Self::insert_todo(&mut tx, template.id, todo).await?;
        }
        Self::replace_documents(&mut tx, template.id, DocumentKind::Required, required_document_ids)
            .await?;
        Self::replace_documents(&mut tx, template.id, DocumentKind::Optional, optional_document_ids)
            .await?;

        tx.commit().await?;
        Ok(template)
    }

    pub async fn find_by_id(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
    ) -> Result<Option<OnboardingTemplate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM onboarding_templates WHERE id = $1 AND company_id = $2"
        );
        sqlx::query_as::<_, OnboardingTemplate>(&query)
            .bind(id)
            .bind(company_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a template with its todos and both document lists.
    pub async fn find_detail(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
    ) -> Result<Option<OnboardingTemplateDetail>, sqlx::Error> {
        let Some(template) = Self::find_by_id(pool, company_id, id).await? else {
            return Ok(None);
        };
        let todos = Self::list_todos(pool, template.id).await?;
        let required_documents = Self::required_documents(pool, template.id).await?;
        let optional_documents = Self::optional_documents(pool, template.id).await?;
        Ok(Some(OnboardingTemplateDetail {
            template,
            todos,
            required_documents,
            optional_documents,
        }))
    }

    pub async fn list(
        pool: &PgPool,
        company_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<OnboardingTemplate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM onboarding_templates WHERE company_id = $1 \
             ORDER BY name, id LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, OnboardingTemplate>(&query)
            .bind(company_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Todo items ordered by `order_index`, ties by id.
    pub async fn list_todos(pool: &PgPool, template_id: DbId) -> Result<Vec<TodoItem>, sqlx::Error> {
        let query = format!(
            "SELECT {TODO_COLUMNS} FROM todo_items WHERE template_id = $1 \
             ORDER BY order_index, id"
        );
        sqlx::query_as::<_, TodoItem>(&query)
            .bind(template_id)
            .fetch_all(pool)
            .await
    }

    pub async fn required_documents(
        pool: &PgPool,
        template_id: DbId,
    ) -> Result<Vec<DocumentRef>, sqlx::Error> {
        Self::documents(pool, template_id, DocumentKind::Required).await
    }

    pub async fn optional_documents(
        pool: &PgPool,
        template_id: DbId,
    ) -> Result<Vec<DocumentRef>, sqlx::Error> {
        Self::documents(pool, template_id, DocumentKind::Optional).await
    }

    /// Apply an update in one transaction.
    ///
    /// `None` arguments leave that part alone. A todo sync plan is applied
    /// as updates, then deletes, then inserts. Deleting a todo that gained a
    /// task after the plan was computed fails on the `RESTRICT` foreign key.
    ///
    /// Returns `None` if the template is not in the company.
    pub async fn update(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
        name: Option<&str>,
        plan: Option<&TodoSyncPlan>,
        required_document_ids: Option<&[DbId]>,
        optional_document_ids: Option<&[DbId]>,
    ) -> Result<Option<OnboardingTemplate>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        // Always touched so updated_at reflects child edits too.
        let query = format!(
            "UPDATE onboarding_templates SET name = COALESCE($3, name), updated_at = NOW() \
             WHERE id = $1 AND company_id = $2 RETURNING {COLUMNS}"
        );
        let template = sqlx::query_as::<_, OnboardingTemplate>(&query)
            .bind(id)
            .bind(company_id)
            .bind(name.map(str::trim))
            .fetch_optional(&mut *tx)
            .await?;
        let Some(template) = template else {
            return Ok(None);
        };

        if let Some(plan) = plan {
            for (todo_id, todo) in &plan.updates {
                sqlx::query(
                    "UPDATE todo_items SET title = $3, description = $4, order_index = $5 \
                     WHERE id = $1 AND template_id = $2",
                )
                .bind(todo_id)
                .bind(template.id)
                .bind(&todo.title)
                .bind(&todo.description)
                .bind(todo.order_index)
                .execute(&mut *tx)
                .await?;
            }
            if !plan.deletes.is_empty() {
                sqlx::query("DELETE FROM todo_items WHERE template_id = $1 AND id = ANY($2)")
                    .bind(template.id)
                    .bind(&plan.deletes)
                    .execute(&mut *tx)
                    .await?;
            }
            for todo in &plan.inserts {
                Self::insert_todo(&mut tx, template.id, todo).await?;
            }
        }

        if let Some(ids) = required_document_ids {
            Self::replace_documents(&mut tx, template.id, DocumentKind::Required, ids).await?;
        }
        if let Some(ids) = optional_document_ids {
            Self::replace_documents(&mut tx, template.id, DocumentKind::Optional, ids).await?;
        }

        tx.commit().await?;
        Ok(Some(template))
    }

    /// Delete a template. Sessions keep running with `template_id` cleared;
    /// deletion fails if any todo still has materialized tasks.
    pub async fn delete(pool: &PgPool, company_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM onboarding_templates WHERE id = $1 AND company_id = $2")
                .bind(id)
                .bind(company_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    async fn insert_todo(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        template_id: DbId,
        todo: &ResolvedTodo,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO todo_items (template_id, title, description, order_index) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(template_id)
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(todo.order_index)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn replace_documents(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        template_id: DbId,
        kind: DocumentKind,
        document_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        let table = kind.table();
        sqlx::query(&format!("DELETE FROM {table} WHERE onboarding_template_id = $1"))
            .bind(template_id)
            .execute(&mut **tx)
            .await?;
        if document_ids.is_empty() {
            return Ok(());
        }
        sqlx::query(&format!(
            "INSERT INTO {table} (onboarding_template_id, document_template_id) \
             SELECT $1, UNNEST($2::BIGINT[]) ON CONFLICT DO NOTHING"
        ))
        .bind(template_id)
        .bind(document_ids)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn documents(
        pool: &PgPool,
        template_id: DbId,
        kind: DocumentKind,
    ) -> Result<Vec<DocumentRef>, sqlx::Error> {
        let query = format!(
            "SELECT d.id, d.name FROM {} j \
             JOIN document_templates d ON d.id = j.document_template_id \
             WHERE j.onboarding_template_id = $1 ORDER BY d.id",
            kind.table()
        );
        sqlx::query_as::<_, DocumentRef>(&query)
            .bind(template_id)
            .fetch_all(pool)
            .await
    }
}
