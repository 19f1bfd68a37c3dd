//! Repository for the `onboarding_tasks` table.

use hrflow_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::onboarding_task::OnboardingTask;

const COLUMNS: &str = "id, session_id, todo_item_id, title, description, order_index, \
    is_completed, completed_at, created_at, updated_at";

pub struct OnboardingTaskRepo;

impl OnboardingTaskRepo {
    /// A session's tasks in checklist order.
    pub async fn list_for_session(
        pool: &PgPool,
        session_id: DbId,
    ) -> Result<Vec<OnboardingTask>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM onboarding_tasks WHERE session_id = $1 \
             ORDER BY order_index, id"
        );
        sqlx::query_as::<_, OnboardingTask>(&query)
            .bind(session_id)
            .fetch_all(pool)
            .await
    }

    /// Todo ids that already have a task in this session.
    pub async fn materialized_todo_ids(
        pool: &PgPool,
        session_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> = sqlx::query_as(
            "SELECT todo_item_id FROM onboarding_tasks \
             WHERE session_id = $1 AND todo_item_id IS NOT NULL",
        )
        .bind(session_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Create tasks for `todo_ids`, copying title, description, and order
    /// from the todo items. Existing `(session, todo)` pairs are skipped, so
    /// concurrent callers never produce duplicates.
    ///
    /// Returns the number of tasks created.
    pub async fn insert_missing(
        pool: &PgPool,
        session_id: DbId,
        todo_ids: &[DbId],
    ) -> Result<u64, sqlx::Error> {
        if todo_ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            "INSERT INTO onboarding_tasks (session_id, todo_item_id, title, description, order_index) \
             SELECT $1, t.id, t.title, t.description, t.order_index \
             FROM todo_items t WHERE t.id = ANY($2) \
             ORDER BY t.order_index, t.id \
             ON CONFLICT ON CONSTRAINT uq_onboarding_tasks_session_todo DO NOTHING",
        )
        .bind(session_id)
        .bind(todo_ids)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// The task in `session_id` materialized from `todo_item_id`.
    pub async fn find_by_todo(
        pool: &PgPool,
        session_id: DbId,
        todo_item_id: DbId,
    ) -> Result<Option<OnboardingTask>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM onboarding_tasks WHERE session_id = $1 AND todo_item_id = $2"
        );
        sqlx::query_as::<_, OnboardingTask>(&query)
            .bind(session_id)
            .bind(todo_item_id)
            .fetch_optional(pool)
            .await
    }

    /// Set completion. `completed_at` is stamped with `now` when completing
    /// and cleared when reopening.
    pub async fn set_completed(
        pool: &PgPool,
        id: DbId,
        completed: bool,
        now: Timestamp,
    ) -> Result<Option<OnboardingTask>, sqlx::Error> {
        let query = format!(
            "UPDATE onboarding_tasks SET \
                is_completed = $2, \
                completed_at = CASE WHEN $2 THEN $3 ELSE NULL END \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OnboardingTask>(&query)
            .bind(id)
            .bind(completed)
            .bind(now)
            .fetch_optional(pool)
            .await
    }

    /// Todo ids of `template_id` that have at least one task in any session.
    pub async fn referenced_todo_ids(
        pool: &PgPool,
        template_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> = sqlx::query_as(
            "SELECT DISTINCT t.id FROM todo_items t \
             JOIN onboarding_tasks k ON k.todo_item_id = t.id \
             WHERE t.template_id = $1 ORDER BY t.id",
        )
        .bind(template_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
