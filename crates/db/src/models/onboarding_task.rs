//! Materialized per-session checklist tasks.

use hrflow_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `onboarding_tasks` table.
///
/// `title`/`description` are copied from the todo item at creation time.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OnboardingTask {
    pub id: DbId,
    pub session_id: DbId,
    pub todo_item_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub order_index: i32,
    pub is_completed: bool,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
