//! Designation (job title) model and DTOs.

use hrflow_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `designations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Designation {
    pub id: DbId,
    pub company_id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Body for creating or renaming a designation.
#[derive(Debug, Deserialize, Validate)]
pub struct DesignationInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
}
