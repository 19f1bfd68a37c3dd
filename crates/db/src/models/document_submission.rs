//! Employee document submissions (append-only, versioned).

use hrflow_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `document_submissions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DocumentSubmission {
    pub id: DbId,
    pub company_id: DbId,
    pub template_id: DbId,
    pub employee_id: String,
    pub session_id: Option<DbId>,
    pub version: i32,
    pub field_values: serde_json::Value,
    pub file_paths: serde_json::Value,
    pub status: String,
    pub submitted_at: Timestamp,
    pub reviewed_at: Option<Timestamp>,
    pub reviewed_by: Option<DbId>,
}

/// DTO for appending a submission version.
#[derive(Debug, Clone)]
pub struct CreateDocumentSubmission {
    pub company_id: DbId,
    pub template_id: DbId,
    pub employee_id: String,
    pub session_id: Option<DbId>,
    pub field_values: serde_json::Value,
    pub file_paths: serde_json::Value,
}

/// Query parameters for listing a template's submissions.
#[derive(Debug, Deserialize)]
pub struct SubmissionListParams {
    pub employee_id: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
