//! Repository for the `document_submissions` table.
//!
//! Submissions are append-only. Each upload for the same
//! (company, employee, template) gets the next `version`; readers take the
//! newest row.

use hrflow_core::document::SubmissionStatus;
use hrflow_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::document_submission::{CreateDocumentSubmission, DocumentSubmission};

const COLUMNS: &str = "id, company_id, template_id, employee_id, session_id, version, \
    field_values, file_paths, status, submitted_at, reviewed_at, reviewed_by";

pub struct DocumentSubmissionRepo;

impl DocumentSubmissionRepo {
    /// Append a new version.
    ///
    /// Two concurrent uploads computing the same version collide on
    /// `uq_document_submissions_version`; the loser gets a 409.
    pub async fn create_version(
        pool: &PgPool,
        input: &CreateDocumentSubmission,
    ) -> Result<DocumentSubmission, sqlx::Error> {
        let query = format!(
            "INSERT INTO document_submissions \
                (company_id, template_id, employee_id, session_id, version, field_values, file_paths) \
             SELECT $1, $2, $3, $4, COALESCE(MAX(version), 0) + 1, $5, $6 \
             FROM document_submissions \
             WHERE company_id = $1 AND template_id = $2 AND employee_id = $3 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DocumentSubmission>(&query)
            .bind(input.company_id)
            .bind(input.template_id)
            .bind(&input.employee_id)
            .bind(input.session_id)
            .bind(&input.field_values)
            .bind(&input.file_paths)
            .fetch_one(pool)
            .await
    }

    /// The newest submission for each of `template_ids`.
    ///
    /// Rows filed under `employee_id` count, as do rows recorded through
    /// `session_id`; the latter covers sessions invited without an `empId`.
    pub async fn latest_for_documents(
        pool: &PgPool,
        company_id: DbId,
        employee_id: Option<&str>,
        session_id: DbId,
        template_ids: &[DbId],
    ) -> Result<Vec<DocumentSubmission>, sqlx::Error> {
        if template_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT DISTINCT ON (template_id) {COLUMNS} FROM document_submissions \
             WHERE company_id = $1 AND template_id = ANY($2) \
               AND (employee_id = $3 OR session_id = $4) \
             ORDER BY template_id, id DESC"
        );
        sqlx::query_as::<_, DocumentSubmission>(&query)
            .bind(company_id)
            .bind(template_ids)
            .bind(employee_id)
            .bind(session_id)
            .fetch_all(pool)
            .await
    }

    /// Submissions for a template, newest first.
    pub async fn list_for_template(
        pool: &PgPool,
        company_id: DbId,
        template_id: DbId,
        employee_id: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<DocumentSubmission>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM document_submissions \
             WHERE company_id = $1 AND template_id = $2 \
               AND ($3::TEXT IS NULL OR employee_id = $3) \
             ORDER BY submitted_at DESC, id DESC LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, DocumentSubmission>(&query)
            .bind(company_id)
            .bind(template_id)
            .bind(employee_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
    ) -> Result<Option<DocumentSubmission>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM document_submissions WHERE id = $1 AND company_id = $2"
        );
        sqlx::query_as::<_, DocumentSubmission>(&query)
            .bind(id)
            .bind(company_id)
            .fetch_optional(pool)
            .await
    }

    /// Record a review. Only applies while the row is still `submitted`.
    pub async fn set_status(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
        status: SubmissionStatus,
        reviewer_id: DbId,
        now: Timestamp,
    ) -> Result<Option<DocumentSubmission>, sqlx::Error> {
        let query = format!(
            "UPDATE document_submissions SET status = $3, reviewed_by = $4, reviewed_at = $5 \
             WHERE id = $1 AND company_id = $2 AND status = 'submitted' \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DocumentSubmission>(&query)
            .bind(id)
            .bind(company_id)
            .bind(status.as_str())
            .bind(reviewer_id)
            .bind(now)
            .fetch_optional(pool)
            .await
    }
}
