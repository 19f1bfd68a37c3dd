//! Handlers for `/document-templates` and `/document-submissions`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use hrflow_core::document::{validate_review, SubmissionStatus};
use hrflow_core::error::CoreError;
use hrflow_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use hrflow_core::types::DbId;
use hrflow_db::models::document_submission::{DocumentSubmission, SubmissionListParams};
use hrflow_db::models::document_template::{
    CreateDocumentTemplate, DocumentTemplate, DocumentTemplateDetail, UpdateDocumentTemplate,
};
use hrflow_db::repositories::{DocumentSubmissionRepo, DocumentTemplateRepo};
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Body for `PUT /document-submissions/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct SubmissionStatusRequest {
    pub status: SubmissionStatus,
}

// ---------------------------------------------------------------------------
// Document templates
// ---------------------------------------------------------------------------

/// POST /api/v1/document-templates
pub async fn create_template(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateDocumentTemplate>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let detail = DocumentTemplateRepo::create(&state.pool, admin.company_id, &input).await?;

    tracing::info!(
        template_id = detail.template.id,
        company_id = admin.company_id,
        fields = detail.fields.len(),
        "Document template created",
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(detail, "Document template created")),
    ))
}

/// GET /api/v1/document-templates
pub async fn list_templates(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Vec<DocumentTemplate>>>> {
    let (limit, offset) = params.resolve();
    let templates = DocumentTemplateRepo::list(&state.pool, admin.company_id, limit, offset).await?;
    Ok(Json(ApiResponse::ok(templates)))
}

/// GET /api/v1/document-templates/{id}
pub async fn get_template(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<DocumentTemplateDetail>>> {
    let detail = DocumentTemplateRepo::find_detail(&state.pool, admin.company_id, id)
        .await?
        .ok_or_else(|| template_not_found(id))?;
    Ok(Json(ApiResponse::ok(detail)))
}

/// PUT /api/v1/document-templates/{id}
///
/// A `fields` list replaces all existing fields.
pub async fn update_template(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateDocumentTemplate>,
) -> AppResult<Json<ApiResponse<DocumentTemplateDetail>>> {
    input.validate()?;
    let detail = DocumentTemplateRepo::update(&state.pool, admin.company_id, id, &input)
        .await?
        .ok_or_else(|| template_not_found(id))?;

    tracing::info!(template_id = id, company_id = admin.company_id, "Document template updated");
    Ok(Json(ApiResponse::with_message(detail, "Document template updated")))
}

/// DELETE /api/v1/document-templates/{id}
pub async fn delete_template(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !DocumentTemplateRepo::delete(&state.pool, admin.company_id, id).await? {
        return Err(template_not_found(id));
    }
    tracing::info!(template_id = id, company_id = admin.company_id, "Document template deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/document-templates/{id}/submissions
///
/// Every stored version, newest first. `employee_id` narrows to one employee.
pub async fn list_submissions(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<SubmissionListParams>,
) -> AppResult<Json<ApiResponse<Vec<DocumentSubmission>>>> {
    DocumentTemplateRepo::find_by_id(&state.pool, admin.company_id, id)
        .await?
        .ok_or_else(|| template_not_found(id))?;

    let submissions = DocumentSubmissionRepo::list_for_template(
        &state.pool,
        admin.company_id,
        id,
        params.employee_id.as_deref(),
        clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT),
        clamp_offset(params.offset),
    )
    .await?;
    Ok(Json(ApiResponse::ok(submissions)))
}

// ---------------------------------------------------------------------------
// Submission review
// ---------------------------------------------------------------------------

/// PUT /api/v1/document-submissions/{id}/status
pub async fn review_submission(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SubmissionStatusRequest>,
) -> AppResult<Json<ApiResponse<DocumentSubmission>>> {
    let not_found = || {
        AppError::Core(CoreError::NotFound {
            entity: "DocumentSubmission",
            id,
        })
    };
    let submission = DocumentSubmissionRepo::find_by_id(&state.pool, admin.company_id, id)
        .await?
        .ok_or_else(not_found)?;
    validate_review(SubmissionStatus::from_str_db(&submission.status)?, input.status)?;

    let reviewed = DocumentSubmissionRepo::set_status(
        &state.pool,
        admin.company_id,
        id,
        input.status,
        admin.user_id,
        state.clock.now(),
    )
    .await?
    .ok_or_else(|| AppError::BadRequest("Submission has already been reviewed".into()))?;

    tracing::info!(
        submission_id = id,
        user_id = admin.user_id,
        status = input.status.as_str(),
        "Document submission reviewed",
    );
    Ok(Json(ApiResponse::ok(reviewed)))
}

fn template_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "DocumentTemplate",
        id,
    })
}
