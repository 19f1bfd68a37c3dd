//! Handlers for `/onboarding-templates` (admin only, company-scoped).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use hrflow_core::error::CoreError;
use hrflow_core::templates::{plan_todo_sync, resolve_todos};
use hrflow_core::types::DbId;
use hrflow_db::models::onboarding_template::{
    CreateOnboardingTemplate, OnboardingTemplate, OnboardingTemplateDetail,
    UpdateOnboardingTemplate,
};
use hrflow_db::repositories::{DocumentTemplateRepo, OnboardingTaskRepo, OnboardingTemplateRepo};
use sqlx::PgPool;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::ApiResponse;
use crate::state::AppState;

/// POST /api/v1/onboarding-templates
pub async fn create_template(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateOnboardingTemplate>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let todos = resolve_todos(&input.todos)?;
    let required =
        DocumentTemplateRepo::ids_in_company(&state.pool, admin.company_id, &input.required_document_ids)
            .await?;
    let optional =
        DocumentTemplateRepo::ids_in_company(&state.pool, admin.company_id, &input.optional_document_ids)
            .await?;

    let template = OnboardingTemplateRepo::create(
        &state.pool,
        admin.company_id,
        input.name.trim(),
        &todos,
        &required,
        &optional,
    )
    .await?;

    tracing::info!(
        template_id = template.id,
        company_id = admin.company_id,
        todos = todos.len(),
        "Onboarding template created",
    );

    let detail = load_detail(&state.pool, admin.company_id, template.id).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(detail, "Onboarding template created")),
    ))
}

/// GET /api/v1/onboarding-templates
pub async fn list_templates(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Vec<OnboardingTemplate>>>> {
    let (limit, offset) = params.resolve();
    let templates =
        OnboardingTemplateRepo::list(&state.pool, admin.company_id, limit, offset).await?;
    Ok(Json(ApiResponse::ok(templates)))
}

/// GET /api/v1/onboarding-templates/{id}
pub async fn get_template(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<OnboardingTemplateDetail>>> {
    let detail = load_detail(&state.pool, admin.company_id, id).await?;
    Ok(Json(ApiResponse::ok(detail)))
}

/// PUT /api/v1/onboarding-templates/{id}
///
/// A `todos` list is synced against the stored items: ids update, new
/// entries insert, omitted items are deleted unless a session has a task
/// for them.
pub async fn update_template(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateOnboardingTemplate>,
) -> AppResult<Json<ApiResponse<OnboardingTemplateDetail>>> {
    input.validate()?;
    let template = OnboardingTemplateRepo::find_by_id(&state.pool, admin.company_id, id)
        .await?
        .ok_or_else(|| template_not_found(id))?;

    let plan = match &input.todos {
        Some(incoming) => {
            let existing: Vec<DbId> = OnboardingTemplateRepo::list_todos(&state.pool, template.id)
                .await?
                .into_iter()
                .map(|t| t.id)
                .collect();
            let referenced = OnboardingTaskRepo::referenced_todo_ids(&state.pool, template.id).await?;
            Some(plan_todo_sync(&existing, incoming, &referenced)?)
        }
        None => None,
    };

    let required = match &input.required_document_ids {
        Some(ids) => Some(DocumentTemplateRepo::ids_in_company(&state.pool, admin.company_id, ids).await?),
        None => None,
    };
    let optional = match &input.optional_document_ids {
        Some(ids) => Some(DocumentTemplateRepo::ids_in_company(&state.pool, admin.company_id, ids).await?),
        None => None,
    };

    OnboardingTemplateRepo::update(
        &state.pool,
        admin.company_id,
        template.id,
        input.name.as_deref().map(str::trim),
        plan.as_ref(),
        required.as_deref(),
        optional.as_deref(),
    )
    .await?
    .ok_or_else(|| template_not_found(id))?;

    tracing::info!(template_id = id, company_id = admin.company_id, "Onboarding template updated");

    let detail = load_detail(&state.pool, admin.company_id, id).await?;
    Ok(Json(ApiResponse::with_message(detail, "Onboarding template updated")))
}

/// DELETE /api/v1/onboarding-templates/{id}
pub async fn delete_template(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    OnboardingTemplateRepo::find_by_id(&state.pool, admin.company_id, id)
        .await?
        .ok_or_else(|| template_not_found(id))?;

    if !OnboardingTaskRepo::referenced_todo_ids(&state.pool, id)
        .await?
        .is_empty()
    {
        return Err(AppError::Core(CoreError::Conflict(
            "Template has todo items already assigned to onboarding sessions".into(),
        )));
    }

    if !OnboardingTemplateRepo::delete(&state.pool, admin.company_id, id).await? {
        return Err(template_not_found(id));
    }

    tracing::info!(template_id = id, company_id = admin.company_id, "Onboarding template deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn load_detail(
    pool: &PgPool,
    company_id: DbId,
    id: DbId,
) -> AppResult<OnboardingTemplateDetail> {
    OnboardingTemplateRepo::find_detail(pool, company_id, id)
        .await?
        .ok_or_else(|| template_not_found(id))
}

fn template_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "OnboardingTemplate",
        id,
    })
}
