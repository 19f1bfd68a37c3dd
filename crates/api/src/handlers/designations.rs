//! Handlers for `/designations`, the company's job titles (admin only).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use hrflow_core::error::CoreError;
use hrflow_core::types::DbId;
use hrflow_db::models::designation::{Designation, DesignationInput};
use hrflow_db::repositories::DesignationRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::ApiResponse;
use crate::state::AppState;

/// POST /api/v1/designations
pub async fn create_designation(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<DesignationInput>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let designation = DesignationRepo::create(&state.pool, admin.company_id, &input.name).await?;

    tracing::info!(
        designation_id = designation.id,
        company_id = admin.company_id,
        "Designation created",
    );

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(designation))))
}

/// GET /api/v1/designations
pub async fn list_designations(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<Designation>>>> {
    let designations = DesignationRepo::list(&state.pool, admin.company_id).await?;
    Ok(Json(ApiResponse::ok(designations)))
}

/// GET /api/v1/designations/{id}
pub async fn get_designation(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<Designation>>> {
    let designation = DesignationRepo::find_by_id(&state.pool, admin.company_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(ApiResponse::ok(designation)))
}

/// PUT /api/v1/designations/{id}
pub async fn update_designation(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<DesignationInput>,
) -> AppResult<Json<ApiResponse<Designation>>> {
    input.validate()?;
    let designation = DesignationRepo::update(&state.pool, admin.company_id, id, &input.name)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(ApiResponse::ok(designation)))
}

/// DELETE /api/v1/designations/{id}
pub async fn delete_designation(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !DesignationRepo::delete(&state.pool, admin.company_id, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(designation_id = id, company_id = admin.company_id, "Designation deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Designation",
        id,
    })
}
