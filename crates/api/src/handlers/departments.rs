//! Handlers for `/departments` (admin only, company-scoped).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use hrflow_core::error::CoreError;
use hrflow_core::types::DbId;
use hrflow_db::models::department::{Department, DepartmentInput};
use hrflow_db::repositories::DepartmentRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::ApiResponse;
use crate::state::AppState;

/// POST /api/v1/departments
pub async fn create_department(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<DepartmentInput>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let department = DepartmentRepo::create(&state.pool, admin.company_id, &input.name).await?;

    tracing::info!(
        department_id = department.id,
        company_id = admin.company_id,
        "Department created",
    );

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(department))))
}

/// GET /api/v1/departments
pub async fn list_departments(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<Department>>>> {
    let departments = DepartmentRepo::list(&state.pool, admin.company_id).await?;
    Ok(Json(ApiResponse::ok(departments)))
}

/// GET /api/v1/departments/{id}
pub async fn get_department(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<Department>>> {
    let department = DepartmentRepo::find_by_id(&state.pool, admin.company_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(ApiResponse::ok(department)))
}

/// PUT /api/v1/departments/{id}
pub async fn update_department(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<DepartmentInput>,
) -> AppResult<Json<ApiResponse<Department>>> {
    input.validate()?;
    let department = DepartmentRepo::update(&state.pool, admin.company_id, id, &input.name)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(ApiResponse::ok(department)))
}

/// DELETE /api/v1/departments/{id}
pub async fn delete_department(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !DepartmentRepo::delete(&state.pool, admin.company_id, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(department_id = id, company_id = admin.company_id, "Department deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Department",
        id,
    })
}
