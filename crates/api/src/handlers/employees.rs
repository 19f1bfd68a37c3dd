//! Handlers for `/employees`: listing company users and assigning them to a
//! department or designation.

use axum::extract::{Path, Query, State};
use axum::Json;
use hrflow_core::error::CoreError;
use hrflow_core::types::DbId;
use hrflow_db::models::user::{User, UserResponse};
use hrflow_db::repositories::{DepartmentRepo, DesignationRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/employees
pub async fn list_employees(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Vec<UserResponse>>>> {
    let (limit, offset) = params.resolve();
    let users = UserRepo::list_by_company(&state.pool, admin.company_id, limit, offset).await?;
    Ok(Json(ApiResponse::ok(
        users.into_iter().map(UserResponse::from).collect(),
    )))
}

/// PUT /api/v1/employees/{id}/department/{department_id}
pub async fn assign_department(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path((id, department_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    if !DepartmentRepo::exists(&state.pool, admin.company_id, department_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Department",
            id: department_id,
        }));
    }
    let user = UserRepo::set_department(&state.pool, admin.company_id, id, Some(department_id))
        .await?;

    tracing::info!(user_id = id, department_id, "Employee assigned to department");
    respond(user, id)
}

/// DELETE /api/v1/employees/{id}/department
pub async fn clear_department(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let user = UserRepo::set_department(&state.pool, admin.company_id, id, None).await?;
    respond(user, id)
}

/// PUT /api/v1/employees/{id}/designation/{designation_id}
pub async fn assign_designation(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path((id, designation_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    if !DesignationRepo::exists(&state.pool, admin.company_id, designation_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Designation",
            id: designation_id,
        }));
    }
    let user = UserRepo::set_designation(&state.pool, admin.company_id, id, Some(designation_id))
        .await?;

    tracing::info!(user_id = id, designation_id, "Employee assigned to designation");
    respond(user, id)
}

/// DELETE /api/v1/employees/{id}/designation
pub async fn clear_designation(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let user = UserRepo::set_designation(&state.pool, admin.company_id, id, None).await?;
    respond(user, id)
}

/// Users outside the admin's company come back as `None` and read as 404.
fn respond(user: Option<User>, id: DbId) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let user = user.ok_or(AppError::Core(CoreError::NotFound {
        entity: "User",
        id,
    }))?;
    Ok(Json(ApiResponse::ok(UserResponse::from(user))))
}
