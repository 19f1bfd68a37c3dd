//! Handlers for `/timesheets`: the employee's own weekly sheet and the
//! admin review queue.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::NaiveDate;
use hrflow_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use hrflow_core::timesheet::TimesheetStatus;
use hrflow_core::types::DbId;
use hrflow_db::models::timesheet::{
    CreateTimeEntry, TimeEntry, Timesheet, TimesheetSubmission, TimesheetWithEntries,
    UpdateTimeEntry,
};
use serde::Deserialize;

use crate::engine::TimesheetEngine;
use crate::error::AppResult;
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// `?start_date=&end_date=` selecting a timesheet period.
#[derive(Debug, Default, Deserialize)]
pub struct PeriodParams {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Query parameters for `GET /timesheets/admin/submissions`.
#[derive(Debug, Deserialize)]
pub struct SubmissionQueueParams {
    /// Defaults to `Submitted`.
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RejectRequest {
    pub reason: Option<String>,
}

// ---------------------------------------------------------------------------
// Employee
// ---------------------------------------------------------------------------

/// GET /api/v1/timesheets/my-timesheet
pub async fn my_timesheet(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Query(period): Query<PeriodParams>,
) -> AppResult<Json<ApiResponse<TimesheetWithEntries>>> {
    let sheet = TimesheetEngine::from_state(&state)
        .my_timesheet(user.user_id, period.start_date, period.end_date)
        .await?;
    Ok(Json(ApiResponse::ok(sheet)))
}

/// POST /api/v1/timesheets/my-timesheet/entries
pub async fn create_entry(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Query(period): Query<PeriodParams>,
    Json(input): Json<CreateTimeEntry>,
) -> AppResult<impl IntoResponse> {
    let entry = TimesheetEngine::from_state(&state)
        .add_entry(user.user_id, period.start_date, period.end_date, &input)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(entry))))
}

/// PUT /api/v1/timesheets/my-timesheet/entries/{entry_id}
pub async fn update_entry(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(entry_id): Path<DbId>,
    Json(input): Json<UpdateTimeEntry>,
) -> AppResult<Json<ApiResponse<TimeEntry>>> {
    let entry = TimesheetEngine::from_state(&state)
        .update_entry(user.user_id, entry_id, &input)
        .await?;
    Ok(Json(ApiResponse::ok(entry)))
}

/// DELETE /api/v1/timesheets/my-timesheet/entries/{entry_id}
pub async fn delete_entry(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(entry_id): Path<DbId>,
) -> AppResult<StatusCode> {
    TimesheetEngine::from_state(&state)
        .delete_entry(user.user_id, entry_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/timesheets/my-timesheet/submit
pub async fn submit(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Query(period): Query<PeriodParams>,
) -> AppResult<Json<ApiResponse<Timesheet>>> {
    let sheet = TimesheetEngine::from_state(&state)
        .submit(user.user_id, period.start_date, period.end_date)
        .await?;
    Ok(Json(ApiResponse::with_message(sheet, "Timesheet submitted")))
}

// ---------------------------------------------------------------------------
// Admin review
// ---------------------------------------------------------------------------

/// GET /api/v1/timesheets/admin/submissions
pub async fn list_submissions(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<SubmissionQueueParams>,
) -> AppResult<Json<ApiResponse<Vec<TimesheetSubmission>>>> {
    let status = match params.status.as_deref() {
        Some(s) => TimesheetStatus::from_str_db(s)?,
        None => TimesheetStatus::Submitted,
    };
    let submissions = TimesheetEngine::from_state(&state)
        .list_submissions(
            admin.company_id,
            status,
            clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT),
            clamp_offset(params.offset),
        )
        .await?;
    Ok(Json(ApiResponse::ok(submissions)))
}

/// PUT /api/v1/timesheets/admin/submissions/{id}/approve
pub async fn approve(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<Timesheet>>> {
    let sheet = TimesheetEngine::from_state(&state)
        .review(
            admin.user_id,
            admin.company_id,
            id,
            TimesheetStatus::Approved,
            None,
        )
        .await?;
    Ok(Json(ApiResponse::with_message(sheet, "Timesheet approved")))
}

/// PUT /api/v1/timesheets/admin/submissions/{id}/reject
///
/// The body is optional; `{reason}` is stored as the rejection reason.
pub async fn reject(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    input: Option<Json<RejectRequest>>,
) -> AppResult<Json<ApiResponse<Timesheet>>> {
    let input = input.map(|Json(body)| body).unwrap_or_default();
    let sheet = TimesheetEngine::from_state(&state)
        .review(
            admin.user_id,
            admin.company_id,
            id,
            TimesheetStatus::Rejected,
            input.reason.as_deref(),
        )
        .await?;
    Ok(Json(ApiResponse::with_message(sheet, "Timesheet rejected")))
}
