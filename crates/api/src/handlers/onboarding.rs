//! Handlers for the `/onboarding` resource.
//!
//! Three audiences share this module: admins issue invitations and list
//! sessions, the invited new hire drives the public token-addressed wizard
//! steps, and the activated (still inactive) employee uses the
//! authenticated self-service endpoints until they submit.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use hrflow_core::notification::DeliveryStatus;
use hrflow_core::onboarding::{InviteRequest, OnboardingStatus, ProfilePatch};
use hrflow_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use hrflow_core::types::DbId;
use hrflow_db::models::document_submission::DocumentSubmission;
use hrflow_db::models::onboarding_session::{OnboardingSession, SessionSummary};
use hrflow_db::repositories::OnboardingSessionRepo;
use serde::{Deserialize, Serialize};

use crate::engine::onboarding::{OnboardingView, TodoView};
use crate::engine::OnboardingEngine;
use crate::error::AppResult;
use crate::handlers::auth::TokenResponse;
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::multipart::FormData;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Multipart part carrying an optional profile picture.
const PROFILE_PICTURE_PART: &str = "profilePic";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Response for `POST /onboarding/invite`.
#[derive(Debug, Serialize)]
pub struct InvitationResponse {
    #[serde(flatten)]
    pub session: SessionSummary,
    pub notification: DeliveryStatus,
}

/// `{status, current_step}` of a session.
#[derive(Debug, Serialize)]
pub struct SessionStatusResponse {
    pub status: String,
    pub current_step: i32,
}

impl From<&OnboardingSession> for SessionStatusResponse {
    fn from(s: &OnboardingSession) -> Self {
        Self {
            status: s.status.clone(),
            current_step: s.current_step,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StepUpdateRequest {
    pub current_step: i32,
}

#[derive(Debug, Deserialize)]
pub struct ActivateRequest {
    pub token: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct TodoUpdateRequest {
    pub completed: bool,
}

/// Query parameters for `GET /onboarding/sessions`.
#[derive(Debug, Deserialize)]
pub struct SessionListParams {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

/// POST /api/v1/onboarding/invite
///
/// Multipart form of invitation fields plus an optional `profilePic`.
pub async fn invite(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut form = FormData::collect(multipart).await?;
    let picture = form.take_file(PROFILE_PICTURE_PART);
    let request = InviteRequest::from_form(&form.fields)?;

    let invitation = OnboardingEngine::from_state(&state)
        .invite(admin.company_id, request, picture)
        .await?;

    tracing::info!(
        session_id = invitation.session.id,
        user_id = admin.user_id,
        notification = ?invitation.notification,
        "Onboarding invitation issued",
    );

    let body = InvitationResponse {
        session: SessionSummary::from(&invitation.session),
        notification: invitation.notification,
    };
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(body, "Invitation created")),
    ))
}

/// GET /api/v1/onboarding/sessions
///
/// Company sessions, newest first, optionally filtered by `status`.
pub async fn list_sessions(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<SessionListParams>,
) -> AppResult<Json<ApiResponse<Vec<SessionSummary>>>> {
    let status = params
        .status
        .as_deref()
        .map(OnboardingStatus::from_str_db)
        .transpose()?;
    let limit = clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT);
    let offset = clamp_offset(params.offset);

    let sessions =
        OnboardingSessionRepo::list(&state.pool, admin.company_id, status, limit, offset).await?;

    Ok(Json(ApiResponse::ok(
        sessions.iter().map(SessionSummary::from).collect(),
    )))
}

// ---------------------------------------------------------------------------
// Public, token-addressed
// ---------------------------------------------------------------------------

/// GET /api/v1/onboarding/session/{token}
///
/// Pre-fill data for a valid pending invitation.
pub async fn get_session(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<ApiResponse<OnboardingSession>>> {
    let session = OnboardingEngine::from_state(&state).resolve(&token).await?;
    Ok(Json(ApiResponse::ok(session)))
}

/// GET /api/v1/onboarding/session/status/{token}
pub async fn session_status(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<ApiResponse<SessionStatusResponse>>> {
    let session = OnboardingEngine::from_state(&state).status(&token).await?;
    Ok(Json(ApiResponse::ok(SessionStatusResponse::from(&session))))
}

/// PUT /api/v1/onboarding/session/step/{token}
pub async fn update_step(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(input): Json<StepUpdateRequest>,
) -> AppResult<Json<ApiResponse<SessionStatusResponse>>> {
    let session = OnboardingEngine::from_state(&state)
        .update_step(&token, input.current_step)
        .await?;
    Ok(Json(ApiResponse::ok(SessionStatusResponse::from(&session))))
}

/// POST /api/v1/onboarding/activate
///
/// Exchange an invitation token and a chosen password for an account.
pub async fn activate(
    State(state): State<AppState>,
    Json(input): Json<ActivateRequest>,
) -> AppResult<Json<ApiResponse<TokenResponse>>> {
    let activation = OnboardingEngine::from_state(&state)
        .activate(&input.token, &input.password)
        .await?;
    Ok(Json(ApiResponse::with_message(
        TokenResponse::bearer(activation.access_token),
        "Account activated",
    )))
}

// ---------------------------------------------------------------------------
// Self-service
// ---------------------------------------------------------------------------

/// GET /api/v1/onboarding/my-data
///
/// The materialized onboarding view of the caller's in-progress session.
pub async fn get_my_data(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<OnboardingView>>> {
    let engine = OnboardingEngine::from_state(&state);
    let session = engine.active_session_for(user.user_id).await?;
    let view = engine.materialize(session).await?;
    Ok(Json(ApiResponse::ok(view)))
}

/// PUT /api/v1/onboarding/my-data
///
/// JSON patch of the whitelisted profile fields.
pub async fn update_my_data(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(patch): Json<ProfilePatch>,
) -> AppResult<Json<ApiResponse<OnboardingView>>> {
    let patch = patch.normalized()?;
    let engine = OnboardingEngine::from_state(&state);
    let session = engine.active_session_for(user.user_id).await?;
    let view = engine.review_update(session, patch, None).await?;
    Ok(Json(ApiResponse::with_message(view, "Profile updated")))
}

/// PUT /api/v1/onboarding/todos/{todo_id}
pub async fn update_todo(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(todo_id): Path<DbId>,
    Json(input): Json<TodoUpdateRequest>,
) -> AppResult<Json<ApiResponse<TodoView>>> {
    let engine = OnboardingEngine::from_state(&state);
    let session = engine.active_session_for(user.user_id).await?;
    let task = engine
        .update_todo(&session, todo_id, input.completed)
        .await?;
    Ok(Json(ApiResponse::ok(TodoView::from(task))))
}

/// PUT /api/v1/onboarding/review
///
/// Multipart: profile fields plus an optional `profilePic`.
pub async fn review(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<OnboardingView>>> {
    let mut form = FormData::collect(multipart).await?;
    let picture = form.take_file(PROFILE_PICTURE_PART);
    let patch = ProfilePatch::from_form(&form.fields)?;

    let engine = OnboardingEngine::from_state(&state);
    let session = engine.active_session_for(user.user_id).await?;
    let view = engine.review_update(session, patch, picture).await?;
    Ok(Json(ApiResponse::with_message(view, "Review saved")))
}

/// POST /api/v1/onboarding/documents/submit/{document_template_id}
///
/// Multipart: `employee_id`, `fields` (a JSON object), and any files.
pub async fn submit_document(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(document_template_id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let form = FormData::collect(multipart).await?;

    let engine = OnboardingEngine::from_state(&state);
    let session = engine.active_session_for(user.user_id).await?;
    let submission: DocumentSubmission = engine
        .save_document_submission(&session, document_template_id, form)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(submission, "Document submitted")),
    ))
}

/// POST /api/v1/onboarding/submit
///
/// Final step of the wizard. Activates the caller's account.
pub async fn submit(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<SessionStatusResponse>>> {
    let session = OnboardingEngine::from_state(&state)
        .submit(user.user_id)
        .await?;
    Ok(Json(ApiResponse::with_message(
        SessionStatusResponse::from(&session),
        "Onboarding submitted",
    )))
}
