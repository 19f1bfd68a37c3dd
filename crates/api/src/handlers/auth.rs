//! Handlers for the `/auth` resource (login, company registration, me).

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use hrflow_core::error::CoreError;
use hrflow_core::roles::ROLE_ADMIN;
use hrflow_core::types::DbId;
use hrflow_db::models::user::{CreateUser, UserResponse};
use hrflow_db::repositories::{CompanyRepo, OnboardingSessionRepo, UserRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::{generate_access_token, TOKEN_TYPE};
use crate::auth::password::{
    hash_password, validate_password_strength, verify_password, MIN_PASSWORD_LENGTH,
};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Maximum consecutive failed login attempts before locking the account.
const MAX_FAILED_ATTEMPTS: i32 = 5;

/// Duration in minutes to lock an account after exceeding failed attempts.
const LOCK_DURATION_MINS: i64 = 15;

const INVALID_CREDENTIALS: &str = "Incorrect email or password";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Bearer token returned by login and by onboarding activation.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: TOKEN_TYPE,
        }
    }
}

/// Request body for `POST /auth/register-company`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterCompanyRequest {
    #[validate(length(min = 1, max = 200))]
    pub company_name: String,
    #[validate(email)]
    pub admin_email: String,
    pub admin_password: String,
}

#[derive(Debug, Serialize)]
pub struct CompanyInfo {
    pub id: DbId,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct AdminInfo {
    pub id: DbId,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterCompanyResponse {
    pub company: CompanyInfo,
    pub admin: AdminInfo,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Returns a bearer access token.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<TokenResponse>>> {
    let now = state.clock.now();

    // 1. Find user by email.
    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized(INVALID_CREDENTIALS.into())))?;

    // 2. Check if the account is temporarily locked.
    if let Some(locked_until) = user.locked_until {
        if locked_until > now {
            return Err(AppError::Core(CoreError::Forbidden(
                "Account is temporarily locked. Try again later.".into(),
            )));
        }
    }

    // 3. Verify password.
    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        // 4. On failure: increment counter, lock if threshold exceeded.
        UserRepo::increment_failed_login(&state.pool, user.id).await?;

        let new_count = user.failed_login_count + 1;
        if new_count >= MAX_FAILED_ATTEMPTS {
            let lock_until = now + chrono::Duration::minutes(LOCK_DURATION_MINS);
            UserRepo::lock_account(&state.pool, user.id, lock_until).await?;
            tracing::warn!(user_id = user.id, "Account locked after repeated failed logins");
        }

        return Err(AppError::Core(CoreError::Unauthorized(
            INVALID_CREDENTIALS.into(),
        )));
    }

    // 5. Inactive accounts may only sign in to resume onboarding.
    if !user.is_active
        && OnboardingSessionRepo::find_active_by_email(&state.pool, &user.email)
            .await?
            .is_none()
    {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is inactive".into(),
        )));
    }

    // 6. On success: reset failed count, set last_login_at.
    UserRepo::record_successful_login(&state.pool, user.id).await?;

    let access_token = generate_access_token(
        user.id,
        user.company_id,
        &user.role,
        &user.email,
        &state.config.jwt,
    )
    .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(user_id = user.id, company_id = user.company_id, "User logged in");

    Ok(Json(ApiResponse::with_message(
        TokenResponse::bearer(access_token),
        "Login successful",
    )))
}

/// POST /api/v1/auth/register-company
///
/// Create a company and its first admin account in one transaction.
pub async fn register_company(
    State(state): State<AppState>,
    Json(input): Json<RegisterCompanyRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    validate_password_strength(&input.admin_password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| CoreError::Validation(format!("Field 'admin_password': {msg}")))?;

    let email = input.admin_email.trim().to_lowercase();
    if UserRepo::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "A user with email {email} is already registered"
        ))));
    }

    let password_hash = hash_password(&input.admin_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let admin = CreateUser {
        email,
        password_hash,
        role: ROLE_ADMIN.to_string(),
        is_active: true,
        ..CreateUser::default()
    };
    let (company, user) =
        CompanyRepo::create_with_admin(&state.pool, input.company_name.trim(), &admin).await?;

    tracing::info!(company_id = company.id, user_id = user.id, "Company registered");

    let body = RegisterCompanyResponse {
        company: CompanyInfo {
            id: company.id,
            name: company.name,
        },
        admin: AdminInfo {
            id: user.id,
            email: user.email,
            role: user.role,
        },
    };
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(body, "Company registered")),
    ))
}

/// GET /api/v1/auth/me
///
/// Profile of the authenticated user.
pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let user = UserRepo::find_in_company(&state.pool, auth_user.company_id, auth_user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth_user.user_id,
        }))?;

    Ok(Json(ApiResponse::ok(UserResponse::from(user))))
}
