use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use hrflow_core::error::CoreError;
use hrflow_core::storage::StorageError;
use serde_json::json;
use validator::{ValidationErrors, ValidationErrorsKind};

/// Message carried by every 422 response; the details go in `errors`.
pub const VALIDATION_MESSAGE: &str = "Validation failed. Please check the provided data.";

const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce the `{success, message, errors}`
/// error envelope.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `hrflow_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// An object storage backend failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Request body failed `validator` rules.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => {
                    single(StatusCode::NOT_FOUND, format!("{entity} with id {id} not found"))
                }
                CoreError::Missing(msg) => single(StatusCode::NOT_FOUND, msg.clone()),
                CoreError::Validation(msg) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    VALIDATION_MESSAGE.to_string(),
                    vec![msg.clone()],
                ),
                CoreError::BadRequest(msg) => single(StatusCode::BAD_REQUEST, msg.clone()),
                CoreError::Conflict(msg) => single(StatusCode::CONFLICT, msg.clone()),
                CoreError::Unauthorized(msg) => single(StatusCode::UNAUTHORIZED, msg.clone()),
                CoreError::Forbidden(msg) => single(StatusCode::FORBIDDEN, msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal()
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            AppError::Storage(err) => {
                tracing::error!(error = %err, "Object storage error");
                internal()
            }

            AppError::Validation(errs) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                VALIDATION_MESSAGE.to_string(),
                validation_messages(errs),
            ),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => single(StatusCode::BAD_REQUEST, msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "success": false,
            "message": message,
            "errors": errors,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn single(status: StatusCode, message: String) -> (StatusCode, String, Vec<String>) {
    (status, message.clone(), vec![message])
}

fn internal() -> (StatusCode, String, Vec<String>) {
    single(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
}

/// Flatten `validator` errors into `Field 'path': message` lines, sorted by
/// field path. Nested structs and lists extend the path (`fields[0].label`).
pub fn validation_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut out = Vec::new();
    collect_messages("", errors, &mut out);
    out.sort();
    out
}

fn collect_messages(prefix: &str, errors: &ValidationErrors, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                for err in list {
                    let detail = match &err.message {
                        Some(msg) => msg.to_string(),
                        None => format!("failed '{}' check", err.code),
                    };
                    out.push(format!("Field '{path}': {detail}"));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_messages(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_messages(&format!("{path}[{index}]"), inner, out);
                }
            }
        }
    }
}

/// Classify a sqlx error into an HTTP status, message, and error list.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Foreign key violations map to 409 (the row is still referenced, or
///   references something that is gone).
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, String, Vec<String>) {
    match err {
        sqlx::Error::RowNotFound => single(StatusCode::NOT_FOUND, "Resource not found".to_string()),
        sqlx::Error::Database(db_err) => {
            let constraint = db_err.constraint().unwrap_or("unknown");
            match db_err.code().as_deref() {
                // PostgreSQL unique constraint violation
                Some("23505") if constraint.starts_with("uq_") => {
                    return single(
                        StatusCode::CONFLICT,
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
                // PostgreSQL foreign key violation
                Some("23503") => {
                    return single(
                        StatusCode::CONFLICT,
                        format!("Operation violates reference constraint: {constraint}"),
                    );
                }
                _ => {}
            }
            tracing::error!(error = %db_err, "Database error");
            internal()
        }
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}
