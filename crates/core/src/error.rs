use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// Not-found for lookups that are not keyed by a numeric id
    /// (invitation tokens, "the active session for this user").
    #[error("Not found: {0}")]
    Missing(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    /// The request is well-formed but not acceptable in the current state
    /// (expired or used invitation, malformed embedded JSON, wrong status).
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
