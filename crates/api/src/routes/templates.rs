//! Route definitions for onboarding and document templates.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::{document_templates, onboarding_templates};
use crate::state::AppState;

/// Onboarding template routes mounted at `/onboarding-templates`.
///
/// ```text
/// GET    /      -> list_templates
/// POST   /      -> create_template
/// GET    /{id}  -> get_template
/// PUT    /{id}  -> update_template
/// DELETE /{id}  -> delete_template
/// ```
pub fn onboarding_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(onboarding_templates::list_templates).post(onboarding_templates::create_template),
        )
        .route(
            "/{id}",
            get(onboarding_templates::get_template)
                .put(onboarding_templates::update_template)
                .delete(onboarding_templates::delete_template),
        )
}

/// Document template routes mounted at `/document-templates`.
///
/// ```text
/// GET    /                  -> list_templates
/// POST   /                  -> create_template
/// GET    /{id}              -> get_template
/// PUT    /{id}              -> update_template
/// DELETE /{id}              -> delete_template
/// GET    /{id}/submissions  -> list_submissions
/// ```
pub fn document_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(document_templates::list_templates).post(document_templates::create_template),
        )
        .route(
            "/{id}",
            get(document_templates::get_template)
                .put(document_templates::update_template)
                .delete(document_templates::delete_template),
        )
        .route("/{id}/submissions", get(document_templates::list_submissions))
}

/// Submission review routes mounted at `/document-submissions`.
///
/// ```text
/// PUT /{id}/status  -> review_submission
/// ```
pub fn submission_router() -> Router<AppState> {
    Router::new().route("/{id}/status", put(document_templates::review_submission))
}
