//! Route definitions for the `/onboarding` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::onboarding;
use crate::state::AppState;

/// Routes mounted at `/onboarding`.
///
/// ```text
/// POST /invite                                  -> invite (admin)
/// GET  /sessions                                -> list_sessions (admin)
///
/// GET  /session/{token}                         -> get_session (public)
/// GET  /session/status/{token}                  -> session_status (public)
/// PUT  /session/step/{token}                    -> update_step (public)
/// POST /activate                                -> activate (public)
///
/// GET  /my-data                                 -> get_my_data
/// PUT  /my-data                                 -> update_my_data
/// PUT  /todos/{todo_id}                         -> update_todo
/// PUT  /review                                  -> review (multipart)
/// POST /documents/submit/{document_template_id} -> submit_document (multipart)
/// POST /submit                                  -> submit
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/invite", post(onboarding::invite))
        .route("/sessions", get(onboarding::list_sessions))
        .route("/session/{token}", get(onboarding::get_session))
        .route("/session/status/{token}", get(onboarding::session_status))
        .route("/session/step/{token}", put(onboarding::update_step))
        .route("/activate", post(onboarding::activate))
        .route(
            "/my-data",
            get(onboarding::get_my_data).put(onboarding::update_my_data),
        )
        .route("/todos/{todo_id}", put(onboarding::update_todo))
        .route("/review", put(onboarding::review))
        .route(
            "/documents/submit/{document_template_id}",
            post(onboarding::submit_document),
        )
        .route("/submit", post(onboarding::submit))
}
