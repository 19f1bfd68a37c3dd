//! Route definitions for the `/timesheets` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::timesheets;
use crate::state::AppState;

/// Routes mounted at `/timesheets`.
///
/// ```text
/// GET    /my-timesheet                         -> my_timesheet
/// POST   /my-timesheet/entries                 -> create_entry
/// PUT    /my-timesheet/entries/{entry_id}      -> update_entry
/// DELETE /my-timesheet/entries/{entry_id}      -> delete_entry
/// POST   /my-timesheet/submit                  -> submit
/// GET    /admin/submissions                    -> list_submissions (admin)
/// PUT    /admin/submissions/{id}/approve       -> approve (admin)
/// PUT    /admin/submissions/{id}/reject        -> reject (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/my-timesheet", get(timesheets::my_timesheet))
        .route("/my-timesheet/entries", post(timesheets::create_entry))
        .route(
            "/my-timesheet/entries/{entry_id}",
            put(timesheets::update_entry).delete(timesheets::delete_entry),
        )
        .route("/my-timesheet/submit", post(timesheets::submit))
        .route("/admin/submissions", get(timesheets::list_submissions))
        .route("/admin/submissions/{id}/approve", put(timesheets::approve))
        .route("/admin/submissions/{id}/reject", put(timesheets::reject))
}
