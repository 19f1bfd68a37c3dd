pub mod auth;
pub mod health;
pub mod onboarding;
pub mod organization;
pub mod templates;
pub mod timesheets;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                      login (public)
/// /auth/register-company                           create company + admin (public)
/// /auth/me                                         current user (requires auth)
///
/// /onboarding/invite                               issue invitation (admin)
/// /onboarding/sessions                             list sessions (admin)
/// /onboarding/session/{token}                      pre-fill data (public)
/// /onboarding/session/status/{token}               status + step (public)
/// /onboarding/session/step/{token}                 set wizard step (public)
/// /onboarding/activate                             token + password -> account (public)
/// /onboarding/my-data                              get, patch own data
/// /onboarding/todos/{todo_id}                      tick checklist item
/// /onboarding/review                               review profile (multipart)
/// /onboarding/documents/submit/{id}                upload document (multipart)
/// /onboarding/submit                               finish onboarding
///
/// /onboarding-templates                            list, create (admin)
/// /onboarding-templates/{id}                       get, update, delete
///
/// /document-templates                              list, create (admin)
/// /document-templates/{id}                         get, update, delete
/// /document-templates/{id}/submissions             submissions for template
/// /document-submissions/{id}/status                approve / reject submission
///
/// /departments, /designations                      list, create (admin)
/// /departments/{id}, /designations/{id}            get, update, delete
/// /employees                                       list company users (admin)
/// /employees/{id}/department[/{department_id}]     assign, clear
/// /employees/{id}/designation[/{designation_id}]   assign, clear
///
/// /timesheets/my-timesheet                         own sheet for a period
/// /timesheets/my-timesheet/entries[/{entry_id}]    add, update, delete entries
/// /timesheets/my-timesheet/submit                  submit for review
/// /timesheets/admin/submissions                    review queue (admin)
/// /timesheets/admin/submissions/{id}/approve       approve
/// /timesheets/admin/submissions/{id}/reject        reject
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication and company sign-up.
        .nest("/auth", auth::router())
        // Invitation, wizard, and self-service.
        .nest("/onboarding", onboarding::router())
        // Template management.
        .nest("/onboarding-templates", templates::onboarding_router())
        .nest("/document-templates", templates::document_router())
        .nest("/document-submissions", templates::submission_router())
        // Company settings.
        .nest("/departments", organization::departments_router())
        .nest("/designations", organization::designations_router())
        .nest("/employees", organization::employees_router())
        // Weekly timesheets.
        .nest("/timesheets", timesheets::router())
}
