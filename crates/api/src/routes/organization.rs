//! Route definitions for company settings: departments, designations, and
//! employee assignment.

use axum::routing::{delete, get, put};
use axum::Router;

use crate::handlers::{departments, designations, employees};
use crate::state::AppState;

/// Routes mounted at `/departments`.
pub fn departments_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(departments::list_departments).post(departments::create_department),
        )
        .route(
            "/{id}",
            get(departments::get_department)
                .put(departments::update_department)
                .delete(departments::delete_department),
        )
}

/// Routes mounted at `/designations`.
pub fn designations_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(designations::list_designations).post(designations::create_designation),
        )
        .route(
            "/{id}",
            get(designations::get_designation)
                .put(designations::update_designation)
                .delete(designations::delete_designation),
        )
}

/// Routes mounted at `/employees`.
///
/// ```text
/// GET    /                                  -> list_employees
/// PUT    /{id}/department/{department_id}   -> assign_department
/// DELETE /{id}/department                   -> clear_department
/// PUT    /{id}/designation/{designation_id} -> assign_designation
/// DELETE /{id}/designation                  -> clear_designation
/// ```
pub fn employees_router() -> Router<AppState> {
    Router::new()
        .route("/", get(employees::list_employees))
        .route(
            "/{id}/department/{department_id}",
            put(employees::assign_department),
        )
        .route("/{id}/department", delete(employees::clear_department))
        .route(
            "/{id}/designation/{designation_id}",
            put(employees::assign_designation),
        )
        .route("/{id}/designation", delete(employees::clear_designation))
}
