//! Integration tests for `/api/v1/onboarding-templates`,
//! `/api/v1/document-templates`, and `/api/v1/document-submissions`.

mod common;

use axum::http::{Method, StatusCode};
use axum::Router;
use common::{
    body_json, delete_auth, get_auth, invite_form, multipart_auth, onboard_employee,
    post_json_auth, put_json_auth, register_company, Admin, Fakes, MultipartForm,
};
use serde_json::{json, Value};
use sqlx::PgPool;

async fn create_document_template(app: &Router, admin: &Admin, name: &str) -> i64 {
    let response = post_json_auth(
        app.clone(),
        "/api/v1/document-templates",
        &admin.token,
        json!({ "name": name }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

async fn create_onboarding_template(app: &Router, admin: &Admin, body: Value) -> Value {
    let response = post_json_auth(
        app.clone(),
        "/api/v1/onboarding-templates",
        &admin.token,
        body,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

fn titles(detail: &Value) -> Vec<String> {
    detail["todos"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Onboarding templates
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn onboarding_template_crud(pool: PgPool) {
    let app = common::build_test_app(pool);
    let admin = register_company(&app, "Acme", "boss@acme.test").await;
    let passport = create_document_template(&app, &admin, "Passport").await;
    let nda = create_document_template(&app, &admin, "NDA").await;

    let detail = create_onboarding_template(
        &app,
        &admin,
        json!({
            "name": "  Engineering  ",
            "todos": [
                { "title": "Laptop", "order_index": 2 },
                { "title": "Badge", "order_index": 1 },
            ],
            "required_document_ids": [passport],
            "optional_document_ids": [nda],
        }),
    )
    .await;
    let id = detail["id"].as_i64().unwrap();
    assert_eq!(detail["name"], "Engineering");
    assert_eq!(titles(&detail), vec!["Badge", "Laptop"]);
    assert_eq!(detail["required_documents"][0]["name"], "Passport");
    assert_eq!(detail["optional_documents"][0]["name"], "NDA");

    let response = get_auth(app.clone(), "/api/v1/onboarding-templates", &admin.token).await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);

    // Rename, keep one todo by id, add one, drop the other.
    let badge_id = detail["todos"][0]["id"].as_i64().unwrap();
    let response = put_json_auth(
        app.clone(),
        &format!("/api/v1/onboarding-templates/{id}"),
        &admin.token,
        json!({
            "name": "Eng",
            "todos": [
                { "id": badge_id, "title": "Badge photo", "order_index": 0 },
                { "title": "Payroll form", "order_index": 1 },
            ],
            "optional_document_ids": [],
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await["data"].clone();
    assert_eq!(updated["name"], "Eng");
    assert_eq!(titles(&updated), vec!["Badge photo", "Payroll form"]);
    assert_eq!(updated["todos"][0]["id"], badge_id);
    assert_eq!(updated["required_documents"].as_array().unwrap().len(), 1);
    assert!(updated["optional_documents"].as_array().unwrap().is_empty());

    let response = delete_auth(
        app.clone(),
        &format!("/api/v1/onboarding-templates/{id}"),
        &admin.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(
        app,
        &format!("/api/v1/onboarding-templates/{id}"),
        &admin.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn foreign_document_ids_are_dropped(pool: PgPool) {
    let app = common::build_test_app(pool);
    let acme = register_company(&app, "Acme", "boss@acme.test").await;
    let globex = register_company(&app, "Globex", "boss@globex.test").await;
    let own = create_document_template(&app, &acme, "Passport").await;
    let foreign = create_document_template(&app, &globex, "Secret").await;

    let detail = create_onboarding_template(
        &app,
        &acme,
        json!({ "name": "Sales", "required_document_ids": [own, foreign] }),
    )
    .await;

    let ids: Vec<i64> = detail["required_documents"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![own]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn templates_are_invisible_to_other_companies(pool: PgPool) {
    let app = common::build_test_app(pool);
    let acme = register_company(&app, "Acme", "boss@acme.test").await;
    let globex = register_company(&app, "Globex", "boss@globex.test").await;
    let detail = create_onboarding_template(&app, &acme, json!({ "name": "Sales" })).await;
    let id = detail["id"].as_i64().unwrap();

    let uri = format!("/api/v1/onboarding-templates/{id}");
    assert_eq!(
        get_auth(app.clone(), &uri, &globex.token).await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        put_json_auth(app.clone(), &uri, &globex.token, json!({ "name": "Mine" }))
            .await
            .status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        delete_auth(app.clone(), &uri, &globex.token).await.status(),
        StatusCode::NOT_FOUND
    );

    let response = get_auth(app, "/api/v1/onboarding-templates", &globex.token).await;
    assert!(body_json(response).await["data"]
        .as_array()
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn todo_update_rejects_items_of_another_template(pool: PgPool) {
    let app = common::build_test_app(pool);
    let admin = register_company(&app, "Acme", "boss@acme.test").await;
    let first = create_onboarding_template(
        &app,
        &admin,
        json!({ "name": "First", "todos": [{ "title": "A" }] }),
    )
    .await;
    let second = create_onboarding_template(&app, &admin, json!({ "name": "Second" })).await;
    let foreign_todo = first["todos"][0]["id"].as_i64().unwrap();

    let response = put_json_auth(
        app,
        &format!("/api/v1/onboarding-templates/{}", second["id"]),
        &admin.token,
        json!({ "todos": [{ "id": foreign_todo, "title": "Stolen" }] }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn assigned_todos_cannot_be_removed(pool: PgPool) {
    let fakes = Fakes::default();
    let app = common::build_test_app_with(pool, &fakes);
    let admin = register_company(&app, "Acme", "boss@acme.test").await;
    let detail = create_onboarding_template(
        &app,
        &admin,
        json!({ "name": "Eng", "todos": [{ "title": "Laptop" }, { "title": "Badge" }] }),
    )
    .await;
    let id = detail["id"].as_i64().unwrap();

    // An employee views their checklist, which assigns both todos.
    let form = invite_form("new.hire@acme.test").text("onboardingTemplateId", &id.to_string());
    let (_, employee) =
        onboard_employee(&app, &fakes, &admin, form, "employee-password-1").await;
    let response = get_auth(app.clone(), "/api/v1/onboarding/my-data", &employee).await;
    assert_eq!(response.status(), StatusCode::OK);

    let uri = format!("/api/v1/onboarding-templates/{id}");
    let keep = detail["todos"][0]["id"].as_i64().unwrap();
    let response = put_json_auth(
        app.clone(),
        &uri,
        &admin.token,
        json!({ "todos": [{ "id": keep, "title": "Laptop" }] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = delete_auth(app.clone(), &uri, &admin.token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        body_json(response).await["message"],
        "Template has todo items already assigned to onboarding sessions"
    );

    // Renaming and adding items is still fine.
    let response = put_json_auth(
        app.clone(),
        &uri,
        &admin.token,
        json!({ "todos": [
            { "id": keep, "title": "Laptop" },
            { "id": detail["todos"][1]["id"], "title": "Access badge" },
            { "title": "Welcome lunch" },
        ] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await["data"].clone();
    assert_eq!(updated["todos"].as_array().unwrap().len(), 3);
    assert_eq!(updated["todos"][1]["title"], "Access badge");

    // Existing tasks keep the title they were created with; the new item is
    // picked up on the next read.
    let response = get_auth(app, "/api/v1/onboarding/my-data", &employee).await;
    assert_eq!(response.status(), StatusCode::OK);
    let view = body_json(response).await;
    let titles: Vec<&str> = view["data"]["todos"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Laptop", "Badge", "Welcome lunch"]);
    assert_eq!(view["data"]["todos"][2]["is_completed"], false);
}

// ---------------------------------------------------------------------------
// Document templates
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn document_template_crud(pool: PgPool) {
    let app = common::build_test_app(pool);
    let admin = register_company(&app, "Acme", "boss@acme.test").await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/document-templates",
        &admin.token,
        json!({
            "name": "Bank details",
            "fields": [
                { "label": "IBAN", "field_type": "text", "required": true, "width": "half" },
                { "label": "Statement", "field_type": "file" },
            ],
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let detail = body_json(response).await["data"].clone();
    let id = detail["id"].as_i64().unwrap();
    assert_eq!(detail["fields"][0]["label"], "IBAN");
    assert_eq!(detail["fields"][0]["is_required"], true);
    assert_eq!(detail["fields"][0]["width"], "half");
    assert_eq!(detail["fields"][1]["field_type"], "file");
    assert_eq!(detail["fields"][1]["width"], "full");
    assert_eq!(detail["fields"][1]["order_index"], 1);

    let uri = format!("/api/v1/document-templates/{id}");
    let response = put_json_auth(
        app.clone(),
        &uri,
        &admin.token,
        json!({ "fields": [{ "label": "Account number", "field_type": "text" }] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await["data"].clone();
    assert_eq!(updated["name"], "Bank details");
    assert_eq!(updated["fields"].as_array().unwrap().len(), 1);
    assert_eq!(updated["fields"][0]["label"], "Account number");

    let response = get_auth(app.clone(), "/api/v1/document-templates", &admin.token).await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);

    let response = delete_auth(app.clone(), &uri, &admin.token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = get_auth(app, &uri, &admin.token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn document_template_rejects_unknown_field_type(pool: PgPool) {
    let app = common::build_test_app(pool);
    let admin = register_company(&app, "Acme", "boss@acme.test").await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/document-templates",
        &admin.token,
        json!({ "name": "X", "fields": [{ "label": "Y", "field_type": "checkbox" }] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = post_json_auth(
        app,
        "/api/v1/document-templates",
        &admin.token,
        json!({ "name": "X", "fields": [{ "label": "", "field_type": "text" }] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert!(json["errors"][0].as_str().unwrap().starts_with("Field 'fields[0].label'"));
}

// ---------------------------------------------------------------------------
// Submission review
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_reviews_a_submission_once(pool: PgPool) {
    let fakes = Fakes::default();
    let app = common::build_test_app_with(pool, &fakes);
    let admin = register_company(&app, "Acme", "boss@acme.test").await;
    let doc = create_document_template(&app, &admin, "Passport").await;
    let (_, employee) = onboard_employee(
        &app,
        &fakes,
        &admin,
        invite_form("new.hire@acme.test"),
        "employee-password-1",
    )
    .await;

    let response = multipart_auth(
        app.clone(),
        Method::POST,
        &format!("/api/v1/onboarding/documents/submit/{doc}"),
        &employee,
        MultipartForm::new().text("fields", r#"{"number":"X1"}"#),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let submission = body_json(response).await["data"]["id"].as_i64().unwrap();
    let uri = format!("/api/v1/document-submissions/{submission}/status");

    // Back to "submitted" is not a review outcome.
    let response = put_json_auth(app.clone(), &uri, &admin.token, json!({ "status": "submitted" })).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Employees cannot review.
    let response = put_json_auth(app.clone(), &uri, &employee, json!({ "status": "approved" })).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = put_json_auth(app.clone(), &uri, &admin.token, json!({ "status": "approved" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "approved");
    assert_eq!(json["data"]["reviewed_by"], admin.user_id);
    assert!(json["data"]["reviewed_at"].is_string());

    let response = put_json_auth(app.clone(), &uri, &admin.token, json!({ "status": "rejected" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Filter by employee.
    let response = get_auth(
        app.clone(),
        &format!("/api/v1/document-templates/{doc}/submissions?employee_id=EMP-001"),
        &admin.token,
    )
    .await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);
    let response = get_auth(
        app,
        &format!("/api/v1/document-templates/{doc}/submissions?employee_id=EMP-404"),
        &admin.token,
    )
    .await;
    assert!(body_json(response).await["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn submissions_of_other_companies_are_not_found(pool: PgPool) {
    let fakes = Fakes::default();
    let app = common::build_test_app_with(pool, &fakes);
    let acme = register_company(&app, "Acme", "boss@acme.test").await;
    let globex = register_company(&app, "Globex", "boss@globex.test").await;
    let doc = create_document_template(&app, &acme, "Passport").await;
    let (_, employee) = onboard_employee(
        &app,
        &fakes,
        &acme,
        invite_form("new.hire@acme.test"),
        "employee-password-1",
    )
    .await;
    let response = multipart_auth(
        app.clone(),
        Method::POST,
        &format!("/api/v1/onboarding/documents/submit/{doc}"),
        &employee,
        MultipartForm::new().text("fields", "{}"),
    )
    .await;
    let submission = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = put_json_auth(
        app.clone(),
        &format!("/api/v1/document-submissions/{submission}/status"),
        &globex.token,
        json!({ "status": "approved" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get_auth(
        app,
        &format!("/api/v1/document-templates/{doc}/submissions"),
        &globex.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
