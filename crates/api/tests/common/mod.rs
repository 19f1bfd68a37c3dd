#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use chrono::{DateTime, TimeZone, Utc};
use http_body_util::BodyExt;
use hrflow_api::auth::jwt::JwtConfig;
use hrflow_api::config::ServerConfig;
use hrflow_api::router::build_app_router;
use hrflow_api::state::AppState;
use hrflow_core::clock::Clock;
use hrflow_core::notification::{
    DeliveryStatus, InvitationNotice, InvitationNotifier, NotifyError,
};
use hrflow_core::storage::{ObjectStorage, StorageError};
use hrflow_core::types::Timestamp;
use sqlx::PgPool;
use tower::ServiceExt;

pub const TEST_JWT_SECRET: &str = "test-secret-for-integration-tests";
pub const ADMIN_PASSWORD: &str = "admin-password-1";

// ---------------------------------------------------------------------------
// Fake collaborators
// ---------------------------------------------------------------------------

/// In-memory object store. Records every key it was asked to write.
#[derive(Default)]
pub struct FakeStorage {
    pub objects: Mutex<Vec<(String, Vec<u8>)>>,
}

impl FakeStorage {
    pub fn keys(&self) -> Vec<String> {
        self.objects
            .lock()
            .unwrap()
            .iter()
            .map(|(k, _)| k.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl ObjectStorage for FakeStorage {
    async fn put_object(
        &self,
        key: &str,
        _content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<String, StorageError> {
        self.objects.lock().unwrap().push((key.to_string(), bytes));
        Ok(format!("https://files.test/{key}"))
    }
}

/// Notifier that captures notices. Set `fail` to simulate a delivery error.
#[derive(Default)]
pub struct FakeNotifier {
    pub sent: Mutex<Vec<InvitationNotice>>,
    pub fail: Mutex<bool>,
}

impl FakeNotifier {
    /// Token embedded in the most recent invitation link.
    pub fn last_token(&self) -> String {
        let sent = self.sent.lock().unwrap();
        let notice = sent.last().expect("no invitation was sent");
        notice
            .link
            .split("token=")
            .nth(1)
            .expect("link carries a token")
            .to_string()
    }

    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }
}

#[async_trait::async_trait]
impl InvitationNotifier for FakeNotifier {
    async fn send_invitation(
        &self,
        notice: &InvitationNotice,
    ) -> Result<DeliveryStatus, NotifyError> {
        self.sent.lock().unwrap().push(notice.clone());
        if *self.fail.lock().unwrap() {
            return Err(NotifyError::Delivery("smtp unavailable".into()));
        }
        Ok(DeliveryStatus::Sent)
    }
}

/// A clock tests can move.
pub struct FixedClock(Mutex<Timestamp>);

impl FixedClock {
    pub fn at(now: Timestamp) -> Self {
        Self(Mutex::new(now))
    }

    pub fn set(&self, now: Timestamp) {
        *self.0.lock().unwrap() = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.0.lock().unwrap();
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        *self.0.lock().unwrap()
    }
}

/// Wednesday 2026-03-11 09:00 UTC. The week runs 2026-03-09..=2026-03-15.
pub fn default_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 11, 9, 0, 0).unwrap()
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3001".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        onboarding_link_base: "http://localhost:3001/onboard".to_string(),
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_mins: 60,
        },
    }
}

/// The fakes behind a test app, kept by the test for assertions.
#[derive(Clone)]
pub struct Fakes {
    pub storage: Arc<FakeStorage>,
    pub notifier: Arc<FakeNotifier>,
    pub clock: Arc<FixedClock>,
}

impl Default for Fakes {
    fn default() -> Self {
        Self {
            storage: Arc::new(FakeStorage::default()),
            notifier: Arc::new(FakeNotifier::default()),
            clock: Arc::new(FixedClock::at(default_now())),
        }
    }
}

/// Build the full application router, with the production middleware
/// stack, over `pool` and fresh fakes.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, &Fakes::default())
}

pub fn build_test_app_with(pool: PgPool, fakes: &Fakes) -> Router {
    build_test_app_serving(pool, fakes, None)
}

/// Like [`build_test_app_with`], also serving `uploads_dir` the way the
/// local storage backend is served in production.
pub fn build_test_app_serving(pool: PgPool, fakes: &Fakes, uploads_dir: Option<&Path>) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        storage: fakes.storage.clone(),
        notifier: fakes.notifier.clone(),
        clock: fakes.clock.clone(),
    };
    build_app_router(state, &config, uploads_dir)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(AUTHORIZATION, bearer(token))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, bearer(token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, json_request(Method::POST, uri, None, body)).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, json_request(Method::PUT, uri, None, body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, json_request(Method::POST, uri, Some(token), body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, json_request(Method::PUT, uri, Some(token), body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(AUTHORIZATION, bearer(token))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn put_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::PUT)
        .uri(uri)
        .header(AUTHORIZATION, bearer(token))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .header(AUTHORIZATION, bearer(token))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Multipart
// ---------------------------------------------------------------------------

const BOUNDARY: &str = "hrflow-test-boundary";

/// A `multipart/form-data` body under construction.
#[derive(Default)]
pub struct MultipartForm {
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; \
                 filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.body
    }
}

pub async fn multipart_auth(
    app: Router,
    method: Method,
    uri: &str,
    token: &str,
    form: MultipartForm,
) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(AUTHORIZATION, bearer(token))
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(form.finish()))
        .unwrap();
    send(app, request).await
}

// ---------------------------------------------------------------------------
// Seeding through the API
// ---------------------------------------------------------------------------

/// A registered company and a signed-in admin.
pub struct Admin {
    pub company_id: i64,
    pub user_id: i64,
    pub token: String,
}

pub async fn login(app: Router, email: &str, password: &str) -> Response<Body> {
    post_json(
        app,
        "/api/v1/auth/login",
        serde_json::json!({ "email": email, "password": password }),
    )
    .await
}

/// Register a company whose admin is `admin_email`, then log in.
pub async fn register_company(app: &Router, name: &str, admin_email: &str) -> Admin {
    let response = post_json(
        app.clone(),
        "/api/v1/auth/register-company",
        serde_json::json!({
            "company_name": name,
            "admin_email": admin_email,
            "admin_password": ADMIN_PASSWORD,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let company_id = json["data"]["company"]["id"].as_i64().unwrap();
    let user_id = json["data"]["admin"]["id"].as_i64().unwrap();

    let response = login(app.clone(), admin_email, ADMIN_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);
    let token = body_json(response).await["data"]["access_token"]
        .as_str()
        .unwrap()
        .to_string();

    Admin {
        company_id,
        user_id,
        token,
    }
}

/// Minimal valid invitation form for `email`.
pub fn invite_form(email: &str) -> MultipartForm {
    MultipartForm::new()
        .text("email", email)
        .text("firstName", "Ada")
        .text("lastName", "Lovelace")
        .text("gender", "female")
        .text("userRole", "employee")
        .text("empId", "EMP-001")
}

pub async fn invite(app: &Router, admin: &Admin, form: MultipartForm) -> Response<Body> {
    multipart_auth(
        app.clone(),
        Method::POST,
        "/api/v1/onboarding/invite",
        &admin.token,
        form,
    )
    .await
}

/// Invite `email`, activate with `password`, and return
/// `(invitation token, employee access token)`.
pub async fn onboard_employee(
    app: &Router,
    fakes: &Fakes,
    admin: &Admin,
    form: MultipartForm,
    password: &str,
) -> (String, String) {
    let response = invite(app, admin, form).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let invitation = fakes.notifier.last_token();

    let response = post_json(
        app.clone(),
        "/api/v1/onboarding/activate",
        serde_json::json!({ "token": invitation, "password": password }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let access = body_json(response).await["data"]["access_token"]
        .as_str()
        .unwrap()
        .to_string();
    (invitation, access)
}
