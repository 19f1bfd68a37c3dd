//! Integration tests for onboarding session persistence.
//!
//! Exercises the repository layer against a real database:
//! - pending-invite uniqueness per (company, email)
//! - conditional status transitions (expire, activate, submit)
//! - idempotent task materialization
//! - versioned document submissions

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use hrflow_core::onboarding::{OnboardingStatus, ProfilePatch};
use hrflow_core::templates::ResolvedTodo;
use hrflow_db::models::document_submission::CreateDocumentSubmission;
use hrflow_db::models::document_template::CreateDocumentTemplate;
use hrflow_db::models::onboarding_session::CreateOnboardingSession;
use hrflow_db::models::user::CreateUser;
use hrflow_db::repositories::{
    CompanyRepo, DocumentSubmissionRepo, DocumentTemplateRepo, OnboardingSessionRepo,
    OnboardingTaskRepo, OnboardingTemplateRepo, UserRepo,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn new_company(pool: &PgPool, admin_email: &str) -> i64 {
    let admin = CreateUser {
        email: admin_email.to_string(),
        password_hash: "hash".to_string(),
        role: "admin".to_string(),
        is_active: true,
        ..Default::default()
    };
    let (company, _) = CompanyRepo::create_with_admin(pool, "Acme", &admin)
        .await
        .unwrap();
    company.id
}

fn new_session(company_id: i64, email: &str, token: &str) -> CreateOnboardingSession {
    let now = Utc::now();
    CreateOnboardingSession {
        company_id,
        new_employee_email: email.to_string(),
        invitation_token: token.to_string(),
        created_at: now,
        expires_at: now + Duration::hours(24),
        template_id: None,
        emp_id: Some("EMP-1".to_string()),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        phone: None,
        gender: "female".to_string(),
        user_role: "employee".to_string(),
        designation_id: None,
        department_id: None,
        job_type: None,
        hiring_date: None,
        report_to: None,
        grade: None,
        probation_period: None,
        date_of_birth: None,
        marital_status: None,
        nationality: None,
        profile_picture_url: None,
    }
}

fn user_for(company_id: i64, email: &str) -> CreateUser {
    CreateUser {
        company_id,
        email: email.to_string(),
        password_hash: "hash".to_string(),
        role: "employee".to_string(),
        is_active: false,
        ..Default::default()
    }
}

fn todo(title: &str, order_index: i32) -> ResolvedTodo {
    ResolvedTodo {
        title: title.to_string(),
        description: None,
        order_index,
    }
}

// ---------------------------------------------------------------------------
// Pending uniqueness
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_second_pending_invite_violates_unique_index(pool: PgPool) {
    let company_id = new_company(&pool, "admin@acme.test").await;

    OnboardingSessionRepo::create(&pool, &new_session(company_id, "a@x.com", "t1"))
        .await
        .unwrap();
    assert!(OnboardingSessionRepo::has_pending(&pool, company_id, "a@x.com")
        .await
        .unwrap());

    let err = OnboardingSessionRepo::create(&pool, &new_session(company_id, "a@x.com", "t2"))
        .await
        .unwrap_err();
    assert_matches!(
        err,
        sqlx::Error::Database(ref db) if db.constraint() == Some("uq_onboarding_sessions_pending_email")
    );

    let pending = OnboardingSessionRepo::count_with_status(
        &pool,
        company_id,
        "a@x.com",
        OnboardingStatus::Pending,
    )
    .await
    .unwrap();
    assert_eq!(pending, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reinvite_allowed_after_expiry(pool: PgPool) {
    let company_id = new_company(&pool, "admin@acme.test").await;

    let first = OnboardingSessionRepo::create(&pool, &new_session(company_id, "a@x.com", "t1"))
        .await
        .unwrap();
    assert!(OnboardingSessionRepo::mark_expired(&pool, first.id).await.unwrap());
    // Second call is a no-op on an already expired row.
    assert!(!OnboardingSessionRepo::mark_expired(&pool, first.id).await.unwrap());

    OnboardingSessionRepo::create(&pool, &new_session(company_id, "a@x.com", "t2"))
        .await
        .unwrap();
}

// ---------------------------------------------------------------------------
// Activation and submission
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_activate_is_single_use(pool: PgPool) {
    let company_id = new_company(&pool, "admin@acme.test").await;
    let session = OnboardingSessionRepo::create(&pool, &new_session(company_id, "a@x.com", "t1"))
        .await
        .unwrap();

    let (activated, user) =
        OnboardingSessionRepo::activate(&pool, session.id, &user_for(company_id, "a@x.com"))
            .await
            .unwrap()
            .expect("first activation succeeds");
    assert_eq!(activated.status, "in_progress");
    assert_eq!(activated.user_id, Some(user.id));
    assert!(!user.is_active);

    let again =
        OnboardingSessionRepo::activate(&pool, session.id, &user_for(company_id, "b@x.com"))
            .await
            .unwrap();
    assert!(again.is_none());
    // The losing attempt's user insert was rolled back.
    assert!(UserRepo::find_by_email(&pool, "b@x.com").await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_submit_activates_user_once(pool: PgPool) {
    let company_id = new_company(&pool, "admin@acme.test").await;
    let session = OnboardingSessionRepo::create(&pool, &new_session(company_id, "a@x.com", "t1"))
        .await
        .unwrap();
    let (_, user) =
        OnboardingSessionRepo::activate(&pool, session.id, &user_for(company_id, "a@x.com"))
            .await
            .unwrap()
            .unwrap();

    let submitted = OnboardingSessionRepo::submit(&pool, session.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(submitted.status, "submitted");

    let user = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert!(user.is_active);

    assert!(OnboardingSessionRepo::submit(&pool, session.id)
        .await
        .unwrap()
        .is_none());
    assert!(OnboardingSessionRepo::find_active_by_email(&pool, "a@x.com")
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_step_never_moves_backwards(pool: PgPool) {
    let company_id = new_company(&pool, "admin@acme.test").await;
    let session = OnboardingSessionRepo::create(&pool, &new_session(company_id, "a@x.com", "t1"))
        .await
        .unwrap();

    let s = OnboardingSessionRepo::update_step(&pool, session.id, 3)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(s.current_step, 3);

    assert!(OnboardingSessionRepo::update_step(&pool, session.id, 2)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_review_mirrors_email_to_user(pool: PgPool) {
    let company_id = new_company(&pool, "admin@acme.test").await;
    let session = OnboardingSessionRepo::create(&pool, &new_session(company_id, "a@x.com", "t1"))
        .await
        .unwrap();
    let (_, user) =
        OnboardingSessionRepo::activate(&pool, session.id, &user_for(company_id, "a@x.com"))
            .await
            .unwrap()
            .unwrap();

    let patch = ProfilePatch {
        email: Some("ada@x.com".to_string()),
        phone: Some("555-0100".to_string()),
        ..Default::default()
    };
    let updated = OnboardingSessionRepo::apply_review(&pool, session.id, &patch, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.new_employee_email, "ada@x.com");
    assert_eq!(updated.phone.as_deref(), Some("555-0100"));
    assert_eq!(updated.first_name.as_deref(), Some("Ada"));

    let user = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(user.email, "ada@x.com");
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_task_materialization_is_idempotent(pool: PgPool) {
    let company_id = new_company(&pool, "admin@acme.test").await;
    let template = OnboardingTemplateRepo::create(
        &pool,
        company_id,
        "Engineering",
        &[todo("Sign NDA", 0), todo("Upload ID", 1)],
        &[],
        &[],
    )
    .await
    .unwrap();
    let mut input = new_session(company_id, "a@x.com", "t1");
    input.template_id = Some(template.id);
    let session = OnboardingSessionRepo::create(&pool, &input).await.unwrap();

    let todo_ids: Vec<i64> = OnboardingTemplateRepo::list_todos(&pool, template.id)
        .await
        .unwrap()
        .iter()
        .map(|t| t.id)
        .collect();

    for _ in 0..3 {
        OnboardingTaskRepo::insert_missing(&pool, session.id, &todo_ids)
            .await
            .unwrap();
    }

    let tasks = OnboardingTaskRepo::list_for_session(&pool, session.id)
        .await
        .unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].title, "Sign NDA");
    assert_eq!(tasks[1].title, "Upload ID");
    assert!(tasks.iter().all(|t| !t.is_completed));

    let referenced = OnboardingTaskRepo::referenced_todo_ids(&pool, template.id)
        .await
        .unwrap();
    assert_eq!(referenced, todo_ids);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_referenced_todo_cannot_be_deleted(pool: PgPool) {
    let company_id = new_company(&pool, "admin@acme.test").await;
    let template = OnboardingTemplateRepo::create(
        &pool,
        company_id,
        "Engineering",
        &[todo("Sign NDA", 0)],
        &[],
        &[],
    )
    .await
    .unwrap();
    let mut input = new_session(company_id, "a@x.com", "t1");
    input.template_id = Some(template.id);
    let session = OnboardingSessionRepo::create(&pool, &input).await.unwrap();
    let todos = OnboardingTemplateRepo::list_todos(&pool, template.id)
        .await
        .unwrap();
    OnboardingTaskRepo::insert_missing(&pool, session.id, &[todos[0].id])
        .await
        .unwrap();

    let err = OnboardingTemplateRepo::delete(&pool, company_id, template.id)
        .await
        .unwrap_err();
    assert_matches!(err, sqlx::Error::Database(ref db) if db.code().as_deref() == Some("23503"));

    // Template is intact.
    assert!(OnboardingTemplateRepo::find_by_id(&pool, company_id, template.id)
        .await
        .unwrap()
        .is_some());
}

// ---------------------------------------------------------------------------
// Document submissions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_resubmission_appends_version(pool: PgPool) {
    let company_id = new_company(&pool, "admin@acme.test").await;
    let doc = DocumentTemplateRepo::create(
        &pool,
        company_id,
        &CreateDocumentTemplate {
            name: "Passport".to_string(),
            fields: vec![],
        },
    )
    .await
    .unwrap();

    let submission = |n: &str| CreateDocumentSubmission {
        company_id,
        template_id: doc.template.id,
        employee_id: "EMP-1".to_string(),
        session_id: None,
        field_values: serde_json::json!({ "number": n }),
        file_paths: serde_json::json!({}),
    };

    let v1 = DocumentSubmissionRepo::create_version(&pool, &submission("A1"))
        .await
        .unwrap();
    let v2 = DocumentSubmissionRepo::create_version(&pool, &submission("A2"))
        .await
        .unwrap();
    assert_eq!(v1.version, 1);
    assert_eq!(v2.version, 2);
    let rows: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM document_submissions WHERE template_id = $1",
    )
    .bind(doc.template.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(rows, 2);

    let latest = DocumentSubmissionRepo::latest_for_documents(
        &pool,
        company_id,
        Some("EMP-1"),
        0,
        &[doc.template.id, doc.template.id + 1000],
    )
    .await
    .unwrap();
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].id, v2.id);
    assert_eq!(latest[0].field_values["number"], "A2");

    let other = DocumentSubmissionRepo::latest_for_documents(
        &pool,
        company_id,
        Some("EMP-2"),
        0,
        &[doc.template.id],
    )
    .await
    .unwrap();
    assert!(other.is_empty());
}
