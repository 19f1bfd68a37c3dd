use chrono::{NaiveDate, NaiveTime, Utc};
use hrflow_core::timesheet::TimesheetStatus;
use hrflow_db::models::user::CreateUser;
use hrflow_db::repositories::{CompanyRepo, TimesheetRepo, UserRepo};
use sqlx::PgPool;

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, day).unwrap()
}

fn t(h: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, 0, 0).unwrap()
}

/// Returns (company_id, admin_id, employee_id).
async fn seed(pool: &PgPool) -> (i64, i64, i64) {
    let admin = CreateUser {
        email: "admin@acme.test".to_string(),
        password_hash: "hash".to_string(),
        role: "admin".to_string(),
        is_active: true,
        ..Default::default()
    };
    let (company, admin) = CompanyRepo::create_with_admin(pool, "Acme", &admin)
        .await
        .unwrap();
    let employee = UserRepo::create(
        pool,
        &CreateUser {
            company_id: company.id,
            email: "emp@acme.test".to_string(),
            password_hash: "hash".to_string(),
            role: "employee".to_string(),
            is_active: true,
            ..Default::default()
        },
    )
    .await
    .unwrap();
    (company.id, admin.id, employee.id)
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_or_create_is_idempotent(pool: PgPool) {
    let (_, _, user_id) = seed(&pool).await;

    let first = TimesheetRepo::get_or_create(&pool, user_id, d(12), d(18))
        .await
        .unwrap();
    let second = TimesheetRepo::get_or_create(&pool, user_id, d(12), d(18))
        .await
        .unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(first.status, "Draft");

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM timesheets WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count.0, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_submit_and_review_are_one_way(pool: PgPool) {
    let (company_id, admin_id, user_id) = seed(&pool).await;
    let sheet = TimesheetRepo::get_or_create(&pool, user_id, d(12), d(18))
        .await
        .unwrap();
    TimesheetRepo::create_entry(&pool, sheet.id, d(13), t(9), t(17), Some("standup"))
        .await
        .unwrap()
        .unwrap();

    let submitted = TimesheetRepo::submit(&pool, sheet.id, Utc::now())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(submitted.status, "Submitted");
    assert!(submitted.submitted_at.is_some());
    assert!(TimesheetRepo::submit(&pool, sheet.id, Utc::now())
        .await
        .unwrap()
        .is_none());
    assert_eq!(TimesheetRepo::count_entries(&pool, sheet.id).await.unwrap(), 1);

    let queue = TimesheetRepo::list_for_company(&pool, company_id, TimesheetStatus::Submitted, 50, 0)
        .await
        .unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].user_email, "emp@acme.test");

    let rejected = TimesheetRepo::review(
        &pool,
        sheet.id,
        TimesheetStatus::Rejected,
        admin_id,
        Some("missing Friday"),
        Utc::now(),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(rejected.status, "Rejected");
    assert_eq!(rejected.reviewed_by, Some(admin_id));
    assert_eq!(rejected.rejection_reason.as_deref(), Some("missing Friday"));

    assert!(TimesheetRepo::review(
        &pool,
        sheet.id,
        TimesheetStatus::Approved,
        admin_id,
        None,
        Utc::now()
    )
    .await
    .unwrap()
    .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_entries_are_scoped_to_owner(pool: PgPool) {
    let (_, admin_id, user_id) = seed(&pool).await;
    let sheet = TimesheetRepo::get_or_create(&pool, user_id, d(12), d(18))
        .await
        .unwrap();
    let later = TimesheetRepo::create_entry(&pool, sheet.id, d(14), t(13), t(15), None)
        .await
        .unwrap()
        .unwrap();
    let earlier = TimesheetRepo::create_entry(&pool, sheet.id, d(14), t(9), t(12), None)
        .await
        .unwrap()
        .unwrap();

    let entries = TimesheetRepo::list_entries(&pool, sheet.id).await.unwrap();
    let ids: Vec<i64> = entries.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![earlier.id, later.id]);

    assert!(TimesheetRepo::find_entry_for_user(&pool, user_id, later.id)
        .await
        .unwrap()
        .is_some());
    assert!(TimesheetRepo::find_entry_for_user(&pool, admin_id, later.id)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_entry_writes_require_a_draft(pool: PgPool) {
    let (_, _, user_id) = seed(&pool).await;
    let sheet = TimesheetRepo::get_or_create(&pool, user_id, d(12), d(18))
        .await
        .unwrap();
    let entry = TimesheetRepo::create_entry(&pool, sheet.id, d(13), t(9), t(17), None)
        .await
        .unwrap()
        .unwrap();
    TimesheetRepo::submit(&pool, sheet.id, Utc::now())
        .await
        .unwrap()
        .unwrap();

    // Writes issued after the submit find no draft to change.
    let inserted = TimesheetRepo::create_entry(&pool, sheet.id, d(14), t(9), t(12), None)
        .await
        .unwrap();
    assert!(inserted.is_none());
    let updated =
        TimesheetRepo::update_entry(&pool, entry.id, d(13), t(10), t(17), Some("late"))
            .await
            .unwrap();
    assert!(updated.is_none());
    assert!(!TimesheetRepo::delete_entry(&pool, entry.id).await.unwrap());

    assert_eq!(TimesheetRepo::count_entries(&pool, sheet.id).await.unwrap(), 1);
    let entries = TimesheetRepo::list_entries(&pool, sheet.id).await.unwrap();
    assert_eq!(entries[0].start_time, t(9));
    assert_eq!(entries[0].notes, None);
}
