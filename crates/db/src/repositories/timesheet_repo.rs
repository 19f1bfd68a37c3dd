//! Repository for the `timesheets` and `time_entries` tables.

use chrono::{NaiveDate, NaiveTime};
use hrflow_core::timesheet::TimesheetStatus;
use hrflow_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::timesheet::{TimeEntry, Timesheet, TimesheetSubmission};

const COLUMNS: &str = "id, user_id, start_date, end_date, status, submitted_at, reviewed_at, \
    reviewed_by, rejection_reason, created_at, updated_at";

const ENTRY_COLUMNS: &str =
    "id, timesheet_id, work_date, start_time, end_time, notes, created_at, updated_at";

/// [`ENTRY_COLUMNS`] for statements that join `time_entries e` with `timesheets`.
const QUALIFIED_ENTRY_COLUMNS: &str = "e.id, e.timesheet_id, e.work_date, e.start_time, \
    e.end_time, e.notes, e.created_at, e.updated_at";

/// Provides timesheet and entry persistence.
pub struct TimesheetRepo;

impl TimesheetRepo {
    /// Return the user's timesheet for the period, creating a draft if none
    /// exists.
    ///
    /// The insert is `ON CONFLICT DO NOTHING` against
    /// `uq_timesheets_user_period`, so concurrent first access yields one row.
    pub async fn get_or_create(
        pool: &PgPool,
        user_id: DbId,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Timesheet, sqlx::Error> {
        sqlx::query(
            "INSERT INTO timesheets (user_id, start_date, end_date, status) \
             VALUES ($1, $2, $3, 'Draft') \
             ON CONFLICT ON CONSTRAINT uq_timesheets_user_period DO NOTHING",
        )
        .bind(user_id)
        .bind(start_date)
        .bind(end_date)
        .execute(pool)
        .await?;

        let query = format!(
            "SELECT {COLUMNS} FROM timesheets \
             WHERE user_id = $1 AND start_date = $2 AND end_date = $3"
        );
        sqlx::query_as::<_, Timesheet>(&query)
            .bind(user_id)
            .bind(start_date)
            .bind(end_date)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Timesheet>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM timesheets WHERE id = $1");
        sqlx::query_as::<_, Timesheet>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The owning user's company, for authorization checks.
    pub async fn owner_company(pool: &PgPool, id: DbId) -> Result<Option<DbId>, sqlx::Error> {
        let row: Option<(DbId,)> = sqlx::query_as(
            "SELECT u.company_id FROM timesheets t JOIN users u ON u.id = t.user_id WHERE t.id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|(c,)| c))
    }

    /// Entries ordered by day, then start time.
    pub async fn list_entries(
        pool: &PgPool,
        timesheet_id: DbId,
    ) -> Result<Vec<TimeEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {ENTRY_COLUMNS} FROM time_entries WHERE timesheet_id = $1 \
             ORDER BY work_date, start_time, id"
        );
        sqlx::query_as::<_, TimeEntry>(&query)
            .bind(timesheet_id)
            .fetch_all(pool)
            .await
    }

    /// Insert an entry. Returns `None` unless the timesheet is a draft.
    pub async fn create_entry(
        pool: &PgPool,
        timesheet_id: DbId,
        work_date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
        notes: Option<&str>,
    ) -> Result<Option<TimeEntry>, sqlx::Error> {
        let query = format!(
            "INSERT INTO time_entries (timesheet_id, work_date, start_time, end_time, notes) \
             SELECT $1, $2, $3, $4, $5 \
             WHERE EXISTS (SELECT 1 FROM timesheets WHERE id = $1 AND status = 'Draft') \
             RETURNING {ENTRY_COLUMNS}"
        );
        sqlx::query_as::<_, TimeEntry>(&query)
            .bind(timesheet_id)
            .bind(work_date)
            .bind(start_time)
            .bind(end_time)
            .bind(notes)
            .fetch_optional(pool)
            .await
    }

    /// Find an entry only if it belongs to one of `user_id`'s timesheets.
    /// Returns the entry with its timesheet.
    pub async fn find_entry_for_user(
        pool: &PgPool,
        user_id: DbId,
        entry_id: DbId,
    ) -> Result<Option<(TimeEntry, Timesheet)>, sqlx::Error> {
        let query = format!("SELECT {ENTRY_COLUMNS} FROM time_entries WHERE id = $1");
        let Some(entry) = sqlx::query_as::<_, TimeEntry>(&query)
            .bind(entry_id)
            .fetch_optional(pool)
            .await?
        else {
            return Ok(None);
        };

        let query = format!("SELECT {COLUMNS} FROM timesheets WHERE id = $1 AND user_id = $2");
        let sheet = sqlx::query_as::<_, Timesheet>(&query)
            .bind(entry.timesheet_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
        Ok(sheet.map(|s| (entry, s)))
    }

    /// Overwrite an entry's values. Callers merge partial updates first.
    /// Returns `None` unless the entry's timesheet is a draft.
    pub async fn update_entry(
        pool: &PgPool,
        entry_id: DbId,
        work_date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
        notes: Option<&str>,
    ) -> Result<Option<TimeEntry>, sqlx::Error> {
        let query = format!(
            "UPDATE time_entries e \
             SET work_date = $2, start_time = $3, end_time = $4, notes = $5 \
             FROM timesheets t \
             WHERE e.id = $1 AND t.id = e.timesheet_id AND t.status = 'Draft' \
             RETURNING {QUALIFIED_ENTRY_COLUMNS}"
        );
        sqlx::query_as::<_, TimeEntry>(&query)
            .bind(entry_id)
            .bind(work_date)
            .bind(start_time)
            .bind(end_time)
            .bind(notes)
            .fetch_optional(pool)
            .await
    }

    /// Delete an entry. Returns `false` unless its timesheet is a draft.
    pub async fn delete_entry(pool: &PgPool, entry_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM time_entries e USING timesheets t \
             WHERE e.id = $1 AND t.id = e.timesheet_id AND t.status = 'Draft'",
        )
            .bind(entry_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_entries(pool: &PgPool, timesheet_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM time_entries WHERE timesheet_id = $1")
            .bind(timesheet_id)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    /// `Draft -> Submitted`. Returns `None` if the sheet was not a draft.
    pub async fn submit(
        pool: &PgPool,
        id: DbId,
        now: Timestamp,
    ) -> Result<Option<Timesheet>, sqlx::Error> {
        let query = format!(
            "UPDATE timesheets SET status = 'Submitted', submitted_at = $2 \
             WHERE id = $1 AND status = 'Draft' RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Timesheet>(&query)
            .bind(id)
            .bind(now)
            .fetch_optional(pool)
            .await
    }

    /// `Submitted -> Approved | Rejected`. Returns `None` if the sheet was
    /// not submitted.
    pub async fn review(
        pool: &PgPool,
        id: DbId,
        outcome: TimesheetStatus,
        reviewer_id: DbId,
        reason: Option<&str>,
        now: Timestamp,
    ) -> Result<Option<Timesheet>, sqlx::Error> {
        let query = format!(
            "UPDATE timesheets SET status = $2, reviewed_by = $3, rejection_reason = $4, \
                reviewed_at = $5 \
             WHERE id = $1 AND status = 'Submitted' RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Timesheet>(&query)
            .bind(id)
            .bind(outcome.as_str())
            .bind(reviewer_id)
            .bind(reason)
            .bind(now)
            .fetch_optional(pool)
            .await
    }

    /// Timesheets of a company's users in `status`, most recently submitted
    /// first.
    pub async fn list_for_company(
        pool: &PgPool,
        company_id: DbId,
        status: TimesheetStatus,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TimesheetSubmission>, sqlx::Error> {
        sqlx::query_as::<_, TimesheetSubmission>(
            "SELECT t.id, t.user_id, t.start_date, t.end_date, t.status, t.submitted_at, \
                t.reviewed_at, t.reviewed_by, t.rejection_reason, t.created_at, t.updated_at, \
                u.email AS user_email, u.first_name AS user_first_name, \
                u.last_name AS user_last_name, u.company_id \
             FROM timesheets t JOIN users u ON u.id = t.user_id \
             WHERE u.company_id = $1 AND t.status = $2 \
             ORDER BY t.submitted_at DESC NULLS LAST, t.id DESC LIMIT $3 OFFSET $4",
        )
        .bind(company_id)
        .bind(status.as_str())
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }
}
