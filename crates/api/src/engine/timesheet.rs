//! Timesheet engine: `Draft -> Submitted -> Approved | Rejected`.

use chrono::NaiveDate;
use hrflow_core::clock::Clock;
use hrflow_core::error::CoreError;
use hrflow_core::timesheet::{
    ensure_editable, ensure_reviewable, ensure_submittable, resolve_period, validate_entry,
    week_containing, TimesheetStatus,
};
use hrflow_core::types::DbId;
use hrflow_db::models::timesheet::{
    CreateTimeEntry, TimeEntry, Timesheet, TimesheetSubmission, TimesheetWithEntries,
    UpdateTimeEntry,
};
use hrflow_db::repositories::TimesheetRepo;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub struct TimesheetEngine<'a> {
    pool: &'a PgPool,
    clock: &'a dyn Clock,
}

impl<'a> TimesheetEngine<'a> {
    pub fn new(pool: &'a PgPool, clock: &'a dyn Clock) -> Self {
        Self { pool, clock }
    }

    pub fn from_state(state: &'a AppState) -> Self {
        Self::new(&state.pool, state.clock.as_ref())
    }

    /// The user's timesheet for the period, created as a draft on first
    /// access. No bounds means the current week.
    pub async fn get_or_create_for_period(
        &self,
        user_id: DbId,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> AppResult<Timesheet> {
        let (start, end) = resolve_period(start, end, self.clock.today())?;
        Ok(TimesheetRepo::get_or_create(self.pool, user_id, start, end).await?)
    }

    /// Same as [`Self::get_or_create_for_period`], with entries ordered by
    /// date and start time.
    pub async fn my_timesheet(
        &self,
        user_id: DbId,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> AppResult<TimesheetWithEntries> {
        let timesheet = self.get_or_create_for_period(user_id, start, end).await?;
        let entries = TimesheetRepo::list_entries(self.pool, timesheet.id).await?;
        Ok(TimesheetWithEntries { timesheet, entries })
    }

    /// Add an entry to a draft timesheet.
    ///
    /// Without explicit bounds the entry goes on the sheet of the week that
    /// contains its date.
    pub async fn add_entry(
        &self,
        user_id: DbId,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        input: &CreateTimeEntry,
    ) -> AppResult<TimeEntry> {
        let (start, end) = match (start, end) {
            (None, None) => week_containing(input.date),
            (s, e) => resolve_period(s, e, self.clock.today())?,
        };
        let timesheet = TimesheetRepo::get_or_create(self.pool, user_id, start, end).await?;

        ensure_editable(timesheet.status()?)?;
        validate_entry(
            timesheet.period(),
            input.date,
            input.start_time,
            input.end_time,
            input.notes.as_deref(),
        )?;

        let entry = TimesheetRepo::create_entry(
            self.pool,
            timesheet.id,
            input.date,
            input.start_time,
            input.end_time,
            input.notes.as_deref(),
        )
        .await?
        .ok_or_else(sheet_not_editable)?;

        tracing::debug!(timesheet_id = timesheet.id, entry_id = entry.id, "Time entry added");
        Ok(entry)
    }

    async fn owned_entry(&self, user_id: DbId, entry_id: DbId) -> AppResult<(TimeEntry, Timesheet)> {
        TimesheetRepo::find_entry_for_user(self.pool, user_id, entry_id)
            .await?
            .ok_or_else(|| {
                CoreError::NotFound {
                    entity: "TimeEntry",
                    id: entry_id,
                }
                .into()
            })
    }

    /// Partially update an entry of the caller's draft timesheet.
    pub async fn update_entry(
        &self,
        user_id: DbId,
        entry_id: DbId,
        patch: &UpdateTimeEntry,
    ) -> AppResult<TimeEntry> {
        let (entry, timesheet) = self.owned_entry(user_id, entry_id).await?;
        ensure_editable(timesheet.status()?)?;

        let date = patch.date.unwrap_or(entry.work_date);
        let start_time = patch.start_time.unwrap_or(entry.start_time);
        let end_time = patch.end_time.unwrap_or(entry.end_time);
        let notes = patch.notes.as_deref().or(entry.notes.as_deref());
        validate_entry(timesheet.period(), date, start_time, end_time, notes)?;

        let updated =
            TimesheetRepo::update_entry(self.pool, entry.id, date, start_time, end_time, notes)
                .await?
                .ok_or_else(sheet_not_editable)?;
        Ok(updated)
    }

    /// Remove an entry from the caller's draft timesheet.
    pub async fn delete_entry(&self, user_id: DbId, entry_id: DbId) -> AppResult<()> {
        let (entry, timesheet) = self.owned_entry(user_id, entry_id).await?;
        ensure_editable(timesheet.status()?)?;
        if !TimesheetRepo::delete_entry(self.pool, entry.id).await? {
            return Err(sheet_not_editable());
        }
        Ok(())
    }

    /// `Draft -> Submitted` for the caller's sheet of the period.
    pub async fn submit(
        &self,
        user_id: DbId,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> AppResult<Timesheet> {
        let timesheet = self.get_or_create_for_period(user_id, start, end).await?;
        ensure_submittable(timesheet.status()?)?;

        let submitted = TimesheetRepo::submit(self.pool, timesheet.id, self.clock.now())
            .await?
            .ok_or_else(|| {
                CoreError::BadRequest("Only draft timesheets can be submitted".to_string())
            })?;

        tracing::info!(timesheet_id = submitted.id, user_id, "Timesheet submitted");
        Ok(submitted)
    }

    pub async fn list_submissions(
        &self,
        company_id: DbId,
        status: TimesheetStatus,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<TimesheetSubmission>> {
        Ok(TimesheetRepo::list_for_company(self.pool, company_id, status, limit, offset).await?)
    }

    /// Approve or reject a submitted timesheet of the reviewer's company.
    pub async fn review(
        &self,
        reviewer_id: DbId,
        reviewer_company: DbId,
        timesheet_id: DbId,
        outcome: TimesheetStatus,
        reason: Option<&str>,
    ) -> AppResult<Timesheet> {
        let not_found = || CoreError::NotFound {
            entity: "Timesheet",
            id: timesheet_id,
        };
        let timesheet = TimesheetRepo::find_by_id(self.pool, timesheet_id)
            .await?
            .ok_or_else(not_found)?;
        let owner_company = TimesheetRepo::owner_company(self.pool, timesheet_id)
            .await?
            .ok_or_else(not_found)?;
        ensure_reviewable(timesheet.status()?, reviewer_company, owner_company)?;

        let reason = match outcome {
            TimesheetStatus::Rejected => reason,
            _ => None,
        };
        let reviewed = TimesheetRepo::review(
            self.pool,
            timesheet_id,
            outcome,
            reviewer_id,
            reason,
            self.clock.now(),
        )
        .await?
        .ok_or_else(|| {
            CoreError::BadRequest("Only submitted timesheets can be reviewed".to_string())
        })?;

        tracing::info!(
            timesheet_id,
            reviewer_id,
            status = outcome.as_str(),
            "Timesheet reviewed"
        );
        Ok(reviewed)
    }
}

/// The sheet left `Draft` between the status check and the write.
fn sheet_not_editable() -> AppError {
    CoreError::BadRequest("Timesheet is no longer a draft".to_string()).into()
}
