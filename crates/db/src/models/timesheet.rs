//! Timesheet and time entry models.

use chrono::{NaiveDate, NaiveTime};
use hrflow_core::timesheet::TimesheetStatus;
use hrflow_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `timesheets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Timesheet {
    pub id: DbId,
    pub user_id: DbId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: String,
    pub submitted_at: Option<Timestamp>,
    pub reviewed_at: Option<Timestamp>,
    pub reviewed_by: Option<DbId>,
    pub rejection_reason: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Timesheet {
    pub fn status(&self) -> Result<TimesheetStatus, hrflow_core::error::CoreError> {
        TimesheetStatus::from_str_db(&self.status)
    }

    pub fn period(&self) -> (NaiveDate, NaiveDate) {
        (self.start_date, self.end_date)
    }
}

/// A row from the `time_entries` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TimeEntry {
    pub id: DbId,
    pub timesheet_id: DbId,
    #[serde(rename = "date")]
    pub work_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A timesheet with its entries ordered by day and start time.
#[derive(Debug, Clone, Serialize)]
pub struct TimesheetWithEntries {
    #[serde(flatten)]
    pub timesheet: Timesheet,
    pub entries: Vec<TimeEntry>,
}

/// A timesheet joined with its owner, for the review queue.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TimesheetSubmission {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub timesheet: Timesheet,
    pub user_email: String,
    pub user_first_name: Option<String>,
    pub user_last_name: Option<String>,
    pub company_id: DbId,
}

/// Body for `POST /my-timesheet/entries`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTimeEntry {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub notes: Option<String>,
}

/// Body for `PUT /my-timesheet/entries/{id}`. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTimeEntry {
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub notes: Option<String>,
}
