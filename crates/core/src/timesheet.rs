//! Timesheet approval workflow rules.
//!
//! A timesheet moves `Draft -> Submitted -> Approved | Rejected`. Entries can
//! only change while the sheet is a draft, and every entry must fall inside
//! the sheet's period.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Maximum length of entry notes.
pub const MAX_NOTES_LEN: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimesheetStatus {
    Draft,
    Submitted,
    Approved,
    Rejected,
}

impl TimesheetStatus {
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "Draft" => Ok(Self::Draft),
            "Submitted" => Ok(Self::Submitted),
            "Approved" => Ok(Self::Approved),
            "Rejected" => Ok(Self::Rejected),
            _ => Err(CoreError::Validation(format!(
                "Invalid timesheet status '{s}'. Must be one of: Draft, Submitted, Approved, Rejected"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Submitted => "Submitted",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }
}

/// Monday..Sunday week containing `day`.
pub fn week_containing(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday = day - Duration::days(i64::from(day.weekday().num_days_from_monday()));
    (monday, monday + Duration::days(6))
}

/// Settle the requested period.
///
/// No bounds means the week containing `today`. Giving only one bound is an
/// error, as is an end before the start.
pub fn resolve_period(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate), CoreError> {
    match (start, end) {
        (None, None) => Ok(week_containing(today)),
        (Some(s), Some(e)) if e < s => Err(CoreError::BadRequest(
            "end_date must not be before start_date".to_string(),
        )),
        (Some(s), Some(e)) => Ok((s, e)),
        _ => Err(CoreError::Validation(
            "start_date and end_date must be given together".to_string(),
        )),
    }
}

/// Entries may only be added, changed, or removed on a draft.
pub fn ensure_editable(status: TimesheetStatus) -> Result<(), CoreError> {
    if status == TimesheetStatus::Draft {
        Ok(())
    } else {
        Err(CoreError::BadRequest(format!(
            "Cannot modify entries of a timesheet with status: {}",
            status.as_str()
        )))
    }
}

/// Validate one entry against its sheet's period.
pub fn validate_entry(
    period: (NaiveDate, NaiveDate),
    date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    notes: Option<&str>,
) -> Result<(), CoreError> {
    let (start, end) = period;
    if date < start || date > end {
        return Err(CoreError::BadRequest(
            "Entry date must be within the timesheet period".to_string(),
        ));
    }
    if end_time <= start_time {
        return Err(CoreError::BadRequest(
            "Entry end_time must be after start_time".to_string(),
        ));
    }
    if notes.is_some_and(|n| n.len() > MAX_NOTES_LEN) {
        return Err(CoreError::Validation(format!(
            "Field 'notes': must be at most {MAX_NOTES_LEN} characters"
        )));
    }
    Ok(())
}

/// Only drafts can be submitted.
pub fn ensure_submittable(status: TimesheetStatus) -> Result<(), CoreError> {
    if status == TimesheetStatus::Draft {
        Ok(())
    } else {
        Err(CoreError::BadRequest(format!(
            "Only draft timesheets can be submitted (current status: {})",
            status.as_str()
        )))
    }
}

/// Approval and rejection need a submitted sheet owned by the reviewer's
/// company. Company is checked first so other tenants learn nothing about
/// the sheet's state.
pub fn ensure_reviewable(
    status: TimesheetStatus,
    reviewer_company: DbId,
    owner_company: DbId,
) -> Result<(), CoreError> {
    if reviewer_company != owner_company {
        return Err(CoreError::Forbidden(
            "Timesheet belongs to another company".to_string(),
        ));
    }
    if status != TimesheetStatus::Submitted {
        return Err(CoreError::BadRequest(format!(
            "Only submitted timesheets can be reviewed (current status: {})",
            status.as_str()
        )));
    }
    Ok(())
}
