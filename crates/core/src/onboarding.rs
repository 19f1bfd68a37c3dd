//! Onboarding session lifecycle rules.
//!
//! Defines the session status enumeration, invitation expiry arithmetic, the
//! step-progression policy, and the typed, whitelisted field sets accepted by
//! the invite and review endpoints.
//!
//! ```text
//! pending --[activate]--> in_progress --[submit]--> submitted
//!    |
//!    +--[resolved after expires_at]--> expired
//! ```

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use crate::error::CoreError;
use crate::roles;
use crate::types::{DbId, Timestamp};

/// Invitation links are valid for this many hours after issuance.
pub const INVITATION_TTL_HOURS: i64 = 24;

/// `scope` claim carried by invitation tokens.
pub const INVITATION_SCOPE: &str = "onboarding_invitation";

/// Step a freshly invited session starts on.
pub const INITIAL_STEP: i32 = 0;

/// Message for an invitation that has already moved past `pending`.
pub const MSG_NOT_PENDING: &str = "Invitation is not pending";

/// Message for an invitation whose validity window has closed.
pub const MSG_EXPIRED: &str = "Invitation has expired";

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Status values for an onboarding session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStatus {
    Pending,
    InProgress,
    Submitted,
    Expired,
}

impl OnboardingStatus {
    /// Parse a status string from the database.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "submitted" => Ok(Self::Submitted),
            "expired" => Ok(Self::Expired),
            _ => Err(CoreError::Validation(format!(
                "Invalid onboarding status '{s}'. Must be one of: pending, in_progress, submitted, expired"
            ))),
        }
    }

    /// Convert to a database-compatible string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Submitted => "submitted",
            Self::Expired => "expired",
        }
    }

    /// No transition leaves a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Submitted | Self::Expired)
    }
}

// ---------------------------------------------------------------------------
// Invitation validity
// ---------------------------------------------------------------------------

/// `expires_at` for an invitation issued at `issued_at`.
pub fn invitation_expiry(issued_at: Timestamp) -> Timestamp {
    issued_at + chrono::Duration::hours(INVITATION_TTL_HOURS)
}

/// An invitation is expired once `now` is strictly past `expires_at`.
pub fn is_expired(expires_at: Timestamp, now: Timestamp) -> bool {
    expires_at < now
}

/// Outcome of checking a session found by its invitation token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvitationCheck {
    Valid,
    /// Status is anything but `pending`. Nothing to persist.
    NotPending,
    /// Still `pending` but past its window; the caller must persist the
    /// `expired` status before failing.
    Expired,
}

/// Classify a token-resolved session.
///
/// Status is checked before expiry so that an already-expired (or activated)
/// session is never transitioned a second time.
pub fn check_invitation(
    status: OnboardingStatus,
    expires_at: Timestamp,
    now: Timestamp,
) -> InvitationCheck {
    if status != OnboardingStatus::Pending {
        InvitationCheck::NotPending
    } else if is_expired(expires_at, now) {
        InvitationCheck::Expired
    } else {
        InvitationCheck::Valid
    }
}

impl InvitationCheck {
    /// The error to surface for a failed check, or `None` when valid.
    pub fn error(self) -> Option<CoreError> {
        match self {
            Self::Valid => None,
            Self::NotPending => Some(CoreError::BadRequest(MSG_NOT_PENDING.to_string())),
            Self::Expired => Some(CoreError::BadRequest(MSG_EXPIRED.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Step progression
// ---------------------------------------------------------------------------

/// Validate a wizard step update.
///
/// Steps are set explicitly by the client and may stay put or move forward,
/// never backward. There is no upper bound; the client owns the wizard length.
pub fn validate_step_update(current: i32, next: i32) -> Result<(), CoreError> {
    if next < INITIAL_STEP {
        return Err(CoreError::BadRequest(format!(
            "Step {next} is invalid. Steps start at {INITIAL_STEP}"
        )));
    }
    if next < current {
        return Err(CoreError::BadRequest(format!(
            "Cannot move from step {current} back to step {next}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Form helpers
// ---------------------------------------------------------------------------

/// Trimmed text value for `key`, treating blank values as absent.
fn text(form: &HashMap<String, String>, key: &str) -> Option<String> {
    form.get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn id(form: &HashMap<String, String>, key: &str) -> Result<Option<DbId>, CoreError> {
    text(form, key)
        .map(|v| {
            v.parse::<DbId>()
                .map_err(|_| CoreError::Validation(format!("Field '{key}': must be an integer id")))
        })
        .transpose()
}

fn date(form: &HashMap<String, String>, key: &str) -> Result<Option<NaiveDate>, CoreError> {
    text(form, key).map(|v| parse_date(key, &v)).transpose()
}

fn parse_date(key: &str, value: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| CoreError::Validation(format!("Field '{key}': must be a date (YYYY-MM-DD)")))
}

fn check_email(key: &str, email: &str) -> Result<(), CoreError> {
    if email.validate_email() {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Field '{key}': must be a valid email address"
        )))
    }
}

// ---------------------------------------------------------------------------
// Invite request
// ---------------------------------------------------------------------------

/// A validated invitation request.
///
/// Mandatory fields are plain `String`s so downstream code never has to
/// re-check their presence.
#[derive(Debug, Clone, PartialEq)]
pub struct InviteRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub user_role: String,
    pub emp_id: Option<String>,
    pub phone: Option<String>,
    pub designation_id: Option<DbId>,
    pub department_id: Option<DbId>,
    pub job_type: Option<String>,
    pub hiring_date: Option<NaiveDate>,
    pub template_id: Option<DbId>,
    pub report_to: Option<String>,
    pub grade: Option<String>,
    pub probation_period: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub marital_status: Option<String>,
    pub nationality: Option<String>,
}

impl InviteRequest {
    /// Build from the flat text fields of the invite form.
    ///
    /// All missing mandatory fields are reported together. The email is
    /// normalised to lowercase.
    pub fn from_form(form: &HashMap<String, String>) -> Result<Self, CoreError> {
        let required = ["email", "firstName", "lastName", "gender", "userRole"];
        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|k| text(form, k).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(CoreError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        let get = |k: &str| text(form, k).unwrap_or_default();
        let email = get("email").to_lowercase();
        check_email("email", &email)?;

        let user_role = get("userRole");
        if !roles::is_valid_role(&user_role) {
            return Err(CoreError::Validation(format!(
                "Field 'userRole': unknown role '{user_role}'"
            )));
        }

        Ok(Self {
            email,
            first_name: get("firstName"),
            last_name: get("lastName"),
            gender: get("gender"),
            user_role,
            emp_id: text(form, "empId"),
            phone: text(form, "phone"),
            designation_id: id(form, "designation")?,
            department_id: id(form, "department")?,
            job_type: text(form, "jobType"),
            hiring_date: date(form, "hiringDate")?,
            template_id: id(form, "onboardingTemplateId")?,
            report_to: text(form, "reportTo"),
            grade: text(form, "grade"),
            probation_period: text(form, "probationPeriod"),
            date_of_birth: date(form, "dateOfBirth")?,
            marital_status: text(form, "maritalStatus"),
            nationality: text(form, "nationality"),
        })
    }
}

// ---------------------------------------------------------------------------
// Profile patch
// ---------------------------------------------------------------------------

/// The profile fields an employee may change during the review step.
///
/// Unknown keys are rejected rather than ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProfilePatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub marital_status: Option<String>,
    pub nationality: Option<String>,
}

/// Form keys accepted by [`ProfilePatch::from_form`].
pub const PROFILE_PATCH_FIELDS: &[&str] = &[
    "firstName",
    "lastName",
    "email",
    "phone",
    "gender",
    "dateOfBirth",
    "maritalStatus",
    "nationality",
];

impl ProfilePatch {
    /// Build from the text fields of the review form. Unknown keys fail.
    pub fn from_form(form: &HashMap<String, String>) -> Result<Self, CoreError> {
        if let Some(unknown) = form.keys().find(|k| !PROFILE_PATCH_FIELDS.contains(&k.as_str())) {
            return Err(CoreError::Validation(format!(
                "Field '{unknown}': cannot be updated during review"
            )));
        }
        let patch = Self {
            first_name: text(form, "firstName"),
            last_name: text(form, "lastName"),
            email: text(form, "email"),
            phone: text(form, "phone"),
            gender: text(form, "gender"),
            date_of_birth: date(form, "dateOfBirth")?,
            marital_status: text(form, "maritalStatus"),
            nationality: text(form, "nationality"),
        };
        patch.normalized()
    }

    /// Validate and normalise a patch (lowercase email, format check).
    pub fn normalized(mut self) -> Result<Self, CoreError> {
        if let Some(email) = self.email.as_mut() {
            *email = email.trim().to_lowercase();
            check_email("email", email)?;
        }
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
