//! Onboarding session engine.
//!
//! Owns the session lifecycle from invitation to submission:
//!
//! ```text
//! invite ──> pending ──activate──> in_progress ──submit──> submitted
//!               │
//!               └──resolved after expires_at──> expired
//! ```
//!
//! Token-gated calls go through [`OnboardingEngine::resolve`], which applies
//! the lazy expiry transition. After activation the employee authenticates
//! with their own access token and [`OnboardingEngine::active_session_for`]
//! finds the session through the user's current email.

use std::collections::{BTreeMap, HashMap};

use hrflow_core::clock::Clock;
use hrflow_core::document::{
    document_object_key, file_key, file_paths_json, parse_field_values, profile_picture_key,
};
use hrflow_core::error::CoreError;
use hrflow_core::notification::{
    invitation_link, DeliveryStatus, InvitationNotice, InvitationNotifier,
};
use hrflow_core::onboarding::{
    check_invitation, invitation_expiry, validate_step_update, InvitationCheck, InviteRequest,
    OnboardingStatus, ProfilePatch, INVITATION_TTL_HOURS, MSG_NOT_PENDING,
};
use hrflow_core::storage::ObjectStorage;
use hrflow_core::templates::todos_to_materialize;
use hrflow_core::types::DbId;
use hrflow_db::models::document_submission::{CreateDocumentSubmission, DocumentSubmission};
use hrflow_db::models::onboarding_session::{CreateOnboardingSession, OnboardingSession};
use hrflow_db::models::onboarding_task::OnboardingTask;
use hrflow_db::models::onboarding_template::DocumentRef;
use hrflow_db::models::user::User;
use hrflow_db::repositories::{
    CompanyRepo, DocumentSubmissionRepo, DocumentTemplateRepo, OnboardingSessionRepo,
    OnboardingTaskRepo, OnboardingTemplateRepo, UserRepo,
};
use serde::Serialize;
use sqlx::PgPool;

use crate::auth::jwt::{
    decode_invitation_token, generate_access_token, generate_invitation_token, JwtConfig,
};
use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::engine::provisioning;
use crate::error::{AppError, AppResult};
use crate::multipart::{FormData, UploadedFile};
use crate::state::AppState;

const PENDING_EMAIL_CONSTRAINT: &str = "uq_onboarding_sessions_pending_email";

/// Form key of the employee identifier on document submissions.
pub const EMPLOYEE_ID_FIELD: &str = "employee_id";

/// Form key of the JSON-encoded field values on document submissions.
pub const FIELDS_FIELD: &str = "fields";

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// A freshly issued invitation and how its notification went.
#[derive(Debug)]
pub struct Invitation {
    pub session: OnboardingSession,
    pub notification: DeliveryStatus,
}

/// Result of activating an invitation.
#[derive(Debug)]
pub struct Activation {
    pub session: OnboardingSession,
    pub user: User,
    pub access_token: String,
}

/// A checklist entry as the employee sees it.
#[derive(Debug, Clone, Serialize)]
pub struct TodoView {
    /// Template todo item id; the key used to tick the task.
    pub todo_id: Option<DbId>,
    pub task_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub order_index: i32,
    pub is_completed: bool,
}

impl From<OnboardingTask> for TodoView {
    fn from(t: OnboardingTask) -> Self {
        Self {
            todo_id: t.todo_item_id,
            task_id: t.id,
            title: t.title,
            description: t.description,
            order_index: t.order_index,
            is_completed: t.is_completed,
        }
    }
}

/// A required or optional document, whether anything was uploaded for it,
/// and the latest version the employee submitted.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentView {
    pub id: DbId,
    pub name: String,
    pub uploaded: bool,
    pub latest_submission: Option<DocumentSubmission>,
}

/// The session's profile together with its materialized checklist and
/// document requirements.
#[derive(Debug, Clone, Serialize)]
pub struct OnboardingView {
    #[serde(flatten)]
    pub session: OnboardingSession,
    pub todos: Vec<TodoView>,
    pub required_documents: Vec<DocumentView>,
    pub optional_documents: Vec<DocumentView>,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct OnboardingEngine<'a> {
    pool: &'a PgPool,
    storage: &'a dyn ObjectStorage,
    notifier: &'a dyn InvitationNotifier,
    clock: &'a dyn Clock,
    jwt: &'a JwtConfig,
    link_base: &'a str,
}

impl<'a> OnboardingEngine<'a> {
    pub fn new(
        pool: &'a PgPool,
        storage: &'a dyn ObjectStorage,
        notifier: &'a dyn InvitationNotifier,
        clock: &'a dyn Clock,
        jwt: &'a JwtConfig,
        link_base: &'a str,
    ) -> Self {
        Self {
            pool,
            storage,
            notifier,
            clock,
            jwt,
            link_base,
        }
    }

    pub fn from_state(state: &'a AppState) -> Self {
        Self::new(
            &state.pool,
            state.storage.as_ref(),
            state.notifier.as_ref(),
            state.clock.as_ref(),
            &state.config.jwt,
            &state.config.onboarding_link_base,
        )
    }

    // -- Invitation ---------------------------------------------------------

    /// Create a pending session for `request` and notify the new hire.
    ///
    /// The session commits before the notification is attempted; a delivery
    /// failure is logged and reported, never rolled back.
    pub async fn invite(
        &self,
        company_id: DbId,
        request: InviteRequest,
        profile_picture: Option<UploadedFile>,
    ) -> AppResult<Invitation> {
        let company = CompanyRepo::find_by_id(self.pool, company_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Company",
                id: company_id,
            })?;

        if OnboardingSessionRepo::has_pending(self.pool, company_id, &request.email).await? {
            return Err(pending_conflict(&request.email));
        }
        if UserRepo::find_by_email(self.pool, &request.email)
            .await?
            .is_some()
        {
            return Err(CoreError::Conflict(format!(
                "A user with email {} is already registered",
                request.email
            ))
            .into());
        }
        if let Some(template_id) = request.template_id {
            OnboardingTemplateRepo::find_by_id(self.pool, company_id, template_id)
                .await?
                .ok_or(CoreError::NotFound {
                    entity: "OnboardingTemplate",
                    id: template_id,
                })?;
        }
        provisioning::ensure_org_refs(
            self.pool,
            company_id,
            request.department_id,
            request.designation_id,
        )
        .await?;

        let issued_at = self.clock.now();
        let token = generate_invitation_token(&request.email, company_id, issued_at, self.jwt)
            .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

        let profile_picture_url = match profile_picture {
            Some(file) => Some(self.store_profile_picture(company_id, file).await?),
            None => None,
        };

        let input = CreateOnboardingSession {
            company_id,
            new_employee_email: request.email,
            invitation_token: token,
            created_at: issued_at,
            expires_at: invitation_expiry(issued_at),
            template_id: request.template_id,
            emp_id: request.emp_id,
            first_name: request.first_name,
            last_name: request.last_name,
            phone: request.phone,
            gender: request.gender,
            user_role: request.user_role,
            designation_id: request.designation_id,
            department_id: request.department_id,
            job_type: request.job_type,
            hiring_date: request.hiring_date,
            report_to: request.report_to,
            grade: request.grade,
            probation_period: request.probation_period,
            date_of_birth: request.date_of_birth,
            marital_status: request.marital_status,
            nationality: request.nationality,
            profile_picture_url,
        };

        let session = match OnboardingSessionRepo::create(self.pool, &input).await {
            Ok(session) => session,
            Err(e) => {
                if let Some(url) = &input.profile_picture_url {
                    tracing::warn!(
                        company_id,
                        url = %url,
                        "Profile picture orphaned by failed invitation"
                    );
                }
                if is_unique_violation(&e, PENDING_EMAIL_CONSTRAINT) {
                    return Err(pending_conflict(&input.new_employee_email));
                }
                return Err(e.into());
            }
        };

        tracing::info!(
            session_id = session.id,
            company_id,
            template_id = ?session.template_id,
            "Onboarding invitation created"
        );

        let notice = InvitationNotice {
            to_email: session.new_employee_email.clone(),
            first_name: session.first_name.clone().unwrap_or_default(),
            company_name: company.name,
            link: invitation_link(self.link_base, &session.invitation_token),
            expires_in_hours: INVITATION_TTL_HOURS,
        };
        let notification = match self.notifier.send_invitation(&notice).await {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!(session_id = session.id, error = %e, "Invitation notification failed");
                DeliveryStatus::Failed
            }
        };

        Ok(Invitation {
            session,
            notification,
        })
    }

    // -- Token resolution ---------------------------------------------------

    /// Look up the session behind `token`. Tokens that were not signed by
    /// this server are treated as unknown without touching the database.
    async fn find_by_token(&self, token: &str) -> AppResult<OnboardingSession> {
        let not_found = || CoreError::Missing("Invitation not found".to_string());
        decode_invitation_token(token, self.jwt).map_err(|_| not_found())?;
        OnboardingSessionRepo::find_by_token(self.pool, token)
            .await?
            .ok_or_else(|| not_found().into())
    }

    /// Persist the `expired` status of a pending session past its window.
    async fn expire(&self, session: &mut OnboardingSession) -> AppResult<()> {
        if OnboardingSessionRepo::mark_expired(self.pool, session.id).await? {
            tracing::info!(session_id = session.id, "Onboarding invitation expired");
        }
        session.status = OnboardingStatus::Expired.as_str().to_string();
        Ok(())
    }

    /// Resolve an invitation token to its still-pending session.
    ///
    /// A pending session found past its deadline is flipped to `expired`
    /// first, on every attempt; the attempt then fails.
    pub async fn resolve(&self, token: &str) -> AppResult<OnboardingSession> {
        let mut session = self.find_by_token(token).await?;
        let check = check_invitation(session.status()?, session.expires_at, self.clock.now());
        if check == InvitationCheck::Expired {
            self.expire(&mut session).await?;
        }
        match check.error() {
            Some(err) => Err(err.into()),
            None => Ok(session),
        }
    }

    /// The session behind `token` in whatever state it is in, after applying
    /// the lazy expiry transition.
    pub async fn status(&self, token: &str) -> AppResult<OnboardingSession> {
        let mut session = self.find_by_token(token).await?;
        if check_invitation(session.status()?, session.expires_at, self.clock.now())
            == InvitationCheck::Expired
        {
            self.expire(&mut session).await?;
        }
        Ok(session)
    }

    // -- Activation ---------------------------------------------------------

    /// Exchange a valid invitation for a user account and an access token.
    ///
    /// Single-use: the session leaves `pending` in the same transaction that
    /// provisions the user.
    pub async fn activate(&self, token: &str, password: &str) -> AppResult<Activation> {
        validate_password_strength(password, MIN_PASSWORD_LENGTH)
            .map_err(|msg| CoreError::Validation(format!("Field 'password': {msg}")))?;

        let session = self.resolve(token).await?;

        let password_hash = hash_password(password)
            .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
        let new_user =
            provisioning::create_user_from_session(self.pool, &session, password_hash).await?;

        let (session, user) = OnboardingSessionRepo::activate(self.pool, session.id, &new_user)
            .await?
            .ok_or_else(|| CoreError::BadRequest(MSG_NOT_PENDING.to_string()))?;

        let access_token =
            generate_access_token(user.id, user.company_id, &user.role, &user.email, self.jwt)
                .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

        tracing::info!(
            session_id = session.id,
            company_id = session.company_id,
            user_id = user.id,
            "Onboarding invitation activated"
        );

        Ok(Activation {
            session,
            user,
            access_token,
        })
    }

    // -- Wizard progress ----------------------------------------------------

    /// Set the wizard step of the session behind `token`.
    ///
    /// Allowed while the session is pending (subject to lazy expiry) or in
    /// progress. Steps never move backwards.
    pub async fn update_step(&self, token: &str, step: i32) -> AppResult<OnboardingSession> {
        let mut session = self.find_by_token(token).await?;
        let status = session.status()?;
        if status.is_terminal() {
            return Err(CoreError::BadRequest(format!(
                "Onboarding session is {}",
                status.as_str()
            ))
            .into());
        }
        if status == OnboardingStatus::Pending {
            let check = check_invitation(status, session.expires_at, self.clock.now());
            if check == InvitationCheck::Expired {
                self.expire(&mut session).await?;
            }
            if let Some(err) = check.error() {
                return Err(err.into());
            }
        }

        validate_step_update(session.current_step, step)?;

        let updated = OnboardingSessionRepo::update_step(self.pool, session.id, step)
            .await?
            .ok_or_else(|| {
                CoreError::BadRequest("Onboarding session changed, please reload".to_string())
            })?;

        tracing::debug!(session_id = updated.id, step, "Onboarding step updated");
        Ok(updated)
    }

    // -- Self-service -------------------------------------------------------

    /// The in-progress session of the authenticated user.
    pub async fn active_session_for(&self, user_id: DbId) -> AppResult<OnboardingSession> {
        let user = UserRepo::find_by_id(self.pool, user_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "User",
                id: user_id,
            })?;
        OnboardingSessionRepo::find_active_by_email(self.pool, &user.email)
            .await?
            .ok_or_else(|| no_session_in_progress().into())
    }

    /// Materialize the session's checklist and build its view.
    ///
    /// Creates a task for every template todo that has none yet (additive
    /// and idempotent); nothing else is written.
    pub async fn materialize(&self, session: OnboardingSession) -> AppResult<OnboardingView> {
        let Some(template_id) = session.template_id else {
            let todos = OnboardingTaskRepo::list_for_session(self.pool, session.id)
                .await?
                .into_iter()
                .map(TodoView::from)
                .collect();
            return Ok(OnboardingView {
                session,
                todos,
                required_documents: Vec::new(),
                optional_documents: Vec::new(),
            });
        };

        let todos = OnboardingTemplateRepo::list_todos(self.pool, template_id).await?;
        let materialized =
            OnboardingTaskRepo::materialized_todo_ids(self.pool, session.id).await?;
        let order: Vec<(DbId, i32)> = todos.iter().map(|t| (t.id, t.order_index)).collect();
        let missing = todos_to_materialize(&order, &materialized);
        if !missing.is_empty() {
            let created = OnboardingTaskRepo::insert_missing(self.pool, session.id, &missing).await?;
            tracing::debug!(session_id = session.id, template_id, created, "Checklist materialized");
        }

        let tasks = OnboardingTaskRepo::list_for_session(self.pool, session.id).await?;
        let required = OnboardingTemplateRepo::required_documents(self.pool, template_id).await?;
        let optional = OnboardingTemplateRepo::optional_documents(self.pool, template_id).await?;
        let latest = self.latest_submissions(&session, &required, &optional).await?;

        Ok(OnboardingView {
            todos: tasks.into_iter().map(TodoView::from).collect(),
            required_documents: document_views(required, &latest),
            optional_documents: document_views(optional, &latest),
            session,
        })
    }

    /// Latest submission per document, filed either under the session's
    /// `empId` or, when it has none, through the session itself.
    async fn latest_submissions(
        &self,
        session: &OnboardingSession,
        required: &[DocumentRef],
        optional: &[DocumentRef],
    ) -> AppResult<HashMap<DbId, DocumentSubmission>> {
        let ids: Vec<DbId> = required.iter().chain(optional).map(|d| d.id).collect();
        let found = DocumentSubmissionRepo::latest_for_documents(
            self.pool,
            session.company_id,
            session.emp_id.as_deref(),
            session.id,
            &ids,
        )
        .await?;
        Ok(found.into_iter().map(|s| (s.template_id, s)).collect())
    }

    /// Apply the employee's review edits, optionally replacing the profile
    /// picture, and return the refreshed view.
    pub async fn review_update(
        &self,
        session: OnboardingSession,
        patch: ProfilePatch,
        profile_picture: Option<UploadedFile>,
    ) -> AppResult<OnboardingView> {
        if patch.is_empty() && profile_picture.is_none() {
            return self.materialize(session).await;
        }

        if let Some(email) = patch.email.as_deref() {
            if email != session.new_employee_email
                && UserRepo::find_by_email(self.pool, email).await?.is_some()
            {
                return Err(CoreError::Conflict(format!(
                    "A user with email {email} is already registered"
                ))
                .into());
            }
        }

        let picture_url = match profile_picture {
            Some(file) => Some(self.store_profile_picture(session.company_id, file).await?),
            None => None,
        };

        let updated = OnboardingSessionRepo::apply_review(
            self.pool,
            session.id,
            &patch,
            picture_url.as_deref(),
        )
        .await?
        .ok_or_else(no_session_in_progress)?;

        tracing::info!(session_id = updated.id, "Onboarding profile reviewed");
        self.materialize(updated).await
    }

    /// Tick or untick one checklist task, addressed by its template todo id.
    ///
    /// Does not materialize: a todo with no task yet is not found.
    pub async fn update_todo(
        &self,
        session: &OnboardingSession,
        todo_id: DbId,
        completed: bool,
    ) -> AppResult<OnboardingTask> {
        let not_found = || CoreError::NotFound {
            entity: "OnboardingTask",
            id: todo_id,
        };
        let task = OnboardingTaskRepo::find_by_todo(self.pool, session.id, todo_id)
            .await?
            .ok_or_else(not_found)?;
        let task = OnboardingTaskRepo::set_completed(self.pool, task.id, completed, self.clock.now())
            .await?
            .ok_or_else(not_found)?;

        tracing::debug!(session_id = session.id, todo_id, completed, "Onboarding task updated");
        Ok(task)
    }

    /// Record a new version of the employee's submission for a document
    /// template, uploading its files first.
    pub async fn save_document_submission(
        &self,
        session: &OnboardingSession,
        document_template_id: DbId,
        mut form: FormData,
    ) -> AppResult<DocumentSubmission> {
        DocumentTemplateRepo::find_by_id(self.pool, session.company_id, document_template_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "DocumentTemplate",
                id: document_template_id,
            })?;

        let employee_id = submission_employee_id(session, form.take_field(EMPLOYEE_ID_FIELD))?;
        let field_values = parse_field_values(form.take_field(FIELDS_FIELD).as_deref())?;

        let mut paths = BTreeMap::new();
        for file in form.files {
            let key = document_object_key(
                session.company_id,
                &employee_id,
                document_template_id,
                file.file_name.as_deref(),
            );
            let url = self
                .storage
                .put_object(&key, file.content_type.as_deref(), file.bytes)
                .await?;
            paths.insert(file_key(&file.part_name, file.file_name.as_deref()), url);
        }

        let submission = DocumentSubmissionRepo::create_version(
            self.pool,
            &CreateDocumentSubmission {
                company_id: session.company_id,
                template_id: document_template_id,
                employee_id,
                session_id: Some(session.id),
                field_values,
                file_paths: file_paths_json(paths),
            },
        )
        .await?;

        tracing::info!(
            session_id = session.id,
            template_id = document_template_id,
            version = submission.version,
            "Document submission recorded"
        );
        Ok(submission)
    }

    /// Terminal transition for the authenticated user's session. Activates
    /// the provisioned account.
    pub async fn submit(&self, user_id: DbId) -> AppResult<OnboardingSession> {
        let user = UserRepo::find_by_id(self.pool, user_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "User",
                id: user_id,
            })?;

        let Some(session) = OnboardingSessionRepo::find_active_by_email(self.pool, &user.email).await?
        else {
            let latest = OnboardingSessionRepo::find_latest_by_email(self.pool, &user.email).await?;
            return match latest.map(|s| s.status()).transpose()? {
                Some(OnboardingStatus::Submitted) => Err(already_submitted()),
                _ => Err(no_session_in_progress().into()),
            };
        };

        let submitted = OnboardingSessionRepo::submit(self.pool, session.id)
            .await?
            .ok_or_else(already_submitted)?;

        tracing::info!(
            session_id = submitted.id,
            company_id = submitted.company_id,
            user_id,
            "Onboarding submitted"
        );
        Ok(submitted)
    }

    // -- Helpers ------------------------------------------------------------

    async fn store_profile_picture(&self, company_id: DbId, file: UploadedFile) -> AppResult<String> {
        let key = profile_picture_key(company_id, file.file_name.as_deref());
        let url = self
            .storage
            .put_object(&key, file.content_type.as_deref(), file.bytes)
            .await?;
        Ok(url)
    }
}

// ---------------------------------------------------------------------------
// Free helpers
// ---------------------------------------------------------------------------

fn document_views(
    docs: Vec<DocumentRef>,
    latest: &HashMap<DbId, DocumentSubmission>,
) -> Vec<DocumentView> {
    docs.into_iter()
        .map(|d| {
            let latest_submission = latest.get(&d.id).cloned();
            DocumentView {
                uploaded: latest_submission.is_some(),
                latest_submission,
                id: d.id,
                name: d.name,
            }
        })
        .collect()
}

/// Settle the employee identifier a submission is filed under.
///
/// The session's `empId` wins and a form value must match it. Without one
/// the form value is used as given.
pub fn submission_employee_id(
    session: &OnboardingSession,
    given: Option<String>,
) -> Result<String, CoreError> {
    let given = given.map(|g| g.trim().to_string()).filter(|g| !g.is_empty());
    match (session.emp_id.as_deref(), given) {
        (Some(own), Some(given)) if own != given => Err(CoreError::Forbidden(
            "employee_id does not match this onboarding session".to_string(),
        )),
        (Some(own), _) => Ok(own.to_string()),
        (None, Some(given)) => Ok(given),
        (None, None) => Err(CoreError::BadRequest(
            "No employee id is assigned to this onboarding session".to_string(),
        )),
    }
}

fn pending_conflict(email: &str) -> AppError {
    CoreError::Conflict(format!(
        "An onboarding invitation is already pending for {email}"
    ))
    .into()
}

fn no_session_in_progress() -> CoreError {
    CoreError::Missing("No onboarding session in progress".to_string())
}

fn already_submitted() -> AppError {
    CoreError::Conflict("Onboarding already submitted".to_string()).into()
}

fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            db.code().as_deref() == Some("23505") && db.constraint() == Some(constraint)
        }
        _ => false,
    }
}
