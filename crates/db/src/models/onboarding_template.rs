//! Onboarding template, todo item, and document association models.

use hrflow_core::templates::TodoInput;
use hrflow_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `onboarding_templates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OnboardingTemplate {
    pub id: DbId,
    pub company_id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `todo_items` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TodoItem {
    pub id: DbId,
    pub template_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub order_index: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Id and name of a document template referenced by an onboarding template.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DocumentRef {
    pub id: DbId,
    pub name: String,
}

/// An onboarding template with its todos and document requirements.
#[derive(Debug, Clone, Serialize)]
pub struct OnboardingTemplateDetail {
    #[serde(flatten)]
    pub template: OnboardingTemplate,
    pub todos: Vec<TodoItem>,
    pub required_documents: Vec<DocumentRef>,
    pub optional_documents: Vec<DocumentRef>,
}

/// Body for `POST /onboarding-templates`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOnboardingTemplate {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub todos: Vec<TodoInput>,
    #[serde(default)]
    pub required_document_ids: Vec<DbId>,
    #[serde(default)]
    pub optional_document_ids: Vec<DbId>,
}

/// Body for `PUT /onboarding-templates/{id}`. Omitted lists are left alone.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateOnboardingTemplate {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub todos: Option<Vec<TodoInput>>,
    pub required_document_ids: Option<Vec<DbId>>,
    pub optional_document_ids: Option<Vec<DbId>>,
}
