//! Document template and field models.

use hrflow_core::document::{FieldType, FieldWidth};
use hrflow_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `document_templates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DocumentTemplate {
    pub id: DbId,
    pub company_id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `document_fields` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DocumentField {
    pub id: DbId,
    pub template_id: DbId,
    pub label: String,
    pub field_type: String,
    pub placeholder: Option<String>,
    pub description: Option<String>,
    pub is_required: bool,
    pub width: String,
    pub order_index: i32,
    pub created_at: Timestamp,
}

/// A document template with its ordered fields.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentTemplateDetail {
    #[serde(flatten)]
    pub template: DocumentTemplate,
    pub fields: Vec<DocumentField>,
}

/// One field in a create or update request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DocumentFieldInput {
    #[validate(length(min = 1, max = 200))]
    pub label: String,
    pub field_type: FieldType,
    pub placeholder: Option<String>,
    pub description: Option<String>,
    #[serde(default, alias = "required")]
    pub is_required: bool,
    #[serde(default)]
    pub width: FieldWidth,
    pub order_index: Option<i32>,
}

/// Body for `POST /document-templates`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDocumentTemplate {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    #[validate(nested)]
    pub fields: Vec<DocumentFieldInput>,
}

/// Body for `PUT /document-templates/{id}`. `fields`, when present,
/// replaces the whole field list.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateDocumentTemplate {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(nested)]
    pub fields: Option<Vec<DocumentFieldInput>>,
}
