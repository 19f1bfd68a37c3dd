//! Repository for the `document_templates` and `document_fields` tables.

use hrflow_core::templates::order_index_for;
use hrflow_core::types::DbId;
use sqlx::PgPool;

use crate::models::document_template::{
    CreateDocumentTemplate, DocumentField, DocumentFieldInput, DocumentTemplate,
    DocumentTemplateDetail, UpdateDocumentTemplate,
};

const COLUMNS: &str = "id, company_id, name, created_at, updated_at";

const FIELD_COLUMNS: &str = "id, template_id, label, field_type, placeholder, description, \
    is_required, width, order_index, created_at";

/// Company-scoped CRUD for document templates and their fields.
pub struct DocumentTemplateRepo;

impl DocumentTemplateRepo {
    /// Insert a template and its fields in one transaction.
    pub async fn create(
        pool: &PgPool,
        company_id: DbId,
        input: &CreateDocumentTemplate,
    ) -> Result<DocumentTemplateDetail, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO document_templates (company_id, name) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        let template = sqlx::query_as::<_, DocumentTemplate>(&query)
            .bind(company_id)
            .bind(input.name.trim())
            .fetch_one(&mut *tx)
            .await?;

        let fields = Self::insert_fields(&mut tx, template.id, &input.fields).await?;

        tx.commit().await?;
        Ok(DocumentTemplateDetail { template, fields })
    }

    pub async fn find_by_id(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
    ) -> Result<Option<DocumentTemplate>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM document_templates WHERE id = $1 AND company_id = $2");
        sqlx::query_as::<_, DocumentTemplate>(&query)
            .bind(id)
            .bind(company_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a template with its fields.
    pub async fn find_detail(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
    ) -> Result<Option<DocumentTemplateDetail>, sqlx::Error> {
        let Some(template) = Self::find_by_id(pool, company_id, id).await? else {
            return Ok(None);
        };
        let fields = Self::list_fields(pool, template.id).await?;
        Ok(Some(DocumentTemplateDetail { template, fields }))
    }

    pub async fn list(
        pool: &PgPool,
        company_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<DocumentTemplate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM document_templates WHERE company_id = $1 \
             ORDER BY name, id LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, DocumentTemplate>(&query)
            .bind(company_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Fields of a template ordered by `order_index`, then insertion order.
    pub async fn list_fields(
        pool: &PgPool,
        template_id: DbId,
    ) -> Result<Vec<DocumentField>, sqlx::Error> {
        let query = format!(
            "SELECT {FIELD_COLUMNS} FROM document_fields WHERE template_id = $1 \
             ORDER BY order_index, id"
        );
        sqlx::query_as::<_, DocumentField>(&query)
            .bind(template_id)
            .fetch_all(pool)
            .await
    }

    /// Update a template. If `fields` is `Some`, the field list is replaced.
    ///
    /// Returns `None` if the template does not exist in the company.
    pub async fn update(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
        input: &UpdateDocumentTemplate,
    ) -> Result<Option<DocumentTemplateDetail>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE document_templates SET name = COALESCE($3, name) \
             WHERE id = $1 AND company_id = $2 RETURNING {COLUMNS}"
        );
        let template = sqlx::query_as::<_, DocumentTemplate>(&query)
            .bind(id)
            .bind(company_id)
            .bind(input.name.as_deref().map(str::trim))
            .fetch_optional(&mut *tx)
            .await?;
        let Some(template) = template else {
            return Ok(None);
        };

        if let Some(fields) = &input.fields {
            sqlx::query("DELETE FROM document_fields WHERE template_id = $1")
                .bind(template.id)
                .execute(&mut *tx)
                .await?;
            Self::insert_fields(&mut tx, template.id, fields).await?;
        }

        tx.commit().await?;

        let fields = Self::list_fields(pool, template.id).await?;
        Ok(Some(DocumentTemplateDetail { template, fields }))
    }

    /// Delete a template (fields and submissions cascade).
    pub async fn delete(pool: &PgPool, company_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM document_templates WHERE id = $1 AND company_id = $2")
            .bind(id)
            .bind(company_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// The subset of `ids` that are document templates of `company_id`.
    pub async fn ids_in_company(
        pool: &PgPool,
        company_id: DbId,
        ids: &[DbId],
    ) -> Result<Vec<DbId>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<(DbId,)> = sqlx::query_as(
            "SELECT id FROM document_templates WHERE company_id = $1 AND id = ANY($2) ORDER BY id",
        )
        .bind(company_id)
        .bind(ids)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    async fn insert_fields(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        template_id: DbId,
        fields: &[DocumentFieldInput],
    ) -> Result<Vec<DocumentField>, sqlx::Error> {
        let query = format!(
            "INSERT INTO document_fields \
                (template_id, label, field_type, placeholder, description, is_required, width, order_index) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {FIELD_COLUMNS}"
        );
        let mut inserted = Vec::with_capacity(fields.len());
        for (i, field) in fields.iter().enumerate() {
            let order_index = order_index_for("fields", i, field.order_index)
                .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
            let row = sqlx::query_as::<_, DocumentField>(&query)
                .bind(template_id)
                .bind(field.label.trim())
                .bind(field.field_type.as_str())
                .bind(&field.placeholder)
                .bind(&field.description)
                .bind(field.is_required)
                .bind(field.width.as_str())
                .bind(order_index)
                .fetch_one(&mut **tx)
                .await?;
            inserted.push(row);
        }
        inserted.sort_by_key(|f| (f.order_index, f.id));
        Ok(inserted)
    }
}
