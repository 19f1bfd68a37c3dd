//! Document template field types and submission rules.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Multipart part names that carry an unnamed list of files. Files sent
/// under these names are keyed by their file name instead.
pub const FILE_LIST_PARTS: &[&str] = &["files", "files[]"];

// ---------------------------------------------------------------------------
// Field type / width
// ---------------------------------------------------------------------------

/// Input control rendered for a document field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Textarea,
    File,
    Date,
}

impl FieldType {
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "text" => Ok(Self::Text),
            "textarea" => Ok(Self::Textarea),
            "file" => Ok(Self::File),
            "date" => Ok(Self::Date),
            _ => Err(CoreError::Validation(format!(
                "Invalid field type '{s}'. Must be one of: text, textarea, file, date"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::File => "file",
            Self::Date => "date",
        }
    }
}

/// Display width of a document field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldWidth {
    Half,
    #[default]
    Full,
}

impl FieldWidth {
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "half" => Ok(Self::Half),
            "full" => Ok(Self::Full),
            _ => Err(CoreError::Validation(format!(
                "Invalid field width '{s}'. Must be one of: half, full"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Half => "half",
            Self::Full => "full",
        }
    }
}

// ---------------------------------------------------------------------------
// Submission status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Submitted,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "submitted" => Ok(Self::Submitted),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(CoreError::Validation(format!(
                "Invalid submission status '{s}'. Must be one of: submitted, approved, rejected"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// Validate a reviewer's status change on a submission.
///
/// Only a `submitted` version can be reviewed, and only into
/// `approved` or `rejected`.
pub fn validate_review(
    current: SubmissionStatus,
    target: SubmissionStatus,
) -> Result<(), CoreError> {
    if target == SubmissionStatus::Submitted {
        return Err(CoreError::Validation(
            "Review status must be 'approved' or 'rejected'".to_string(),
        ));
    }
    if current != SubmissionStatus::Submitted {
        return Err(CoreError::BadRequest(format!(
            "Submission has already been {}",
            current.as_str()
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Field values
// ---------------------------------------------------------------------------

/// Parse the `fields` form value of a document submission.
///
/// Must be a JSON object; an absent or blank value means no fields.
pub fn parse_field_values(raw: Option<&str>) -> Result<serde_json::Value, CoreError> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(serde_json::Value::Object(Default::default())),
        Some(r) => r,
    };
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(value @ serde_json::Value::Object(_)) => Ok(value),
        Ok(_) => Err(CoreError::BadRequest(
            "Fields JSON must be an object".to_string(),
        )),
        Err(_) => Err(CoreError::BadRequest("Invalid fields JSON format".to_string())),
    }
}

/// Key a stored file under in `file_paths`.
pub fn file_key(part_name: &str, file_name: Option<&str>) -> String {
    match file_name {
        Some(name) if FILE_LIST_PARTS.contains(&part_name) && !name.is_empty() => name.to_string(),
        _ => part_name.to_string(),
    }
}

/// Collect stored-file URLs into the `file_paths` JSON object.
pub fn file_paths_json(paths: BTreeMap<String, String>) -> serde_json::Value {
    serde_json::Value::Object(
        paths
            .into_iter()
            .map(|(k, v)| (k, serde_json::Value::String(v)))
            .collect(),
    )
}

// ---------------------------------------------------------------------------
// Storage keys
// ---------------------------------------------------------------------------

/// Lowercased extension of `file_name`, if it has a usable one.
pub fn file_extension(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

fn object_name(file_name: Option<&str>) -> String {
    let id = uuid::Uuid::new_v4();
    match file_name.and_then(file_extension) {
        Some(ext) => format!("{id}.{ext}"),
        None => id.to_string(),
    }
}

/// Object key for a document upload, scoped by company and employee.
pub fn document_object_key(
    company_id: DbId,
    employee_id: &str,
    template_id: DbId,
    file_name: Option<&str>,
) -> String {
    format!(
        "documents/{company_id}/{}/{template_id}/{}",
        sanitize_segment(employee_id),
        object_name(file_name)
    )
}

/// Object key for a profile picture.
pub fn profile_picture_key(company_id: DbId, file_name: Option<&str>) -> String {
    format!("profile-pictures/{company_id}/{}", object_name(file_name))
}

/// Make an employee identifier safe to use as one key segment.
fn sanitize_segment(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn field_type_roundtrip() {
        for t in [FieldType::Text, FieldType::Textarea, FieldType::File, FieldType::Date] {
            assert_eq!(FieldType::from_str_db(t.as_str()).unwrap(), t);
        }
        assert!(FieldType::from_str_db("checkbox").is_err());
    }

    #[test]
    fn width_defaults_to_full() {
        assert_eq!(FieldWidth::default(), FieldWidth::Full);
        assert_eq!(FieldWidth::from_str_db("half").unwrap(), FieldWidth::Half);
        assert!(FieldWidth::from_str_db("third").is_err());
    }

    #[test]
    fn review_only_from_submitted() {
        use SubmissionStatus::*;
        assert!(validate_review(Submitted, Approved).is_ok());
        assert!(validate_review(Submitted, Rejected).is_ok());
        assert_matches!(validate_review(Approved, Rejected), Err(CoreError::BadRequest(_)));
        assert_matches!(validate_review(Submitted, Submitted), Err(CoreError::Validation(_)));
    }

    #[test]
    fn field_values_must_be_object() {
        let v = parse_field_values(Some(r#"{"passport_no":"X123"}"#)).unwrap();
        assert_eq!(v["passport_no"], "X123");

        assert!(parse_field_values(None).unwrap().as_object().unwrap().is_empty());
        assert!(parse_field_values(Some("  ")).unwrap().is_object());

        assert_matches!(
            parse_field_values(Some("{not json")),
            Err(CoreError::BadRequest(msg)) if msg == "Invalid fields JSON format"
        );
        assert_matches!(parse_field_values(Some("[1,2]")), Err(CoreError::BadRequest(_)));
    }

    #[test]
    fn file_key_uses_filename_for_list_parts() {
        assert_eq!(file_key("files", Some("passport.pdf")), "passport.pdf");
        assert_eq!(file_key("files[]", Some("id.png")), "id.png");
        assert_eq!(file_key("passport_scan", Some("scan.pdf")), "passport_scan");
        assert_eq!(file_key("files", None), "files");
    }

    #[test]
    fn extension_extraction() {
        assert_eq!(file_extension("Scan.PDF").as_deref(), Some("pdf"));
        assert_eq!(file_extension("archive.tar.gz").as_deref(), Some("gz"));
        assert_eq!(file_extension("noext"), None);
        assert_eq!(file_extension(".hidden"), None);
        assert_eq!(file_extension("weird.p/f"), None);
    }

    #[test]
    fn document_keys_are_scoped() {
        let key = document_object_key(4, "EMP/007", 9, Some("id.jpg"));
        assert!(key.starts_with("documents/4/EMP_007/9/"), "{key}");
        assert!(key.ends_with(".jpg"));

        let pic = profile_picture_key(4, None);
        assert!(pic.starts_with("profile-pictures/4/"));
        assert!(!pic.contains('.'));
    }

    #[test]
    fn file_paths_object() {
        let mut m = BTreeMap::new();
        m.insert("passport".to_string(), "https://cdn/x.pdf".to_string());
        let v = file_paths_json(m);
        assert_eq!(v["passport"], "https://cdn/x.pdf");
    }
}
