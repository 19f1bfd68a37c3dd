//! Collecting multipart form bodies.
//!
//! Handlers that accept `multipart/form-data` read the whole body into a
//! [`FormData`]: text parts keyed by name, file parts in arrival order.

use std::collections::HashMap;

use axum::extract::Multipart;

use crate::error::{AppError, AppResult};

/// One uploaded file part.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub part_name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct FormData {
    pub fields: HashMap<String, String>,
    pub files: Vec<UploadedFile>,
}

impl FormData {
    /// Read every part of `multipart`.
    ///
    /// A part with a file name is a file; anything else is text. File parts
    /// with no content and no name (an untouched file input) are skipped.
    pub async fn collect(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = FormData::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(format!("Multipart error: {e}")))?
        {
            let name = field.name().unwrap_or("").to_string();
            let file_name = field.file_name().map(str::to_string);

            match file_name {
                Some(file_name) => {
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("Failed to read file: {e}")))?;
                    if bytes.is_empty() && file_name.is_empty() {
                        continue;
                    }
                    form.files.push(UploadedFile {
                        part_name: name,
                        file_name: Some(file_name).filter(|n| !n.is_empty()),
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
                None => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("Failed to read field: {e}")))?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    /// Remove and return the first file sent under `part_name`.
    pub fn take_file(&mut self, part_name: &str) -> Option<UploadedFile> {
        let index = self.files.iter().position(|f| f.part_name == part_name)?;
        Some(self.files.remove(index))
    }

    /// Remove and return the text value of `name`.
    pub fn take_field(&mut self, name: &str) -> Option<String> {
        self.fields.remove(name)
    }
}
