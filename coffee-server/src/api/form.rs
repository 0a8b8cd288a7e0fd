//! Multipart form collection
//!
//! Product and profile endpoints accept `multipart/form-data` with a mix of
//! text fields and files. The form is read fully into memory; each file is
//! bounded by [`MAX_FILE_SIZE`](crate::media::MAX_FILE_SIZE) when validated.

use std::collections::HashMap;
use std::str::FromStr;

use axum::extract::Multipart;
use shared::error::{AppError, ErrorCode};

/// One uploaded file
#[derive(Debug, Clone)]
pub struct FilePart {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

/// Text fields and files of a multipart body
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: HashMap<String, Vec<FilePart>>,
}

impl MultipartForm {
    /// Drain `multipart`; parts with a file name are files, the rest text
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            AppError::with_message(ErrorCode::InvalidRequest, format!("Multipart error: {e}"))
        })? {
            let name = field.name().unwrap_or_default().to_string();
            if name.is_empty() {
                continue;
            }

            let file_name = field.file_name().map(|s| s.to_string());
            match file_name {
                Some(file_name) => {
                    let bytes = field.bytes().await.map_err(|e| {
                        AppError::with_message(ErrorCode::InvalidRequest, format!("Read error: {e}"))
                    })?;
                    form.files.entry(name).or_default().push(FilePart {
                        file_name: Some(file_name),
                        bytes: bytes.to_vec(),
                    });
                }
                None => {
                    let text = field.text().await.map_err(|e| {
                        AppError::with_message(ErrorCode::InvalidRequest, format!("Read error: {e}"))
                    })?;
                    form.fields.insert(name, text);
                }
            }
        }

        Ok(form)
    }

    /// Trimmed text field; blank counts as absent
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(|v| v.to_string())
    }

    pub fn require_text(&self, name: &str) -> Result<String, AppError> {
        self.text(name).ok_or_else(|| {
            AppError::with_message(ErrorCode::RequiredField, format!("{name} is required"))
                .with_detail("field", name)
        })
    }

    /// Parse a text field, `code` on malformed input
    pub fn parse<T: FromStr>(&self, name: &str, code: ErrorCode) -> Result<Option<T>, AppError> {
        self.text(name)
            .map(|v| {
                v.parse::<T>().map_err(|_| {
                    AppError::with_message(code, format!("Invalid {name}: {v}"))
                        .with_detail("field", name)
                })
            })
            .transpose()
    }

    /// First file under `name`
    pub fn file(&self, name: &str) -> Option<&FilePart> {
        self.files.get(name).and_then(|files| files.first())
    }

    /// Every file under `name`
    pub fn files(&self, name: &str) -> &[FilePart] {
        self.files.get(name).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Comma separated list, blank entries dropped
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(fields: &[(&str, &str)]) -> MultipartForm {
        MultipartForm {
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            files: HashMap::new(),
        }
    }

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list(" milk, espresso ,,foam "),
            vec!["milk", "espresso", "foam"]
        );
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_blank_text_is_absent() {
        let f = form(&[("name", "  "), ("summary", " Strong ")]);
        assert_eq!(f.text("name"), None);
        assert_eq!(f.text("summary").as_deref(), Some("Strong"));
        assert_eq!(f.require_text("name").unwrap_err().code, ErrorCode::RequiredField);
    }

    #[test]
    fn test_parse_field() {
        let f = form(&[("price", "3.5"), ("discount", "ten")]);
        assert_eq!(
            f.parse::<f64>("price", ErrorCode::ProductInvalidPrice).unwrap(),
            Some(3.5)
        );
        assert_eq!(
            f.parse::<f64>("discount", ErrorCode::ProductInvalidDiscount)
                .unwrap_err()
                .code,
            ErrorCode::ProductInvalidDiscount
        );
        assert_eq!(f.parse::<f64>("missing", ErrorCode::ProductInvalidPrice).unwrap(), None);
        assert!(f.files("images").is_empty());
    }
}
