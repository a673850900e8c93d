use reqwest::blocking::multipart;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::errors::AppResult;

use super::active_event::ActiveEventContext;

/// Multipart field names the client owns. Caller-supplied metadata never
/// overrides these; album and uploader identity always come from the
/// active event context.
const RESERVED_FIELDS: [&str; 2] = ["albumName", "uploaderName"];

/// Outcome of a single upload. Callers branch on the variant only; a
/// `Success` is always fully populated.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadResult {
    Success {
        photo_id: String,
        url: String,
        event_id: String,
        album_name: String,
    },
    Failure {
        error: String,
    },
}

impl UploadResult {
    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failure { error } => Some(error),
            Self::Success { .. } => None,
        }
    }
}

/// Success body of the photo upload endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct UploadResponse {
    pub id: String,
    pub url: String,
}

/// Optional error body of the photo upload endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct UploadErrorBody {
    pub message: Option<String>,
}

/// Holds the encoded image plus form fields for one upload request.
#[derive(Debug, Clone)]
pub struct UploadPayload {
    filename: String,
    jpeg_bytes: Vec<u8>,
    text_fields: HashMap<String, String>,
}

impl UploadPayload {
    pub fn new(
        jpeg_bytes: Vec<u8>,
        original_path: &Path,
        context: &ActiveEventContext,
        uploader_name: &str,
        metadata: Option<&HashMap<String, String>>,
    ) -> Self {
        let filename = original_path
            .file_stem()
            .map(|stem| format!("{}.jpg", stem.to_string_lossy()))
            .unwrap_or_else(|| "processed_photo.jpg".to_string());

        let mut text_fields = HashMap::new();
        if let Some(metadata) = metadata {
            for (key, value) in metadata {
                text_fields.insert(key.clone(), value.clone());
            }
        }

        // Reserved fields are written last so they win over metadata.
        let [album_field, uploader_field] = RESERVED_FIELDS;
        text_fields.insert(album_field.to_string(), context.album_name.clone());
        text_fields.insert(uploader_field.to_string(), uploader_name.to_string());

        Self {
            filename,
            jpeg_bytes,
            text_fields,
        }
    }

    pub fn build_form(&self) -> AppResult<multipart::Form> {
        let mut form = multipart::Form::new();

        for (key, value) in &self.text_fields {
            form = form.text(key.clone(), value.clone());
        }

        let part = multipart::Part::bytes(self.jpeg_bytes.clone())
            .file_name(self.filename.clone())
            .mime_str("image/jpeg")?;

        Ok(form.part("photo", part))
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.text_fields.get(key).map(String::as_str)
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }
}
