//! Multipart form reading.
//!
//! The whole form is collected up front so validation can stay a pure function
//! over plain values. File parts are counted in full but only the first
//! `retain_limit` bytes are kept, which bounds memory for oversized uploads.

use std::collections::HashMap;

use axum::extract::multipart::{Multipart, MultipartError};
use bytes::{Bytes, BytesMut};

/// A file part exactly as the client sent it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFile {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    /// Possibly truncated; see `size` for the real length.
    pub content: Bytes,
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    File(RawFile),
}

/// Unvalidated form fields keyed by name. The first value for a name wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawForm {
    fields: HashMap<String, FormValue>,
}

impl RawForm {
    pub fn insert(&mut self, name: impl Into<String>, value: FormValue) {
        self.fields.entry(name.into()).or_insert(value);
    }

    #[cfg(test)]
    pub fn with_text(mut self, name: &str, value: &str) -> Self {
        self.insert(name, FormValue::Text(value.to_string()));
        self
    }

    #[cfg(test)]
    pub fn with_file(mut self, name: &str, file: RawFile) -> Self {
        self.insert(name, FormValue::File(file));
        self
    }

    /// Text value of a field, or an empty string when absent or a file.
    pub fn text(&self, name: &str) -> String {
        match self.fields.get(name) {
            Some(FormValue::Text(value)) => value.clone(),
            _ => String::new(),
        }
    }

    pub fn file(&self, name: &str) -> Option<&RawFile> {
        match self.fields.get(name) {
            Some(FormValue::File(file)) => Some(file),
            _ => None,
        }
    }
}

/// Drains a multipart body into a [`RawForm`].
pub async fn read_form(
    mut multipart: Multipart,
    retain_limit: usize,
) -> Result<RawForm, MultipartError> {
    let mut form = RawForm::default();

    while let Some(mut field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        let value = match field.file_name().map(str::to_string) {
            Some(filename) => {
                let content_type = field.content_type().map(str::to_string);
                let mut retained = BytesMut::new();
                let mut size = 0usize;

                while let Some(chunk) = field.chunk().await? {
                    size += chunk.len();
                    let room = retain_limit.saturating_sub(retained.len());
                    if room > 0 {
                        retained.extend_from_slice(&chunk[..room.min(chunk.len())]);
                    }
                }

                FormValue::File(RawFile {
                    filename: Some(filename),
                    content_type,
                    content: retained.freeze(),
                    size,
                })
            }
            None => FormValue::Text(field.text().await?),
        };

        form.insert(name, value);
    }

    Ok(form)
}
