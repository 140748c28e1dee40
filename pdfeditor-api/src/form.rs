//! Multipart form collection

use crate::error::AppError;
use axum::extract::Multipart;
use pdfeditor::Upload;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::debug;

const FALLBACK_UPLOAD_NAME: &str = "upload.pdf";

/// All fields of one multipart request, read up front.
///
/// Parts carrying a file name are uploads; every other part is text.
#[derive(Debug, Default)]
pub struct FormData {
    uploads: Vec<(String, Upload)>,
    fields: HashMap<String, Vec<String>>,
}

impl FormData {
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = FormData::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let bytes = field.bytes().await?;
                    debug!("Received file '{}' ({} bytes) in '{}'", file_name, bytes.len(), name);
                    form.push_upload(name, Upload::new(file_name, bytes.to_vec()));
                }
                None => {
                    let value = field.text().await?;
                    form.push_field(name, value);
                }
            }
        }

        Ok(form)
    }

    pub fn push_upload(&mut self, field: impl Into<String>, upload: Upload) {
        let field = field.into();
        let field = field.strip_suffix("[]").map(str::to_string).unwrap_or(field);
        self.uploads.push((field, upload));
    }

    pub fn push_field(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.entry(field.into()).or_default().push(value.into());
    }

    /// The first upload in `field`.
    ///
    /// A missing upload comes back empty so the operation reports it.
    pub fn take_upload(&mut self, field: &str) -> Upload {
        match self.uploads.iter().position(|(name, _)| name == field) {
            Some(index) => self.uploads.remove(index).1,
            None => Upload::new(FALLBACK_UPLOAD_NAME, Vec::new()),
        }
    }

    /// Every upload in `field`, in the order received.
    pub fn take_uploads(&mut self, field: &str) -> Vec<Upload> {
        let (taken, kept) = std::mem::take(&mut self.uploads)
            .into_iter()
            .partition(|(name, _)| name == field);
        self.uploads = kept;
        taken.into_iter().map(|(_, upload)| upload).collect()
    }

    /// The first non-blank value of a text field, trimmed.
    pub fn text(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)?
            .iter()
            .map(|value| value.trim())
            .find(|value| !value.is_empty())
    }

    pub fn text_owned(&self, field: &str) -> Option<String> {
        self.text(field).map(str::to_string)
    }

    /// Values of a field sent repeatedly or comma-joined.
    pub fn list(&self, field: &str) -> Vec<String> {
        self.fields
            .get(field)
            .into_iter()
            .flatten()
            .flat_map(|value| value.split(','))
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn parse<T: FromStr>(&self, field: &str) -> Result<Option<T>, AppError> {
        self.text(field)
            .map(|value| {
                value
                    .parse()
                    .map_err(|_| AppError::BadRequest(format!("Invalid value for {field}: '{value}'")))
            })
            .transpose()
    }
}
