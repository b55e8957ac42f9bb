use actix_multipart::Multipart;
use futures::{StreamExt, TryStreamExt};

use crate::app_settings::UploadConfig;
use crate::routes::error::ApiError;

/// A file part of a multipart upload, fully read into memory
#[derive(Debug)]
pub struct UploadedFile {
    /// Form field the file was sent under
    pub field: String,
    /// Name of the file as given by the client
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Parts of a multipart form, in the order they were sent
#[derive(Debug, Default)]
pub struct UploadForm {
    files: Vec<UploadedFile>,
    text_fields: Vec<(String, String)>,
}

impl UploadForm {
    /// Remove and return every file sent under `field`, keeping their order
    pub fn take_files(&mut self, field: &str) -> Vec<UploadedFile> {
        let (taken, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.files)
            .into_iter()
            .partition(|file| file.field == field);
        self.files = rest;
        taken
    }

    /// First text value sent under `field`
    pub fn text(&self, field: &str) -> Option<&str> {
        self.text_fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value.as_str())
    }
}

/// Read a whole multipart payload into memory.
///
/// Parts carrying a filename are treated as files, everything else as text.
/// Fails as soon as a single file or the request as a whole goes over the
/// configured limits.
pub async fn read_multipart(
    mut payload: Multipart,
    limits: &UploadConfig,
) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();
    let mut total_bytes = 0usize;

    while let Some(mut field) = payload.try_next().await? {
        let name = field.name().unwrap_or_default().to_owned();
        let filename = field
            .content_disposition()
            .and_then(|disposition| disposition.get_filename())
            .map(ToOwned::to_owned);

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk?;
            total_bytes += chunk.len();
            if bytes.len() + chunk.len() > limits.max_file_bytes {
                return Err(ApiError::PayloadTooLarge {
                    field: name,
                    limit: limits.max_file_bytes,
                });
            }
            if total_bytes > limits.max_total_bytes {
                return Err(ApiError::PayloadTooLarge {
                    field: name,
                    limit: limits.max_total_bytes,
                });
            }
            bytes.extend_from_slice(&chunk);
        }

        match filename {
            Some(filename) => {
                tracing::debug!(
                    "Received file. field={name} filename={filename} size={}",
                    bytes.len()
                );
                form.files.push(UploadedFile {
                    field: name,
                    filename,
                    bytes,
                });
            }
            None => {
                let value = String::from_utf8_lossy(&bytes).into_owned();
                form.text_fields.push((name, value));
            }
        }
    }

    Ok(form)
}
