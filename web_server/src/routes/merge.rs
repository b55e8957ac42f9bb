use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use assembler::{InputItem, assemble};
use tracing::instrument;

use crate::app_settings::AppSettings;
use crate::routes::error::ApiError;
use crate::routes::upload::read_multipart;
use crate::routes::{pdf_attachment, run_blocking};

/// Merge every file sent under the `files` field, PDFs and images alike,
/// into a single PDF following the order they were submitted in.
#[instrument(skip(payload, settings))]
pub async fn merge_files(
    payload: Multipart,
    settings: web::Data<AppSettings>,
) -> Result<HttpResponse, ApiError> {
    let mut form = read_multipart(payload, &settings.uploads).await?;

    let files = form.take_files("files");
    if files.is_empty() {
        return Err(ApiError::MissingField("files"));
    }

    let items: Vec<InputItem> = files
        .into_iter()
        .map(|file| InputItem::new(file.filename, file.bytes))
        .collect();

    tracing::info!("Merging files. count={}", items.len());
    let merged = run_blocking(move || assemble(&items)).await?;

    Ok(pdf_attachment(merged, "merged"))
}
