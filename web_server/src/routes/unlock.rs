use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use assembler::{UnlockError, unlock};
use tracing::instrument;

use crate::app_settings::AppSettings;
use crate::routes::error::ApiError;
use crate::routes::upload::read_multipart;
use crate::routes::{pdf_attachment, run_blocking};

/// Decrypt the PDF sent under `file` with the `password` field
/// and send back a copy that opens without a password.
#[instrument(skip(payload, settings))]
pub async fn unlock_file(
    payload: Multipart,
    settings: web::Data<AppSettings>,
) -> Result<HttpResponse, ApiError> {
    let mut form = read_multipart(payload, &settings.uploads).await?;

    let file = form
        .take_files("file")
        .into_iter()
        .next()
        .ok_or(ApiError::MissingField("file"))?;

    let password = match form.text("password") {
        Some(password) if !password.is_empty() => password.to_owned(),
        _ => return Err(UnlockError::MissingPassword.into()),
    };

    tracing::info!("Unlocking file. size={}", file.bytes.len());
    let unlocked = run_blocking(move || unlock(&file.bytes, &password)).await?;

    Ok(pdf_attachment(unlocked, "unlocked"))
}
