pub mod error;
pub mod health;
pub mod merge;
pub mod unlock;
pub mod upload;

use actix_web::HttpResponse;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use chrono::Local;

use crate::routes::error::ApiError;

/// Respond with `bytes` as a downloadable PDF named `<prefix>_<YYYY-MM-DD>.pdf`
pub fn pdf_attachment(bytes: Vec<u8>, prefix: &str) -> HttpResponse {
    let filename = format!("{prefix}_{}.pdf", Local::now().format("%Y-%m-%d"));

    HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(filename)],
        })
        .body(bytes)
}

/// Run CPU bound PDF work on the blocking thread pool so it doesn't
/// hold up the async workers serving other requests.
pub async fn run_blocking<F, T, E>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
    ApiError: From<E>,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(result) => result.map_err(ApiError::from),
        Err(error) => {
            tracing::error!("Processing task failed. error={error}");
            Err(ApiError::Internal(format!("Processing task failed. error={error}")))
        }
    }
}
