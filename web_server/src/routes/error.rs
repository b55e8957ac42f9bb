use actix_multipart::MultipartError;
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use assembler::{MergeError, UnlockError};
use serde::Serialize;
use thiserror::Error;

/// Every way a request can fail, mapped onto a status code
/// and rendered as `{"error": "<message>"}`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("No {0} provided")]
    MissingField(&'static str),
    #[error("Could not read upload. error={0}")]
    BadUpload(#[from] MultipartError),
    #[error("Upload exceeds the limit of {limit} bytes. field={field}")]
    PayloadTooLarge { field: String, limit: usize },
    #[error(transparent)]
    Merge(#[from] MergeError),
    #[error(transparent)]
    Unlock(#[from] UnlockError),
    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingField(_) | ApiError::BadUpload(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Merge(error) => match error {
                MergeError::InsufficientInputs | MergeError::LockedInput { .. } => {
                    StatusCode::BAD_REQUEST
                }
                MergeError::MalformedInput { .. }
                | MergeError::InvalidDimensions { .. }
                | MergeError::SerializationFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Unlock(error) => match error {
                UnlockError::MissingPassword => StatusCode::BAD_REQUEST,
                UnlockError::WrongPassword => StatusCode::UNAUTHORIZED,
                UnlockError::MalformedInput(_) | UnlockError::SerializationFailed(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed. status={status} error={self}");
        } else {
            tracing::info!("Request rejected. status={status} error={self}");
        }

        HttpResponse::build(status).json(ErrorBody {
            error: self.to_string(),
        })
    }
}
