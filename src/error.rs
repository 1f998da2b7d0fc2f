use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use actix_web::ResponseError;
use serde::Serialize;
use std::num::ParseIntError;
use thiserror::Error;

/// Failure of a whole call.
#[derive(Debug, Error)]
pub(crate) enum Error {
    #[error("store unavailable: {0:#}")]
    StoreUnavailable(anyhow::Error),

    #[error("{0} not found")]
    NotFound(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Failure of a single record inside a batch. Never fails the call.
#[derive(Debug, Error)]
pub(crate) enum RecordError {
    #[error("no value stored under key")]
    Missing,

    #[error("malformed position: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("key is not a trip id: {0}")]
    InvalidKey(#[from] ParseIntError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status_code()).json(ErrorBody { error: self.to_string() })
    }
}
