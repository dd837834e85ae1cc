use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use thiserror::Error;

use crate::config::ConfigError;
use crate::domain::errors::{DomainError, RemoteError};
use crate::handlers::envelope::ResponseEnvelope;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::CartNotFound | DomainError::LineNotFound => AppError::NotFound(e.to_string()),
            DomainError::InvalidInput(_) => AppError::BadRequest(e.to_string()),
            DomainError::Store(_) => AppError::Internal(e.to_string()),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::Internal(msg) = self {
            log::error!("Request failed: {msg}");
        }
        HttpResponse::build(self.status_code()).json(ResponseEnvelope::<()>::failure(self.to_string()))
    }
}

/// Anything that can stop the service from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("database pool error: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("migration error: {0}")]
    Migration(String),
    #[error("remote client error: {0}")]
    Client(#[from] RemoteError),
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}
