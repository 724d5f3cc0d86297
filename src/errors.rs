use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use thiserror::Error;

use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Business or upstream failure whose message is safe to show.
    #[error("{0}")]
    Failed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::InvalidArgument(_) | DomainError::InvalidStatus(_) => {
                AppError::BadRequest(e.to_string())
            }
            DomainError::NotFound(what) => AppError::NotFound(what),
            DomainError::EmptyCart
            | DomainError::AmountMismatch { .. }
            | DomainError::GatewayAuth(_)
            | DomainError::GatewayRequest(_)
            | DomainError::GatewayCapture(_) => AppError::Failed(e.to_string()),
            DomainError::Write(_) | DomainError::Store(_) => AppError::Internal(e.to_string()),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Failed(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Internal(detail) => {
                log::error!("Internal error: {}", detail);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(serde_json::json!({ "error": message }))
    }
}
