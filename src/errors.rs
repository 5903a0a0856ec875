use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::error;
use thiserror::Error;

use crate::dtos::ApiResponse;
use crate::pagination::PageError;
use crate::repositories::RepoError;
use crate::services::auth_services::AuthError;
use crate::services::media_services::MediaError;

/// Everything a handler can fail with. Rendered as the error envelope.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("invalid page: {0}")]
    InvalidPage(#[from] PageError),
    #[error("authentication required")]
    Unauthorized,
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error("media error: {0}")]
    Media(#[from] MediaError),
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),
    #[error("storage error: {0}")]
    Repo(RepoError),
}

impl From<RepoError> for ServiceError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::MissingReference(what) => {
                ServiceError::Validation(format!("referenced object does not exist ({})", what))
            }
            other => ServiceError::Repo(other),
        }
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) | ServiceError::InvalidPage(_) => StatusCode::NOT_FOUND,
            ServiceError::Unauthorized | ServiceError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Media(MediaError::UnsupportedType(_))
            | ServiceError::Media(MediaError::InvalidData(_)) => StatusCode::BAD_REQUEST,
            ServiceError::Auth(AuthError::InvalidToken) => StatusCode::UNAUTHORIZED,
            ServiceError::Media(_) | ServiceError::Auth(_) | ServiceError::Repo(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = if status.is_server_error() {
            error!("request failed: {}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        HttpResponse::build(status).json(ApiResponse::error(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_errors_to_status_codes() {
        assert_eq!(ServiceError::NotFound("post").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ServiceError::Forbidden("nope").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ServiceError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ServiceError::InvalidPage(PageError::Empty).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::Conflict("taken".into()).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn missing_reference_is_a_validation_error() {
        let err: ServiceError = RepoError::MissingReference("category 3".into()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
