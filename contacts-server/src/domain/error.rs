use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

pub const INTERNAL_MESSAGE: &str = "Internal server error";

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("No token provided")]
    NoToken,
    #[error("Invalid token")]
    InvalidToken,
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        DomainError::InvalidInput(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            DomainError::InvalidInput(_) => "invalid_input",
            DomainError::Conflict(_) => "conflict",
            DomainError::NotFound(_) => "not_found",
            DomainError::InvalidCredentials => "invalid_credentials",
            DomainError::NoToken => "no_token",
            DomainError::InvalidToken => "invalid_token",
            DomainError::Internal(_) => "internal",
        }
    }

    /// Message safe to hand to a client.
    pub fn public_message(&self) -> String {
        match self {
            DomainError::Internal(_) => INTERNAL_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    ok: bool,
    message: &'a str,
    error: ErrorDetails<'a>,
}

#[derive(Serialize)]
struct ErrorDetails<'a> {
    status: u16,
    message: &'a str,
    code: &'a str,
}

impl ResponseError for DomainError {
    fn status_code(&self) -> StatusCode {
        match self {
            DomainError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            DomainError::Conflict(_) => StatusCode::CONFLICT,
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::InvalidCredentials | DomainError::NoToken => StatusCode::UNAUTHORIZED,
            DomainError::InvalidToken => StatusCode::FORBIDDEN,
            DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let DomainError::Internal(detail) = self {
            error!(detail = %detail, "request failed with internal error");
        }

        let status = self.status_code();
        let message = self.public_message();
        let body = ErrorBody {
            ok: false,
            message: &message,
            error: ErrorDetails {
                status: status.as_u16(),
                message: &message,
                code: self.code(),
            },
        };
        HttpResponse::build(status).json(body)
    }
}
