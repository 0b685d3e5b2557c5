// web-server/src/error.rs
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use common::Envelope;
use serde_json::Value;
use thiserror::Error;

const EXPIRED_TOKEN_MESSAGE: &str = "invalid or expired token";
const GENERIC_FAILURE: &str = "An unexpected error occurred";

/// Every failure the gateway can report, projected onto `{status, message}` at the HTTP boundary
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Missing or malformed user input
    #[error("{0}")]
    Validation(String),

    /// Rejected credentials or token
    #[error("{0}")]
    Auth(String),

    /// Upstream answered, but not with a usable success body
    #[error("{message}")]
    Upstream { status: u16, message: String },

    /// Upstream could not be reached
    #[error("API request failed: {0}")]
    Transport(String),

    #[error("File exceeds the {}MB upload limit.", .limit_bytes / (1024 * 1024))]
    FileTooLarge { limit_bytes: u64 },

    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Auth(_) => 401,
            Self::Upstream { status, .. } => *status,
            Self::Transport(_) => 500,
            Self::FileTooLarge { .. } => 413,
            Self::Internal(_) => 500,
        }
    }

    /// Message safe to show to the browser
    pub fn message(&self) -> String {
        match self {
            Self::Internal(_) => GENERIC_FAILURE.to_string(),
            other => other.to_string(),
        }
    }

    /// Upstream's way of saying the bearer token is no longer accepted
    pub fn is_expired_token(&self) -> bool {
        matches!(self, Self::Upstream { message, .. } if message.trim().eq_ignore_ascii_case(EXPIRED_TOKEN_MESSAGE))
    }
}

impl From<std::io::Error> for GatewayError {
    fn from(e: std::io::Error) -> Self {
        Self::Internal(e.to_string())
    }
}

impl From<actix::MailboxError> for GatewayError {
    fn from(e: actix::MailboxError) -> Self {
        Self::Internal(format!("session registry unavailable: {}", e))
    }
}

impl ResponseError for GatewayError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let envelope: Envelope<Value> = Envelope::new(status.as_u16(), false, self.message(), None);
        HttpResponse::build(status).json(envelope)
    }
}
