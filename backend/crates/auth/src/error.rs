//! Auth Error Types
//!
//! Auth-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.
//!
//! `InvalidCredentials` and `SessionNotFound` deliberately collapse several
//! underlying causes; nothing finer-grained may reach a client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::crypto::RandomnessError;
use platform::password::PasswordHashError;
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown username, inactive user or wrong password
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("User name already taken")]
    UsernameTaken,

    /// Session absent, expired or owned by a deactivated user
    #[error("Session not found or expired")]
    SessionNotFound,

    /// Stored password hash does not parse. Verification fails closed.
    #[error("Stored password hash is malformed: {0}")]
    MalformedHash(String),

    #[error("Secure randomness unavailable")]
    RandomnessUnavailable(#[source] RandomnessError),

    /// A freshly generated session ID already exists. Retried by sign-in.
    #[error("Session ID collision")]
    SessionIdCollision,

    /// Input rejected before touching the store
    #[error("{0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidCredentials | AuthError::SessionNotFound => ErrorKind::Unauthorized,
            AuthError::UsernameTaken => ErrorKind::Conflict,
            AuthError::Validation(_) => ErrorKind::BadRequest,
            AuthError::RandomnessUnavailable(_) => ErrorKind::ServiceUnavailable,
            AuthError::Storage(sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed) => {
                ErrorKind::ServiceUnavailable
            }
            AuthError::MalformedHash(_)
            | AuthError::SessionIdCollision
            | AuthError::Storage(_)
            | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError. Server-side detail stays in the logs.
    pub fn to_app_error(&self) -> AppError {
        match self.kind() {
            ErrorKind::ServiceUnavailable => {
                AppError::service_unavailable("Service temporarily unavailable")
                    .with_action("Please try again shortly")
            }
            kind if kind.is_server_error() => AppError::internal("Internal server error"),
            kind => AppError::new(kind, self.to_string()),
        }
    }

    /// Log the error with appropriate level
    pub(crate) fn log(&self) {
        match self {
            AuthError::Storage(e) => {
                tracing::error!(error = %e, "Auth storage error");
            }
            AuthError::RandomnessUnavailable(e) => {
                tracing::error!(error = %e, "Entropy source failure");
            }
            AuthError::MalformedHash(reason) => {
                tracing::error!(reason = %reason, "Stored password hash failed to parse");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::SessionIdCollision => {
                tracing::error!("Session ID collision persisted across retries");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<RandomnessError> for AuthError {
    fn from(err: RandomnessError) -> Self {
        AuthError::RandomnessUnavailable(err)
    }
}

impl From<PasswordHashError> for AuthError {
    fn from(err: PasswordHashError) -> Self {
        match err {
            PasswordHashError::RandomnessUnavailable(e) => AuthError::RandomnessUnavailable(e),
            PasswordHashError::MalformedHash(reason) => AuthError::MalformedHash(reason.to_string()),
            e @ (PasswordHashError::InvalidParams(_) | PasswordHashError::HashingFailed(_)) => {
                AuthError::Internal(e.to_string())
            }
        }
    }
}

impl From<tokio::task::JoinError> for AuthError {
    fn from(err: tokio::task::JoinError) -> Self {
        AuthError::Internal(format!("hashing task failed: {err}"))
    }
}
