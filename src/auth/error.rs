// Authentication and authorization error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;
use tracing::{error, warn};

use crate::auth::models::Role;
use crate::error::ApiError;

/// Authentication and authorization error types
#[derive(Debug)]
pub enum AuthError {
    // Service errors
    InvalidCredentials,
    /// Role outside the set an administrator may assign
    InvalidRole(String),
    DuplicateEmail,
    /// Identity validation rejected the new user; one message per rule
    CreationFailed(Vec<String>),
    NotFound,
    Store(String),
    PasswordHash(String),
    TokenGeneration(String),

    // Guard errors
    MissingToken,
    InvalidToken,
    ExpiredToken,
    /// Token is valid but carries none of the required role
    InsufficientPermissions {
        required: Role,
    },
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "Invalid email or password!"),
            AuthError::InvalidRole(_) => {
                write!(f, "Invalid role! Must be 'HR' or 'Interviewer'")
            }
            AuthError::DuplicateEmail => write!(f, "User with this email already exists!"),
            AuthError::CreationFailed(errors) => {
                write!(f, "User creation failed: {}", errors.join(", "))
            }
            AuthError::NotFound => write!(f, "User not found"),
            AuthError::Store(msg) => write!(f, "Credential store error: {}", msg),
            AuthError::PasswordHash(msg) => write!(f, "Password hashing error: {}", msg),
            AuthError::TokenGeneration(msg) => write!(f, "Token generation error: {}", msg),
            AuthError::MissingToken => write!(f, "Missing authentication token"),
            AuthError::InvalidToken => write!(f, "Invalid token"),
            AuthError::ExpiredToken => write!(f, "Token has expired"),
            AuthError::InsufficientPermissions { required } => {
                write!(f, "Insufficient permissions: required role '{}'", required)
            }
        }
    }
}

impl std::error::Error for AuthError {}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        AuthError::Store(err.to_string())
    }
}

impl AuthError {
    /// Status used when the error escapes the guard or a lookup
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials
            | AuthError::MissingToken
            | AuthError::InvalidToken
            | AuthError::ExpiredToken => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientPermissions { .. } => StatusCode::FORBIDDEN,
            AuthError::NotFound => StatusCode::NOT_FOUND,
            AuthError::InvalidRole(_)
            | AuthError::DuplicateEmail
            | AuthError::CreationFailed(_)
            | AuthError::Store(_)
            | AuthError::PasswordHash(_)
            | AuthError::TokenGeneration(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Map onto the envelope with an explicit status.
    ///
    /// Handlers catch service failures broadly: login failures are always 401
    /// and everything else under an admin operation is 400.
    pub fn into_api_error(self, status: StatusCode) -> ApiError {
        match &self {
            AuthError::Store(msg) | AuthError::PasswordHash(msg) | AuthError::TokenGeneration(msg) => {
                error!("Auth operation failed: {}", msg)
            }
            other => warn!("Auth operation rejected: {}", other),
        }
        ApiError::new(status, self.to_string())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        self.into_api_error(status).into_response()
    }
}
