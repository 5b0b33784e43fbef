/*
 * Responsibility
 * - Request-gate rejection (AuthError) definitions
 * - IntoResponse (HTTP status / JSON body)
 * - Every lower-layer failure (bearer / key / verify / rbac) maps to exactly one variant
 */
use std::fmt;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::middleware::auth::bearer::BearerError;
use crate::services::auth::{AuthzError, VerifyError};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: &'static str,
}

/// Terminal denial states of the request gate.
///
/// `message()` is the exact body returned to the caller and also the
/// `Display` text, so it never carries internal detail (which check failed,
/// key parse errors...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    NoToken,
    EmptyToken,
    InvalidToken,
    Forbidden,
    MissingConfiguration,
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::NoToken | AuthError::EmptyToken | AuthError::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::MissingConfiguration => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            AuthError::NoToken => "Unauthorized - No Token",
            AuthError::EmptyToken => "Unauthorized - Empty Token",
            AuthError::InvalidToken => "Unauthorized - Invalid Token",
            AuthError::Forbidden => "Forbidden - Insufficient permissions",
            AuthError::MissingConfiguration => "Internal Server Error - Missing configuration",
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            message: self.message(),
        };

        (self.status(), Json(body)).into_response()
    }
}

impl From<BearerError> for AuthError {
    fn from(e: BearerError) -> Self {
        match e {
            // Absent and malformed headers are only told apart in logs.
            BearerError::Missing | BearerError::Malformed => AuthError::NoToken,
            BearerError::Empty => AuthError::EmptyToken,
        }
    }
}

impl From<VerifyError> for AuthError {
    fn from(e: VerifyError) -> Self {
        match e {
            VerifyError::Configuration(_) => AuthError::MissingConfiguration,
            VerifyError::InvalidToken(_) | VerifyError::Claims(_) => AuthError::InvalidToken,
        }
    }
}

impl From<AuthzError> for AuthError {
    fn from(_: AuthzError) -> Self {
        AuthError::Forbidden
    }
}
