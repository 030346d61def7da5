//! Error taxonomy for authentication and authorization
//!
//! Every failure the auth workflows can produce is an [`AuthError`]. The HTTP
//! mapping lives here too so route handlers only ever use `?`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::error::DatabaseError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Custom error type for authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// Malformed or invalid input; carries the joined validation messages
    #[error("{0}")]
    BadRequest(String),

    /// Uniqueness violation, e.g. an email that is already registered
    #[error("{0}")]
    Conflict(String),

    /// Unknown email or wrong password; the two are indistinguishable
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is deactivated")]
    AccountDeactivated,

    /// Refresh token missing from the store or not matching the stored hash
    #[error("Access denied")]
    AccessDenied,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    /// Missing identity, or identity of an inactive or deleted user
    #[error("{0}")]
    Unauthorized(String),

    /// Valid identity without the required privilege
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// HTTP status this error maps to at the transport boundary
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AuthError::Conflict(_) => StatusCode::CONFLICT,
            AuthError::InvalidCredentials
            | AuthError::AccountDeactivated
            | AuthError::AccessDenied
            | AuthError::InvalidToken
            | AuthError::TokenExpired
            | AuthError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
            AuthError::NotFound(_) => StatusCode::NOT_FOUND,
            AuthError::Database(db) => database_status(db),
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to clients; store and internal faults are opaque
    pub fn public_message(&self) -> String {
        match self {
            AuthError::Database(db) => database_message(db).to_string(),
            AuthError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

/// Status for a store-level error: constraint classes are operational, the
/// rest are faults
pub fn database_status(err: &DatabaseError) -> StatusCode {
    match err {
        DatabaseError::UniqueViolation(_) => StatusCode::CONFLICT,
        DatabaseError::RecordNotFound => StatusCode::NOT_FOUND,
        DatabaseError::ForeignKeyViolation(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Client-facing message for a store-level error
pub fn database_message(err: &DatabaseError) -> &'static str {
    match err {
        DatabaseError::UniqueViolation(_) => "Duplicate field value entered",
        DatabaseError::RecordNotFound => "Record not found",
        DatabaseError::ForeignKeyViolation(_) => "Invalid reference",
        _ => "Internal server error",
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let body = Json(json!({
            "success": false,
            "error": self.public_message(),
        }));

        (status, body).into_response()
    }
}

/// Type alias for auth results
pub type AuthResult<T> = Result<T, AuthError>;
