//! Custom error types for the common library
//!
//! This module defines the store-level error type shared by every repository.
//! Driver errors are classified into the constraint classes the services map
//! onto their HTTP error taxonomy (duplicate key, missing record, dangling
//! reference) so no service has to inspect PostgreSQL error shapes itself.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// PostgreSQL SQLSTATE for `unique_violation`
const UNIQUE_VIOLATION: &str = "23505";
/// PostgreSQL SQLSTATE for `foreign_key_violation`
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),

    /// A unique constraint rejected the write
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// The record targeted by an update or delete does not exist
    #[error("Record not found")]
    RecordNotFound,

    /// A foreign key referenced a missing row
    #[error("Foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),
}

impl DatabaseError {
    /// Whether this error is one of the expected constraint classes rather
    /// than an infrastructure fault
    pub fn is_constraint(&self) -> bool {
        matches!(
            self,
            DatabaseError::UniqueViolation(_)
                | DatabaseError::RecordNotFound
                | DatabaseError::ForeignKeyViolation(_)
        )
    }
}

enum Class {
    Unique(String),
    ForeignKey(String),
    Missing,
    Connection,
    Other,
}

fn classify(err: &SqlxError) -> Class {
    match err {
        SqlxError::RowNotFound => Class::Missing,
        SqlxError::Database(db) => {
            let constraint = db.constraint().unwrap_or("unknown").to_string();
            match db.code().as_deref() {
                Some(UNIQUE_VIOLATION) => Class::Unique(constraint),
                Some(FOREIGN_KEY_VIOLATION) => Class::ForeignKey(constraint),
                _ => Class::Other,
            }
        }
        SqlxError::PoolTimedOut | SqlxError::PoolClosed | SqlxError::Io(_) | SqlxError::Tls(_) => {
            Class::Connection
        }
        _ => Class::Other,
    }
}

impl From<SqlxError> for DatabaseError {
    fn from(err: SqlxError) -> Self {
        match classify(&err) {
            Class::Unique(constraint) => DatabaseError::UniqueViolation(constraint),
            Class::ForeignKey(constraint) => DatabaseError::ForeignKeyViolation(constraint),
            Class::Missing => DatabaseError::RecordNotFound,
            Class::Connection => DatabaseError::Connection(err),
            Class::Other => DatabaseError::Query(err),
        }
    }
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;
