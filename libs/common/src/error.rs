//! Error types shared by the infrastructure modules

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Failures raised while configuring or talking to PostgreSQL
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// The pool could not reach the server
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// A statement failed
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// Applying embedded migrations failed
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Invalid settings, detected before connecting
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;
