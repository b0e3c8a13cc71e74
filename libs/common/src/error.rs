//! Errors shared by the API service and the migration tool

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Database plumbing and schema migration errors
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// The pool could not be established
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// A statement failed on an established connection
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// The migration list does not form a single linear chain
    #[error("Invalid migration chain: {0}")]
    InvalidChain(String),

    /// A revision named by the caller or stored in the database is not in the chain
    #[error("Unknown migration revision: {0}")]
    UnknownRevision(String),

    /// Target lies in the wrong direction for the requested operation
    #[error("Invalid migration target: {0}")]
    InvalidTarget(String),

    #[error("Database configuration error: {0}")]
    Configuration(String),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;
