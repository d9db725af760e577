//! Error types for SQLite introspection.

use oxide_schema::{CheckError, TableNotFoundError};

/// Errors reading a table description from a database.
#[derive(Debug, thiserror::Error)]
pub enum IntrospectError {
    /// Database error while querying the catalog.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The requested table does not exist.
    #[error(transparent)]
    TableNotFound(#[from] TableNotFoundError),
}

/// Errors checking a live table.
#[derive(Debug, thiserror::Error)]
pub enum SqliteCheckError {
    /// The table could not be described.
    #[error(transparent)]
    Introspect(#[from] IntrospectError),

    /// The description could not be normalized, or does not match.
    #[error(transparent)]
    Check(#[from] CheckError),
}

impl SqliteCheckError {
    /// Returns the schema diff, if the table exists but does not match.
    #[must_use]
    pub fn as_schema_diff(&self) -> Option<&oxide_schema::SchemaDiffError> {
        match self {
            Self::Check(error) => error.as_schema_diff(),
            Self::Introspect(_) => None,
        }
    }
}

impl From<sqlx::Error> for SqliteCheckError {
    fn from(error: sqlx::Error) -> Self {
        Self::Introspect(error.into())
    }
}

/// Result type for SQLite introspection.
pub type Result<T> = std::result::Result<T, IntrospectError>;
