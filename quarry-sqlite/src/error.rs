//! Error types for SQLite operations.

use thiserror::Error;

use quarry_query::error::QueryError;

/// Result type for SQLite operations.
pub type SqliteResult<T> = Result<T, SqliteError>;

/// Error type for SQLite operations.
#[derive(Error, Debug)]
pub enum SqliteError {
    /// SQLite driver error.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] tokio_rusqlite::Error),
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SqliteError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<rusqlite::Error> for SqliteError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Sqlite(tokio_rusqlite::Error::Rusqlite(err))
    }
}

impl From<SqliteError> for QueryError {
    fn from(err: SqliteError) -> Self {
        match err {
            SqliteError::Sqlite(tokio_rusqlite::Error::Rusqlite(e)) => {
                QueryError::database(e.to_string()).with_source(e)
            }
            SqliteError::Sqlite(tokio_rusqlite::Error::ConnectionClosed) => {
                QueryError::connection("SQLite connection is closed")
            }
            SqliteError::Sqlite(e) => QueryError::database(e.to_string()),
            SqliteError::Config(msg) => QueryError::connection_string(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_query::ErrorCode;

    #[test]
    fn test_error_display() {
        let err = SqliteError::config("database path is required");
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("database path is required"));
    }

    #[test]
    fn test_rusqlite_error_conversion() {
        let err: SqliteError = rusqlite::Error::InvalidQuery.into();
        let query_err: QueryError = err.into();
        assert_eq!(query_err.code, ErrorCode::DatabaseError);
        assert!(std::error::Error::source(&query_err).is_some());
    }

    #[test]
    fn test_closed_connection_is_connection_error() {
        let err = SqliteError::Sqlite(tokio_rusqlite::Error::ConnectionClosed);
        let query_err: QueryError = err.into();
        assert!(query_err.is_connection_error());
    }

    #[test]
    fn test_config_error_conversion() {
        let query_err: QueryError = SqliteError::config("bad url").into();
        assert_eq!(query_err.code, ErrorCode::InvalidConnectionString);
    }
}
