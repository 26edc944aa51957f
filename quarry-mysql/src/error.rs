//! Error types for MySQL operations.

use thiserror::Error;

use quarry_query::error::QueryError;

/// Result type for MySQL operations.
pub type MysqlResult<T> = Result<T, MysqlError>;

/// Error type for MySQL operations.
#[derive(Error, Debug)]
pub enum MysqlError {
    /// Failed to obtain a connection from the pool.
    #[error("Connection error: {0}")]
    Connection(#[source] mysql_async::Error),
    /// MySQL driver error while running a statement.
    #[error("MySQL error: {0}")]
    Mysql(#[from] mysql_async::Error),
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl MysqlError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<MysqlError> for QueryError {
    fn from(err: MysqlError) -> Self {
        match err {
            MysqlError::Connection(e) => QueryError::connection(e.to_string()).with_source(e),
            MysqlError::Mysql(e) => QueryError::database(e.to_string()).with_source(e),
            MysqlError::Config(msg) => QueryError::connection_string(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_query::ErrorCode;

    #[test]
    fn test_error_display() {
        let err = MysqlError::config("invalid url");
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("invalid url"));
    }

    #[test]
    fn test_error_conversion() {
        let query_err: QueryError = MysqlError::config("missing database").into();
        assert_eq!(query_err.code, ErrorCode::InvalidConnectionString);
        assert!(query_err.message.contains("missing database"));
    }
}
