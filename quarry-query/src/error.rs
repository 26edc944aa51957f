//! Errors raised while building or running a `SELECT`.
//!
//! Building fails only on malformed filter or ordering input; everything else comes
//! from a driver. Each error has a stable code (`Q` plus four digits) whose leading
//! digit names the stage:
//!
//! | Range | Stage |
//! |-------|-------|
//! | 1xxx  | filters and results |
//! | 3xxx  | connecting |
//! | 5xxx  | executing |
//! | 7xxx  | driver configuration |
//!
//! ```rust
//! use quarry_query::{ErrorCode, QueryError};
//!
//! let err = QueryError::not_found("users");
//! assert_eq!(err.code, ErrorCode::RecordNotFound);
//! assert_eq!(err.to_string(), "[Q1001] No users record found matching the query");
//! ```

use std::fmt;
use thiserror::Error;

/// Result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Stable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// `first()` matched no rows (Q1001).
    RecordNotFound = 1001,
    /// A condition could not be built (Q1003).
    InvalidFilter = 1003,
    /// The driver could not reach the database (Q3001).
    ConnectionFailed = 3001,
    /// A non-filter argument was rejected, such as a sort direction (Q5003).
    InvalidParameter = 5003,
    /// The database rejected or failed the statement (Q5005).
    DatabaseError = 5005,
    /// A driver URL or path could not be parsed (Q7003).
    InvalidConnectionString = 7003,
}

impl ErrorCode {
    /// The code as printed, e.g. `"Q1003"`.
    pub fn code(&self) -> String {
        format!("Q{}", *self as u16)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A hint attached to an error, optionally with a code snippet.
#[derive(Debug, Clone)]
pub struct Suggestion {
    /// What to try.
    pub text: String,
    /// Example call.
    pub code: Option<String>,
}

impl Suggestion {
    /// A plain-text hint.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            code: None,
        }
    }

    /// Attach an example call.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Where an error happened.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Driver operation that failed, e.g. `"sqlite fetch_all"`.
    pub operation: Option<String>,
    /// Table the query selected from.
    pub table: Option<String>,
    /// Column of the offending condition.
    pub field: Option<String>,
    /// Rendered statement.
    pub sql: Option<String>,
    /// Hints for the caller.
    pub suggestions: Vec<Suggestion>,
}

/// An error from building or executing a query.
#[derive(Error, Debug)]
pub struct QueryError {
    /// Stable code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Where it happened.
    pub context: ErrorContext,
    /// Underlying driver error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl QueryError {
    /// Create an error with no context.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Record the operation that failed.
    pub fn with_context(mut self, operation: impl Into<String>) -> Self {
        self.context.operation = Some(operation.into());
        self
    }

    /// Add a hint.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context.suggestions.push(Suggestion::new(suggestion));
        self
    }

    /// Add a hint with an example call.
    pub fn with_code_suggestion(
        mut self,
        text: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        self.context.suggestions.push(Suggestion::new(text).with_code(code));
        self
    }

    /// Record the table.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.context.table = Some(table.into());
        self
    }

    /// Record the offending column.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.context.field = Some(field.into());
        self
    }

    /// Record the rendered statement.
    pub fn with_sql(mut self, sql: impl Into<String>) -> Self {
        self.context.sql = Some(sql.into());
        self
    }

    /// Attach the driver error that caused this one.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// `first()` found nothing in `table`.
    pub fn not_found(table: impl Into<String>) -> Self {
        let table = table.into();
        Self::new(
            ErrorCode::RecordNotFound,
            format!("No {} record found matching the query", table),
        )
        .with_table(&table)
        .with_code_suggestion(
            "Use first_optional() to get None instead of an error",
            format!("db.table(\"{}\").first_optional().await", table),
        )
    }

    /// A condition was rejected.
    pub fn invalid_filter(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidFilter, message)
    }

    /// A non-filter argument named `field` was rejected.
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        let field = field.into();
        Self::new(
            ErrorCode::InvalidParameter,
            format!("Invalid input for {}: {}", field, message.into()),
        )
        .with_field(field)
    }

    /// The database could not be reached.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ConnectionFailed,
            format!("Connection error: {}", message.into()),
        )
        .with_suggestion("Check that the database server is running")
    }

    /// The database failed the statement.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// A driver URL or path could not be parsed.
    pub fn connection_string(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidConnectionString, message)
    }

    /// Whether `first()` found nothing.
    pub fn is_not_found(&self) -> bool {
        self.code == ErrorCode::RecordNotFound
    }

    /// Whether a condition was rejected.
    pub fn is_invalid_filter(&self) -> bool {
        self.code == ErrorCode::InvalidFilter
    }

    /// Whether the database could not be reached.
    pub fn is_connection_error(&self) -> bool {
        self.code == ErrorCode::ConnectionFailed
    }
}
