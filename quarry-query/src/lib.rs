//! # quarry-query
//!
//! Query construction core for quarry.
//!
//! This crate provides:
//! - Filter values, comparison operators and leaf conditions
//! - Arena-backed AND/OR condition trees shared by `WHERE` and `HAVING`
//! - Fluent clause builders with nested groups
//! - `SELECT` assembly into `?`-placeholder SQL plus ordered arguments
//! - The [`Driver`] trait implemented by execution adapters
//!
//! Nothing here performs I/O; drivers live in `quarry-sqlite` and `quarry-mysql`.
//!
//! ## Conditions
//!
//! Operators can be given as [`Operator`] values or as their SQL tokens:
//!
//! ```rust
//! use quarry_query::{Operator, WhereClause};
//!
//! let mut clause = WhereClause::new();
//! clause
//!     .r#where("age", ">", 18)?
//!     .or_where("status", Operator::Eq, "active")?;
//!
//! let (sql, args) = clause.build();
//! assert_eq!(sql, "WHERE age > ? OR status = ?");
//! assert_eq!(args.len(), 2);
//! # Ok::<(), quarry_query::QueryError>(())
//! ```
//!
//! ## Filter Values
//!
//! ```rust
//! use quarry_query::FilterValue;
//!
//! let val: FilterValue = 42.into();
//! assert!(matches!(val, FilterValue::Int(42)));
//!
//! let val: FilterValue = vec![1, 2, 3].into();
//! assert!(val.is_list());
//!
//! let val: FilterValue = None::<i64>.into();
//! assert!(val.is_null());
//! ```
//!
//! ## Statements
//!
//! ```rust
//! use quarry_query::{SelectQuery, SortOrder};
//!
//! let mut query = SelectQuery::new("users")
//!     .order_by("id", SortOrder::Asc)
//!     .limit(5)
//!     .offset(10);
//! query.where_clause.r#where("id", "IN", vec![1, 2, 3])?;
//!
//! let (sql, args) = query.build();
//! assert_eq!(sql, "SELECT * FROM users WHERE id IN (?,?,?) ORDER BY id ASC LIMIT ? OFFSET ?");
//! assert_eq!(args.len(), 5);
//! # Ok::<(), quarry_query::QueryError>(())
//! ```

pub mod clause;
pub mod condition;
pub mod error;
pub mod filter;
pub mod logging;
pub mod row;
pub mod select;
pub mod traits;
pub mod types;

pub use clause::{
    Clause, ClauseBuilder, ClauseKind, Having, HavingBuilder, HavingClause, Where, WhereBuilder,
    WhereClause,
};
pub use condition::{Child, ConditionTree, GroupId, GroupNode};
pub use error::{ErrorCode, ErrorContext, QueryError, QueryResult, Suggestion};
pub use filter::{Condition, Connector, FilterValue, IntoOperator, Operator};
pub use row::Record;
pub use select::SelectQuery;
pub use traits::{BoxFuture, Driver};
pub use types::{OrderByField, SortOrder};

pub use logging::{LogFormat, LogSettings, init as init_logging};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::clause::{HavingBuilder, HavingClause, WhereBuilder, WhereClause};
    pub use crate::error::{QueryError, QueryResult};
    pub use crate::filter::{FilterValue, Operator};
    pub use crate::row::Record;
    pub use crate::select::SelectQuery;
    pub use crate::traits::Driver;
    pub use crate::types::SortOrder;
}
