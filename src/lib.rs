//! # Quarry
//!
//! A fluent `SELECT` builder that renders parameterized SQL and runs it through
//! pluggable drivers.
//!
//! Quarry provides:
//! - Chained filter methods with arbitrarily nested AND/OR groups
//! - `GROUP BY` / `HAVING`, ordering and paging
//! - SQL text with `?` placeholders plus ordered arguments
//! - Async execution through SQLite and MySQL drivers
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use quarry::prelude::*;
//! use quarry::sqlite::{SqliteConfig, SqliteDriver};
//!
//! #[tokio::main]
//! async fn main() -> QueryResult<()> {
//!     let driver = SqliteDriver::open(SqliteConfig::from_url("sqlite://./app.db")?).await?;
//!     let db = Database::new(driver);
//!
//!     let adults = db
//!         .table("users")
//!         .select(["id", "name"])
//!         .r#where("age", ">=", 18)?
//!         .where_func(|w| {
//!             w.r#where("status", "=", "active")?.or_where("role", "=", "admin")?;
//!             Ok(())
//!         })?
//!         .order_by("name", SortOrder::Asc)
//!         .limit(20)
//!         .get()
//!         .await?;
//!
//!     println!("{} rows", adults.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Rendering without a database
//!
//! ```rust
//! use quarry::SelectQuery;
//!
//! let mut query = SelectQuery::new("users").limit(5).offset(10);
//! query.where_clause.r#where("id", "IN", vec![1, 2, 3])?;
//!
//! let (sql, args) = query.build();
//! assert_eq!(sql, "SELECT * FROM users WHERE id IN (?,?,?) LIMIT ? OFFSET ?");
//! assert_eq!(args.len(), 5);
//! # Ok::<(), quarry::QueryError>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod database;

pub use database::{Database, Query};

// Re-export key types at the crate root
pub use quarry_query::{
    Driver, ErrorCode, FilterValue, HavingBuilder, Operator, QueryError, QueryResult, Record,
    SelectQuery, SortOrder, WhereBuilder, logging,
};

/// Condition trees, clauses and statement assembly.
pub mod query {
    pub use quarry_query::*;
}

/// SQLite driver.
#[cfg(feature = "sqlite")]
#[cfg_attr(docsrs, doc(cfg(feature = "sqlite")))]
pub mod sqlite {
    pub use quarry_sqlite::*;
}

/// MySQL driver.
#[cfg(feature = "mysql")]
#[cfg_attr(docsrs, doc(cfg(feature = "mysql")))]
pub mod mysql {
    pub use quarry_mysql::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::database::{Database, Query};
    pub use quarry_query::prelude::*;
}
