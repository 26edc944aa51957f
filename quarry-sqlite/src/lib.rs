//! SQLite driver for quarry.
//!
//! Runs rendered `SELECT` statements through `tokio-rusqlite`, which executes
//! `rusqlite` calls on a dedicated background thread.
//!
//! # Example
//!
//! ```rust,no_run
//! use quarry_query::{Driver, SelectQuery};
//! use quarry_sqlite::{SqliteConfig, SqliteDriver};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SqliteConfig::from_url("sqlite://./app.db")?;
//!     let driver = SqliteDriver::open(config).await?;
//!
//!     let rows = driver.get(&SelectQuery::new("users")).await?;
//!     println!("{} users", rows.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod types;

pub use config::{DatabasePath, SqliteConfig};
pub use driver::SqliteDriver;
pub use error::{SqliteError, SqliteResult};
