//! SQLite execution driver.

use std::fmt;

use tokio_rusqlite::Connection;
use tracing::{debug, info, instrument};

use quarry_query::error::{QueryError, QueryResult};
use quarry_query::filter::FilterValue;
use quarry_query::row::Record;
use quarry_query::traits::{BoxFuture, Driver};

use crate::config::{DatabasePath, SqliteConfig};
use crate::error::SqliteResult;
use crate::types::{filter_value_to_sqlite, get_value_at_index};

/// Runs statements on a single `tokio-rusqlite` connection.
///
/// Cloning is cheap; clones share the same background connection thread.
#[derive(Clone)]
pub struct SqliteDriver {
    conn: Connection,
}

impl fmt::Debug for SqliteDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteDriver").finish_non_exhaustive()
    }
}

impl SqliteDriver {
    /// Wrap an already open connection.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Open a connection and apply the configuration's PRAGMAs.
    #[instrument(skip(config), fields(path = %config.path_str()))]
    pub async fn open(config: SqliteConfig) -> SqliteResult<Self> {
        let conn = match &config.path {
            DatabasePath::Memory => Connection::open_in_memory().await?,
            DatabasePath::File(path) => Connection::open(path.clone()).await?,
        };

        let init_sql = config.init_sql();
        if !init_sql.is_empty() {
            conn.call(move |conn| {
                conn.execute_batch(&init_sql)?;
                Ok(())
            })
            .await?;
        }

        info!("SQLite connection opened");
        Ok(Self::new(conn))
    }

    /// Get a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Run a batch of statements without parameters, e.g. schema setup.
    pub async fn execute_batch(&self, sql: &str) -> SqliteResult<()> {
        let sql = sql.to_string();
        debug!(sql = %sql, "Executing batch");

        self.conn
            .call(move |conn| {
                conn.execute_batch(&sql)?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    /// Run a row-returning statement with positional parameters.
    #[instrument(skip(self, sql, params), fields(params = params.len()))]
    pub async fn query_params(
        &self,
        sql: &str,
        params: Vec<FilterValue>,
    ) -> SqliteResult<Vec<Record>> {
        let sql = sql.to_string();
        debug!(sql = %sql, "Executing parameterized query");

        let params: Vec<rusqlite::types::Value> =
            params.iter().map(filter_value_to_sqlite).collect();

        let rows = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql)?;
                let columns: Vec<String> = stmt
                    .column_names()
                    .iter()
                    .map(|s| s.to_string())
                    .collect();

                let params_ref: Vec<&dyn rusqlite::ToSql> = params
                    .iter()
                    .map(|v| v as &dyn rusqlite::ToSql)
                    .collect();

                let rows = stmt.query_map(params_ref.as_slice(), |row| {
                    let mut record = Record::with_capacity(columns.len());
                    for (i, col) in columns.iter().enumerate() {
                        record.insert(col.clone(), get_value_at_index(row, i));
                    }
                    Ok(record)
                })?;

                let results: Result<Vec<_>, _> = rows.collect();
                Ok(results?)
            })
            .await?;

        debug!(rows = rows.len(), "Query returned");
        Ok(rows)
    }
}

impl Driver for SqliteDriver {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn fetch_all(
        &self,
        sql: &str,
        params: Vec<FilterValue>,
    ) -> BoxFuture<'_, QueryResult<Vec<Record>>> {
        let sql = sql.to_string();
        Box::pin(async move {
            let result = self.query_params(&sql, params).await;
            result.map_err(|e| {
                QueryError::from(e)
                    .with_context("sqlite fetch_all")
                    .with_sql(sql)
            })
        })
    }
}
