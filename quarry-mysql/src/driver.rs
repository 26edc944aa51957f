//! MySQL execution driver.

use std::fmt;

use mysql_async::prelude::*;
use mysql_async::{Opts, OptsBuilder, Params, Pool, Row};
use tracing::{debug, instrument};
use url::Url;

use quarry_query::error::{QueryError, QueryResult};
use quarry_query::filter::FilterValue;
use quarry_query::row::Record;
use quarry_query::traits::{BoxFuture, Driver};

use crate::error::{MysqlError, MysqlResult};
use crate::types::{filter_value_to_mysql, row_to_record};

/// Runs statements over the binary protocol on connections taken from a `mysql_async::Pool`.
///
/// The pool handle is owned by the caller; cloning the driver clones the handle.
#[derive(Clone)]
pub struct MysqlDriver {
    pool: Pool,
}

impl fmt::Debug for MysqlDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MysqlDriver").finish_non_exhaustive()
    }
}

impl MysqlDriver {
    /// Wrap an existing pool.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create a pool for a `mysql://[user[:password]@]host[:port]/database` URL.
    ///
    /// Only the URL is checked here; connections are opened lazily on first use.
    pub fn connect(url: &str) -> MysqlResult<Self> {
        let opts = pool_opts(url)?;
        debug!(
            host = %opts.ip_or_hostname(),
            port = opts.tcp_port(),
            database = ?opts.db_name(),
            "Creating MySQL pool"
        );
        Ok(Self::new(Pool::new(opts)))
    }

    /// Get a reference to the underlying pool.
    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// Close every pooled connection.
    pub async fn disconnect(self) -> MysqlResult<()> {
        self.pool.disconnect().await?;
        Ok(())
    }

    /// Run a row-returning statement with positional parameters.
    #[instrument(skip(self, sql, params), fields(params = params.len()))]
    pub async fn query_params(
        &self,
        sql: &str,
        params: Vec<FilterValue>,
    ) -> MysqlResult<Vec<Record>> {
        debug!(sql = %sql, "Executing parameterized query");

        let mut conn = self.pool.get_conn().await.map_err(MysqlError::Connection)?;

        let params = if params.is_empty() {
            Params::Empty
        } else {
            Params::Positional(params.iter().map(filter_value_to_mysql).collect())
        };

        let rows: Vec<Row> = conn.exec(sql, params).await?;
        debug!(rows = rows.len(), "Query returned");

        Ok(rows.iter().map(row_to_record).collect())
    }
}

impl Driver for MysqlDriver {
    fn name(&self) -> &'static str {
        "mysql"
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
                    .with_context("mysql fetch_all")
                    .with_sql(sql)
            })
        })
    }
}

/// Build pool options from a `mysql://` URL, requiring a database name.
fn pool_opts(url: &str) -> MysqlResult<Opts> {
    let parsed = Url::parse(url).map_err(|e| MysqlError::config(format!("invalid URL: {}", e)))?;
    if parsed.scheme() != "mysql" {
        return Err(MysqlError::config(format!(
            "unsupported scheme '{}', expected 'mysql'",
            parsed.scheme()
        )));
    }

    let database = parsed.path().trim_start_matches('/');
    if database.is_empty() {
        return Err(MysqlError::config("URL must name a database"));
    }
    let user = Some(parsed.username()).filter(|u| !u.is_empty());

    let builder = OptsBuilder::default()
        .ip_or_hostname(parsed.host_str().unwrap_or("localhost"))
        .tcp_port(parsed.port().unwrap_or(3306))
        .db_name(Some(database))
        .user(user)
        .pass(parsed.password());
    Ok(Opts::from(builder))
}
