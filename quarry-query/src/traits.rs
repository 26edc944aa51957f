//! The execution seam between query building and a database.

use std::future::Future;
use std::pin::Pin;

use crate::error::QueryResult;
use crate::filter::FilterValue;
use crate::row::Record;
use crate::select::SelectQuery;

/// A boxed future for async driver operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// An execution adapter.
///
/// Drivers receive SQL text using `?` placeholders and the matching positional
/// arguments, run it, and return every row as a [`Record`]. Database failures are
/// reported as [`QueryError`](crate::QueryError)s with the underlying error as source.
pub trait Driver: Clone + Send + Sync + 'static {
    /// Short driver name, used in logs.
    fn name(&self) -> &'static str;

    /// Run a row-returning statement.
    fn fetch_all(
        &self,
        sql: &str,
        params: Vec<FilterValue>,
    ) -> BoxFuture<'_, QueryResult<Vec<Record>>>;

    /// Render and run a `SELECT`.
    fn get(&self, query: &SelectQuery) -> BoxFuture<'_, QueryResult<Vec<Record>>> {
        let (sql, params) = query.build();
        Box::pin(async move { self.fetch_all(&sql, params).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingDriver {
        calls: Arc<Mutex<Vec<(String, Vec<FilterValue>)>>>,
    }

    impl Driver for RecordingDriver {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn fetch_all(
            &self,
            sql: &str,
            params: Vec<FilterValue>,
        ) -> BoxFuture<'_, QueryResult<Vec<Record>>> {
            self.calls.lock().unwrap().push((sql.to_string(), params));
            Box::pin(async { Ok(vec![Record::new()]) })
        }
    }

    #[tokio::test]
    async fn test_get_builds_and_forwards() {
        let driver = RecordingDriver::default();
        let mut query = SelectQuery::new("users").limit(1);
        query.where_clause.r#where("id", "=", 7).unwrap();

        let rows = driver.get(&query).await.unwrap();
        assert_eq!(rows.len(), 1);

        let calls = driver.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "SELECT * FROM users WHERE id = ? LIMIT ?");
        assert_eq!(calls[0].1, vec![FilterValue::Int(7), FilterValue::Int(1)]);
    }
}
