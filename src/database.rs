//! The caller-facing entry point: a [`Database`] handing out fluent [`Query`]s.

use tracing::instrument;

use quarry_query::clause::{HavingBuilder, WhereBuilder};
use quarry_query::error::{QueryError, QueryResult};
use quarry_query::filter::{FilterValue, IntoOperator};
use quarry_query::row::Record;
use quarry_query::select::SelectQuery;
use quarry_query::traits::Driver;
use quarry_query::types::SortOrder;

/// A database reachable through a [`Driver`].
#[derive(Debug, Clone)]
pub struct Database<D: Driver> {
    driver: D,
}

impl<D: Driver> Database<D> {
    /// Wrap a driver.
    pub fn new(driver: D) -> Self {
        Self { driver }
    }

    /// The underlying driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Start a `SELECT * FROM <name>` query.
    pub fn table(&self, name: impl Into<String>) -> Query<D> {
        Query {
            driver: self.driver.clone(),
            select: SelectQuery::new(name),
        }
    }
}

/// A fluent `SELECT` bound to a driver.
///
/// Structural methods consume and return the query. Filter methods validate their
/// input and return `QueryResult<Self>`, so chains read `db.table("t").r#where(..)?.limit(5)`.
#[derive(Debug, Clone)]
pub struct Query<D: Driver> {
    driver: D,
    select: SelectQuery,
}

impl<D: Driver> Query<D> {
    /// Replace the projected columns.
    pub fn select(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.select = self.select.columns(columns);
        self
    }

    /// Emit `SELECT DISTINCT`.
    pub fn distinct(mut self) -> Self {
        self.select = self.select.distinct();
        self
    }

    /// Add a `WHERE` condition joined with `AND`.
    pub fn r#where(
        mut self,
        column: impl Into<String>,
        op: impl IntoOperator,
        value: impl Into<FilterValue>,
    ) -> QueryResult<Self> {
        self.select.where_clause.r#where(column, op, value)?;
        Ok(self)
    }

    /// Add a `WHERE` condition joined with `OR`.
    pub fn or_where(
        mut self,
        column: impl Into<String>,
        op: impl IntoOperator,
        value: impl Into<FilterValue>,
    ) -> QueryResult<Self> {
        self.select.where_clause.or_where(column, op, value)?;
        Ok(self)
    }

    /// Add a parenthesized `WHERE` group joined with `AND`.
    pub fn where_func<F>(mut self, f: F) -> QueryResult<Self>
    where
        F: FnOnce(&mut WhereBuilder<'_>) -> QueryResult<()>,
    {
        self.select.where_clause.where_func(f)?;
        Ok(self)
    }

    /// Add a parenthesized `WHERE` group joined with `OR`.
    pub fn or_where_func<F>(mut self, f: F) -> QueryResult<Self>
    where
        F: FnOnce(&mut WhereBuilder<'_>) -> QueryResult<()>,
    {
        self.select.where_clause.or_where_func(f)?;
        Ok(self)
    }

    /// Replace the `GROUP BY` columns.
    pub fn group_by(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.select = self.select.group_by(columns);
        self
    }

    /// Add a `HAVING` condition joined with `AND`.
    pub fn having(
        mut self,
        column: impl Into<String>,
        op: impl IntoOperator,
        value: impl Into<FilterValue>,
    ) -> QueryResult<Self> {
        self.select.having.having(column, op, value)?;
        Ok(self)
    }

    /// Add a `HAVING` condition joined with `OR`.
    pub fn or_having(
        mut self,
        column: impl Into<String>,
        op: impl IntoOperator,
        value: impl Into<FilterValue>,
    ) -> QueryResult<Self> {
        self.select.having.or_having(column, op, value)?;
        Ok(self)
    }

    /// Add a parenthesized `HAVING` group joined with `AND`.
    pub fn having_func<F>(mut self, f: F) -> QueryResult<Self>
    where
        F: FnOnce(&mut HavingBuilder<'_>) -> QueryResult<()>,
    {
        self.select.having.having_func(f)?;
        Ok(self)
    }

    /// Add a parenthesized `HAVING` group joined with `OR`.
    pub fn or_having_func<F>(mut self, f: F) -> QueryResult<Self>
    where
        F: FnOnce(&mut HavingBuilder<'_>) -> QueryResult<()>,
    {
        self.select.having.or_having_func(f)?;
        Ok(self)
    }

    /// Append an `ORDER BY` specification.
    pub fn order_by(mut self, column: impl Into<String>, order: SortOrder) -> Self {
        self.select = self.select.order_by(column, order);
        self
    }

    /// Set the row limit. Zero means no limit.
    pub fn limit(mut self, limit: u32) -> Self {
        self.select = self.select.limit(limit);
        self
    }

    /// Set the row offset.
    pub fn offset(mut self, offset: u32) -> Self {
        self.select = self.select.offset(offset);
        self
    }

    /// The statement built so far.
    pub fn to_select(&self) -> &SelectQuery {
        &self.select
    }

    /// Consume the query, keeping only the statement.
    pub fn into_select(self) -> SelectQuery {
        self.select
    }

    /// Render the statement and its arguments without running it.
    pub fn to_sql(&self) -> (String, Vec<FilterValue>) {
        self.select.build()
    }

    /// Run the query and return every row.
    #[instrument(skip(self), fields(table = %self.select.table, driver = self.driver.name()))]
    pub async fn get(&self) -> QueryResult<Vec<Record>> {
        self.driver.get(&self.select).await
    }

    /// Run the query with `LIMIT 1` and return the row.
    ///
    /// Fails with a not-found error when nothing matches.
    pub async fn first(self) -> QueryResult<Record> {
        let table = self.select.table.clone();
        self.first_optional()
            .await?
            .ok_or_else(|| QueryError::not_found(table))
    }

    /// Run the query with `LIMIT 1` and return the row, if any.
    pub async fn first_optional(mut self) -> QueryResult<Option<Record>> {
        self.select.limit = Some(1);
        let rows = self.get().await?;
        Ok(rows.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_query::traits::BoxFuture;

    #[derive(Debug, Clone)]
    struct EmptyDriver;

    impl Driver for EmptyDriver {
        fn name(&self) -> &'static str {
            "empty"
        }

        fn fetch_all(
            &self,
            _sql: &str,
            _params: Vec<FilterValue>,
        ) -> BoxFuture<'_, QueryResult<Vec<Record>>> {
            Box::pin(async { Ok(Vec::new()) })
        }
    }

    #[test]
    fn test_table_defaults_to_star() {
        let db = Database::new(EmptyDriver);
        let (sql, params) = db.table("users").to_sql();
        assert_eq!(sql, "SELECT * FROM users");
        assert!(params.is_empty());
    }

    #[test]
    fn test_filter_errors_surface_at_call_site() {
        let db = Database::new(EmptyDriver);
        let err = db.table("users").r#where("id", "IN", 3).unwrap_err();
        assert!(err.is_invalid_filter());
    }

    #[tokio::test]
    async fn test_first_not_found() {
        let db = Database::new(EmptyDriver);
        let err = db.table("users").first().await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.context.table.as_deref(), Some("users"));
    }

    #[tokio::test]
    async fn test_first_optional_none() {
        let db = Database::new(EmptyDriver);
        assert!(db.table("users").first_optional().await.unwrap().is_none());
    }
}
