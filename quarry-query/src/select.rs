//! `SELECT` statement assembly.

use tracing::trace;

use crate::clause::{HavingClause, WhereClause};
use crate::filter::FilterValue;
use crate::types::{OrderByField, SortOrder};

/// A fully described `SELECT` statement.
///
/// Clauses render in the fixed order
/// `SELECT [DISTINCT] cols FROM table WHERE GROUP BY HAVING ORDER BY LIMIT OFFSET`,
/// skipping any that are absent.
///
/// # Example
///
/// ```rust
/// use quarry_query::select::SelectQuery;
/// use quarry_query::types::SortOrder;
///
/// let mut query = SelectQuery::new("users")
///     .columns(["id", "email"])
///     .order_by("created_at", SortOrder::Desc)
///     .limit(10);
/// query.where_clause.r#where("active", "=", true)?;
///
/// let (sql, args) = query.build();
/// assert_eq!(
///     sql,
///     "SELECT id, email FROM users WHERE active = ? ORDER BY created_at DESC LIMIT ?"
/// );
/// assert_eq!(args.len(), 2);
/// # Ok::<(), quarry_query::QueryError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    /// Table name, rendered verbatim.
    pub table: String,
    /// Whether to emit `DISTINCT`.
    pub distinct: bool,
    /// Projected columns; `*` when empty.
    pub columns: Vec<String>,
    /// The `WHERE` clause.
    pub where_clause: WhereClause,
    /// `GROUP BY` columns.
    pub group_by: Vec<String>,
    /// The `HAVING` clause.
    pub having: HavingClause,
    /// `ORDER BY` specifications.
    pub order_by: Vec<OrderByField>,
    /// Row limit; only rendered when greater than zero.
    pub limit: Option<u32>,
    /// Row offset; rendered whenever set, zero included.
    pub offset: Option<u32>,
}

impl SelectQuery {
    /// Start a `SELECT * FROM <table>`.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            distinct: false,
            columns: vec!["*".to_string()],
            where_clause: WhereClause::new(),
            group_by: Vec::new(),
            having: HavingClause::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Replace the projected columns.
    pub fn columns(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Emit `SELECT DISTINCT`.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Replace the `GROUP BY` columns.
    pub fn group_by(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.group_by = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Append an `ORDER BY` specification.
    pub fn order_by(mut self, column: impl Into<String>, order: SortOrder) -> Self {
        self.order_by.push(OrderByField::new(column.into(), order));
        self
    }

    /// Set the row limit.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the row offset.
    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Render the statement and its ordered arguments.
    pub fn build(&self) -> (String, Vec<FilterValue>) {
        let mut sql = String::with_capacity(64);
        let mut params = Vec::new();

        // SELECT clause
        sql.push_str("SELECT ");
        if self.distinct {
            sql.push_str("DISTINCT ");
        }
        if self.columns.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&self.columns.join(", "));
        }

        // FROM clause
        sql.push_str(" FROM ");
        sql.push_str(&self.table);

        // WHERE clause
        let (where_sql, where_params) = self.where_clause.build();
        if !where_sql.is_empty() {
            sql.push(' ');
            sql.push_str(&where_sql);
            params.extend(where_params);
        }

        // GROUP BY clause
        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.group_by.join(", "));
        }

        // HAVING clause
        let (having_sql, having_params) = self.having.build();
        if !having_sql.is_empty() {
            sql.push(' ');
            sql.push_str(&having_sql);
            params.extend(having_params);
        }

        // ORDER BY clause
        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            for (i, field) in self.order_by.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                field.write_sql(&mut sql);
            }
        }

        // LIMIT/OFFSET clause
        if let Some(limit) = self.limit.filter(|&n| n > 0) {
            sql.push_str(" LIMIT ?");
            params.push(FilterValue::Int(i64::from(limit)));
        }
        if let Some(offset) = self.offset {
            sql.push_str(" OFFSET ?");
            params.push(FilterValue::Int(i64::from(offset)));
        }

        trace!(sql = %sql, params = params.len(), "Built SELECT");
        (sql, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterValue;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bare_select() {
        let (sql, params) = SelectQuery::new("users").build();
        assert_eq!(sql, "SELECT * FROM users");
        assert!(params.is_empty());
    }

    #[test]
    fn test_empty_columns_render_star() {
        let query = SelectQuery::new("users").columns(Vec::<String>::new());
        assert_eq!(query.build().0, "SELECT * FROM users");
    }

    #[test]
    fn test_distinct_columns() {
        let query = SelectQuery::new("users").columns(["city", "country"]).distinct();
        assert_eq!(query.build().0, "SELECT DISTINCT city, country FROM users");
    }

    #[test]
    fn test_full_statement() {
        let mut query = SelectQuery::new("orders")
            .columns(["customer_id", "COUNT(*) AS n"])
            .group_by(["customer_id"])
            .order_by("n", SortOrder::Desc)
            .limit(10)
            .offset(0);
        query.where_clause.r#where("status", "=", "paid").unwrap();
        query.having.having("COUNT(*)", ">", 5).unwrap();

        let (sql, params) = query.build();
        assert_eq!(
            sql,
            "SELECT customer_id, COUNT(*) AS n FROM orders WHERE status = ? \
             GROUP BY customer_id HAVING COUNT(*) > ? ORDER BY n DESC LIMIT ? OFFSET ?"
        );
        assert_eq!(
            params,
            vec![
                FilterValue::from("paid"),
                FilterValue::Int(5),
                FilterValue::Int(10),
                FilterValue::Int(0),
            ]
        );
    }

    #[test]
    fn test_zero_limit_is_omitted() {
        let query = SelectQuery::new("users").limit(0);
        let (sql, params) = query.build();
        assert_eq!(sql, "SELECT * FROM users");
        assert!(params.is_empty());
    }

    #[test]
    fn test_offset_without_limit() {
        let query = SelectQuery::new("users").offset(20);
        let (sql, params) = query.build();
        assert_eq!(sql, "SELECT * FROM users OFFSET ?");
        assert_eq!(params, vec![FilterValue::Int(20)]);
    }

    #[test]
    fn test_largest_paging_values_bind_unchanged() {
        let query = SelectQuery::new("t").limit(u32::MAX).offset(u32::MAX);
        let (sql, params) = query.build();
        assert_eq!(sql, "SELECT * FROM t LIMIT ? OFFSET ?");
        assert_eq!(
            params,
            vec![
                FilterValue::Int(4_294_967_295),
                FilterValue::Int(4_294_967_295)
            ]
        );
    }

    #[test]
    fn test_group_by_replaces_previous_columns() {
        let query = SelectQuery::new("t").group_by(["a", "b"]).group_by(["c"]);
        assert_eq!(query.build().0, "SELECT * FROM t GROUP BY c");

        let cleared = query.group_by(Vec::<String>::new());
        assert_eq!(cleared.build().0, "SELECT * FROM t");
    }

    #[test]
    fn test_multiple_order_by() {
        let query = SelectQuery::new("users")
            .order_by("last_name", SortOrder::Asc)
            .order_by("first_name", SortOrder::Asc);
        assert_eq!(
            query.build().0,
            "SELECT * FROM users ORDER BY last_name ASC, first_name ASC"
        );
    }

    #[test]
    fn test_where_args_precede_having_args() {
        let mut query = SelectQuery::new("t").group_by(["g"]);
        query.having.having("SUM(v)", ">", 1).unwrap();
        query.where_clause.r#where("a", "IN", vec![2, 3]).unwrap();

        let (sql, params) = query.build();
        assert_eq!(sql, "SELECT * FROM t WHERE a IN (?,?) GROUP BY g HAVING SUM(v) > ?");
        assert_eq!(
            params,
            vec![FilterValue::Int(2), FilterValue::Int(3), FilterValue::Int(1)]
        );
    }

    #[test]
    fn test_no_trailing_whitespace() {
        let mut query = SelectQuery::new("users").limit(5);
        query.where_clause.r#where("id", ">", 1).unwrap();
        let (sql, _) = query.build();
        assert_eq!(sql, sql.trim_end());
        assert_eq!(sql.matches('?').count(), 2);
    }
}
