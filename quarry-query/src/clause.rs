//! `WHERE` and `HAVING` clauses.
//!
//! Both clauses are the same [`Clause`] type over a different [`ClauseKind`]; only the
//! keyword differs. Filters are added through a [`ClauseBuilder`], a view scoped to one
//! group of the clause's [`ConditionTree`]. Nested groups are filled through callbacks that
//! receive a builder scoped to the new group:
//!
//! ```rust
//! use quarry_query::clause::WhereClause;
//! use quarry_query::filter::Operator;
//!
//! let mut clause = WhereClause::new();
//! clause
//!     .r#where("a", "=", 1)?
//!     .where_func(|w| {
//!         w.r#where("x", Operator::Eq, 2)?.or_where("y", "=", 3)?;
//!         Ok(())
//!     })?;
//!
//! let (sql, args) = clause.build();
//! assert_eq!(sql, "WHERE a = ? AND (x = ? OR y = ?)");
//! assert_eq!(args.len(), 3);
//! # Ok::<(), quarry_query::QueryError>(())
//! ```

use std::fmt;
use std::marker::PhantomData;

use crate::condition::{ConditionTree, GroupId};
use crate::error::QueryResult;
use crate::filter::{Connector, FilterValue, IntoOperator};

/// Marker for the keyword a clause renders with.
pub trait ClauseKind {
    /// Keyword prefixed to a non-empty clause.
    const KEYWORD: &'static str;
}

/// `WHERE` marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Where;

impl ClauseKind for Where {
    const KEYWORD: &'static str = "WHERE";
}

/// `HAVING` marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Having;

impl ClauseKind for Having {
    const KEYWORD: &'static str = "HAVING";
}

/// A filter clause owning one condition tree.
pub struct Clause<K: ClauseKind> {
    tree: ConditionTree,
    _kind: PhantomData<K>,
}

/// A `WHERE` clause.
pub type WhereClause = Clause<Where>;
/// A `HAVING` clause.
pub type HavingClause = Clause<Having>;

impl<K: ClauseKind> Default for Clause<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ClauseKind> Clone for Clause<K> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
            _kind: PhantomData,
        }
    }
}

impl<K: ClauseKind> PartialEq for Clause<K> {
    fn eq(&self, other: &Self) -> bool {
        self.tree == other.tree
    }
}

impl<K: ClauseKind> fmt::Debug for Clause<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clause")
            .field("keyword", &K::KEYWORD)
            .field("tree", &self.tree)
            .finish()
    }
}

impl<K: ClauseKind> Clause<K> {
    /// Create an empty clause.
    pub fn new() -> Self {
        Self {
            tree: ConditionTree::new(),
            _kind: PhantomData,
        }
    }

    /// The keyword this clause renders with.
    pub fn keyword(&self) -> &'static str {
        K::KEYWORD
    }

    /// The underlying condition tree.
    pub fn tree(&self) -> &ConditionTree {
        &self.tree
    }

    /// Whether [`build`](Self::build) would render nothing.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// A builder scoped to the root group.
    pub fn builder(&mut self) -> ClauseBuilder<'_, K> {
        let group = self.tree.root();
        ClauseBuilder::new(&mut self.tree, group)
    }

    /// Render `"<KEYWORD> <conditions>"` and its arguments, or nothing when empty.
    pub fn build(&self) -> (String, Vec<FilterValue>) {
        let (sql, params) = self.tree.render();
        if sql.is_empty() {
            return (String::new(), Vec::new());
        }
        (format!("{} {}", K::KEYWORD, sql), params)
    }

    /// Append a condition joined with `AND`.
    pub fn and(
        &mut self,
        column: impl Into<String>,
        op: impl IntoOperator,
        value: impl Into<FilterValue>,
    ) -> QueryResult<&mut Self> {
        self.builder().and(column, op, value)?;
        Ok(self)
    }

    /// Append a condition joined with `OR`.
    pub fn or(
        &mut self,
        column: impl Into<String>,
        op: impl IntoOperator,
        value: impl Into<FilterValue>,
    ) -> QueryResult<&mut Self> {
        self.builder().or(column, op, value)?;
        Ok(self)
    }

    /// Append a subgroup joined with `AND`, populated by `f`.
    pub fn and_group<F>(&mut self, f: F) -> QueryResult<&mut Self>
    where
        F: FnOnce(&mut ClauseBuilder<'_, K>) -> QueryResult<()>,
    {
        self.builder().and_group(f)?;
        Ok(self)
    }

    /// Append a subgroup joined with `OR`, populated by `f`.
    pub fn or_group<F>(&mut self, f: F) -> QueryResult<&mut Self>
    where
        F: FnOnce(&mut ClauseBuilder<'_, K>) -> QueryResult<()>,
    {
        self.builder().or_group(f)?;
        Ok(self)
    }
}

impl Clause<Where> {
    /// Append a `WHERE` condition joined with `AND`.
    pub fn r#where(
        &mut self,
        column: impl Into<String>,
        op: impl IntoOperator,
        value: impl Into<FilterValue>,
    ) -> QueryResult<&mut Self> {
        self.and(column, op, value)
    }

    /// Append a `WHERE` condition joined with `OR`.
    pub fn or_where(
        &mut self,
        column: impl Into<String>,
        op: impl IntoOperator,
        value: impl Into<FilterValue>,
    ) -> QueryResult<&mut Self> {
        self.or(column, op, value)
    }

    /// Append a nested `WHERE` group joined with `AND`.
    pub fn where_func<F>(&mut self, f: F) -> QueryResult<&mut Self>
    where
        F: FnOnce(&mut WhereBuilder<'_>) -> QueryResult<()>,
    {
        self.and_group(f)
    }

    /// Append a nested `WHERE` group joined with `OR`.
    pub fn or_where_func<F>(&mut self, f: F) -> QueryResult<&mut Self>
    where
        F: FnOnce(&mut WhereBuilder<'_>) -> QueryResult<()>,
    {
        self.or_group(f)
    }
}

impl Clause<Having> {
    /// Append a `HAVING` condition joined with `AND`.
    pub fn having(
        &mut self,
        column: impl Into<String>,
        op: impl IntoOperator,
        value: impl Into<FilterValue>,
    ) -> QueryResult<&mut Self> {
        self.and(column, op, value)
    }

    /// Append a `HAVING` condition joined with `OR`.
    pub fn or_having(
        &mut self,
        column: impl Into<String>,
        op: impl IntoOperator,
        value: impl Into<FilterValue>,
    ) -> QueryResult<&mut Self> {
        self.or(column, op, value)
    }

    /// Append a nested `HAVING` group joined with `AND`.
    pub fn having_func<F>(&mut self, f: F) -> QueryResult<&mut Self>
    where
        F: FnOnce(&mut HavingBuilder<'_>) -> QueryResult<()>,
    {
        self.and_group(f)
    }

    /// Append a nested `HAVING` group joined with `OR`.
    pub fn or_having_func<F>(&mut self, f: F) -> QueryResult<&mut Self>
    where
        F: FnOnce(&mut HavingBuilder<'_>) -> QueryResult<()>,
    {
        self.or_group(f)
    }
}

/// A builder scoped to one group of a clause's tree.
pub struct ClauseBuilder<'a, K: ClauseKind> {
    tree: &'a mut ConditionTree,
    group: GroupId,
    _kind: PhantomData<K>,
}

/// Builder for `WHERE` groups.
pub type WhereBuilder<'a> = ClauseBuilder<'a, Where>;
/// Builder for `HAVING` groups.
pub type HavingBuilder<'a> = ClauseBuilder<'a, Having>;

impl<'a, K: ClauseKind> ClauseBuilder<'a, K> {
    /// Scope a builder to `group` of `tree`.
    pub fn new(tree: &'a mut ConditionTree, group: GroupId) -> Self {
        Self {
            tree,
            group,
            _kind: PhantomData,
        }
    }

    /// The group this builder appends to.
    pub fn group(&self) -> GroupId {
        self.group
    }

    /// Append a condition joined with `AND`.
    pub fn and(
        &mut self,
        column: impl Into<String>,
        op: impl IntoOperator,
        value: impl Into<FilterValue>,
    ) -> QueryResult<&mut Self> {
        self.push(column, op, value, Connector::And)
    }

    /// Append a condition joined with `OR`.
    pub fn or(
        &mut self,
        column: impl Into<String>,
        op: impl IntoOperator,
        value: impl Into<FilterValue>,
    ) -> QueryResult<&mut Self> {
        self.push(column, op, value, Connector::Or)
    }

    /// Append a subgroup joined with `AND`, populated by `f`.
    pub fn and_group<F>(&mut self, f: F) -> QueryResult<&mut Self>
    where
        F: FnOnce(&mut ClauseBuilder<'_, K>) -> QueryResult<()>,
    {
        self.nest(Connector::And, f)
    }

    /// Append a subgroup joined with `OR`, populated by `f`.
    pub fn or_group<F>(&mut self, f: F) -> QueryResult<&mut Self>
    where
        F: FnOnce(&mut ClauseBuilder<'_, K>) -> QueryResult<()>,
    {
        self.nest(Connector::Or, f)
    }

    fn push(
        &mut self,
        column: impl Into<String>,
        op: impl IntoOperator,
        value: impl Into<FilterValue>,
        connector: Connector,
    ) -> QueryResult<&mut Self> {
        let operator = op.into_operator()?;
        self.tree
            .add_condition(self.group, column, operator, value, connector)?;
        Ok(self)
    }

    /// Open a subgroup and let `f` fill it. If `f` fails, the subgroup and everything
    /// `f` added are removed again.
    fn nest<F>(&mut self, connector: Connector, f: F) -> QueryResult<&mut Self>
    where
        F: FnOnce(&mut ClauseBuilder<'_, K>) -> QueryResult<()>,
    {
        let savepoint = self.tree.savepoint(self.group);
        let group = self.tree.open_subgroup(self.group, connector);
        let mut nested = ClauseBuilder {
            tree: &mut *self.tree,
            group,
            _kind: PhantomData,
        };
        if let Err(err) = f(&mut nested) {
            self.tree.rollback(savepoint);
            return Err(err);
        }
        Ok(self)
    }
}

impl ClauseBuilder<'_, Where> {
    /// Append a `WHERE` condition joined with `AND`.
    pub fn r#where(
        &mut self,
        column: impl Into<String>,
        op: impl IntoOperator,
        value: impl Into<FilterValue>,
    ) -> QueryResult<&mut Self> {
        self.and(column, op, value)
    }

    /// Append a `WHERE` condition joined with `OR`.
    pub fn or_where(
        &mut self,
        column: impl Into<String>,
        op: impl IntoOperator,
        value: impl Into<FilterValue>,
    ) -> QueryResult<&mut Self> {
        self.or(column, op, value)
    }

    /// Append a nested group joined with `AND`.
    pub fn where_func<F>(&mut self, f: F) -> QueryResult<&mut Self>
    where
        F: FnOnce(&mut WhereBuilder<'_>) -> QueryResult<()>,
    {
        self.and_group(f)
    }

    /// Append a nested group joined with `OR`.
    pub fn or_where_func<F>(&mut self, f: F) -> QueryResult<&mut Self>
    where
        F: FnOnce(&mut WhereBuilder<'_>) -> QueryResult<()>,
    {
        self.or_group(f)
    }
}

impl ClauseBuilder<'_, Having> {
    /// Append a `HAVING` condition joined with `AND`.
    pub fn having(
        &mut self,
        column: impl Into<String>,
        op: impl IntoOperator,
        value: impl Into<FilterValue>,
    ) -> QueryResult<&mut Self> {
        self.and(column, op, value)
    }

    /// Append a `HAVING` condition joined with `OR`.
    pub fn or_having(
        &mut self,
        column: impl Into<String>,
        op: impl IntoOperator,
        value: impl Into<FilterValue>,
    ) -> QueryResult<&mut Self> {
        self.or(column, op, value)
    }

    /// Append a nested group joined with `AND`.
    pub fn having_func<F>(&mut self, f: F) -> QueryResult<&mut Self>
    where
        F: FnOnce(&mut HavingBuilder<'_>) -> QueryResult<()>,
    {
        self.and_group(f)
    }

    /// Append a nested group joined with `OR`.
    pub fn or_having_func<F>(&mut self, f: F) -> QueryResult<&mut Self>
    where
        F: FnOnce(&mut HavingBuilder<'_>) -> QueryResult<()>,
    {
        self.or_group(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Operator;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_clause_builds_nothing() {
        let clause = WhereClause::new();
        assert!(clause.is_empty());
        assert_eq!(clause.build(), (String::new(), Vec::new()));
    }

    #[test]
    fn test_where_or_where() {
        let mut clause = WhereClause::new();
        clause
            .r#where("age", ">", 18)
            .unwrap()
            .or_where("status", Operator::Eq, "active")
            .unwrap();

        let (sql, args) = clause.build();
        assert_eq!(sql, "WHERE age > ? OR status = ?");
        assert_eq!(args, vec![FilterValue::Int(18), FilterValue::from("active")]);
    }

    #[test]
    fn test_where_in_list() {
        let mut clause = WhereClause::new();
        clause.r#where("id", "IN", vec![1, 2, 3]).unwrap();

        let (sql, args) = clause.build();
        assert_eq!(sql, "WHERE id IN (?,?,?)");
        assert_eq!(
            args,
            vec![FilterValue::Int(1), FilterValue::Int(2), FilterValue::Int(3)]
        );
    }

    #[test]
    fn test_where_is_not_null() {
        let mut clause = WhereClause::new();
        clause
            .r#where("deleted_at", "IS NOT", FilterValue::Null)
            .unwrap();

        let (sql, args) = clause.build();
        assert_eq!(sql, "WHERE deleted_at IS NOT NULL");
        assert!(args.is_empty());
    }

    #[test]
    fn test_nested_where_func() {
        let mut clause = WhereClause::new();
        clause
            .r#where("a", "=", 1)
            .unwrap()
            .where_func(|w| {
                w.r#where("x", "=", 2)?.or_where("y", "=", 3)?;
                Ok(())
            })
            .unwrap();

        let (sql, args) = clause.build();
        assert_eq!(sql, "WHERE a = ? AND (x = ? OR y = ?)");
        assert_eq!(args.len(), 3);
    }

    #[test]
    fn test_or_where_func_multiple_levels() {
        let mut clause = WhereClause::new();
        clause
            .r#where("role", "=", "admin")
            .unwrap()
            .or_where_func(|w| {
                w.r#where("role", "=", "editor")?.where_func(|inner| {
                    inner
                        .r#where("published", "=", true)?
                        .or_where("draft_count", "<", 3)?;
                    Ok(())
                })?;
                Ok(())
            })
            .unwrap();

        let (sql, args) = clause.build();
        assert_eq!(
            sql,
            "WHERE role = ? OR (role = ? AND (published = ? OR draft_count < ?))"
        );
        assert_eq!(
            args,
            vec![
                FilterValue::from("admin"),
                FilterValue::from("editor"),
                FilterValue::Bool(true),
                FilterValue::Int(3),
            ]
        );
    }

    #[test]
    fn test_empty_where_func_contributes_nothing() {
        let mut with_empty = WhereClause::new();
        with_empty
            .r#where("a", "=", 1)
            .unwrap()
            .where_func(|_| Ok(()))
            .unwrap()
            .r#where("b", "=", 2)
            .unwrap();

        let mut without = WhereClause::new();
        without
            .r#where("a", "=", 1)
            .unwrap()
            .r#where("b", "=", 2)
            .unwrap();

        assert_eq!(with_empty.build(), without.build());
    }

    #[test]
    fn test_only_empty_groups_is_empty() {
        let mut clause = WhereClause::new();
        clause
            .where_func(|w| {
                w.or_where_func(|_| Ok(()))?;
                Ok(())
            })
            .unwrap();

        assert!(clause.is_empty());
        assert_eq!(clause.build().0, "");
    }

    #[test]
    fn test_callback_error_propagates() {
        let mut clause = WhereClause::new();
        let err = clause
            .where_func(|w| {
                w.r#where("id", "IN", 5)?;
                Ok(())
            })
            .unwrap_err();
        assert!(err.is_invalid_filter());
    }

    #[test]
    fn test_failed_group_leaves_clause_unchanged() {
        let mut clause = WhereClause::new();
        clause.r#where("tenant", "=", 1).unwrap();
        let before = clause.clone();

        let err = clause
            .where_func(|w| {
                w.r#where("a", "=", 2)?.or_where("id", "IN", 5)?;
                Ok(())
            })
            .unwrap_err();
        assert!(err.is_invalid_filter());
        assert_eq!(clause, before);
        assert_eq!(clause.tree().group_count(), 1);

        let (sql, args) = clause.build();
        assert_eq!(sql, "WHERE tenant = ?");
        assert_eq!(args, vec![FilterValue::Int(1)]);
    }

    #[test]
    fn test_failed_inner_group_rolls_back_only_itself() {
        let mut clause = HavingClause::new();
        clause
            .having_func(|outer| {
                outer.having("SUM(v)", ">", 1)?;
                let inner = outer.or_having_func(|inner| {
                    inner.having("", "=", 2)?;
                    Ok(())
                });
                assert!(inner.is_err());
                outer.having("COUNT(*)", "<", 3)?;
                Ok(())
            })
            .unwrap();

        let (sql, args) = clause.build();
        assert_eq!(sql, "HAVING (SUM(v) > ? AND COUNT(*) < ?)");
        assert_eq!(args, vec![FilterValue::Int(1), FilterValue::Int(3)]);
        assert_eq!(clause.tree().group_count(), 2);
    }

    #[test]
    fn test_unknown_operator_token() {
        let mut clause = WhereClause::new();
        let err = clause.r#where("age", "=>", 18).unwrap_err();
        assert!(err.is_invalid_filter());
        assert!(clause.is_empty());
    }

    #[test]
    fn test_having_clause() {
        let mut clause = HavingClause::new();
        clause
            .having("COUNT(*)", ">", 5)
            .unwrap()
            .or_having_func(|h| {
                h.having("SUM(total)", ">=", 100.5)?
                    .or_having("MAX(total)", "<", 10)?;
                Ok(())
            })
            .unwrap();

        let (sql, args) = clause.build();
        assert_eq!(sql, "HAVING COUNT(*) > ? OR (SUM(total) >= ? OR MAX(total) < ?)");
        assert_eq!(
            args,
            vec![FilterValue::Int(5), FilterValue::Float(100.5), FilterValue::Int(10)]
        );
        assert_eq!(clause.keyword(), "HAVING");
    }

    #[test]
    fn test_generic_builder_api() {
        let mut clause = WhereClause::new();
        {
            let mut root = clause.builder();
            root.and("a", "=", 1)
                .unwrap()
                .or_group(|g| {
                    g.and("b", "LIKE", "%x%")?.and("c", "NOT LIKE", "y%")?;
                    Ok(())
                })
                .unwrap();
        }

        let (sql, _) = clause.build();
        assert_eq!(sql, "WHERE a = ? OR (b LIKE ? AND c NOT LIKE ?)");
    }

    #[test]
    fn test_build_is_idempotent() {
        let mut clause = WhereClause::new();
        clause
            .r#where("a", "=", 1)
            .unwrap()
            .or_where_func(|w| {
                w.r#where("b", "IN", vec!["x", "y"])?;
                Ok(())
            })
            .unwrap();

        assert_eq!(clause.build(), clause.build());
    }
}
