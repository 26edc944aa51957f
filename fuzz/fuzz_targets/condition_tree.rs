//! Fuzz target for condition trees.
//!
//! Builds arbitrary WHERE / HAVING trees through the clause builders and checks that
//! the rendered SQL always carries exactly one placeholder per argument and balanced
//! parentheses.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_condition_tree
//! ```

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use quarry_query::clause::{ClauseBuilder, ClauseKind};
use quarry_query::filter::{FilterValue, Operator};
use quarry_query::select::SelectQuery;
use quarry_query::types::SortOrder;

const MAX_DEPTH: usize = 8;

/// A fuzzable filter value.
#[derive(Debug, Arbitrary, Clone)]
enum FuzzValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<FuzzValue>),
}

impl From<FuzzValue> for FilterValue {
    fn from(val: FuzzValue) -> Self {
        match val {
            FuzzValue::Null => FilterValue::Null,
            FuzzValue::Bool(b) => FilterValue::Bool(b),
            FuzzValue::Int(i) => FilterValue::Int(i),
            FuzzValue::Float(f) => FilterValue::Float(f),
            FuzzValue::String(s) => FilterValue::String(s),
            FuzzValue::List(list) => FilterValue::List(list.into_iter().map(Into::into).collect()),
        }
    }
}

#[derive(Debug, Arbitrary, Clone, Copy)]
enum FuzzOperator {
    Eq,
    Neq,
    Gt,
    Lt,
    Gte,
    Lte,
    Like,
    NotLike,
    Is,
    IsNot,
    In,
    NotIn,
}

impl From<FuzzOperator> for Operator {
    fn from(op: FuzzOperator) -> Self {
        match op {
            FuzzOperator::Eq => Operator::Eq,
            FuzzOperator::Neq => Operator::Neq,
            FuzzOperator::Gt => Operator::Gt,
            FuzzOperator::Lt => Operator::Lt,
            FuzzOperator::Gte => Operator::Gte,
            FuzzOperator::Lte => Operator::Lte,
            FuzzOperator::Like => Operator::Like,
            FuzzOperator::NotLike => Operator::NotLike,
            FuzzOperator::Is => Operator::Is,
            FuzzOperator::IsNot => Operator::IsNot,
            FuzzOperator::In => Operator::In,
            FuzzOperator::NotIn => Operator::NotIn,
        }
    }
}

/// One step of a fluent chain.
#[derive(Debug, Arbitrary)]
enum FuzzOp {
    And(u8, FuzzOperator, FuzzValue),
    Or(u8, FuzzOperator, FuzzValue),
    AndGroup(Vec<FuzzOp>),
    OrGroup(Vec<FuzzOp>),
}

#[derive(Debug, Arbitrary)]
struct FuzzQuery {
    distinct: bool,
    where_ops: Vec<FuzzOp>,
    having_ops: Vec<FuzzOp>,
    group_by: bool,
    order_desc: Option<bool>,
    limit: Option<u32>,
    offset: Option<u32>,
}

/// Column names come from a fixed set so the SQL text never contains stray `?`.
fn column(index: u8) -> &'static str {
    const COLUMNS: [&str; 4] = ["id", "name", "age", "status"];
    COLUMNS[index as usize % COLUMNS.len()]
}

fn apply<K: ClauseKind>(builder: &mut ClauseBuilder<'_, K>, ops: Vec<FuzzOp>, depth: usize) {
    if depth > MAX_DEPTH {
        return;
    }

    for op in ops {
        // Invalid conditions are rejected without touching the tree.
        let _ = match op {
            FuzzOp::And(col, operator, value) => builder
                .and(column(col), Operator::from(operator), FilterValue::from(value))
                .map(|_| ()),
            FuzzOp::Or(col, operator, value) => builder
                .or(column(col), Operator::from(operator), FilterValue::from(value))
                .map(|_| ()),
            FuzzOp::AndGroup(inner) => builder
                .and_group(|b| {
                    apply(b, inner, depth + 1);
                    Ok(())
                })
                .map(|_| ()),
            FuzzOp::OrGroup(inner) => builder
                .or_group(|b| {
                    apply(b, inner, depth + 1);
                    Ok(())
                })
                .map(|_| ()),
        };
    }
}

fuzz_target!(|input: FuzzQuery| {
    let mut query = SelectQuery::new("users");
    if input.distinct {
        query = query.distinct();
    }
    if input.group_by {
        query = query.group_by(["status"]);
    }
    if let Some(desc) = input.order_desc {
        let order = if desc { SortOrder::Desc } else { SortOrder::Asc };
        query = query.order_by("id", order);
    }
    if let Some(limit) = input.limit {
        query = query.limit(limit);
    }
    if let Some(offset) = input.offset {
        query = query.offset(offset);
    }

    apply(&mut query.where_clause.builder(), input.where_ops, 0);
    apply(&mut query.having.builder(), input.having_ops, 0);

    let (sql, args) = query.build();

    assert_eq!(sql.matches('?').count(), args.len(), "sql: {sql}");
    assert_eq!(sql.matches('(').count(), sql.matches(')').count(), "sql: {sql}");
    assert!(!sql.contains("()"), "empty group rendered: {sql}");
    for leading in ["(AND ", "(OR ", "WHERE AND ", "WHERE OR ", "HAVING AND ", "HAVING OR "] {
        assert!(!sql.contains(leading), "leading connector: {sql}");
    }
    assert!(!sql.ends_with(" WHERE") && !sql.ends_with(" HAVING"), "dangling keyword: {sql}");

    // Rendering does not mutate the query. Args are compared by count since NaN != NaN.
    let (again_sql, again_args) = query.build();
    assert_eq!(again_sql, sql);
    assert_eq!(again_args.len(), args.len());
});
