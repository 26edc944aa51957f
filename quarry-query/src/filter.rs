//! Filter primitives: bound values, comparison operators, connectors and leaf conditions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, QueryResult};

/// A value bound to a `?` placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// String value.
    String(String),
    /// List of values, used by `IN` / `NOT IN`.
    ///
    /// Precedes `Json` so untagged deserialization maps arrays here.
    List(Vec<FilterValue>),
    /// JSON value.
    Json(serde_json::Value),
}

impl FilterValue {
    /// Check if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Check if this is a list value.
    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// Convert to a JSON value.
    ///
    /// Non-finite floats have no JSON form and become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Int(i) => serde_json::Value::Number((*i).into()),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Json(j) => j.clone(),
            Self::List(list) => serde_json::Value::Array(list.iter().map(Self::to_json).collect()),
        }
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for FilterValue {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<u32> for FilterValue {
    fn from(v: u32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<serde_json::Value> for FilterValue {
    fn from(v: serde_json::Value) -> Self {
        Self::Json(v)
    }
}

impl<T: Into<FilterValue>> From<Vec<T>> for FilterValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

/// Comparison operator of a single condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `=`
    Eq,
    /// `!=`
    Neq,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `>=`
    Gte,
    /// `<=`
    Lte,
    /// `LIKE`
    Like,
    /// `NOT LIKE`
    NotLike,
    /// `IS` (always rendered as `IS NULL`)
    Is,
    /// `IS NOT` (always rendered as `IS NOT NULL`)
    IsNot,
    /// `IN`
    In,
    /// `NOT IN`
    NotIn,
}

impl Operator {
    /// Get the SQL token for this operator.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Neq => "!=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Gte => ">=",
            Self::Lte => "<=",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::Is => "IS",
            Self::IsNot => "IS NOT",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
        }
    }

    /// Whether this operator binds a list of values.
    pub fn is_list(&self) -> bool {
        matches!(self, Self::In | Self::NotIn)
    }

    /// Whether this operator is a nullity test.
    pub fn is_null_check(&self) -> bool {
        matches!(self, Self::Is | Self::IsNot)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for Operator {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase();
        let op = match normalized.as_str() {
            "=" => Self::Eq,
            "!=" | "<>" => Self::Neq,
            ">" => Self::Gt,
            "<" => Self::Lt,
            ">=" => Self::Gte,
            "<=" => Self::Lte,
            "LIKE" => Self::Like,
            "NOT LIKE" => Self::NotLike,
            "IS" => Self::Is,
            "IS NOT" => Self::IsNot,
            "IN" => Self::In,
            "NOT IN" => Self::NotIn,
            _ => {
                return Err(QueryError::invalid_filter(format!("unknown operator '{}'", s))
                    .with_suggestion(
                        "Use one of =, !=, >, <, >=, <=, LIKE, NOT LIKE, IS, IS NOT, IN, NOT IN",
                    ));
            }
        };
        Ok(op)
    }
}

/// Conversion into an [`Operator`], accepting either the enum or its SQL token.
pub trait IntoOperator {
    /// Resolve the operator.
    fn into_operator(self) -> QueryResult<Operator>;
}

impl IntoOperator for Operator {
    fn into_operator(self) -> QueryResult<Operator> {
        Ok(self)
    }
}

impl IntoOperator for &str {
    fn into_operator(self) -> QueryResult<Operator> {
        self.parse()
    }
}

impl IntoOperator for String {
    fn into_operator(self) -> QueryResult<Operator> {
        self.parse()
    }
}

/// Logical keyword joining an item to whatever precedes it in its group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Connector {
    /// No keyword; only the first item of a group is stored this way.
    #[default]
    None,
    /// `AND`
    And,
    /// `OR`
    Or,
}

impl Connector {
    /// Get the SQL keyword, or `None` for [`Connector::None`].
    pub fn as_sql(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::And => Some("AND"),
            Self::Or => Some("OR"),
        }
    }
}

/// A single `column operator value` predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// The column (or expression) being filtered.
    pub column: String,
    /// The comparison operator.
    pub operator: Operator,
    /// The bound value. Ignored for `IS` / `IS NOT`.
    pub value: FilterValue,
    /// How this condition joins the preceding item.
    pub connector: Connector,
}

impl Condition {
    /// Create a validated condition.
    ///
    /// Fails when the column is blank, or when `IN` / `NOT IN` is given anything
    /// other than a non-empty list.
    pub fn new(
        column: impl Into<String>,
        operator: Operator,
        value: impl Into<FilterValue>,
        connector: Connector,
    ) -> QueryResult<Self> {
        let column = column.into();
        let value = value.into();

        if column.trim().is_empty() {
            return Err(QueryError::invalid_filter(format!(
                "condition using {} has an empty column name",
                operator
            )));
        }

        if operator.is_list() {
            match &value {
                FilterValue::List(values) if values.is_empty() => {
                    return Err(QueryError::invalid_filter(format!(
                        "{} {} requires at least one value",
                        column, operator
                    ))
                    .with_field(&column));
                }
                FilterValue::List(_) => {}
                _ => {
                    return Err(QueryError::invalid_filter(format!(
                        "{} {} requires a list of values",
                        column, operator
                    ))
                    .with_field(&column)
                    .with_suggestion("Pass a Vec, e.g. vec![1, 2, 3]"));
                }
            }
        }

        Ok(Self {
            column,
            operator,
            value,
            connector,
        })
    }

    /// Write this condition's fragment (without its connector) and push its arguments.
    pub(crate) fn write_sql(&self, sql: &mut String, params: &mut Vec<FilterValue>) {
        sql.push_str(&self.column);
        sql.push(' ');
        sql.push_str(self.operator.as_sql());

        match (&self.operator, &self.value) {
            (Operator::In | Operator::NotIn, FilterValue::List(values)) => {
                sql.push_str(" (");
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        sql.push(',');
                    }
                    sql.push('?');
                    params.push(value.clone());
                }
                sql.push(')');
            }
            (Operator::Is | Operator::IsNot, _) => sql.push_str(" NULL"),
            _ => {
                sql.push_str(" ?");
                params.push(self.value.clone());
            }
        }
    }
}
