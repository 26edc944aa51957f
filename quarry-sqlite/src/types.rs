//! Type conversion utilities for SQLite.

use rusqlite::types::{Value, ValueRef};
use serde_json::Value as JsonValue;

use quarry_query::filter::FilterValue;
use quarry_query::row::binary_to_json;

/// Convert a FilterValue to a SQLite Value.
///
/// Lists and JSON documents are bound as JSON text.
pub fn filter_value_to_sqlite(value: &FilterValue) -> Value {
    match value {
        FilterValue::Null => Value::Null,
        FilterValue::Bool(b) => Value::Integer(i64::from(*b)),
        FilterValue::Int(i) => Value::Integer(*i),
        FilterValue::Float(f) => Value::Real(*f),
        FilterValue::String(s) => Value::Text(s.clone()),
        FilterValue::Json(j) => Value::Text(j.to_string()),
        FilterValue::List(_) => Value::Text(value.to_json().to_string()),
    }
}

/// Convert a SQLite ValueRef to a JSON Value.
pub fn from_sqlite_value(value: ValueRef<'_>) -> JsonValue {
    match value {
        ValueRef::Null => JsonValue::Null,
        ValueRef::Integer(i) => JsonValue::Number(i.into()),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        ValueRef::Text(bytes) => JsonValue::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => binary_to_json(bytes),
    }
}

/// Get a JSON value from a row at the given column index.
pub fn get_value_at_index(row: &rusqlite::Row<'_>, index: usize) -> JsonValue {
    row.get_ref(index)
        .map(from_sqlite_value)
        .unwrap_or(JsonValue::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_value_to_sqlite_null() {
        let result = filter_value_to_sqlite(&FilterValue::Null);
        assert!(matches!(result, Value::Null));
    }

    #[test]
    fn test_filter_value_to_sqlite_bool() {
        assert!(matches!(filter_value_to_sqlite(&FilterValue::Bool(true)), Value::Integer(1)));
        assert!(matches!(filter_value_to_sqlite(&FilterValue::Bool(false)), Value::Integer(0)));
    }

    #[test]
    fn test_filter_value_to_sqlite_scalars() {
        assert!(matches!(filter_value_to_sqlite(&FilterValue::Int(42)), Value::Integer(42)));
        match filter_value_to_sqlite(&FilterValue::Float(2.5)) {
            Value::Real(f) => assert!((f - 2.5).abs() < f64::EPSILON),
            other => panic!("Expected Real, got {:?}", other),
        }
        let text = filter_value_to_sqlite(&FilterValue::from("hello"));
        assert!(matches!(text, Value::Text(s) if s == "hello"));
    }

    #[test]
    fn test_filter_value_to_sqlite_list() {
        let list = FilterValue::List(vec![FilterValue::Int(1), FilterValue::from("a")]);
        assert!(matches!(filter_value_to_sqlite(&list), Value::Text(s) if s == r#"[1,"a"]"#));
    }

    #[test]
    fn test_from_sqlite_value() {
        assert_eq!(from_sqlite_value(ValueRef::Null), JsonValue::Null);
        assert_eq!(from_sqlite_value(ValueRef::Integer(42)), JsonValue::from(42));
        assert_eq!(from_sqlite_value(ValueRef::Real(1.5)), JsonValue::from(1.5));
        assert_eq!(from_sqlite_value(ValueRef::Text(b"hello")), JsonValue::from("hello"));
    }

    #[test]
    fn test_from_sqlite_value_text_stays_text() {
        let result = from_sqlite_value(ValueRef::Text(br#"{"key": "value"}"#));
        assert_eq!(result, JsonValue::from(r#"{"key": "value"}"#));
    }

    #[test]
    fn test_from_sqlite_value_blob() {
        assert_eq!(from_sqlite_value(ValueRef::Blob(b"abc")), JsonValue::from("abc"));
        assert_eq!(from_sqlite_value(ValueRef::Blob(&[0xff, 0x00])), JsonValue::from("/wA="));
    }
}
