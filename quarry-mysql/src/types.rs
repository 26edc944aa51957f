//! Type conversion utilities for MySQL.

use mysql_async::{Row, Value};
use serde_json::Value as JsonValue;

use quarry_query::filter::FilterValue;
use quarry_query::row::{Record, binary_to_json};

/// Convert a FilterValue to a MySQL Value.
///
/// Lists and JSON documents are bound as JSON text.
pub fn filter_value_to_mysql(value: &FilterValue) -> Value {
    match value {
        FilterValue::Null => Value::NULL,
        FilterValue::Bool(b) => Value::from(*b),
        FilterValue::Int(i) => Value::from(*i),
        FilterValue::Float(f) => Value::from(*f),
        FilterValue::String(s) => Value::from(s.as_str()),
        FilterValue::Json(j) => Value::from(j.to_string()),
        FilterValue::List(_) => Value::from(value.to_json().to_string()),
    }
}

/// Convert a MySQL Value to a JSON Value.
pub fn from_mysql_value(value: Value) -> JsonValue {
    match value {
        Value::NULL => JsonValue::Null,
        Value::Bytes(bytes) => binary_to_json(&bytes),
        Value::Int(i) => JsonValue::Number(i.into()),
        Value::UInt(u) => JsonValue::Number(u.into()),
        Value::Float(f) => serde_json::Number::from_f64(f64::from(f))
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Value::Double(d) => serde_json::Number::from_f64(d)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Value::Date(year, month, day, hour, minute, second, micro) => {
            let datetime = format!(
                "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:06}",
                year, month, day, hour, minute, second, micro
            );
            JsonValue::String(datetime)
        }
        Value::Time(is_neg, days, hours, minutes, seconds, micro) => {
            let sign = if is_neg { "-" } else { "" };
            let time = format!(
                "{}{:02}:{:02}:{:02}.{:06}",
                sign,
                days * 24 + u32::from(hours),
                minutes,
                seconds,
                micro
            );
            JsonValue::String(time)
        }
    }
}

/// Convert a result row into a [`Record`], keeping the reported column order.
pub fn row_to_record(row: &Row) -> Record {
    let columns = row.columns_ref();
    let mut record = Record::with_capacity(columns.len());
    for (i, column) in columns.iter().enumerate() {
        let value = row.as_ref(i).cloned().unwrap_or(Value::NULL);
        record.insert(column.name_str().into_owned(), from_mysql_value(value));
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_value_to_mysql_null() {
        assert!(matches!(filter_value_to_mysql(&FilterValue::Null), Value::NULL));
    }

    #[test]
    fn test_filter_value_to_mysql_bool() {
        // mysql_async converts bool to Int
        assert!(matches!(filter_value_to_mysql(&FilterValue::Bool(true)), Value::Int(1)));
    }

    #[test]
    fn test_filter_value_to_mysql_numbers() {
        assert!(matches!(filter_value_to_mysql(&FilterValue::Int(42)), Value::Int(42)));
        assert!(matches!(filter_value_to_mysql(&FilterValue::Float(2.5)), Value::Double(_)));
    }

    #[test]
    fn test_filter_value_to_mysql_text() {
        let text = filter_value_to_mysql(&FilterValue::from("hello"));
        assert!(matches!(text, Value::Bytes(b) if b == b"hello"));
        let list = FilterValue::List(vec![FilterValue::Int(1), FilterValue::Int(2)]);
        assert!(matches!(filter_value_to_mysql(&list), Value::Bytes(b) if b == b"[1,2]"));
    }

    #[test]
    fn test_from_mysql_value_numbers() {
        assert_eq!(from_mysql_value(Value::NULL), JsonValue::Null);
        assert_eq!(from_mysql_value(Value::Int(42)), JsonValue::from(42));
        assert_eq!(from_mysql_value(Value::UInt(100)), JsonValue::from(100u64));
        assert_eq!(from_mysql_value(Value::Double(0.5)), JsonValue::from(0.5));
    }

    #[test]
    fn test_from_mysql_value_bytes() {
        assert_eq!(
            from_mysql_value(Value::Bytes(b"hello".to_vec())),
            JsonValue::from("hello")
        );
        assert_eq!(
            from_mysql_value(Value::Bytes(b"[1,2]".to_vec())),
            JsonValue::from("[1,2]")
        );
        assert_eq!(
            from_mysql_value(Value::Bytes(vec![0xff, 0x00])),
            JsonValue::from("/wA=")
        );
    }

    #[test]
    fn test_from_mysql_value_temporal() {
        assert_eq!(
            from_mysql_value(Value::Date(2024, 3, 9, 14, 5, 0, 0)),
            JsonValue::from("2024-03-09T14:05:00.000000")
        );
        assert_eq!(
            from_mysql_value(Value::Time(true, 1, 2, 30, 0, 0)),
            JsonValue::from("-26:30:00.000000")
        );
    }
}
