//! Per-column value coercion applied before a value is bound as a parameter.

use crate::config::ColumnType;
use serde_json::Value;

/// Coerce `value` according to the column's declared type tag. Untagged
/// columns pass through untouched; null passes through under every tag.
pub fn transform_value(value: Value, ty: Option<ColumnType>) -> Value {
    match ty {
        None => value,
        Some(ColumnType::Jsonb) => match value {
            Value::Null => Value::Null,
            other => Value::String(other.to_string()),
        },
        Some(ColumnType::IntArray) | Some(ColumnType::TextArray) => to_pg_array(value),
    }
}

/// Render a JSON array as a PostgreSQL array literal: `{a,b,c}`. Elements are
/// written bare (no per-element quoting) with embedded `"` escaped as `\"`;
/// elements containing commas or braces are therefore encoded lossily.
/// Non-array values are assumed to already be an array literal and pass
/// through unchanged.
fn to_pg_array(value: Value) -> Value {
    let items = match value {
        Value::Null => return Value::Null,
        Value::Array(items) => items,
        other => return other,
    };
    let body = items
        .iter()
        .map(element_text)
        .collect::<Vec<_>>()
        .join(",");
    Value::String(format!("{{{body}}}"))
}

fn element_text(v: &Value) -> String {
    let raw = match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    raw.replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn untagged_passes_through() {
        assert_eq!(transform_value(json!("hola"), None), json!("hola"));
        assert_eq!(transform_value(json!(42), None), json!(42));
        assert_eq!(transform_value(json!({"a": 1}), None), json!({"a": 1}));
    }

    #[test]
    fn jsonb_serializes_to_text() {
        assert_eq!(
            transform_value(json!({"a": 1}), Some(ColumnType::Jsonb)),
            json!("{\"a\":1}")
        );
    }

    #[test]
    fn jsonb_null_passes_through() {
        assert_eq!(transform_value(Value::Null, Some(ColumnType::Jsonb)), Value::Null);
    }

    #[test]
    fn text_array_renders_brace_literal() {
        assert_eq!(
            transform_value(json!(["a", "b"]), Some(ColumnType::TextArray)),
            json!("{a,b}")
        );
    }

    #[test]
    fn int_array_renders_brace_literal() {
        assert_eq!(
            transform_value(json!([1, 2, 3]), Some(ColumnType::IntArray)),
            json!("{1,2,3}")
        );
    }

    #[test]
    fn array_null_passes_through() {
        assert_eq!(transform_value(Value::Null, Some(ColumnType::TextArray)), Value::Null);
        assert_eq!(transform_value(Value::Null, Some(ColumnType::IntArray)), Value::Null);
    }

    #[test]
    fn preencoded_literal_passes_through() {
        assert_eq!(
            transform_value(json!("{x,y}"), Some(ColumnType::TextArray)),
            json!("{x,y}")
        );
    }

    #[test]
    fn embedded_quotes_are_escaped() {
        assert_eq!(
            transform_value(json!(["di\"jo"]), Some(ColumnType::TextArray)),
            json!("{di\\\"jo}")
        );
    }

    #[test]
    fn embedded_comma_stays_lossy() {
        // Known limitation: no per-element quoting, so a comma inside an
        // element splits it at the store.
        assert_eq!(
            transform_value(json!(["a,b"]), Some(ColumnType::TextArray)),
            json!("{a,b}")
        );
    }
}
