//! Builds parameterized INSERT and UPDATE statements from a resource
//! configuration and a loosely-typed request body.

use crate::config::{ColumnType, ResourceConfig};
use crate::error::ApiError;
use crate::sql::transform::transform_value;
use serde_json::{Map, Value};

/// Parameterized SQL text plus its ordered bound values. Placeholders are
/// 1-based and contiguous; `values.len()` always equals the placeholder count.
#[derive(Debug)]
pub struct BuiltQuery {
    pub text: String,
    pub values: Vec<Value>,
}

/// `$n`, suffixed with an explicit cast when the column carries a type tag.
fn placeholder(index: usize, ty: Option<ColumnType>) -> String {
    match ty {
        Some(ty) => format!("${}::{}", index, ty.as_sql()),
        None => format!("${}", index),
    }
}

/// Allow-listed columns present in the body, in allow-list order. Presence is
/// key presence: an explicit null is a defined value.
fn selected_columns<'a>(config: &'a ResourceConfig, data: &Map<String, Value>) -> Vec<&'a str> {
    config
        .allowed_columns
        .iter()
        .copied()
        .filter(|col| data.contains_key(*col))
        .collect()
}

/// `INSERT INTO <table> (...) VALUES (...) RETURNING *` over the allow-listed
/// columns present in `data`. Does not execute.
pub fn build_insert(config: &ResourceConfig, data: &Map<String, Value>) -> Result<BuiltQuery, ApiError> {
    let columns = selected_columns(config, data);
    if columns.is_empty() {
        return Err(ApiError::NoFields("Sin campos para insertar"));
    }
    let placeholders = columns
        .iter()
        .enumerate()
        .map(|(i, col)| placeholder(i + 1, config.type_of(col)))
        .collect::<Vec<_>>()
        .join(", ");
    let values = columns
        .iter()
        .map(|col| transform_value(data[*col].clone(), config.type_of(col)))
        .collect();
    let text = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING *",
        config.table,
        columns.join(", "),
        placeholders
    );
    Ok(BuiltQuery { text, values })
}

/// `UPDATE <table> SET ... WHERE <id_column> = $n RETURNING *`. The id is the
/// trailing parameter, bound raw. With `has_updated_at`, an extra
/// `updated_at = NOW()` clause is stamped without consuming a placeholder;
/// the emptiness check runs after that clause is appended, so an empty body
/// then still builds a valid timestamp-only update.
pub fn build_update(
    config: &ResourceConfig,
    id: &Value,
    data: &Map<String, Value>,
) -> Result<BuiltQuery, ApiError> {
    let columns = selected_columns(config, data);
    let mut set_clauses = columns
        .iter()
        .enumerate()
        .map(|(i, col)| format!("{} = {}", col, placeholder(i + 1, config.type_of(col))))
        .collect::<Vec<_>>();
    if config.has_updated_at {
        set_clauses.push("updated_at = NOW()".to_string());
    }
    if set_clauses.is_empty() {
        return Err(ApiError::NoFields("Sin campos para actualizar"));
    }
    let text = format!(
        "UPDATE {} SET {} WHERE {} = ${} RETURNING *",
        config.table,
        set_clauses.join(", "),
        config.id_column,
        columns.len() + 1
    );
    let mut values: Vec<Value> = columns
        .iter()
        .map(|col| transform_value(data[*col].clone(), config.type_of(col)))
        .collect();
    values.push(id.clone());
    Ok(BuiltQuery { text, values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn plans() -> ResourceConfig {
        ResourceConfig::new("plans", &["name", "price", "description", "is_active"])
    }

    fn reportes() -> ResourceConfig {
        ResourceConfig::new("reportes", &["obra_id", "fotos_urls", "metadata"])
            .column_type("fotos_urls", ColumnType::TextArray)
            .column_type("metadata", ColumnType::Jsonb)
    }

    fn body(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn insert_filters_by_allow_list_in_declared_order() {
        let q = build_insert(
            &plans(),
            &body(json!({"price": 100, "name": "Basic", "intruso": true})),
        )
        .unwrap();
        assert_eq!(
            q.text,
            "INSERT INTO plans (name, price) VALUES ($1, $2) RETURNING *"
        );
        assert_eq!(q.values, vec![json!("Basic"), json!(100)]);
    }

    #[test]
    fn insert_placeholder_count_matches_values() {
        let q = build_insert(
            &plans(),
            &body(json!({"name": "Pro", "price": 250, "is_active": true})),
        )
        .unwrap();
        let placeholders = q.text.matches('$').count();
        assert_eq!(placeholders, q.values.len());
        assert_eq!(placeholders, 3);
    }

    #[test]
    fn insert_includes_explicit_null() {
        let q = build_insert(&plans(), &body(json!({"name": "Basic", "description": null}))).unwrap();
        assert_eq!(
            q.text,
            "INSERT INTO plans (name, description) VALUES ($1, $2) RETURNING *"
        );
        assert_eq!(q.values[1], Value::Null);
    }

    #[test]
    fn insert_with_no_allowed_fields_fails() {
        let err = build_insert(&plans(), &body(json!({"otro": 1}))).unwrap_err();
        assert!(matches!(err, ApiError::NoFields("Sin campos para insertar")));
    }

    #[test]
    fn insert_casts_tagged_columns_by_position() {
        let q = build_insert(
            &reportes(),
            &body(json!({"obra_id": 7, "fotos_urls": ["a.jpg", "b.jpg"], "metadata": {"k": 1}})),
        )
        .unwrap();
        assert_eq!(
            q.text,
            "INSERT INTO reportes (obra_id, fotos_urls, metadata) VALUES ($1, $2::text[], $3::jsonb) RETURNING *"
        );
        assert_eq!(
            q.values,
            vec![json!(7), json!("{a.jpg,b.jpg}"), json!("{\"k\":1}")]
        );
    }

    #[test]
    fn update_appends_timestamp_and_trailing_id() {
        let q = build_update(&plans(), &json!(42), &body(json!({"price": 120}))).unwrap();
        assert_eq!(
            q.text,
            "UPDATE plans SET price = $1, updated_at = NOW() WHERE id = $2 RETURNING *"
        );
        assert_eq!(q.values, vec![json!(120), json!(42)]);
    }

    #[test]
    fn update_without_timestamp_column() {
        let config = plans().has_updated_at(false);
        let q = build_update(&config, &json!(5), &body(json!({"name": "X"}))).unwrap();
        assert_eq!(q.text, "UPDATE plans SET name = $1 WHERE id = $2 RETURNING *");
    }

    #[test]
    fn empty_update_with_timestamp_is_a_touch() {
        // Regression: an empty body with updated_at stamping must not fail.
        let q = build_update(&plans(), &json!(42), &body(json!({}))).unwrap();
        assert_eq!(
            q.text,
            "UPDATE plans SET updated_at = NOW() WHERE id = $1 RETURNING *"
        );
        assert_eq!(q.values, vec![json!(42)]);
    }

    #[test]
    fn empty_update_without_timestamp_fails() {
        let config = plans().has_updated_at(false);
        let err = build_update(&config, &json!(42), &body(json!({}))).unwrap_err();
        assert!(matches!(err, ApiError::NoFields("Sin campos para actualizar")));
    }

    #[test]
    fn update_cast_position_counts_only_data_columns() {
        let q = build_update(
            &reportes(),
            &json!("a4e9"),
            &body(json!({"fotos_urls": ["x"], "obra_id": 1})),
        )
        .unwrap();
        assert_eq!(
            q.text,
            "UPDATE reportes SET obra_id = $1, fotos_urls = $2::text[], updated_at = NOW() WHERE id = $3 RETURNING *"
        );
        assert_eq!(q.values.len(), 3);
        assert_eq!(q.values[2], json!("a4e9"));
    }

    #[test]
    fn custom_id_column_is_used_in_where() {
        let config = ResourceConfig::new("users", &["email"]).id_column("user_id");
        let q = build_update(&config, &json!(1), &body(json!({"email": "a@b.c"}))).unwrap();
        assert!(q.text.ends_with("WHERE user_id = $2 RETURNING *"));
    }
}
