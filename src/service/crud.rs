//! Generic CRUD execution against PostgreSQL. One logical statement per call;
//! no cross-statement transactions here.

use crate::config::ResourceConfig;
use crate::error::ApiError;
use crate::sql::{build_insert, build_update, BuiltQuery, PgBindValue};
use rust_decimal::prelude::ToPrimitive;
use serde_json::{Map, Value};
use sqlx::postgres::PgRow;
use sqlx::PgPool;

pub struct CrudService;

impl CrudService {
    /// Full table scan ordered per the resource's `list_order`.
    pub async fn list(pool: &PgPool, resource: &ResourceConfig) -> Result<Vec<Value>, ApiError> {
        let sql = format!(
            "SELECT * FROM {} ORDER BY {}",
            resource.table, resource.list_order
        );
        tracing::debug!(sql = %sql, "query");
        let rows = sqlx::query(&sql).fetch_all(pool).await?;
        Ok(rows.iter().map(row_to_json).collect())
    }

    /// Fetch one row by id. Returns None when no row matches.
    pub async fn get(
        pool: &PgPool,
        resource: &ResourceConfig,
        id: &Value,
    ) -> Result<Option<Value>, ApiError> {
        let sql = format!(
            "SELECT * FROM {} WHERE {} = $1",
            resource.table, resource.id_column
        );
        tracing::debug!(sql = %sql, id = ?id, "query");
        let row = sqlx::query(&sql)
            .bind(PgBindValue::from_json(id))
            .fetch_optional(pool)
            .await?;
        Ok(row.as_ref().map(row_to_json))
    }

    /// Insert one row from the allow-listed body fields. Returns the created
    /// row with store-assigned defaults.
    pub async fn create(
        pool: &PgPool,
        resource: &ResourceConfig,
        body: &Map<String, Value>,
    ) -> Result<Value, ApiError> {
        let q = build_insert(resource, body)?;
        Self::fetch_returning(pool, &q)
            .await?
            .ok_or(ApiError::Db(sqlx::Error::RowNotFound))
    }

    /// Update one row by id. Returns None when no row matches.
    pub async fn update(
        pool: &PgPool,
        resource: &ResourceConfig,
        id: &Value,
        body: &Map<String, Value>,
    ) -> Result<Option<Value>, ApiError> {
        let q = build_update(resource, id, body)?;
        Self::fetch_returning(pool, &q).await
    }

    /// Delete one row by id, returning the deleted row or None.
    pub async fn delete(
        pool: &PgPool,
        resource: &ResourceConfig,
        id: &Value,
    ) -> Result<Option<Value>, ApiError> {
        let sql = format!(
            "DELETE FROM {} WHERE {} = $1 RETURNING *",
            resource.table, resource.id_column
        );
        tracing::debug!(sql = %sql, id = ?id, "query");
        let row = sqlx::query(&sql)
            .bind(PgBindValue::from_json(id))
            .fetch_optional(pool)
            .await?;
        Ok(row.as_ref().map(row_to_json))
    }

    /// Execute a built write statement and decode its RETURNING row, if any.
    pub async fn fetch_returning(pool: &PgPool, q: &BuiltQuery) -> Result<Option<Value>, ApiError> {
        Self::query_opt(pool, &q.text, &q.values).await
    }

    /// One parameterized statement, first row or None.
    pub async fn query_opt(
        pool: &PgPool,
        sql: &str,
        params: &[Value],
    ) -> Result<Option<Value>, ApiError> {
        tracing::debug!(sql = %sql, params = ?params, "query");
        let mut query = sqlx::query(sql);
        for v in params {
            query = query.bind(PgBindValue::from_json(v));
        }
        let row = query.fetch_optional(pool).await?;
        Ok(row.as_ref().map(row_to_json))
    }

    /// One parameterized statement, no result rows expected.
    pub async fn execute(pool: &PgPool, sql: &str, params: &[Value]) -> Result<u64, ApiError> {
        tracing::debug!(sql = %sql, params = ?params, "execute");
        let mut query = sqlx::query(sql);
        for v in params {
            query = query.bind(PgBindValue::from_json(v));
        }
        let done = query.execute(pool).await?;
        Ok(done.rows_affected())
    }
}

pub fn row_to_json(row: &PgRow) -> Value {
    use sqlx::{Column, Row};
    let mut map = Map::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, name));
    }
    Value::Object(map)
}

fn cell_to_value(row: &PgRow, name: &str) -> Value {
    use sqlx::Row;
    if let Ok(Some(n)) = row.try_get::<Option<i16>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i32>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<f32>, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(n as f64) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(n)) = row.try_get::<Option<f64>, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(n) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(d)) = row.try_get::<Option<rust_decimal::Decimal>, _>(name) {
        // numeric: JSON number when f64-representable, text otherwise
        if let Some(n) = d.to_f64().and_then(serde_json::Number::from_f64) {
            return Value::Number(n);
        }
        return Value::String(d.to_string());
    }
    if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(name) {
        return Value::Bool(b);
    }
    if let Ok(Some(u)) = row.try_get::<Option<uuid::Uuid>, _>(name) {
        return Value::String(u.to_string());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
        return Value::String(d.to_rfc3339());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::NaiveDateTime>, _>(name) {
        return Value::String(d.format("%Y-%m-%dT%H:%M:%S%.f").to_string());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::NaiveDate>, _>(name) {
        return Value::String(d.format("%Y-%m-%d").to_string());
    }
    if let Ok(Some(t)) = row.try_get::<Option<chrono::NaiveTime>, _>(name) {
        return Value::String(t.format("%H:%M:%S").to_string());
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    if let Ok(Some(items)) = row.try_get::<Option<Vec<String>>, _>(name) {
        return Value::Array(items.into_iter().map(Value::String).collect());
    }
    if let Ok(Some(items)) = row.try_get::<Option<Vec<i32>>, _>(name) {
        return Value::Array(items.into_iter().map(|n| Value::Number(n.into())).collect());
    }
    if let Ok(Some(items)) = row.try_get::<Option<Vec<i64>>, _>(name) {
        return Value::Array(items.into_iter().map(|n| Value::Number(n.into())).collect());
    }
    if let Ok(Some(j)) = row.try_get::<Option<Value>, _>(name) {
        return j;
    }
    Value::Null
}
