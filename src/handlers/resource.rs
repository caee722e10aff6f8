//! Generic resource handlers: list, get, create, update, delete. One set per
//! registered resource, bound to its configuration through router state.

use crate::config::ResourceConfig;
use crate::error::ApiError;
use crate::service::CrudService;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Map, Value};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct ResourceState {
    pub pool: PgPool,
    pub resource: Arc<ResourceConfig>,
}

/// Path ids arrive as text; bind them with their natural type so the
/// comparison against uuid/bigint id columns type-checks.
pub(crate) fn parse_id(id: &str) -> Value {
    if let Ok(n) = id.parse::<i64>() {
        return Value::Number(n.into());
    }
    Value::String(id.to_string())
}

fn body_to_map(value: Value) -> Result<Map<String, Value>, ApiError> {
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(ApiError::BadRequest("se esperaba un objeto JSON".into())),
    }
}

pub async fn list(State(state): State<ResourceState>) -> Result<impl IntoResponse, ApiError> {
    let rows = CrudService::list(&state.pool, &state.resource).await?;
    Ok(Json(Value::Array(rows)))
}

pub async fn get_by_id(
    State(state): State<ResourceState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let row = CrudService::get(&state.pool, &state.resource, &parse_id(&id))
        .await?
        .ok_or_else(ApiError::not_found)?;
    Ok(Json(row))
}

pub async fn create(
    State(state): State<ResourceState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let body = body_to_map(body)?;
    let row = CrudService::create(&state.pool, &state.resource, &body).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn update(
    State(state): State<ResourceState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let body = body_to_map(body)?;
    let row = CrudService::update(&state.pool, &state.resource, &parse_id(&id), &body)
        .await?
        .ok_or_else(ApiError::not_found)?;
    Ok(Json(row))
}

pub async fn remove(
    State(state): State<ResourceState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let row = CrudService::delete(&state.pool, &state.resource, &parse_id(&id))
        .await?
        .ok_or_else(ApiError::not_found)?;
    Ok(Json(json!({ "deleted": row })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_ids_parse_as_numbers() {
        assert_eq!(parse_id("42"), json!(42));
    }

    #[test]
    fn uuid_ids_stay_text() {
        let id = "0e3896c5-2f2c-4f3a-9c55-0f6f1b1f8f5e";
        assert_eq!(parse_id(id), json!(id));
    }

    #[test]
    fn non_object_bodies_are_rejected() {
        assert!(body_to_map(json!([1, 2])).is_err());
        assert!(body_to_map(json!("x")).is_err());
        assert!(body_to_map(json!({"a": 1})).is_ok());
    }
}
