//! The CRUD router factory: one resource configuration in, one mounted
//! five-operation router out.

use crate::config::ResourceConfig;
use crate::handlers::resource::{create, get_by_id, list, remove, update, ResourceState};
use axum::{routing::get, Router};
use sqlx::PgPool;
use std::sync::Arc;

/// Build the standard router for one resource:
/// `GET /`, `POST /`, `GET /:id`, `PUT /:id`, `DELETE /:id`.
pub fn resource_router(pool: PgPool, resource: ResourceConfig) -> Router {
    let state = ResourceState {
        pool,
        resource: Arc::new(resource),
    };
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(get_by_id).put(update).delete(remove))
        .with_state(state)
}
