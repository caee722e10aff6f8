//! Registration/sync routes and the resource-router extras they hang off of.

use crate::handlers::auth::{register, register_constructora, register_residente, sync};
use crate::handlers::lookup::{constructora_by_user, obra_by_residente};
use crate::state::AppState;
use axum::{routing::get, routing::post, Router};

/// Mounted at `/api/auth`.
pub fn auth_routes(state: AppState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/sync", post(sync))
        .with_state(state)
}

/// Extra routes merged into the `/api/constructoras` resource router.
pub fn constructora_routes(state: AppState) -> Router {
    Router::new()
        .route("/register", post(register_constructora))
        .route("/by-user/:user_id", get(constructora_by_user))
        .with_state(state)
}

/// Extra routes merged into the `/api/residentes` resource router.
pub fn residente_routes(state: AppState) -> Router {
    Router::new()
        .route("/register", post(register_residente))
        .with_state(state)
}

/// Extra routes merged into the `/api/obras` resource router.
pub fn obra_routes(state: AppState) -> Router {
    Router::new()
        .route("/by-residente/:residente_id", get(obra_by_residente))
        .with_state(state)
}
