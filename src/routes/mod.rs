pub mod auth;
pub mod common;
pub mod resource;

use crate::config::resources;
use crate::state::AppState;
use axum::Router;

pub use resource::resource_router;

/// Assemble the full application router: common routes, the generic CRUD
/// surface, and the registration/lookup extras that share resource prefixes.
pub fn app_router(state: AppState) -> Router {
    let mut router = Router::new().merge(common::common_routes(state.clone()));
    for (path, config) in resources() {
        let mut r = resource::resource_router(state.pool.clone(), config);
        // Static segments win over `/:id`, so these merge cleanly.
        r = match path {
            "/api/constructoras" => r.merge(auth::constructora_routes(state.clone())),
            "/api/residentes" => r.merge(auth::residente_routes(state.clone())),
            "/api/obras" => r.merge(auth::obra_routes(state.clone())),
            _ => r,
        };
        router = router.nest(path, r);
    }
    router.nest("/api/auth", auth::auth_routes(state))
}
