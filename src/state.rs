//! Shared application state for the auth and lookup routes.

use crate::identity::IdentityProvider;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub identity: Arc<dyn IdentityProvider>,
}
