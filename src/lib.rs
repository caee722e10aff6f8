//! obras-api: configuration-driven CRUD backend with identity-provider
//! registration flows.

pub mod config;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod password;
pub mod phone;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;

pub use config::{resources, ColumnType, ResourceConfig};
pub use error::ApiError;
pub use identity::{IdentityProvider, RestIdentityProvider};
pub use routes::{app_router, resource_router};
pub use service::CrudService;
pub use sql::{build_insert, build_update, BuiltQuery};
pub use state::AppState;
