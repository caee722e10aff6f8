pub mod registry;
pub mod resource;

pub use registry::resources;
pub use resource::{ColumnType, ResourceConfig};
