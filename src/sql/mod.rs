pub mod builder;
pub mod params;
pub mod transform;

pub use builder::{build_insert, build_update, BuiltQuery};
pub use params::PgBindValue;
pub use transform::transform_value;
