//! Property categories and amenities.

pub mod models;
pub mod queries;
pub mod routes;
pub mod seeds;

pub use models::{CatalogEntry, CatalogKind};
pub use routes::router;
