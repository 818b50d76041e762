//! Rental listings: creation, public browsing and owner management.

pub mod access;
pub mod models;
pub mod queries;
pub mod requests;
pub mod routes;
pub mod services;

pub use models::{Property, PropertyDetails, PublicProperty};
pub use routes::router;
