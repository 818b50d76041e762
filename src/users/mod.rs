//! Marketplace users: registration, profile and password reset.

pub mod models;
pub mod queries;
pub mod requests;
pub mod routes;
pub mod services;

pub use models::{PublicUser, User};
pub use routes::router;
