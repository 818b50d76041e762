//! Route wiring for the `/api/v1` surface

pub mod health;

use axum::Router;

use crate::AppState;

/// Every API route, relative to `/api/v1`
pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(crate::auth::router())
        .merge(crate::users::router())
        .merge(crate::catalog::router())
        .merge(crate::properties::router())
        .merge(crate::reservations::router())
}
