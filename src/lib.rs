//! NatureNest marketplace API
//!
//! Users list rural stays (cabins, yurts, farmhouses) and guests book them.
//! The reservation engine keeps every calendar day of a stay within the
//! property's guest capacity and prices stays per night and per guest.

pub mod auth;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod pagination;
pub mod properties;
pub mod reservations;
pub mod routes;
pub mod throttle;
pub mod users;

use std::sync::Arc;

use axum::{
    extract::FromRef,
    http::{header, HeaderValue, Method},
    middleware, Router,
};
use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use tokio::sync::mpsc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

use crate::auth::{JwtService, PasswordHasher};
use crate::cache::AppCache;
use crate::config::Config;
use crate::reservations::stats::RecomputeStats;
use crate::reservations::{ReservationService, ReservationStore, StatsQueue};
use crate::throttle::{throttle_middleware, Throttle};

/// Current UTC calendar date
pub fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub cache: AppCache,
    pub jwt: JwtService,
    pub passwords: PasswordHasher,
    pub reservations: ReservationService,
    /// Source of "today" for date validation
    pub today: fn() -> NaiveDate,
}

impl AppState {
    /// Build the state and hand back the receiving end of the stats queue
    pub fn new(
        db: PgPool,
        store: Arc<dyn ReservationStore>,
        config: &Config,
    ) -> (Self, mpsc::Receiver<RecomputeStats>) {
        let cache = AppCache::new();
        let (stats, rx) = StatsQueue::new(config.stats_queue_capacity);
        let reservations = ReservationService::new(store, cache.clone(), stats);

        let state = Self {
            db,
            cache,
            jwt: JwtService::new(config.jwt_secret.clone(), config.jwt_ttl_hours),
            passwords: PasswordHasher::new(),
            reservations,
            today: utc_today,
        };
        (state, rx)
    }
}

impl FromRef<AppState> for JwtService {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::PUT,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}

/// Full application router with middleware
pub fn build_router(state: AppState, config: &Config) -> Router {
    let throttle = Throttle::new(config.throttle_limit, config.throttle_window);

    Router::new()
        .nest("/api/v1", routes::api_router())
        .layer(middleware::from_fn_with_state(throttle, throttle_middleware))
        .layer(cors_layer(&config.cors_origins))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
