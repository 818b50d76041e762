//! NatureNest API server

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use naturenest_api::config::Config;
use naturenest_api::reservations::{run_stats_worker, PgReservationStore, ReservationStore};
use naturenest_api::{build_router, catalog, db, utc_today, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "naturenest_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    info!("Connecting to database...");
    let pool = db::connect(&config).await?;

    catalog::queries::sync_all(&pool)
        .await
        .context("Failed to sync catalog seeds")?;

    let store: Arc<dyn ReservationStore> = Arc::new(PgReservationStore::new(pool.clone()));
    let (state, stats_rx) = AppState::new(pool, store.clone(), &config);
    tokio::spawn(run_stats_worker(stats_rx, store, utc_today));

    let app = build_router(state, &config);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
