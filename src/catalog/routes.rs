//! Public catalog routes

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use crate::error::Result;
use crate::pagination::PageQuery;
use crate::AppState;

use super::models::{CatalogEntry, CatalogKind};
use super::queries;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(categories))
        .route("/amenities", get(amenities))
}

async fn categories(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<CatalogEntry>>> {
    let entries = queries::list(&state.db, CatalogKind::Category, query.page()).await?;
    Ok(Json(entries))
}

async fn amenities(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<CatalogEntry>>> {
    let entries = queries::list(&state.db, CatalogKind::Amenity, query.page()).await?;
    Ok(Json(entries))
}
