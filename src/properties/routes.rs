//! Property route handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::Result;
use crate::extract::ValidJson;
use crate::pagination::PageQuery;
use crate::AppState;

use super::access::{ensure_owner, PropertyAction};
use super::models::{Property, PropertyDetails, PublicProperty};
use super::requests::{CreatePropertyRequest, PropertyListQuery, UpdatePropertyRequest};
use super::services;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/properties", get(list).post(create))
        .route("/properties/my", get(mine))
        .route("/properties/:id", get(find).patch(update).delete(remove))
        .route("/properties/:id/full", get(full))
}

async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    ValidJson(request): ValidJson<CreatePropertyRequest>,
) -> Result<(StatusCode, Json<Property>)> {
    request.check()?;
    let (new, amenity_ids) = request.into_new(user.id);
    let property = services::create(&state.db, new, amenity_ids).await?;
    Ok((StatusCode::CREATED, Json(property)))
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<PropertyListQuery>,
) -> Result<Json<Vec<PublicProperty>>> {
    let (filter, page) = query.split();
    let properties = services::list_public(&state.db, &filter, page.page()).await?;
    Ok(Json(properties))
}

async fn mine(
    State(state): State<AppState>,
    user: AuthUser,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<PropertyDetails>>> {
    let properties =
        services::list_mine(&state.db, &state.reservations, user.id, page.page()).await?;
    Ok(Json(properties))
}

async fn find(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PublicProperty>> {
    Ok(Json(services::find_public(&state.db, id).await?))
}

async fn full(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<PropertyDetails>> {
    let details = services::find_full(&state.db, &state.reservations, id).await?;
    ensure_owner(details.property.creator_id, user.id, PropertyAction::View)?;
    Ok(Json(details))
}

async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ValidJson(request): ValidJson<UpdatePropertyRequest>,
) -> Result<Json<Property>> {
    request.check()?;
    let owner = services::owner_of(&state.db, id).await?;
    ensure_owner(owner, user.id, PropertyAction::Update)?;

    let (changes, amenity_ids) = request.into_changes();
    let property = services::update(&state.db, &state.cache, id, changes, amenity_ids).await?;
    Ok(Json(property))
}

async fn remove(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    let owner = services::owner_of(&state.db, id).await?;
    ensure_owner(owner, user.id, PropertyAction::Delete)?;

    services::delete(&state.db, &state.cache, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
