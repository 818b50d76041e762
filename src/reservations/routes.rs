//! Reservation route handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::Result;
use crate::extract::ValidJson;
use crate::AppState;

use super::access::{ensure_property_owner, ensure_reservation_access, ReservationAction};
use super::models::{Reservation, ReservationDetails, ReservationFilter};
use super::requests::{
    AvailabilityRequest, CreateReservationRequest, ListReservationsQuery,
    UpdateReservationRequest,
};
use super::responses::AvailabilityResponse;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reservations", post(create).get(list))
        .route("/reservations/:id", get(find).patch(update).delete(remove))
        .route("/properties/:id/availability", post(availability))
}

async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    ValidJson(request): ValidJson<CreateReservationRequest>,
) -> Result<(StatusCode, Json<Reservation>)> {
    let booking = request.into_booking()?;
    let outcome = state
        .reservations
        .create(user.id, booking, (state.today)())
        .await?;
    Ok((StatusCode::CREATED, Json(outcome.reservation)))
}

async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListReservationsQuery>,
) -> Result<Json<Vec<ReservationDetails>>> {
    let filter = match query.property_id {
        Some(property_id) => {
            let property = state.reservations.property(property_id).await?;
            ensure_property_owner(&property, user.id)?;
            ReservationFilter::Property(property_id)
        }
        None => ReservationFilter::Guest(user.id),
    };

    Ok(Json(state.reservations.list(filter).await?))
}

async fn find(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ReservationDetails>> {
    let details = state.reservations.find(id).await?;
    ensure_reservation_access(&details, user.id, ReservationAction::View)?;
    Ok(Json(details))
}

async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ValidJson(request): ValidJson<UpdateReservationRequest>,
) -> Result<Json<Reservation>> {
    let details = state.reservations.find(id).await?;
    ensure_reservation_access(&details, user.id, ReservationAction::Update)?;

    let changes = request.into_changes()?;
    let outcome = state
        .reservations
        .update(id, changes, (state.today)())
        .await?;
    Ok(Json(outcome.reservation))
}

async fn remove(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Reservation>> {
    let details = state.reservations.find(id).await?;
    ensure_reservation_access(&details, user.id, ReservationAction::Delete)?;

    let cancellation = state.reservations.delete(id).await?;
    Ok(Json(cancellation.reservation))
}

async fn availability(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(property_id): Path<Uuid>,
    ValidJson(request): ValidJson<AvailabilityRequest>,
) -> Result<Json<AvailabilityResponse>> {
    let booking = request.into_booking(property_id)?;
    let quote = state.reservations.quote(booking, (state.today)()).await?;
    Ok(Json(AvailabilityResponse::new(booking, quote)))
}
