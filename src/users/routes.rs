//! User route handlers

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::auth::AuthUser;
use crate::error::{AppError, Result};
use crate::extract::ValidJson;
use crate::AppState;

use super::models::PublicUser;
use super::queries;
use super::requests::{CreateUserRequest, ResetPasswordRequest};
use super::services;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", post(create))
        .route("/users/me", get(me))
        .route("/users/reset-password", post(reset_password))
}

async fn create(
    State(state): State<AppState>,
    _user: AuthUser,
    ValidJson(request): ValidJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<PublicUser>)> {
    let user = services::register_user(&state.db, &state.passwords, request).await?;
    Ok((StatusCode::CREATED, Json(PublicUser::from(user))))
}

async fn me(State(state): State<AppState>, user: AuthUser) -> Result<Json<PublicUser>> {
    let found = queries::find_by_id(&state.db, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(PublicUser::from(found)))
}

async fn reset_password(
    State(state): State<AppState>,
    _user: AuthUser,
    ValidJson(request): ValidJson<ResetPasswordRequest>,
) -> Result<Json<PublicUser>> {
    let user = services::reset_password(&state.db, &state.passwords, request).await?;
    Ok(Json(user))
}
