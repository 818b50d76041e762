//! Public authentication routes

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};

use crate::error::Result;
use crate::extract::ValidJson;
use crate::users::requests::CreateUserRequest;
use crate::AppState;

use super::services::{self, AuthResponse, SignInRequest};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/sign-in", post(sign_in))
        .route("/auth/register", post(register))
}

async fn sign_in(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<SignInRequest>,
) -> Result<Json<AuthResponse>> {
    let response = services::sign_in(&state.db, &state.passwords, &state.jwt, request).await?;
    Ok(Json(response))
}

async fn register(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let response = services::register(&state.db, &state.passwords, &state.jwt, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}
