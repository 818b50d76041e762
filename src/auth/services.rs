//! Sign-in and registration flows that hand out tokens

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{info, warn};
use validator::Validate;

use crate::error::{AppError, Result};
use crate::users::requests::CreateUserRequest;
use crate::users::{queries as user_queries, services as user_services, PublicUser, User};

use super::jwt::JwtService;
use super::password::PasswordHasher;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignInRequest {
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Token plus the user it was issued for
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub jwt: String,
    pub user: PublicUser,
}

fn authenticated(jwt: &JwtService, user: User) -> Result<AuthResponse> {
    let token = jwt.issue(user.id, &user.email)?;
    Ok(AuthResponse {
        jwt: token,
        user: PublicUser::from(user),
    })
}

pub async fn sign_in(
    pool: &PgPool,
    passwords: &PasswordHasher,
    jwt: &JwtService,
    request: SignInRequest,
) -> Result<AuthResponse> {
    let user = user_queries::find_by_email(pool, &request.email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if !passwords
        .verify(request.password, user.password_hash.clone())
        .await?
    {
        warn!(user_id = %user.id, "Sign-in rejected: wrong password");
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    info!(user_id = %user.id, "User signed in");
    authenticated(jwt, user)
}

pub async fn register(
    pool: &PgPool,
    passwords: &PasswordHasher,
    jwt: &JwtService,
    request: CreateUserRequest,
) -> Result<AuthResponse> {
    let user = user_services::register_user(pool, passwords, request).await?;
    authenticated(jwt, user)
}
