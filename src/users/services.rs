//! User registration and password reset

use sqlx::PgPool;
use tracing::info;

use crate::auth::PasswordHasher;
use crate::error::{AppError, Result};

use super::models::{NewUser, PublicUser, User};
use super::queries;
use super::requests::{CreateUserRequest, ResetPasswordRequest};

pub fn ensure_passwords_match(password: &str, confirmation: &str) -> Result<()> {
    if password != confirmation {
        return Err(AppError::Validation("Passwords do not match".to_string()));
    }
    Ok(())
}

/// Register a user after checking email and username are free
pub async fn register_user(
    pool: &PgPool,
    passwords: &PasswordHasher,
    request: CreateUserRequest,
) -> Result<User> {
    ensure_passwords_match(&request.password, &request.password2)?;

    if queries::find_by_email(pool, &request.email).await?.is_some() {
        return Err(AppError::Validation("Email already exists".to_string()));
    }
    if queries::username_exists(pool, &request.username).await? {
        return Err(AppError::Validation("Username already exists".to_string()));
    }

    let password_hash = passwords.hash(request.password).await?;
    let user = queries::insert_user(
        pool,
        &NewUser {
            email: request.email,
            username: request.username,
            password_hash,
            first_name: request.first_name,
            last_name: request.last_name,
        },
    )
    .await?;

    info!(user_id = %user.id, username = %user.username, "User registered");
    Ok(user)
}

/// Replace the password of the user matching both email and username
pub async fn reset_password(
    pool: &PgPool,
    passwords: &PasswordHasher,
    request: ResetPasswordRequest,
) -> Result<PublicUser> {
    let user = queries::find_by_email(pool, &request.email)
        .await?
        .ok_or_else(|| AppError::NotFound("No user found with this email".to_string()))?;

    if user.username != request.username {
        return Err(AppError::Validation(
            "Username does not match with the email".to_string(),
        ));
    }
    ensure_passwords_match(&request.new_password, &request.confirm_new_password)?;

    let password_hash = passwords.hash(request.new_password).await?;
    let updated = queries::update_password(pool, user.id, &password_hash).await?;

    info!(user_id = %updated.id, "Password reset");
    Ok(PublicUser::from(updated))
}
