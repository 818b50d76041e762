//! Request DTOs for user and registration endpoints.

use serde::Deserialize;
use validator::Validate;

/// Registration body, shared by `POST /users` and `POST /auth/register`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 3, message = "username must be at least 3 characters"))]
    pub username: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
    pub password2: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 3, message = "username must be at least 3 characters"))]
    pub username: String,
    #[validate(length(min = 6, message = "newPassword must be at least 6 characters"))]
    pub new_password: String,
    #[validate(length(min = 6, message = "confirmNewPassword must be at least 6 characters"))]
    pub confirm_new_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(email: &str, username: &str, password: &str) -> CreateUserRequest {
        CreateUserRequest {
            email: email.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            password2: password.to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
        }
    }

    #[test]
    fn test_valid_registration() {
        assert!(request("ada@example.com", "ada", "secret1").validate().is_ok());
    }

    #[test]
    fn test_registration_field_rules() {
        assert!(request("not-an-email", "ada", "secret1").validate().is_err());
        assert!(request("ada@example.com", "ad", "secret1").validate().is_err());
        assert!(request("ada@example.com", "ada", "12345").validate().is_err());
    }

    #[test]
    fn test_camel_case_body() {
        let body = r#"{
            "email": "ada@example.com",
            "username": "ada",
            "password": "secret1",
            "password2": "secret1",
            "firstName": "Ada",
            "lastName": "Lovelace"
        }"#;
        let parsed: CreateUserRequest = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.first_name, "Ada");
    }
}
