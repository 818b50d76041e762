//! Password hashing using Argon2id

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};

use crate::error::{AppError, Result};

/// Argon2id hasher; hashing runs on the blocking pool
#[derive(Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    /// Hasher with the argon2 crate defaults (19 MiB, 2 passes, 1 lane)
    pub fn new() -> Self {
        Self {
            params: Params::DEFAULT,
        }
    }

    /// Hasher with custom cost parameters, e.g. cheap ones for tests
    pub fn with_params(memory_cost: u32, time_cost: u32, parallelism: u32) -> Result<Self> {
        let params = Params::new(memory_cost, time_cost, parallelism, None)
            .map_err(|e| AppError::Internal(format!("Invalid Argon2 parameters: {}", e)))?;
        Ok(Self { params })
    }

    fn argon2(params: Params) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    }

    pub async fn hash(&self, password: String) -> Result<String> {
        let params = self.params.clone();
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            Self::argon2(params)
                .hash_password(password.as_bytes(), &salt)
                .map(|h| h.to_string())
        })
        .await
        .map_err(|e| AppError::Internal(format!("Password hash task failed: {}", e)))?
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    }

    /// `Ok(false)` on mismatch; errors only for unreadable stored hashes
    pub async fn verify(&self, password: String, stored_hash: String) -> Result<bool> {
        let params = self.params.clone();
        tokio::task::spawn_blocking(move || -> Result<bool> {
            let parsed = PasswordHash::new(&stored_hash)
                .map_err(|e| AppError::Internal(format!("Stored password hash is invalid: {}", e)))?;
            Ok(Self::argon2(params)
                .verify_password(password.as_bytes(), &parsed)
                .is_ok())
        })
        .await
        .map_err(|e| AppError::Internal(format!("Password verify task failed: {}", e)))?
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::with_params(1024, 1, 1).unwrap()
    }

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hasher = hasher();
        let hash = hasher.hash("secret1".to_string()).await.unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("secret1".to_string(), hash.clone()).await.unwrap());
        assert!(!hasher.verify("wrong".to_string(), hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_hashes_are_salted() {
        let hasher = hasher();
        let a = hasher.hash("secret1".to_string()).await.unwrap();
        let b = hasher.hash("secret1".to_string()).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_verify_rejects_garbage_hash() {
        let result = hasher()
            .verify("secret1".to_string(), "not-a-hash".to_string())
            .await;
        assert!(result.is_err());
    }
}
