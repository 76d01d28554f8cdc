use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::ApiError;

/// Hash a password with argon2 under a fresh salt.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            tracing::error!("Password hashing failed: {}", e);
            ApiError::internal_server_error("An error occurred while processing your request")
        })
}

/// Verify a candidate password against a stored hash.
///
/// Uses `spawn_blocking` to avoid blocking the async runtime during argon2
/// verification.
pub async fn verify_password(password: &str, stored_hash: &str) -> bool {
    let password = password.to_string();
    let stored_hash = stored_hash.to_string();
    tokio::task::spawn_blocking(move || {
        let parsed = match PasswordHash::new(&stored_hash) {
            Ok(hash) => hash,
            Err(_) => return false,
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
    .await
    .unwrap_or(false)
}

/// A fresh password-reset token: the plaintext goes out to the user, only
/// the digest is stored.
pub struct ResetToken {
    pub plaintext: String,
    pub digest: String,
}

pub fn generate_reset_token() -> ResetToken {
    let plaintext = Uuid::new_v4().simple().to_string();
    ResetToken {
        digest: digest_reset_token(&plaintext),
        plaintext,
    }
}

pub fn digest_reset_token(plaintext: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(plaintext.as_bytes());
    let hash = hasher.finalize();
    format!("{:x}", hash)
}
