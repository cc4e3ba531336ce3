//! Password hashing and verification (bcrypt).
//!
//! Both operations are CPU-bound and run on the blocking pool.

use bcrypt::{hash, verify};

use crate::AuthError;

/// Bcrypt cost factor used when none is given.
pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

pub async fn hash_password(password: &str, cost: Option<u32>) -> Result<String, AuthError> {
    let password = password.to_string();
    let cost = cost.unwrap_or(DEFAULT_COST);

    tokio::task::spawn_blocking(move || {
        hash(password, cost).map_err(|e| AuthError::internal(format!("password hashing failed: {e}")))
    })
    .await
    .map_err(|e| AuthError::internal(format!("task join error: {e}")))?
}

/// `Ok(true)` on match, `Ok(false)` on mismatch, `Err` if the stored hash is
/// unusable.
pub async fn verify_password(password: &str, stored_hash: &str) -> Result<bool, AuthError> {
    let password = password.to_string();
    let stored_hash = stored_hash.to_string();

    tokio::task::spawn_blocking(move || {
        verify(password, &stored_hash)
            .map_err(|e| AuthError::internal(format!("password verification failed: {e}")))
    })
    .await
    .map_err(|e| AuthError::internal(format!("task join error: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_COST: u32 = 4;

    #[tokio::test]
    async fn correct_password_matches() {
        let hash = hash_password("hunter2", Some(TEST_COST)).await.unwrap();
        assert!(verify_password("hunter2", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn wrong_password_does_not_match() {
        let hash = hash_password("hunter2", Some(TEST_COST)).await.unwrap();
        assert!(!verify_password("hunter3", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn hashes_are_salted() {
        let a = hash_password("same", Some(TEST_COST)).await.unwrap();
        let b = hash_password("same", Some(TEST_COST)).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn malformed_hash_is_an_error() {
        assert!(verify_password("pw", "not-a-hash").await.is_err());
    }
}
