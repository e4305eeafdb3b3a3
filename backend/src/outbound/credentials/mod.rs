//! Argon2id adapter for the `CredentialHasher` port.
//!
//! Hashing is CPU bound, so both operations run on the blocking pool to keep
//! the actix workers responsive.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use async_trait::async_trait;
use tokio::task::JoinError;
use zeroize::Zeroizing;

use crate::domain::PasswordHash;
use crate::domain::ports::{CredentialHasher, CredentialHasherError};

/// Argon2id hasher with the crate's default parameters.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2Hasher;

fn join_error(error: JoinError) -> CredentialHasherError {
    CredentialHasherError::hash(format!("hashing task failed: {error}"))
}

#[async_trait]
impl CredentialHasher for Argon2Hasher {
    async fn hash(&self, password: &str) -> Result<PasswordHash, CredentialHasherError> {
        let password = Zeroizing::new(password.to_owned());
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            Argon2::default()
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| PasswordHash::new(hash.to_string()))
                .map_err(|error| CredentialHasherError::hash(error.to_string()))
        })
        .await
        .map_err(join_error)?
    }

    async fn verify(
        &self,
        password: &str,
        hash: &PasswordHash,
    ) -> Result<bool, CredentialHasherError> {
        let password = Zeroizing::new(password.to_owned());
        let encoded = hash.as_ref().to_owned();
        tokio::task::spawn_blocking(move || {
            let parsed = password_hash::PasswordHash::new(&encoded)
                .map_err(|error| CredentialHasherError::malformed_hash(error.to_string()))?;
            match Argon2::default().verify_password(password.as_bytes(), &parsed) {
                Ok(()) => Ok(true),
                Err(password_hash::Error::Password) => Ok(false),
                Err(error) => Err(CredentialHasherError::hash(error.to_string())),
            }
        })
        .await
        .map_err(join_error)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn hash_then_verify_accepts_only_the_original_password() {
        let hasher = Argon2Hasher;
        let hash = hasher.hash("correct horse").await.expect("hash");

        assert!(hash.as_ref().starts_with("$argon2id$"));
        assert!(hasher.verify("correct horse", &hash).await.expect("verify"));
        assert!(!hasher.verify("wrong horse", &hash).await.expect("verify"));
    }

    #[rstest]
    #[tokio::test]
    async fn same_password_gets_distinct_salts() {
        let hasher = Argon2Hasher;
        let first = hasher.hash("password1").await.expect("hash");
        let second = hasher.hash("password1").await.expect("hash");
        assert_ne!(first.as_ref(), second.as_ref());
    }

    #[rstest]
    #[tokio::test]
    async fn malformed_stored_hash_is_reported() {
        let error = Argon2Hasher
            .verify("anything", &PasswordHash::new("plaintext"))
            .await
            .expect_err("not a PHC string");
        assert!(matches!(error, CredentialHasherError::MalformedHash { .. }));
    }
}
