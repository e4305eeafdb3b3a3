//! Driving port for registration and login.
//!
//! Inbound adapters call it with validated input and receive the caller's own
//! profile, which they echo back after establishing the session.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, OwnProfile, Registration};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Create an account; duplicate emails fail with a conflict.
    async fn register(&self, registration: &Registration) -> Result<OwnProfile, Error>;

    /// Verify credentials; unknown emails and wrong passwords are both
    /// reported as `unauthorized`.
    async fn login(&self, credentials: &LoginCredentials) -> Result<OwnProfile, Error>;
}
