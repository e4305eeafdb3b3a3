//! Driving port for reading profiles.
use async_trait::async_trait;

use crate::domain::{Error, OwnProfile, PublicProfile, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileQuery: Send + Sync {
    /// The caller's own profile including pending requests.
    async fn own_profile(&self, user: &UserId) -> Result<OwnProfile, Error>;

    /// Another user's profile with flags relative to `viewer`.
    async fn public_profile(
        &self,
        viewer: Option<UserId>,
        user: &UserId,
    ) -> Result<PublicProfile, Error>;
}
