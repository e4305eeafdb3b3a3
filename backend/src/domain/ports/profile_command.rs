//! Driving port for editing the caller's profile.
use async_trait::async_trait;

use crate::domain::{Error, ImageSlot, ImageUpload, OwnProfile, ProfilePatch, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileCommand: Send + Sync {
    /// Apply a partial update.
    async fn update_profile(&self, user: &UserId, patch: ProfilePatch)
    -> Result<OwnProfile, Error>;

    /// Store an uploaded image and point the profile at it.
    async fn set_image(
        &self,
        user: &UserId,
        slot: ImageSlot,
        image: ImageUpload,
    ) -> Result<OwnProfile, Error>;
}
