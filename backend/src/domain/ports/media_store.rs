//! Port for storing uploaded profile images.
use async_trait::async_trait;

use crate::domain::{ImageSlot, ImageUpload, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by media store adapters.
    pub enum MediaStoreError {
        /// Writing the file failed.
        Io { message: String } => "media store write failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Persist `image` for `user` and return its public URL.
    async fn store(
        &self,
        user: &UserId,
        slot: ImageSlot,
        image: &ImageUpload,
    ) -> Result<String, MediaStoreError>;
}
