//! Filesystem adapter for the `MediaStore` port.
//!
//! Uploads are written through a capability-scoped [`Dir`] so the adapter can
//! only touch files under its configured root. Each write goes to a staging
//! name first and is renamed into place, so readers never see a partial file.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{MediaStore, MediaStoreError};
use crate::domain::{ImageSlot, ImageType, ImageUpload, UserId};

const ALL_TYPES: [ImageType; 4] = [
    ImageType::Png,
    ImageType::Jpeg,
    ImageType::Webp,
    ImageType::Gif,
];

/// Stores profile images as `<user>-<slot>.<ext>` under one directory.
#[derive(Clone)]
pub struct FsMediaStore {
    root: Arc<Dir>,
    root_path: PathBuf,
    base_url: String,
}

impl FsMediaStore {
    /// Open (creating if needed) `media_dir` and serve files under `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the directory cannot be created or opened.
    pub fn open(media_dir: impl Into<PathBuf>, base_url: &str) -> io::Result<Self> {
        let root_path = media_dir.into();
        Dir::create_ambient_dir_all(&root_path, ambient_authority())?;
        let root = Dir::open_ambient_dir(&root_path, ambient_authority())?;
        Ok(Self {
            root: Arc::new(root),
            root_path,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Directory the images are written to.
    pub fn root_path(&self) -> &PathBuf {
        &self.root_path
    }

    fn file_name(user: &UserId, slot: ImageSlot, kind: ImageType) -> String {
        format!("{user}-{}.{}", slot.as_str(), kind.extension())
    }
}

fn write_replacing(
    root: &Dir,
    user: &UserId,
    slot: ImageSlot,
    image: &ImageUpload,
) -> io::Result<String> {
    let final_name = FsMediaStore::file_name(user, slot, image.kind());
    let staged_name = format!(".upload-{}", Uuid::new_v4().simple());
    if let Err(error) = root.write(&staged_name, image.bytes()) {
        let _cleanup = root.remove_file(&staged_name);
        return Err(error);
    }
    root.rename(&staged_name, root, &final_name)?;

    // A new upload of another type must not leave the previous file behind.
    for kind in ALL_TYPES.into_iter().filter(|kind| *kind != image.kind()) {
        match root.remove_file(FsMediaStore::file_name(user, slot, kind)) {
            Ok(()) => {}
            Err(error) if error.kind() == io::ErrorKind::NotFound => {}
            Err(error) => return Err(error),
        }
    }
    Ok(final_name)
}

#[async_trait]
impl MediaStore for FsMediaStore {
    async fn store(
        &self,
        user: &UserId,
        slot: ImageSlot,
        image: &ImageUpload,
    ) -> Result<String, MediaStoreError> {
        let root = Arc::clone(&self.root);
        let user = user.clone();
        let image = image.clone();
        let file_name = tokio::task::spawn_blocking(move || {
            write_replacing(&root, &user, slot, &image)
        })
        .await
        .map_err(|error| MediaStoreError::io(format!("upload task failed: {error}")))?
        .map_err(|error| {
            debug!(%error, "media write failed");
            MediaStoreError::io(error.to_string())
        })?;
        Ok(format!("{}/{file_name}", self.base_url))
    }
}
