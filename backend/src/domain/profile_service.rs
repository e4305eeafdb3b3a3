//! Profile read and edit service.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::domain::account_service::map_user_error;
use crate::domain::ports::{
    MediaStore, MediaStoreError, ProfileCommand, ProfileQuery, RelationshipRepository,
    RelationshipRepositoryError, UserRepository,
};
use crate::domain::{
    Error, ImageSlot, ImageUpload, OwnProfile, ProfilePatch, PublicProfile, RelationshipFlags,
    Relationships, User, UserId, UserSummary, UserValidationError,
};

pub(crate) fn map_validation_error(error: UserValidationError) -> Error {
    let code = match error {
        UserValidationError::EmptyId => "missing_field",
        UserValidationError::InvalidId => "invalid_uuid",
        UserValidationError::InvalidEmail => "invalid_email",
        UserValidationError::TooLong { .. } => "too_long",
    };
    let mut details = json!({ "field": error.field(), "code": code });
    if let UserValidationError::TooLong { max, .. } = error {
        details["max"] = json!(max);
    }
    Error::invalid_request(error.to_string()).with_details(details)
}

fn map_relationship_read_error(error: RelationshipRepositoryError) -> Error {
    match error {
        RelationshipRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("relationship repository unavailable: {message}"))
        }
        RelationshipRepositoryError::Query { message }
        | RelationshipRepositoryError::StaleState { message } => {
            Error::internal(format!("relationship repository error: {message}"))
        }
    }
}

fn map_media_error(error: MediaStoreError) -> Error {
    Error::internal(format!("failed to store image: {error}"))
}

fn user_not_found(id: &UserId) -> Error {
    Error::not_found("user not found").with_details(json!({ "field": "id", "value": id.as_ref() }))
}

/// Resolve user ids to summaries, keeping the order of `ids`.
pub(crate) async fn summaries<U>(users: &U, ids: Vec<UserId>) -> Result<Vec<UserSummary>, Error>
where
    U: UserRepository + ?Sized,
{
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let found = users.find_many(&ids).await.map_err(map_user_error)?;
    Ok(ids
        .iter()
        .filter_map(|id| found.iter().find(|user| user.id() == id))
        .map(User::summary)
        .collect())
}

/// Build the owner's view of `user`.
pub(crate) async fn own_profile_of<U, R>(
    users: &U,
    relationships: &R,
    user: &User,
) -> Result<OwnProfile, Error>
where
    U: UserRepository + ?Sized,
    R: RelationshipRepository + ?Sized,
{
    let sets = relationships
        .load(user.id())
        .await
        .map_err(map_relationship_read_error)?
        .unwrap_or_else(|| Relationships::empty(user.id().clone()));
    let friends = summaries(users, sets.friends().iter().cloned().collect()).await?;
    let requests = summaries(users, sets.received().iter().cloned().collect()).await?;
    Ok(OwnProfile::new(user, friends, requests))
}

/// Profile service implementing [`ProfileQuery`] and [`ProfileCommand`].
#[derive(Clone)]
pub struct ProfileService<U, R, M> {
    users: Arc<U>,
    relationships: Arc<R>,
    media: Arc<M>,
}

impl<U, R, M> ProfileService<U, R, M> {
    /// Create the service.
    pub fn new(users: Arc<U>, relationships: Arc<R>, media: Arc<M>) -> Self {
        Self {
            users,
            relationships,
            media,
        }
    }
}

impl<U, R, M> ProfileService<U, R, M>
where
    U: UserRepository,
    R: RelationshipRepository,
    M: MediaStore,
{
    async fn require_user(&self, id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| user_not_found(id))
    }

    async fn save_and_view(&self, user: &User) -> Result<OwnProfile, Error> {
        self.users
            .update_profile(user)
            .await
            .map_err(map_user_error)?;
        own_profile_of(self.users.as_ref(), self.relationships.as_ref(), user).await
    }
}

#[async_trait]
impl<U, R, M> ProfileQuery for ProfileService<U, R, M>
where
    U: UserRepository,
    R: RelationshipRepository,
    M: MediaStore,
{
    async fn own_profile(&self, user: &UserId) -> Result<OwnProfile, Error> {
        let record = self.require_user(user).await?;
        own_profile_of(self.users.as_ref(), self.relationships.as_ref(), &record).await
    }

    async fn public_profile(
        &self,
        viewer: Option<UserId>,
        user: &UserId,
    ) -> Result<PublicProfile, Error> {
        let record = self.require_user(user).await?;
        let sets = self
            .relationships
            .load(user)
            .await
            .map_err(map_relationship_read_error)?
            .unwrap_or_else(|| Relationships::empty(user.clone()));

        // The target's sets mirror the viewer's, so flags come from one load.
        let relationship = match viewer {
            Some(viewer) if viewer != *user => RelationshipFlags {
                is_friend: sets.friends().contains(&viewer),
                request_sent: sets.received().contains(&viewer),
                request_received: sets.sent().contains(&viewer),
            },
            _ => RelationshipFlags::default(),
        };
        let friends = summaries(
            self.users.as_ref(),
            sets.friends().iter().cloned().collect(),
        )
        .await?;
        Ok(PublicProfile::new(&record, friends, relationship))
    }
}

#[async_trait]
impl<U, R, M> ProfileCommand for ProfileService<U, R, M>
where
    U: UserRepository,
    R: RelationshipRepository,
    M: MediaStore,
{
    async fn update_profile(
        &self,
        user: &UserId,
        patch: ProfilePatch,
    ) -> Result<OwnProfile, Error> {
        let mut record = self.require_user(user).await?;
        record
            .profile
            .apply(patch)
            .map_err(map_validation_error)?;
        self.save_and_view(&record).await
    }

    async fn set_image(
        &self,
        user: &UserId,
        slot: ImageSlot,
        image: ImageUpload,
    ) -> Result<OwnProfile, Error> {
        let mut record = self.require_user(user).await?;
        let url = self
            .media
            .store(user, slot, &image)
            .await
            .map_err(map_media_error)?;
        match slot {
            ImageSlot::Avatar => record.profile.avatar_url = Some(url),
            ImageSlot::Cover => record.profile.cover_url = Some(url),
        }
        self.save_and_view(&record).await
    }
}
