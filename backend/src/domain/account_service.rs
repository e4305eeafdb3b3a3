//! Registration and login service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    AccountCommand, CredentialHasher, CredentialHasherError, RelationshipRepository,
    UserPersistenceError, UserRepository,
};
use crate::domain::profile_service::{map_validation_error, own_profile_of};
use crate::domain::{
    Error, LoginCredentials, OwnProfile, ProfilePatch, Registration, User, UserId, UserProfile,
};

pub(crate) fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail { .. } => Error::conflict("email already registered")
            .with_details(serde_json::json!({ "field": "email", "code": "email_taken" })),
    }
}

fn map_hasher_error(error: CredentialHasherError) -> Error {
    Error::internal(format!("credential check failed: {error}"))
}

fn invalid_credentials() -> Error {
    Error::unauthorized("invalid credentials")
}

/// Account service implementing [`AccountCommand`].
#[derive(Clone)]
pub struct AccountService<U, R, H> {
    users: Arc<U>,
    relationships: Arc<R>,
    hasher: Arc<H>,
    clock: Arc<dyn Clock>,
}

impl<U, R, H> AccountService<U, R, H> {
    /// Create the service.
    pub fn new(
        users: Arc<U>,
        relationships: Arc<R>,
        hasher: Arc<H>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            relationships,
            hasher,
            clock,
        }
    }
}

#[async_trait]
impl<U, R, H> AccountCommand for AccountService<U, R, H>
where
    U: UserRepository,
    R: RelationshipRepository,
    H: CredentialHasher,
{
    async fn register(&self, registration: &Registration) -> Result<OwnProfile, Error> {
        let mut profile = UserProfile::default();
        profile
            .apply(ProfilePatch {
                nickname: registration.nickname().map(str::to_owned),
                ..ProfilePatch::default()
            })
            .map_err(map_validation_error)?;

        let credentials = registration.credentials();
        let hash = self
            .hasher
            .hash(credentials.password())
            .await
            .map_err(map_hasher_error)?;
        let user = User::new(
            UserId::random(),
            credentials.email().clone(),
            hash,
            profile,
            self.clock.utc(),
        );
        self.users.insert(&user).await.map_err(map_user_error)?;
        info!(user_id = %user.id(), "account registered");
        Ok(OwnProfile::new(&user, Vec::new(), Vec::new()))
    }

    async fn login(&self, credentials: &LoginCredentials) -> Result<OwnProfile, Error> {
        let Some(user) = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_user_error)?
        else {
            return Err(invalid_credentials());
        };
        let verified = self
            .hasher
            .verify(credentials.password(), user.password_hash())
            .await
            .map_err(map_hasher_error)?;
        if !verified {
            return Err(invalid_credentials());
        }
        own_profile_of(self.users.as_ref(), self.relationships.as_ref(), &user).await
    }
}
