//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, catalog, media, hashing) are implemented by
//! outbound adapters. Driving ports (commands and queries) are implemented by
//! domain services and consumed by the HTTP layer through `HttpState`.

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod anime_list_repository;
mod catalog_query;
mod catalog_source;
mod credential_hasher;
mod list_tracking_command;
mod list_tracking_query;
mod media_store;
mod notification_inbox;
mod notification_repository;
mod profile_command;
mod profile_query;
mod relationship_command;
mod relationship_repository;
mod user_repository;

#[cfg(test)]
pub use account_command::MockAccountCommand;
pub use account_command::AccountCommand;
#[cfg(test)]
pub use anime_list_repository::MockAnimeListRepository;
pub use anime_list_repository::{AnimeListRepository, AnimeListRepositoryError};
#[cfg(test)]
pub use catalog_query::MockCatalogQuery;
pub use catalog_query::CatalogQuery;
#[cfg(test)]
pub use catalog_source::MockCatalogSource;
pub use catalog_source::{CatalogSource, CatalogSourceError, FixtureCatalogSource};
#[cfg(test)]
pub use credential_hasher::MockCredentialHasher;
pub use credential_hasher::{CredentialHasher, CredentialHasherError};
#[cfg(test)]
pub use list_tracking_command::MockListTrackingCommand;
pub use list_tracking_command::{ListTrackingCommand, UpsertEntryRequest};
#[cfg(test)]
pub use list_tracking_query::{MockListDetailsQuery, MockListTrackingQuery};
pub use list_tracking_query::{ListDetailsQuery, ListTrackingQuery};
#[cfg(test)]
pub use media_store::MockMediaStore;
pub use media_store::{MediaStore, MediaStoreError};
#[cfg(test)]
pub use notification_inbox::MockNotificationInbox;
pub use notification_inbox::NotificationInbox;
#[cfg(test)]
pub use notification_repository::MockNotificationRepository;
pub use notification_repository::{NotificationRepository, NotificationRepositoryError};
#[cfg(test)]
pub use profile_command::MockProfileCommand;
pub use profile_command::ProfileCommand;
#[cfg(test)]
pub use profile_query::MockProfileQuery;
pub use profile_query::ProfileQuery;
#[cfg(test)]
pub use relationship_command::MockRelationshipCommand;
pub use relationship_command::RelationshipCommand;
#[cfg(test)]
pub use relationship_repository::MockRelationshipRepository;
pub use relationship_repository::{
    PairCommit, RelationshipRepository, RelationshipRepositoryError,
};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};

#[cfg(test)]
mod tests;
