//! Assemble domain services over the configured adapters.
//!
//! With a database URL the Diesel repositories back every port; without one
//! a single [`MemoryStore`] does, which suits local runs and demos.

use std::io;
use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use anitrack::domain::ports::{
    AnimeListRepository, CatalogSource, NotificationRepository, RelationshipRepository,
    UserRepository,
};
use anitrack::domain::{
    AccountService, CatalogService, EnrichmentConfig, ListDetailsService, ListEnricher,
    ListService, NotificationService, ProfileService, RelationshipService,
};
use anitrack::inbound::http::state::HttpState;
use anitrack::outbound::catalog::{CatalogEndpoints, CatalogHttpSource};
use anitrack::outbound::credentials::Argon2Hasher;
use anitrack::outbound::media::FsMediaStore;
use anitrack::outbound::memory::MemoryStore;
use anitrack::outbound::persistence::{
    DbPool, DieselAnimeListRepository, DieselNotificationRepository,
    DieselRelationshipRepository, DieselUserRepository, PoolConfig, run_pending_migrations,
};
use anitrack::settings::AppSettings;

/// Adapters shared by every service regardless of the store.
struct SharedAdapters {
    media: Arc<FsMediaStore>,
    hasher: Arc<Argon2Hasher>,
    catalog: Arc<CatalogHttpSource>,
    clock: Arc<dyn Clock>,
}

fn invalid_setting(error: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, error.to_string())
}

fn shared_adapters(settings: &AppSettings) -> io::Result<SharedAdapters> {
    let media_dir = settings.media_dir();
    let media = FsMediaStore::open(&media_dir, settings.media_base_url())?;
    info!(path = %media_dir.display(), "media directory ready");

    let endpoints = CatalogEndpoints {
        catalog_base: settings.catalog_base_url().map_err(invalid_setting)?,
        player_search: settings.player_base_url().map_err(invalid_setting)?,
    };
    if endpoints.player_search.is_none() {
        warn!("no player search endpoint configured; player lookups return 404");
    }
    let catalog = CatalogHttpSource::new(endpoints, settings.catalog_timeout())
        .map_err(|error| io::Error::other(format!("catalog client: {error}")))?;

    Ok(SharedAdapters {
        media: Arc::new(media),
        hasher: Arc::new(Argon2Hasher),
        catalog: Arc::new(catalog),
        clock: Arc::new(DefaultClock),
    })
}

fn assemble<U, R, N, L>(
    users: Arc<U>,
    relationships: Arc<R>,
    notifications: Arc<N>,
    lists: Arc<L>,
    shared: SharedAdapters,
) -> HttpState
where
    U: UserRepository + 'static,
    R: RelationshipRepository + 'static,
    N: NotificationRepository + 'static,
    L: AnimeListRepository + 'static,
{
    let catalog_source: Arc<dyn CatalogSource> = shared.catalog.clone();
    let profiles = Arc::new(ProfileService::new(
        users.clone(),
        relationships.clone(),
        shared.media,
    ));
    let list = Arc::new(ListService::new(
        lists.clone(),
        users.clone(),
        shared.clock.clone(),
    ));
    HttpState {
        accounts: Arc::new(AccountService::new(
            users.clone(),
            relationships.clone(),
            shared.hasher,
            shared.clock.clone(),
        )),
        profiles: profiles.clone(),
        profile_updates: profiles,
        relationships: Arc::new(RelationshipService::new(
            relationships,
            users.clone(),
            shared.clock,
        )),
        notifications: Arc::new(NotificationService::new(notifications, users)),
        list: list.clone(),
        list_query: list,
        list_details: Arc::new(ListDetailsService::new(
            lists,
            ListEnricher::new(catalog_source, EnrichmentConfig::default()),
        )),
        catalog: Arc::new(CatalogService::new(shared.catalog)),
    }
}

/// Build handler state from settings, migrating the database first when
/// configured to.
///
/// # Errors
///
/// Fails on invalid settings, an unusable media directory, migration errors
/// or an unreachable database.
pub async fn build_http_state(settings: &AppSettings) -> io::Result<HttpState> {
    let shared = shared_adapters(settings)?;
    let Some(database_url) = settings.database_url.as_deref() else {
        warn!("ANITRACK_DATABASE_URL unset; using the in-memory store");
        let store = Arc::new(MemoryStore::new());
        return Ok(assemble(
            store.clone(),
            store.clone(),
            store.clone(),
            store,
            shared,
        ));
    };

    if settings.run_migrations() {
        run_pending_migrations(database_url)
            .await
            .map_err(io::Error::other)?;
    }
    let pool = DbPool::new(
        PoolConfig::new(database_url).with_max_size(settings.db_max_connections()),
    )
    .await
    .map_err(io::Error::other)?;
    info!(max_connections = settings.db_max_connections(), "database pool ready");

    Ok(assemble(
        Arc::new(DieselUserRepository::new(pool.clone())),
        Arc::new(DieselRelationshipRepository::new(pool.clone())),
        Arc::new(DieselNotificationRepository::new(pool.clone())),
        Arc::new(DieselAnimeListRepository::new(pool)),
        shared,
    ))
}
