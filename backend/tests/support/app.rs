//! Full-stack harness: real services over the in-memory store.
//!
//! Passwords are hashed with a fast SHA-256 hasher so flows that register
//! several users stay quick; the Argon2 adapter has its own unit tests.

use std::sync::Arc;
use std::time::Duration;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test;
use async_trait::async_trait;
use mockable::DefaultClock;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tempfile::TempDir;

use anitrack::domain::ports::{CredentialHasher, CredentialHasherError, FixtureCatalogSource};
use anitrack::domain::{
    AccountService, CatalogService, EnrichmentConfig, ListDetailsService, ListEnricher,
    ListService, NotificationService, PasswordHash, ProfileService, RelationshipService,
};
use anitrack::inbound::http::state::HttpState;
use anitrack::outbound::media::FsMediaStore;
use anitrack::outbound::memory::MemoryStore;

struct Sha256Hasher;

fn digest(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

#[async_trait]
impl CredentialHasher for Sha256Hasher {
    async fn hash(&self, password: &str) -> Result<PasswordHash, CredentialHasherError> {
        Ok(PasswordHash::new(digest(password)))
    }

    async fn verify(
        &self,
        password: &str,
        hash: &PasswordHash,
    ) -> Result<bool, CredentialHasherError> {
        Ok(digest(password) == hash.as_ref())
    }
}

/// Handler state plus handles the tests poke at directly.
pub struct Harness {
    pub state: HttpState,
    pub store: Arc<MemoryStore>,
    _media: TempDir,
}

pub fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let media_dir = TempDir::new().expect("media dir");
    let media = Arc::new(FsMediaStore::open(media_dir.path(), "/media").expect("media store"));
    let clock = Arc::new(DefaultClock);
    let profiles = Arc::new(ProfileService::new(store.clone(), store.clone(), media));
    let list = Arc::new(ListService::new(store.clone(), store.clone(), clock.clone()));
    let enrichment = EnrichmentConfig {
        max_attempts: 1,
        retry_delay: Duration::ZERO,
        item_delay: Duration::ZERO,
        channel_capacity: 4,
    };

    let state = HttpState {
        accounts: Arc::new(AccountService::new(
            store.clone(),
            store.clone(),
            Arc::new(Sha256Hasher),
            clock.clone(),
        )),
        profiles: profiles.clone(),
        profile_updates: profiles,
        relationships: Arc::new(RelationshipService::new(
            store.clone(),
            store.clone(),
            clock,
        )),
        notifications: Arc::new(NotificationService::new(store.clone(), store.clone())),
        list: list.clone(),
        list_query: list,
        list_details: Arc::new(ListDetailsService::new(
            store.clone(),
            ListEnricher::new(Arc::new(FixtureCatalogSource), enrichment),
        )),
        catalog: Arc::new(CatalogService::new(Arc::new(FixtureCatalogSource))),
    };
    Harness {
        state,
        store,
        _media: media_dir,
    }
}

pub fn session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Status, decoded JSON body (or `Null`) and any session cookie set.
pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
    pub cookie: Option<Cookie<'static>>,
}

pub async fn send<S, R, B>(app: &S, req: R) -> Reply
where
    S: Service<R, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = test::call_service(app, req).await;
    let status = res.status();
    let cookie = res
        .response()
        .cookies()
        .find(|c| c.name() == "session")
        .map(|c| c.into_owned());
    let bytes = test::read_body(res).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    Reply {
        status,
        body,
        cookie,
    }
}

/// Build the full API app over a [`Harness`].
#[macro_export]
macro_rules! init_app {
    ($harness:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($harness.state.clone()))
                .wrap(anitrack::Trace)
                .service(
                    anitrack::inbound::http::api_scope()
                        .wrap($crate::app_support::session_middleware()),
                ),
        )
        .await
    };
}
