//! Helpers for handler tests: a test session layer and a state made of mocks.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;

use crate::domain::ports::{
    MockAccountCommand, MockCatalogQuery, MockListDetailsQuery, MockListTrackingCommand,
    MockListTrackingQuery, MockNotificationInbox, MockProfileCommand, MockProfileQuery,
    MockRelationshipCommand,
};
use crate::inbound::http::state::HttpState;

/// Cookie session layer with a throwaway key and the `Secure` flag off.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// One mock per driving port; set expectations, then call [`Self::into_state`].
#[derive(Default)]
pub struct MockPorts {
    pub accounts: MockAccountCommand,
    pub profiles: MockProfileQuery,
    pub profile_updates: MockProfileCommand,
    pub relationships: MockRelationshipCommand,
    pub notifications: MockNotificationInbox,
    pub list: MockListTrackingCommand,
    pub list_query: MockListTrackingQuery,
    pub list_details: MockListDetailsQuery,
    pub catalog: MockCatalogQuery,
}

impl MockPorts {
    pub fn into_state(self) -> HttpState {
        HttpState {
            accounts: Arc::new(self.accounts),
            profiles: Arc::new(self.profiles),
            profile_updates: Arc::new(self.profile_updates),
            relationships: Arc::new(self.relationships),
            notifications: Arc::new(self.notifications),
            list: Arc::new(self.list),
            list_query: Arc::new(self.list_query),
            list_details: Arc::new(self.list_details),
            catalog: Arc::new(self.catalog),
        }
    }
}

/// The `session` cookie set by `res`, if any.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(|cookie| cookie.into_owned())
}

/// Build an app with the mock state, a test session and the full API scope.
macro_rules! mock_app {
    ($ports:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($ports.into_state()))
                .wrap($crate::inbound::http::test_utils::test_session_middleware())
                .route(
                    "/test/login/{id}",
                    actix_web::web::post().to(
                        |session: $crate::inbound::http::session::SessionContext,
                         path: actix_web::web::Path<String>| async move {
                            let id = $crate::domain::UserId::new(path.into_inner())
                                .expect("test user id");
                            session.sign_in(&id)?;
                            Ok::<_, $crate::domain::Error>(actix_web::HttpResponse::NoContent())
                        },
                    ),
                )
                .service($crate::inbound::http::api_scope()),
        )
        .await
    };
}
pub(crate) use mock_app;

/// Sign `user` in through the test-only route and return the session cookie.
macro_rules! login_as {
    ($app:expr, $user:expr) => {{
        let res = actix_web::test::call_service(
            &$app,
            actix_web::test::TestRequest::post()
                .uri(&format!("/test/login/{}", $user))
                .to_request(),
        )
        .await;
        $crate::inbound::http::test_utils::session_cookie(&res).expect("session cookie")
    }};
}
pub(crate) use login_as;
