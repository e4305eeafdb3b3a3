//! HTTP inbound adapter exposing the REST API.
//!
//! [`api_scope`] mounts every `/api` route with the extractor configuration
//! that turns malformed bodies, queries and paths into domain errors. The
//! server wraps it with the session layer; health probes live outside it.

use actix_web::{Scope, web};

pub mod auth;
pub mod catalog;
pub mod error;
pub mod health;
pub mod list;
pub mod notifications;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;

/// JSON bodies above this size are refused with `payload_too_large`.
pub const JSON_BODY_LIMIT: usize = 64 * 1024;

/// Every `/api` route.
///
/// `/users/me` routes are registered ahead of `/users/{id}` so `me` is never
/// parsed as an id.
pub fn api_scope() -> Scope {
    web::scope("/api")
        .app_data(
            web::JsonConfig::default()
                .limit(JSON_BODY_LIMIT)
                .error_handler(error::json_error_handler),
        )
        .app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
        .app_data(web::PathConfig::default().error_handler(error::path_error_handler))
        .service(auth::register)
        .service(auth::login)
        .service(auth::logout)
        .service(users::current_user)
        .service(users::update_profile)
        .service(users::upload_avatar)
        .service(users::upload_cover)
        .service(users::public_profile)
        .service(users::stats)
        .service(users::recent)
        .service(users::detailed_stats)
        .service(users::activity)
        .service(users::request_friend)
        .service(users::accept_friend)
        .service(users::reject_friend)
        .service(users::remove_friend)
        .service(notifications::list_notifications)
        .service(notifications::mark_read)
        .service(notifications::unread_count)
        .service(list::get_list)
        .service(list::list_details)
        .service(list::upsert_entry)
        .service(list::remove_entry)
        .service(list::log_episode)
        .service(catalog::title_details)
        .service(catalog::player)
}
