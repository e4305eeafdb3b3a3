//! Liveness and readiness probes.

use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use serde_json::json;

/// Probe flags flipped by the server lifecycle.
#[derive(Debug)]
pub struct HealthState {
    ready: AtomicBool,
    live: AtomicBool,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
        }
    }
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start accepting traffic.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Report the process as draining so orchestrators stop routing to it.
    pub fn mark_draining(&self) {
        self.ready.store(false, Ordering::Release);
        self.live.store(false, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }
}

fn probe(ok: bool) -> HttpResponse {
    let mut builder = if ok {
        HttpResponse::Ok()
    } else {
        HttpResponse::ServiceUnavailable()
    };
    builder
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .json(json!({ "status": if ok { "ok" } else { "unavailable" } }))
}

/// Readiness probe: 200 once startup finished, 503 before or while draining.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Ready for traffic"),
        (status = 503, description = "Not ready")
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    probe(state.is_ready())
}

/// Liveness probe: 200 until shutdown starts.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Process is alive"),
        (status = 503, description = "Shutting down")
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    probe(state.is_alive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use rstest::rstest;

    async fn statuses(state: web::Data<HealthState>) -> (StatusCode, StatusCode) {
        let app = test::init_service(App::new().app_data(state).service(ready).service(live)).await;
        let ready_res =
            test::call_service(&app, test::TestRequest::get().uri("/health/ready").to_request())
                .await;
        let live_res =
            test::call_service(&app, test::TestRequest::get().uri("/health/live").to_request())
                .await;
        (ready_res.status(), live_res.status())
    }

    #[rstest]
    #[actix_web::test]
    async fn starts_alive_but_not_ready() {
        let state = web::Data::new(HealthState::new());
        assert_eq!(
            statuses(state).await,
            (StatusCode::SERVICE_UNAVAILABLE, StatusCode::OK)
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn ready_after_startup_and_down_when_draining() {
        let state = web::Data::new(HealthState::new());
        state.mark_ready();
        assert_eq!(statuses(state.clone()).await, (StatusCode::OK, StatusCode::OK));

        state.mark_draining();
        assert_eq!(
            statuses(state).await,
            (StatusCode::SERVICE_UNAVAILABLE, StatusCode::SERVICE_UNAVAILABLE)
        );
    }
}
