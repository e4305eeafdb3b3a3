//! End-to-end friendship and notification flows over the in-memory store.

#[path = "support/app.rs"]
mod app_support;

use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use app_support::{harness, send};
use rstest::rstest;
use serde_json::json;

/// Register a user and return `(id, session cookie)`.
macro_rules! register {
    ($app:expr, $email:expr, $nickname:expr) => {{
        let reply = send(
            &$app,
            TestRequest::post()
                .uri("/api/auth/register")
                .set_json(json!({"email": $email, "password": "correct horse", "nickname": $nickname}))
                .to_request(),
        )
        .await;
        assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
        let id = reply.body["id"].as_str().expect("id").to_owned();
        (id, reply.cookie.expect("session cookie"))
    }};
}

macro_rules! post {
    ($app:expr, $uri:expr, $cookie:expr) => {
        send(
            &$app,
            TestRequest::post()
                .uri(&$uri)
                .cookie($cookie.clone())
                .to_request(),
        )
        .await
    };
}

macro_rules! get {
    ($app:expr, $uri:expr, $cookie:expr) => {
        send(
            &$app,
            TestRequest::get()
                .uri(&$uri)
                .cookie($cookie.clone())
                .to_request(),
        )
        .await
    };
}

#[rstest]
#[actix_web::test]
async fn request_accept_and_unfriend() {
    let harness = harness();
    let app = init_app!(harness);
    let (alice, alice_cookie) = register!(app, "alice@example.com", "Alice");
    let (bob, bob_cookie) = register!(app, "bob@example.com", "Bob");

    let reply = post!(app, format!("/api/users/{bob}/request-friend"), alice_cookie);
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(
        reply.body,
        json!({"isFriend": false, "requestSent": true, "requestReceived": false})
    );

    let inbox = get!(app, "/api/notifications".to_owned(), bob_cookie);
    let items = inbox.body.as_array().expect("array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["type"], "friend_request");
    assert_eq!(items[0]["resolution"], "pending");
    assert_eq!(items[0]["from"]["id"], alice.as_str());
    assert_eq!(items[0]["message"], "Alice wants to be your friend");

    let count = get!(app, "/api/notifications/unread-count".to_owned(), bob_cookie);
    assert_eq!(count.body, json!({"count": 1}));

    let own = get!(app, "/api/users/me".to_owned(), bob_cookie);
    assert_eq!(own.body["friendRequests"][0]["id"], alice.as_str());

    let reply = post!(app, format!("/api/users/{alice}/accept-friend"), bob_cookie);
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["isFriend"], true);

    let inbox = get!(app, "/api/notifications".to_owned(), bob_cookie);
    assert_eq!(inbox.body[0]["resolution"], "accepted");

    let profile = get!(app, format!("/api/users/{bob}"), alice_cookie);
    assert_eq!(profile.body["isFriend"], true);
    assert_eq!(profile.body["friends"][0]["id"], alice.as_str());

    let reply = send(
        &app,
        TestRequest::delete()
            .uri(&format!("/api/users/{alice}/friend"))
            .cookie(bob_cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["isFriend"], false);

    let profile = get!(app, format!("/api/users/{bob}"), alice_cookie);
    assert_eq!(profile.body["isFriend"], false);
    assert_eq!(profile.body["friends"], json!([]));
}

#[rstest]
#[actix_web::test]
async fn conflicting_requests_are_refused() {
    let harness = harness();
    let app = init_app!(harness);
    let (alice, alice_cookie) = register!(app, "alice@example.com", "Alice");
    let (bob, bob_cookie) = register!(app, "bob@example.com", "Bob");

    assert_eq!(
        post!(app, format!("/api/users/{bob}/request-friend"), alice_cookie).status,
        StatusCode::OK
    );

    let again = post!(app, format!("/api/users/{bob}/request-friend"), alice_cookie);
    assert_eq!(again.status, StatusCode::CONFLICT);
    assert_eq!(again.body["details"]["code"], "already_requested");

    let crossed = post!(app, format!("/api/users/{alice}/request-friend"), bob_cookie);
    assert_eq!(crossed.status, StatusCode::CONFLICT);
    assert_eq!(crossed.body["details"]["code"], "incoming_request_pending");

    let own = post!(app, format!("/api/users/{alice}/request-friend"), alice_cookie);
    assert_eq!(own.status, StatusCode::BAD_REQUEST);
    assert_eq!(own.body["details"]["code"], "invalid_target");

    let wrong_side = post!(app, format!("/api/users/{bob}/accept-friend"), alice_cookie);
    assert_eq!(wrong_side.status, StatusCode::NOT_FOUND);
    assert_eq!(wrong_side.body["details"]["code"], "no_such_request");
}

#[rstest]
#[actix_web::test]
async fn rejection_clears_the_request() {
    let harness = harness();
    let app = init_app!(harness);
    let (alice, alice_cookie) = register!(app, "alice@example.com", "Alice");
    let (bob, bob_cookie) = register!(app, "bob@example.com", "Bob");

    post!(app, format!("/api/users/{bob}/request-friend"), alice_cookie);
    let reply = post!(app, format!("/api/users/{alice}/reject-friend"), bob_cookie);
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(
        reply.body,
        json!({"isFriend": false, "requestSent": false, "requestReceived": false})
    );

    let inbox = get!(app, "/api/notifications".to_owned(), bob_cookie);
    assert_eq!(inbox.body[0]["resolution"], "rejected");

    let read = post!(app, "/api/notifications/read".to_owned(), bob_cookie);
    assert_eq!(read.body, json!({"updated": 1}));
    let read = post!(app, "/api/notifications/read".to_owned(), bob_cookie);
    assert_eq!(read.body, json!({"updated": 0}));

    // The request can be sent again once rejected.
    let retry = post!(app, format!("/api/users/{bob}/request-friend"), alice_cookie);
    assert_eq!(retry.status, StatusCode::OK);
}

#[rstest]
#[actix_web::test]
async fn failed_commit_leaves_no_partial_state() {
    let harness = harness();
    let app = init_app!(harness);
    let (_alice, alice_cookie) = register!(app, "alice@example.com", "Alice");
    let (bob, bob_cookie) = register!(app, "bob@example.com", "Bob");

    harness.store.fail_relationship_commits(true);
    let reply = post!(app, format!("/api/users/{bob}/request-friend"), alice_cookie);
    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(reply.body["message"], "Internal server error");

    harness.store.fail_relationship_commits(false);
    let profile = get!(app, format!("/api/users/{bob}"), alice_cookie);
    assert_eq!(profile.body["requestSent"], false);
    let inbox = get!(app, "/api/notifications".to_owned(), bob_cookie);
    assert_eq!(inbox.body, json!([]));
}

#[rstest]
#[actix_web::test]
async fn duplicate_registration_conflicts_and_login_round_trips() {
    let harness = harness();
    let app = init_app!(harness);
    let (id, _) = register!(app, "alice@example.com", "Alice");

    let duplicate = send(
        &app,
        TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({"email": "ALICE@example.com", "password": "another one"}))
            .to_request(),
    )
    .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let wrong = send(
        &app,
        TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({"email": "alice@example.com", "password": "wrong horse"}))
            .to_request(),
    )
    .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);

    let login = send(
        &app,
        TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({"email": "alice@example.com", "password": "correct horse"}))
            .to_request(),
    )
    .await;
    assert_eq!(login.status, StatusCode::OK);
    let cookie = login.cookie.expect("session cookie");
    let me = get!(app, "/api/users/me".to_owned(), cookie);
    assert_eq!(me.body["id"], id.as_str());
}

#[rstest]
#[actix_web::test]
async fn responses_carry_a_trace_id() {
    let harness = harness();
    let app = init_app!(harness);
    let res = actix_web::test::call_service(
        &app,
        TestRequest::get().uri("/api/users/me").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.headers().contains_key("trace-id"));
}

#[rstest]
#[actix_web::test]
async fn avatar_form_upload_updates_the_profile() {
    let harness = harness();
    let app = init_app!(harness);
    let (id, cookie) = register!(app, "rin@example.com", "Rin");

    let mut body = b"--edge\r\nContent-Disposition: form-data; name=\"avatar\"; filename=\"rin.png\"\r\nContent-Type: image/png\r\n\r\n".to_vec();
    body.extend_from_slice(&[0x89, b'P', b'N', b'G']);
    body.extend_from_slice(b"\r\n--edge--\r\n");
    let reply = send(
        &app,
        TestRequest::post()
            .uri("/api/users/me/avatar")
            .cookie(cookie.clone())
            .insert_header(("content-type", "multipart/form-data; boundary=edge"))
            .set_payload(body)
            .to_request(),
    )
    .await;

    assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
    assert_eq!(reply.body["avatarUrl"], format!("/media/{id}-avatar.png"));
    let me = get!(app, "/api/users/me".to_owned(), cookie);
    assert_eq!(me.body["avatarUrl"], reply.body["avatarUrl"]);
}
