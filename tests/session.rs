mod common;

use axum::{
    body::Body,
    extract::Request,
    http::{header, StatusCode},
};
use chrono::Duration;
use common::*;
use forwarding_gateway::core::SessionCodec;
use serde_json::json;

fn login_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// `name=value` part of a Set-Cookie header
fn cookie_pair(set_cookie: &str) -> &str {
    set_cookie.split(';').next().unwrap()
}

#[tokio::test]
async fn test_login_issues_decodable_cookie() {
    let (stub, app) = setup().await;
    stub.reply_with(Reply::json(
        StatusCode::OK,
        json!({ "success": true, "data": { "access_token": "backend-token", "expires_in": 600 } }),
    ));

    let (status, headers, body) =
        send(&app, login_request(r#"{"email":"a@b.c","password":"pw"}"#)).await;
    assert_eq!(status, StatusCode::OK);

    let seen = stub.last();
    assert_eq!(seen.path, "/api/v1/auth/login");
    assert_eq!(&seen.body[..], br#"{"email":"a@b.c","password":"pw"}"#);
    assert!(seen.headers.get(header::AUTHORIZATION).is_none());

    let set_cookie = headers[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(set_cookie.contains("Max-Age=600"));
    assert!(!set_cookie.contains("Secure"));

    let token = cookie_pair(set_cookie).strip_prefix("admin_session=").unwrap();
    let payload = SessionCodec::new(Some(SECRET)).decode(token).unwrap();
    assert_eq!(payload.access_token, "backend-token");

    let body = json_body(&body);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["expires_at"], payload.expires_at);
    assert!(!body.to_string().contains("backend-token"));

    // the issued cookie authenticates admin routes
    stub.reply_with(Reply::json(StatusCode::OK, json!({ "success": true })));
    let (status, _, _) = send(
        &app,
        Request::builder()
            .uri("/api/admin/organizations/o1/segments")
            .header(header::COOKIE, cookie_pair(set_cookie))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stub.last().headers[header::AUTHORIZATION], "Bearer backend-token");
}

#[tokio::test]
async fn test_login_ttl_is_capped_by_config() {
    let (stub, url) = spawn_backend().await;
    let mut config = config_for(&url);
    config.session_ttl_secs = 120;
    config.secure_cookies = true;
    let app = gateway(config);

    stub.reply_with(Reply::json(
        StatusCode::OK,
        json!({ "access_token": "backend-token", "expires_in": 86400 }),
    ));
    let (status, headers, _) = send(&app, login_request("{}")).await;

    assert_eq!(status, StatusCode::OK);
    let set_cookie = headers[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.contains("Max-Age=120"));
    assert!(set_cookie.ends_with("; Secure"));
}

#[tokio::test]
async fn test_failed_login_is_relayed_without_cookie() {
    let (stub, app) = setup().await;
    stub.reply_with(Reply::json(
        StatusCode::UNAUTHORIZED,
        json!({ "success": false, "error": "Invalid credentials" }),
    ));

    let (status, headers, body) = send(&app, login_request(r#"{"password":"nope"}"#)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(headers.get(header::SET_COOKIE).is_none());
    assert_eq!(json_body(&body)["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_login_without_token_is_502() {
    let (stub, app) = setup().await;
    stub.reply_with(Reply::json(StatusCode::OK, json!({ "success": true, "data": {} })));

    let (status, headers, _) = send(&app, login_request("{}")).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(headers.get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_login_without_secret_is_503() {
    let (stub, url) = spawn_backend().await;
    let mut config = config_for(&url);
    config.session_secret = None;
    let app = gateway(config);

    let (status, _, _) = send(&app, login_request("{}")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let (stub, app) = setup().await;

    let (status, headers, body) = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/api/auth/logout")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers[header::SET_COOKIE],
        "admin_session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"
    );
    assert_eq!(json_body(&body), json!({ "success": true, "data": null }));
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn test_session_status() {
    let (stub, app) = setup().await;

    let (_, _, body) = send(
        &app,
        Request::builder()
            .uri("/api/auth/session")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(
        json_body(&body),
        json!({ "success": true, "data": { "authenticated": false } })
    );

    let (_, _, body) = send(
        &app,
        Request::builder()
            .uri("/api/auth/session")
            .header(header::COOKIE, session_cookie("backend-token", Duration::hours(1)))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    let body = json_body(&body);
    assert_eq!(body["data"]["authenticated"], true);
    assert!(body["data"]["expires_at"].is_i64());

    let (_, _, body) = send(
        &app,
        Request::builder()
            .uri("/api/auth/session")
            .header(header::COOKIE, session_cookie("backend-token", Duration::seconds(-1)))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(json_body(&body)["data"]["authenticated"], false);
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn test_healthz() {
    let (_, app) = setup().await;
    let (status, _, body) = send(
        &app,
        Request::builder().uri("/healthz").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..], b"ok");
}
