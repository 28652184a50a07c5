//! Access gate, identity endpoints and error bodies

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::net::SocketAddr;

use tests::http::{get, post, post_from, put, register, TestApp};

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let (status, body) = get(&app.router, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "message": "Server is running"}));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = TestApp::new();
    let (status, _) = get(&app.router, "/api/nowhere", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_register_login_and_profile() {
    let app = TestApp::new();
    let (status, body) = post(
        &app.router,
        "/api/auth/register",
        None,
        json!({"email": "Eva@Example.com", "password": "secret1", "firstName": "Eva", "lastName": "Lund"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User registered successfully");
    assert_eq!(body["user"]["email"], "eva@example.com");
    assert_eq!(body["user"]["role"], "guest");
    assert!(body["user"]["password"].is_null());

    let (status, body) = post(
        &app.router,
        "/api/auth/login",
        None,
        json!({"email": "eva@example.com", "password": "secret1"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("message").is_none());
    let token = body["token"].as_str().unwrap().to_string();

    let (status, profile) = get(&app.router, "/api/users/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["firstName"], "Eva");
    assert_eq!(profile["lastName"], "Lund");
    assert!(profile["createdAt"].is_string());

    let (status, body) = put(
        &app.router,
        "/api/users/profile",
        Some(&token),
        json!({"lastName": "Berg"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Profile updated successfully");
    assert_eq!(body["user"]["lastName"], "Berg");
    assert_eq!(body["user"]["firstName"], "Eva");
}

#[tokio::test]
async fn test_registration_errors() {
    let app = TestApp::new();
    register(&app.router, "dup@example.com", "secret1").await;

    let (status, body) = post(
        &app.router,
        "/api/auth/register",
        None,
        json!({"email": "dup@example.com", "password": "secret1"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Email is already registered"}));

    let (status, body) = post(
        &app.router,
        "/api/auth/register",
        None,
        json!({"email": "short@example.com", "password": "123"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    // Missing required field is a 400 with an error body, not a 422
    let (status, body) = post(&app.router, "/api/auth/register", None, json!({"email": "x@y.z"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_bad_login_is_unauthorized() {
    let app = TestApp::new();
    register(&app.router, "user@example.com", "secret1").await;

    let (status, body) = post(
        &app.router,
        "/api/auth/login",
        None,
        json!({"email": "user@example.com", "password": "wrong!!"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"error": "Invalid email or password"}));
}

#[tokio::test]
async fn test_protected_routes_require_a_valid_token() {
    let app = TestApp::new();
    let (_, token) = register(&app.router, "user@example.com", "secret1").await;

    let (status, body) = get(&app.router, "/api/bookings/my-bookings", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"error": "Access token required"}));

    let (status, body) = get(&app.router, "/api/bookings/my-bookings", Some("garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    // Flip one character of the signature
    let mut tampered = token.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == 'A' { 'B' } else { 'A' });
    let (status, _) = get(&app.router, "/api/users/profile", Some(&tampered)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = get(&app.router, "/api/bookings/my-bookings", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let app = TestApp::with_ttl(-60);
    let (_, token) = register(&app.router, "user@example.com", "secret1").await;

    let (status, body) = get(&app.router, "/api/users/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"error": "Invalid or expired token"}));
}

#[tokio::test]
async fn test_change_password_revokes_existing_tokens() {
    let app = TestApp::new();
    let (_, token) = register(&app.router, "user@example.com", "secret1").await;

    let (status, body) = put(
        &app.router,
        "/api/users/change-password",
        Some(&token),
        json!({"currentPassword": "not-it", "newPassword": "secret2"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Current password is incorrect"}));

    let (status, body) = put(
        &app.router,
        "/api/users/change-password",
        Some(&token),
        json!({"currentPassword": "secret1", "newPassword": "secret2"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Password updated successfully"}));

    let (status, body) = get(&app.router, "/api/users/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"error": "Token has been revoked"}));

    let (status, _) = post(
        &app.router,
        "/api/auth/login",
        None,
        json!({"email": "user@example.com", "password": "secret2"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_is_rate_limited() {
    let app = TestApp::new();
    let attempt = json!({"email": "nobody@example.com", "password": "whatever"});

    for _ in 0..20 {
        let (status, _) = post(&app.router, "/api/auth/login", None, attempt.clone()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    let (status, body) = post(&app.router, "/api/auth/login", None, attempt).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(body["error"].is_string());

    // Other routes are unaffected
    let (status, _) = get(&app.router, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_rate_limit_is_per_client() {
    let app = TestApp::new();
    let attempt = json!({"email": "nobody@example.com", "password": "whatever"});
    let noisy: SocketAddr = "203.0.113.7:40000".parse().unwrap();
    let quiet: SocketAddr = "198.51.100.9:40001".parse().unwrap();

    for _ in 0..20 {
        let (status, _) = post_from(&app.router, noisy, "/api/auth/login", attempt.clone()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
    let (status, _) = post_from(&app.router, noisy, "/api/auth/login", attempt.clone()).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    // A different peer still gets through
    let (status, _) = post_from(&app.router, quiet, "/api/auth/login", attempt).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registrations_create_one_account() {
    let app = TestApp::new();

    let attempts: Vec<_> = (0..8)
        .map(|i| {
            let router = app.router.clone();
            tokio::spawn(async move {
                post(
                    &router,
                    "/api/auth/register",
                    None,
                    json!({
                        "email": "same@example.com",
                        "password": format!("secret{}", i),
                        "firstName": "Same",
                        "lastName": "Person",
                    }),
                )
                .await
            })
        })
        .collect();

    let mut created = 0;
    for attempt in futures::future::join_all(attempts).await {
        let (status, body) = attempt.unwrap();
        match status {
            StatusCode::CREATED => created += 1,
            StatusCode::BAD_REQUEST => {
                assert_eq!(body, json!({"error": "Email is already registered"}))
            }
            other => panic!("unexpected status {}: {}", other, body),
        }
    }
    assert_eq!(created, 1);

    let db = app.db.lock().await;
    let (users, credentials): (i64, i64) = db
        .connection()
        .query_row(
            "SELECT (SELECT COUNT(*) FROM users), (SELECT COUNT(*) FROM password_credentials)",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!((users, credentials), (1, 1));
}
