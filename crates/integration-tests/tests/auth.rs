//! Token issuance, refresh and role checks.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`stockroom migrate`)
//! - The API server running (`cargo run -p stockroom-api`)
//! - An admin created with the CLI and its password in
//!   `STOCKROOM_TEST_ADMIN_PASSWORD`

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use stockroom_integration_tests::{Session, base_url, unique};

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_health_endpoints() {
    let client = Client::new();

    let resp = client
        .get(format!("{}/health", base_url()))
        .send()
        .await
        .expect("Failed to call health");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.expect("Failed to read body"), "ok");

    let resp = client
        .get(format!("{}/health/ready", base_url()))
        .send()
        .await
        .expect("Failed to call readiness");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_login_returns_token_pair() {
    let admin = Session::admin().await.expect("Failed to log in as admin");

    assert!(!admin.access.is_empty());
    assert!(!admin.refresh.is_empty());
    assert_ne!(admin.access, admin.refresh);
    assert!(!admin.employee_id.is_empty());
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_wrong_password_is_unauthorized() {
    let resp = Client::new()
        .post(format!("{}/api/token", base_url()))
        .json(&json!({ "username": unique("nobody"), "password": "not-the-password" }))
        .send()
        .await
        .expect("Failed to call token endpoint");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.expect("Failed to parse error");
    assert!(body["error"].is_string());
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_refresh_issues_new_access_token() {
    let admin = Session::admin().await.expect("Failed to log in as admin");
    let client = Client::new();

    let resp = client
        .post(format!("{}/api/token/refresh", base_url()))
        .json(&json!({ "refresh": admin.refresh }))
        .send()
        .await
        .expect("Failed to refresh");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse refresh");
    assert!(body["access"].as_str().is_some_and(|s| !s.is_empty()));

    // An access token is not a refresh token
    let resp = client
        .post(format!("{}/api/token/refresh", base_url()))
        .json(&json!({ "refresh": admin.access }))
        .send()
        .await
        .expect("Failed to refresh");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_requests_without_token_are_rejected() {
    let resp = Client::new()
        .get(format!("{}/api/products", base_url()))
        .send()
        .await
        .expect("Failed to list products");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_employee_cannot_use_admin_routes() {
    let admin = Session::admin().await.expect("Failed to log in as admin");
    let clerk = admin.new_employee().await.expect("Failed to create employee");

    let resp = clerk
        .post("/sales/archive")
        .send()
        .await
        .expect("Failed to call archive");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = clerk
        .get("/login-activity")
        .send()
        .await
        .expect("Failed to call login activity");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_create_employee_validation() {
    let admin = Session::admin().await.expect("Failed to log in as admin");
    let username = unique("clerk");

    let bad_contact = json!({
        "name": "Bad Contact",
        "username": username,
        "email": format!("{username}@example.com"),
        "password": "long-enough-password",
        "contact": "12ab",
    });
    let resp = admin
        .post("/employees")
        .json(&bad_contact)
        .send()
        .await
        .expect("Failed to create employee");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let short_password = json!({
        "name": "Short Password",
        "username": username,
        "email": format!("{username}@example.com"),
        "password": "short",
        "contact": "912345678",
    });
    let resp = admin
        .post("/employees")
        .json(&short_password)
        .send()
        .await
        .expect("Failed to create employee");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_duplicate_username_conflicts() {
    let admin = Session::admin().await.expect("Failed to log in as admin");
    let username = unique("clerk");
    let employee = |email: &str| {
        json!({
            "name": "Twin",
            "username": username,
            "email": email,
            "password": "long-enough-password",
            "contact": "912345678",
        })
    };

    let resp = admin
        .post("/employees")
        .json(&employee(&format!("{username}-a@example.com")))
        .send()
        .await
        .expect("Failed to create employee");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = admin
        .post("/employees")
        .json(&employee(&format!("{username}-b@example.com")))
        .send()
        .await
        .expect("Failed to create employee");
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_login_activity_records_attempts() {
    let admin = Session::admin().await.expect("Failed to log in as admin");

    let resp = admin
        .get("/login-activity?limit=5")
        .send()
        .await
        .expect("Failed to list login activity");
    assert_eq!(resp.status(), StatusCode::OK);

    let rows: Vec<Value> = resp.json().await.expect("Failed to parse activity");
    assert!(!rows.is_empty());
    assert!(rows.len() <= 5);
}
