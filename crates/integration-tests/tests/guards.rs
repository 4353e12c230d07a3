//! Integration tests for sign-in, sign-out and route guards.

use serde_json::json;

use pageturn_integration_tests::{FakeBackend, TestApp, location, set_cookie};

const PASSWORD: &str = "correct horse battery";

async fn app_with_accounts() -> TestApp {
    let backend = FakeBackend::start().await;
    backend.add_account(
        "reader@example.com",
        PASSWORD,
        Some(json!({"display_name": "Rea", "role": "member", "is_admin": false})),
    );
    backend.add_account(
        "mod@example.com",
        PASSWORD,
        Some(json!({"display_name": "Mo", "role": "moderator", "is_admin": false})),
    );
    backend.add_account(
        "owner@example.com",
        PASSWORD,
        Some(json!({"display_name": null, "role": "member", "is_admin": true})),
    );
    backend.add_account("noprofile@example.com", PASSWORD, None);
    TestApp::spawn(backend, Vec::new()).await
}

// =============================================================================
// Signed-in guard
// =============================================================================

#[tokio::test]
async fn test_anonymous_settings_redirects_to_login_with_origin() {
    let app = app_with_accounts().await;

    let response = app.get("/settings?tab=security").await;
    assert_eq!(response.status(), 303);
    assert_eq!(
        location(&response),
        "/auth/login?from=%2Fsettings%3Ftab%3Dsecurity"
    );
}

#[tokio::test]
async fn test_login_returns_to_origin() {
    let app = app_with_accounts().await;

    let response = app
        .login("reader@example.com", PASSWORD, Some("/settings?tab=security"))
        .await;
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/settings?tab=security");

    let response = app.get("/settings?tab=security").await;
    assert_eq!(response.status(), 200);
    let html = response.text().await.expect("Failed to read body");
    assert!(html.contains(r#"id="security""#));
}

#[tokio::test]
async fn test_login_without_origin_goes_home() {
    let app = app_with_accounts().await;

    let response = app.login("reader@example.com", PASSWORD, None).await;
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_login_rejects_offsite_origin() {
    let app = app_with_accounts().await;

    let response = app
        .login("reader@example.com", PASSWORD, Some("//evil.example/steal"))
        .await;
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_bad_credentials_return_to_login_with_error() {
    let app = app_with_accounts().await;

    let response = app
        .login("reader@example.com", "wrong", Some("/settings"))
        .await;
    assert_eq!(response.status(), 303);
    let target = location(&response);
    assert!(target.starts_with("/auth/login?"), "got {target}");
    assert!(target.contains("error=credentials"), "got {target}");

    let response = app.get("/settings").await;
    assert_eq!(response.status(), 303);
}

#[tokio::test]
async fn test_login_page_redirects_signed_in_user() {
    let app = app_with_accounts().await;
    app.login("reader@example.com", PASSWORD, None).await;

    let response = app.get("/auth/login").await;
    assert_eq!(response.status(), 303);
}

#[tokio::test]
async fn test_user_without_profile_is_member() {
    let app = app_with_accounts().await;
    app.login("noprofile@example.com", PASSWORD, None).await;

    let response = app.get("/settings").await;
    assert_eq!(response.status(), 200);
    let html = response.text().await.expect("Failed to read body");
    assert!(html.contains("member"));

    let response = app.get("/dashboard").await;
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/");
}

// =============================================================================
// Staff guard
// =============================================================================

#[tokio::test]
async fn test_anonymous_dashboard_redirects_to_login() {
    let app = app_with_accounts().await;

    let response = app.get("/dashboard").await;
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/auth/login?from=%2Fdashboard");
}

#[tokio::test]
async fn test_member_dashboard_redirects_home() {
    let app = app_with_accounts().await;
    app.login("reader@example.com", PASSWORD, None).await;

    let response = app.get("/dashboard").await;
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_moderator_sees_dashboard() {
    let app = app_with_accounts().await;
    app.login("mod@example.com", PASSWORD, None).await;

    let response = app.get("/dashboard").await;
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_admin_flag_sees_dashboard() {
    let app = app_with_accounts().await;
    app.login("owner@example.com", PASSWORD, None).await;

    let response = app.get("/dashboard").await;
    assert_eq!(response.status(), 200);
    let html = response.text().await.expect("Failed to read body");
    assert!(html.contains("admin"));
}

// =============================================================================
// Sign-out
// =============================================================================

#[tokio::test]
async fn test_logout_clears_session() {
    let app = app_with_accounts().await;
    app.login("reader@example.com", PASSWORD, None).await;
    assert_eq!(app.get("/settings").await.status(), 200);

    let response = app.post_form("/auth/logout", &[]).await;
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/");
    assert_eq!(app.backend.sign_outs(), 1);

    let response = app.get("/settings").await;
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/auth/login?from=%2Fsettings");
}

// =============================================================================
// Cookie signing
// =============================================================================

async fn settings_with_cookie(app: &TestApp, cookie: &str) -> reqwest::StatusCode {
    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client");

    client
        .get(format!("{}/settings", app.base_url))
        .header("cookie", cookie)
        .send()
        .await
        .expect("Request failed")
        .status()
}

#[tokio::test]
async fn test_tampered_session_cookie_is_rejected() {
    let app = app_with_accounts().await;
    let response = app.login("reader@example.com", PASSWORD, None).await;
    let cookie = set_cookie(&response).expect("Login should set the session cookie");
    assert!(cookie.starts_with("pageturn_session="));

    assert_eq!(settings_with_cookie(&app, &cookie).await, 200);

    let (name, value) = cookie.split_once('=').expect("Malformed cookie");
    let mut tampered: Vec<char> = value.chars().collect();
    let last = tampered.len() - 1;
    tampered[last] = if tampered[last] == 'A' { 'B' } else { 'A' };
    let tampered: String = tampered.into_iter().collect();

    assert_eq!(
        settings_with_cookie(&app, &format!("{name}={tampered}")).await,
        303
    );
}
