//! Request-level behavior of the assembled router for anonymous visitors.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;

use crm_integration_tests::{Site, body_text, get, location, post_form};

#[tokio::test]
async fn health_is_ok() {
    let site = Site::new();
    let response = site.send(get("/health", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn readiness_is_ok_with_memory_tables() {
    let site = Site::new();
    let response = site.send(get("/health/ready", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn anonymous_requests_redirect_to_login() {
    let site = Site::new();
    for uri in ["/", "/contacts/", "/deals/add/", "/activities/3/"] {
        let response = site.send(get(uri, None)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&response), "/login", "{uri}");
    }
}

#[tokio::test]
async fn anonymous_mutation_redirects_to_login() {
    let site = Site::new();
    let response = site.send(post_form("/leads/1/delete/", None, "")).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn login_page_renders() {
    let site = Site::new();
    let response = site.send(get("/login", None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("name=\"username\""));
    assert!(html.contains("name=\"password\""));
}

#[tokio::test]
async fn wrong_password_rerenders_login() {
    let site = Site::new();
    let response = site
        .send(post_form("/login", None, "username=alice&password=nope"))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Invalid username or password"));
}

#[tokio::test]
async fn logged_in_user_sees_dashboard() {
    let site = Site::new();
    let cookie = site.login("alice").await;

    let response = site.send(get("/", Some(&cookie))).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("alice"));
}

#[tokio::test]
async fn logout_redirects_to_login() {
    let site = Site::new();
    let response = site.send(post_form("/logout", None, "")).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn logout_ends_the_session() {
    let site = Site::new();
    let cookie = site.login("bob").await;

    let response = site.send(post_form("/logout", Some(&cookie), "")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = site.send(get("/leads/", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}
