//! Shared fixtures for the CRM integration tests.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p crm-integration-tests
//! ```
//!
//! Service-level tests run against [`MemoryStore`] and [`RecordingMailer`],
//! so they need neither `PostgreSQL` nor an SMTP server. Request-level tests
//! drive the full axum application through [`Site`], which serves the same
//! in-memory tables behind a logged-in session.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use secrecy::SecretString;
use tower::ServiceExt;

use crm_core::{ActivityType, CompanyId, DealStage, Email, LeadStatus};
use crm_web::config::{CrmConfig, EmailConfig};
use crm_web::db::Stores;
use crm_web::db::memory::MemoryStore;
use crm_web::middleware::create_session_layer;
use crm_web::models::{
    ActivityInput, CompanyInput, ContactInput, CurrentUser, DealInput, LeadInput,
};
use crm_web::services::auth::hash_password;
use crm_web::state::AppState;

pub use crm_web::services::email::RecordingMailer;

/// A store with two regular users and one administrator.
pub struct World {
    pub store: MemoryStore,
    pub alice: CurrentUser,
    pub bob: CurrentUser,
    pub admin: CurrentUser,
}

impl World {
    /// Alice has an email address; Bob does not.
    #[must_use]
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let alice = store
            .add_user("alice", Some(Email::parse("alice@example.com").unwrap()), "x", false)
            .unwrap();
        let bob = store.add_user("bob", None, "x", false).unwrap();
        let admin = store
            .add_user("root", Some(Email::parse("root@example.com").unwrap()), "x", true)
            .unwrap();

        Self {
            store,
            alice: CurrentUser::from(&alice),
            bob: CurrentUser::from(&bob),
            admin: CurrentUser::from(&admin),
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[must_use]
pub fn company(name: &str) -> CompanyInput {
    CompanyInput {
        name: name.to_string(),
        industry: None,
        website: None,
        phone: None,
        address: None,
    }
}

#[must_use]
pub fn contact(first_name: &str, company_id: Option<CompanyId>) -> ContactInput {
    ContactInput {
        first_name: first_name.to_string(),
        last_name: None,
        email: None,
        phone: None,
        position: None,
        company_id,
    }
}

#[must_use]
pub fn lead(name: &str) -> LeadInput {
    LeadInput {
        name: name.to_string(),
        email: None,
        phone: None,
        source: None,
        status: LeadStatus::New,
        notes: None,
    }
}

/// A deal of `dollars` whole dollars.
#[must_use]
pub fn deal(title: &str, dollars: i64, stage: DealStage) -> DealInput {
    DealInput {
        title: title.to_string(),
        amount: Decimal::new(dollars, 0),
        stage,
        company_id: None,
        close_date: None,
    }
}

#[must_use]
pub fn activity(title: &str, activity_type: ActivityType, due_date: DateTime<Utc>) -> ActivityInput {
    ActivityInput {
        title: title.to_string(),
        activity_type,
        description: None,
        due_date,
    }
}

// =============================================================================
// Router fixtures
// =============================================================================

/// Password shared by every [`Site`] account.
pub const PASSWORD: &str = "correct-horse-battery-staple";

/// Configuration for a local, plain-HTTP test server.
#[must_use]
pub fn test_config() -> CrmConfig {
    CrmConfig {
        database_url: SecretString::from("postgres://localhost/crm_test"),
        host: "127.0.0.1".parse().unwrap(),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        email: EmailConfig {
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            smtp_username: "crm".to_string(),
            smtp_password: SecretString::from("unused"),
            from_address: "crm@example.com".to_string(),
        },
        log_json: false,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// The assembled application over in-memory tables.
///
/// Accounts match [`World`]: alice and bob are regular users, root is an
/// administrator. All of them log in with [`PASSWORD`].
pub struct Site {
    pub store: Arc<MemoryStore>,
    pub alice: CurrentUser,
    pub bob: CurrentUser,
    pub admin: CurrentUser,
    router: Router,
}

impl Site {
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let hash = hash_password(PASSWORD).unwrap();
        let alice = store
            .add_user("alice", Some(Email::parse("alice@example.com").unwrap()), &hash, false)
            .unwrap();
        let bob = store.add_user("bob", None, &hash, false).unwrap();
        let admin = store
            .add_user("root", Some(Email::parse("root@example.com").unwrap()), &hash, true)
            .unwrap();

        let config = test_config();
        let session_layer =
            create_session_layer(tower_sessions::MemoryStore::default(), &config);
        let state =
            AppState::with_stores(&config.email, Stores::Memory(Arc::clone(&store))).unwrap();

        Self {
            store,
            alice: CurrentUser::from(&alice),
            bob: CurrentUser::from(&bob),
            admin: CurrentUser::from(&admin),
            router: crm_web::app(state, session_layer),
        }
    }

    /// Send one request through the router.
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Log in as `username` and return the `Cookie` header value.
    pub async fn login(&self, username: &str) -> String {
        let response = self
            .send(post_form(
                "/login",
                None,
                &format!("username={username}&password={PASSWORD}"),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "login as {username}");

        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }
}

impl Default for Site {
    fn default() -> Self {
        Self::new()
    }
}

/// A GET request, optionally carrying a session cookie.
#[must_use]
pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// A urlencoded form POST, optionally carrying a session cookie.
#[must_use]
pub fn post_form(uri: &str, cookie: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// The `Location` header of a redirect.
#[must_use]
pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
}

/// The response body as text.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
