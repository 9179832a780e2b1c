//! Login and logout.
//!
//! Username and password only. A failed login re-renders the form with a
//! single generic message so usernames cannot be probed.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::{
    error::{AppError, clear_sentry_user, set_sentry_user},
    middleware::auth::{LOGIN_PATH, OptionalAuth, clear_current_user, set_current_user},
    models::CurrentUser,
    services::{AuthError, AuthService},
    state::AppState,
};

const INVALID_LOGIN: &str = "Invalid username or password";

/// Auth routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(LOGIN_PATH, get(login_page).post(login))
        .route("/logout", post(logout))
}

#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub username: String,
    pub error: Option<String>,
}

/// Login form payload.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// GET /login
#[instrument(skip(current))]
pub async fn login_page(OptionalAuth(current): OptionalAuth) -> Response {
    if current.is_some() {
        return Redirect::to("/").into_response();
    }

    LoginTemplate {
        username: String::new(),
        error: None,
    }
    .into_response()
}

/// POST /login
#[instrument(skip(state, session, form), fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let user = match AuthService::new(state.stores())
        .authenticate(&form.username, &form.password)
        .await
    {
        Ok(user) => user,
        Err(AuthError::InvalidCredentials) => {
            tracing::info!("Login failed");
            return Ok(LoginTemplate {
                username: form.username,
                error: Some(INVALID_LOGIN.to_string()),
            }
            .into_response());
        }
        Err(e) => return Err(e.into()),
    };

    let current = CurrentUser::from(&user);
    set_current_user(&session, &current).await?;
    set_sentry_user(current.id.as_i32(), &current.username);
    tracing::info!(user_id = %current.id, "User logged in");

    Ok(Redirect::to("/").into_response())
}

/// POST /logout
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect, AppError> {
    clear_current_user(&session).await?;
    clear_sentry_user();

    Ok(Redirect::to(LOGIN_PATH))
}
