//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                            - Dashboard
//!
//! # Auth (username + password)
//! GET  /login                       - Login page
//! POST /login                       - Log in
//! POST /logout                      - Log out
//!
//! # Records: companies, contacts, leads, deals, activities
//! GET  /{entity}/                   - List (scoped to the user unless admin)
//! GET  /{entity}/add/               - New record form
//! POST /{entity}/add/               - Create
//! GET  /{entity}/{id}/              - Detail
//! GET  /{entity}/{id}/edit/         - Edit form
//! POST /{entity}/{id}/edit/         - Save
//! POST /{entity}/{id}/delete/       - Delete (owner or admin)
//! POST /activities/{id}/complete/   - Mark completed (owner or admin)
//! ```
//!
//! An `{id}` that is not a valid record id answers 404, same as a missing
//! record.

pub mod activities;
pub mod auth;
pub mod companies;
pub mod contacts;
pub mod dashboard;
pub mod deals;
pub mod leads;

use axum::{
    Router,
    extract::{FromRequestParts, Path},
    http::request::Parts,
    routing::get,
};
use serde::de::DeserializeOwned;

use crm_core::{CompanyId, Scope};

use crate::db::{EntityStore, RepositoryError};
use crate::error::AppError;
use crate::models::Company;
use crate::state::AppState;

/// Date-time format used on detail and list pages.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Build the application router (without state or layers).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::dashboard))
        .merge(auth::routes())
        .merge(companies::routes())
        .merge(contacts::routes())
        .merge(leads::routes())
        .merge(deals::routes())
        .merge(activities::routes())
}

/// Record id from the URL path, rejected as [`AppError::NotFound`].
pub struct IdPath<T>(pub T);

impl<S, T> FromRequestParts<S> for IdPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(id))
    }
}

/// Optional text field as shown in templates (empty when absent).
pub(crate) fn text(value: Option<&String>) -> String {
    value.cloned().unwrap_or_default()
}

/// Every company, for pickers and name lookups.
pub(crate) async fn all_companies<S: EntityStore<Company>>(
    store: &S,
) -> Result<Vec<Company>, RepositoryError> {
    store.list(Scope::All).await
}

/// Name of the company with `id`, or empty.
pub(crate) fn company_name(companies: &[Company], id: Option<CompanyId>) -> String {
    id.and_then(|id| companies.iter().find(|c| c.id == id))
        .map(|c| c.name.clone())
        .unwrap_or_default()
}
