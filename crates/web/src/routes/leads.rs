//! Lead route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use tracing::instrument;

use crm_core::{LeadId, Principal};

use crate::{
    error::AppError,
    filters,
    forms::{FormErrors, LeadForm, SelectOption, lead_status_options},
    middleware::auth::RequireAuth,
    models::{CurrentUser, Lead},
    services::records,
    state::AppState,
};

use super::dashboard::UserView;
use super::{DISPLAY_FORMAT, IdPath, text};

const LIST_PATH: &str = "/leads/";

/// Lead routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/leads/", get(list))
        .route("/leads/add/", get(add_page).post(add))
        .route("/leads/{id}/", get(detail))
        .route("/leads/{id}/edit/", get(edit_page).post(edit))
        .route("/leads/{id}/delete/", post(delete))
}

#[derive(Debug, Clone)]
pub struct LeadRow {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub source: String,
    pub status: String,
    pub notes: String,
    pub can_mutate: bool,
}

impl LeadRow {
    #[must_use]
    pub fn new(lead: &Lead, principal: &Principal) -> Self {
        Self {
            id: lead.id.as_i32(),
            name: lead.name.clone(),
            email: lead
                .email
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            phone: text(lead.phone.as_ref()),
            source: text(lead.source.as_ref()),
            status: lead.status.label().to_string(),
            notes: text(lead.notes.as_ref()),
            can_mutate: principal.can_mutate(lead),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "leads/list.html")]
pub struct LeadListTemplate {
    pub user: UserView,
    pub current_path: String,
    pub leads: Vec<LeadRow>,
}

#[derive(Template, WebTemplate)]
#[template(path = "leads/detail.html")]
pub struct LeadDetailTemplate {
    pub user: UserView,
    pub current_path: String,
    pub lead: LeadRow,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "leads/form.html")]
pub struct LeadFormTemplate {
    pub user: UserView,
    pub current_path: String,
    pub heading: String,
    pub action: String,
    pub form: LeadForm,
    pub errors: FormErrors,
    pub statuses: Vec<SelectOption>,
}

impl LeadFormTemplate {
    fn new(user: &CurrentUser, action: String, form: LeadForm, errors: FormErrors) -> Self {
        let heading = if action.ends_with("/add/") {
            "Add Lead"
        } else {
            "Edit Lead"
        };
        Self {
            user: UserView::from(user),
            current_path: LIST_PATH.to_string(),
            heading: heading.to_string(),
            statuses: lead_status_options(&form.status),
            action,
            form,
            errors,
        }
    }
}

#[instrument(skip(user, state))]
pub async fn list(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<LeadListTemplate, AppError> {
    let principal = user.principal();
    let stores = state.stores();
    let leads: Vec<Lead> = records::list(stores, &principal).await?;

    Ok(LeadListTemplate {
        user: UserView::from(&user),
        current_path: LIST_PATH.to_string(),
        leads: leads.iter().map(|l| LeadRow::new(l, &principal)).collect(),
    })
}

#[instrument(skip(user))]
pub async fn add_page(RequireAuth(user): RequireAuth) -> LeadFormTemplate {
    LeadFormTemplate::new(
        &user,
        "/leads/add/".to_string(),
        LeadForm::default(),
        FormErrors::default(),
    )
}

#[instrument(skip(user, state, form))]
pub async fn add(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Form(form): Form<LeadForm>,
) -> Result<Response, AppError> {
    match form.validate() {
        Ok(input) => {
            let stores = state.stores();
            records::create::<Lead, _>(stores, &user.principal(), &input).await?;
            Ok(Redirect::to(LIST_PATH).into_response())
        }
        Err(errors) => {
            Ok(LeadFormTemplate::new(&user, "/leads/add/".to_string(), form, errors)
                .into_response())
        }
    }
}

#[instrument(skip(user, state))]
pub async fn detail(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    IdPath(id): IdPath<LeadId>,
) -> Result<LeadDetailTemplate, AppError> {
    let stores = state.stores();
    let lead: Lead = records::fetch(stores, id).await?;

    Ok(LeadDetailTemplate {
        user: UserView::from(&user),
        current_path: LIST_PATH.to_string(),
        lead: LeadRow::new(&lead, &user.principal()),
        created_at: lead.created_at.format(DISPLAY_FORMAT).to_string(),
        updated_at: lead.updated_at.format(DISPLAY_FORMAT).to_string(),
    })
}

#[instrument(skip(user, state))]
pub async fn edit_page(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    IdPath(id): IdPath<LeadId>,
) -> Result<LeadFormTemplate, AppError> {
    let stores = state.stores();
    let lead: Lead = records::fetch(stores, id).await?;

    Ok(LeadFormTemplate::new(
        &user,
        format!("/leads/{id}/edit/"),
        LeadForm::from(&lead),
        FormErrors::default(),
    ))
}

#[instrument(skip(user, state, form))]
pub async fn edit(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    IdPath(id): IdPath<LeadId>,
    Form(form): Form<LeadForm>,
) -> Result<Response, AppError> {
    let stores = state.stores();
    let _: Lead = records::fetch(stores, id).await?;

    match form.validate() {
        Ok(input) => {
            records::update::<Lead, _>(stores, &user.principal(), id, &input).await?;
            Ok(Redirect::to(LIST_PATH).into_response())
        }
        Err(errors) => {
            Ok(LeadFormTemplate::new(&user, format!("/leads/{id}/edit/"), form, errors)
                .into_response())
        }
    }
}

/// Delete a lead (assignee or admin only; others are ignored).
#[instrument(skip(user, state))]
pub async fn delete(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    IdPath(id): IdPath<LeadId>,
) -> Result<Redirect, AppError> {
    let stores = state.stores();
    let _ = records::delete::<Lead, _>(stores, &user.principal(), id).await?;

    Ok(Redirect::to(LIST_PATH))
}
