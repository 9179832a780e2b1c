//! Company route handlers.
//!
//! Companies have no owner. Everyone lists, views, creates and edits them;
//! only administrators delete them.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use tracing::instrument;

use crm_core::{CompanyId, Principal};

use crate::{
    error::AppError,
    filters,
    forms::{CompanyForm, FormErrors},
    middleware::auth::RequireAuth,
    models::{Company, CurrentUser},
    services::records,
    state::AppState,
};

use super::contacts::ContactRow;
use super::dashboard::UserView;
use super::deals::DealRow;
use super::{DISPLAY_FORMAT, IdPath, text};

const LIST_PATH: &str = "/companies/";

/// Company routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/companies/", get(list))
        .route("/companies/add/", get(add_page).post(add))
        .route("/companies/{id}/", get(detail))
        .route("/companies/{id}/edit/", get(edit_page).post(edit))
        .route("/companies/{id}/delete/", post(delete))
}

/// Company as shown in lists and on its detail page.
#[derive(Debug, Clone)]
pub struct CompanyView {
    pub id: i32,
    pub name: String,
    pub industry: String,
    pub website: String,
    pub phone: String,
    pub address: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Company> for CompanyView {
    fn from(company: &Company) -> Self {
        Self {
            id: company.id.as_i32(),
            name: company.name.clone(),
            industry: text(company.industry.as_ref()),
            website: text(company.website.as_ref()),
            phone: text(company.phone.as_ref()),
            address: text(company.address.as_ref()),
            created_at: company.created_at.format(DISPLAY_FORMAT).to_string(),
            updated_at: company.updated_at.format(DISPLAY_FORMAT).to_string(),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "companies/list.html")]
pub struct CompanyListTemplate {
    pub user: UserView,
    pub current_path: String,
    pub companies: Vec<CompanyView>,
}

#[derive(Template, WebTemplate)]
#[template(path = "companies/detail.html")]
pub struct CompanyDetailTemplate {
    pub user: UserView,
    pub current_path: String,
    pub company: CompanyView,
    pub contacts: Vec<ContactRow>,
    pub deals: Vec<DealRow>,
    pub can_delete: bool,
}

#[derive(Template, WebTemplate)]
#[template(path = "companies/form.html")]
pub struct CompanyFormTemplate {
    pub user: UserView,
    pub current_path: String,
    pub heading: String,
    pub action: String,
    pub form: CompanyForm,
    pub errors: FormErrors,
}

impl CompanyFormTemplate {
    fn new(user: &CurrentUser, action: String, form: CompanyForm, errors: FormErrors) -> Self {
        let heading = if action.ends_with("/add/") {
            "Add Company"
        } else {
            "Edit Company"
        };
        Self {
            user: UserView::from(user),
            current_path: LIST_PATH.to_string(),
            heading: heading.to_string(),
            action,
            form,
            errors,
        }
    }
}

/// Company list handler.
#[instrument(skip(user, state))]
pub async fn list(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<CompanyListTemplate, AppError> {
    let stores = state.stores();
    let companies: Vec<Company> = records::list(stores, &user.principal()).await?;

    Ok(CompanyListTemplate {
        user: UserView::from(&user),
        current_path: LIST_PATH.to_string(),
        companies: companies.iter().map(CompanyView::from).collect(),
    })
}

#[instrument(skip(user))]
pub async fn add_page(RequireAuth(user): RequireAuth) -> CompanyFormTemplate {
    CompanyFormTemplate::new(
        &user,
        "/companies/add/".to_string(),
        CompanyForm::default(),
        FormErrors::default(),
    )
}

#[instrument(skip(user, state, form))]
pub async fn add(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Form(form): Form<CompanyForm>,
) -> Result<Response, AppError> {
    match form.validate() {
        Ok(input) => {
            let stores = state.stores();
            records::create_company(stores, &user.principal(), &input).await?;
            Ok(Redirect::to(LIST_PATH).into_response())
        }
        Err(errors) => Ok(CompanyFormTemplate::new(
            &user,
            "/companies/add/".to_string(),
            form,
            errors,
        )
        .into_response()),
    }
}

/// Company detail with its contacts and deals (as visible to the user).
#[instrument(skip(user, state))]
pub async fn detail(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    IdPath(id): IdPath<CompanyId>,
) -> Result<CompanyDetailTemplate, AppError> {
    let principal: Principal = user.principal();
    let stores = state.stores();
    let company: Company = records::fetch(stores, id).await?;

    let contacts = stores.contacts_for_company(id, principal.scope()).await?;
    let deals = stores.deals_for_company(id, principal.scope()).await?;
    let companies = std::slice::from_ref(&company);

    Ok(CompanyDetailTemplate {
        user: UserView::from(&user),
        current_path: LIST_PATH.to_string(),
        company: CompanyView::from(&company),
        contacts: contacts
            .iter()
            .map(|c| ContactRow::new(c, companies, &principal))
            .collect(),
        deals: deals
            .iter()
            .map(|d| DealRow::new(d, companies, &principal))
            .collect(),
        can_delete: principal.can_delete_company(),
    })
}

#[instrument(skip(user, state))]
pub async fn edit_page(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    IdPath(id): IdPath<CompanyId>,
) -> Result<CompanyFormTemplate, AppError> {
    let stores = state.stores();
    let company: Company = records::fetch(stores, id).await?;

    Ok(CompanyFormTemplate::new(
        &user,
        format!("/companies/{id}/edit/"),
        CompanyForm::from(&company),
        FormErrors::default(),
    ))
}

#[instrument(skip(user, state, form))]
pub async fn edit(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    IdPath(id): IdPath<CompanyId>,
    Form(form): Form<CompanyForm>,
) -> Result<Response, AppError> {
    let stores = state.stores();
    let _: Company = records::fetch(stores, id).await?;

    match form.validate() {
        Ok(input) => {
            records::update::<Company, _>(stores, &user.principal(), id, &input).await?;
            Ok(Redirect::to(LIST_PATH).into_response())
        }
        Err(errors) => Ok(CompanyFormTemplate::new(
            &user,
            format!("/companies/{id}/edit/"),
            form,
            errors,
        )
        .into_response()),
    }
}

/// Delete a company (admins only; others are ignored).
///
/// Contacts and deals of a deleted company keep existing with no company.
#[instrument(skip(user, state))]
pub async fn delete(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    IdPath(id): IdPath<CompanyId>,
) -> Result<Redirect, AppError> {
    let stores = state.stores();
    let _ = records::delete_company(stores, &user.principal(), id).await?;

    Ok(Redirect::to(LIST_PATH))
}
