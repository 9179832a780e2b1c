//! Contact route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use tracing::instrument;

use crm_core::{ContactId, Principal};

use crate::{
    error::AppError,
    filters,
    forms::{ContactForm, FormErrors, SelectOption, company_options},
    middleware::auth::RequireAuth,
    models::{Company, Contact, CurrentUser},
    services::records,
    state::AppState,
};

use super::dashboard::UserView;
use super::{DISPLAY_FORMAT, IdPath, all_companies, company_name, text};

const LIST_PATH: &str = "/contacts/";

/// Contact routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/contacts/", get(list))
        .route("/contacts/add/", get(add_page).post(add))
        .route("/contacts/{id}/", get(detail))
        .route("/contacts/{id}/edit/", get(edit_page).post(edit))
        .route("/contacts/{id}/delete/", post(delete))
}

/// Contact as shown in lists and on its detail page.
#[derive(Debug, Clone)]
pub struct ContactRow {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub position: String,
    pub company_id: Option<i32>,
    pub company: String,
    pub can_mutate: bool,
}

impl ContactRow {
    /// `companies` is used to resolve the company name.
    #[must_use]
    pub fn new(contact: &Contact, companies: &[Company], principal: &Principal) -> Self {
        Self {
            id: contact.id.as_i32(),
            name: contact.full_name(),
            email: contact
                .email
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            phone: text(contact.phone.as_ref()),
            position: text(contact.position.as_ref()),
            company_id: contact.company_id.map(|id| id.as_i32()),
            company: company_name(companies, contact.company_id),
            can_mutate: principal.can_mutate(contact),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "contacts/list.html")]
pub struct ContactListTemplate {
    pub user: UserView,
    pub current_path: String,
    pub contacts: Vec<ContactRow>,
}

#[derive(Template, WebTemplate)]
#[template(path = "contacts/detail.html")]
pub struct ContactDetailTemplate {
    pub user: UserView,
    pub current_path: String,
    pub contact: ContactRow,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "contacts/form.html")]
pub struct ContactFormTemplate {
    pub user: UserView,
    pub current_path: String,
    pub heading: String,
    pub action: String,
    pub form: ContactForm,
    pub errors: FormErrors,
    pub companies: Vec<SelectOption>,
}

impl ContactFormTemplate {
    fn new(
        user: &CurrentUser,
        action: String,
        form: ContactForm,
        errors: FormErrors,
        companies: &[Company],
    ) -> Self {
        let heading = if action.ends_with("/add/") {
            "Add Contact"
        } else {
            "Edit Contact"
        };
        Self {
            user: UserView::from(user),
            current_path: LIST_PATH.to_string(),
            heading: heading.to_string(),
            companies: company_options(companies, &form.company),
            action,
            form,
            errors,
        }
    }
}

/// Contact list handler. Non-admins see only their own contacts.
#[instrument(skip(user, state))]
pub async fn list(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<ContactListTemplate, AppError> {
    let principal = user.principal();
    let stores = state.stores();
    let contacts: Vec<Contact> = records::list(stores, &principal).await?;
    let companies = all_companies(state.stores()).await?;

    Ok(ContactListTemplate {
        user: UserView::from(&user),
        current_path: LIST_PATH.to_string(),
        contacts: contacts
            .iter()
            .map(|c| ContactRow::new(c, &companies, &principal))
            .collect(),
    })
}

#[instrument(skip(user, state))]
pub async fn add_page(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<ContactFormTemplate, AppError> {
    let companies = all_companies(state.stores()).await?;

    Ok(ContactFormTemplate::new(
        &user,
        "/contacts/add/".to_string(),
        ContactForm::default(),
        FormErrors::default(),
        &companies,
    ))
}

#[instrument(skip(user, state, form))]
pub async fn add(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Form(form): Form<ContactForm>,
) -> Result<Response, AppError> {
    let companies = all_companies(state.stores()).await?;

    match form.validate(&companies) {
        Ok(input) => {
            let stores = state.stores();
            records::create::<Contact, _>(stores, &user.principal(), &input).await?;
            Ok(Redirect::to(LIST_PATH).into_response())
        }
        Err(errors) => Ok(ContactFormTemplate::new(
            &user,
            "/contacts/add/".to_string(),
            form,
            errors,
            &companies,
        )
        .into_response()),
    }
}

#[instrument(skip(user, state))]
pub async fn detail(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    IdPath(id): IdPath<ContactId>,
) -> Result<ContactDetailTemplate, AppError> {
    let stores = state.stores();
    let contact: Contact = records::fetch(stores, id).await?;
    let companies = all_companies(state.stores()).await?;

    Ok(ContactDetailTemplate {
        user: UserView::from(&user),
        current_path: LIST_PATH.to_string(),
        contact: ContactRow::new(&contact, &companies, &user.principal()),
        created_at: contact.created_at.format(DISPLAY_FORMAT).to_string(),
        updated_at: contact.updated_at.format(DISPLAY_FORMAT).to_string(),
    })
}

#[instrument(skip(user, state))]
pub async fn edit_page(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    IdPath(id): IdPath<ContactId>,
) -> Result<ContactFormTemplate, AppError> {
    let stores = state.stores();
    let contact: Contact = records::fetch(stores, id).await?;
    let companies = all_companies(state.stores()).await?;

    Ok(ContactFormTemplate::new(
        &user,
        format!("/contacts/{id}/edit/"),
        ContactForm::from(&contact),
        FormErrors::default(),
        &companies,
    ))
}

#[instrument(skip(user, state, form))]
pub async fn edit(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    IdPath(id): IdPath<ContactId>,
    Form(form): Form<ContactForm>,
) -> Result<Response, AppError> {
    let stores = state.stores();
    let _: Contact = records::fetch(stores, id).await?;
    let companies = all_companies(state.stores()).await?;

    match form.validate(&companies) {
        Ok(input) => {
            records::update::<Contact, _>(stores, &user.principal(), id, &input).await?;
            Ok(Redirect::to(LIST_PATH).into_response())
        }
        Err(errors) => Ok(ContactFormTemplate::new(
            &user,
            format!("/contacts/{id}/edit/"),
            form,
            errors,
            &companies,
        )
        .into_response()),
    }
}

/// Delete a contact (assignee or admin only; others are ignored).
#[instrument(skip(user, state))]
pub async fn delete(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    IdPath(id): IdPath<ContactId>,
) -> Result<Redirect, AppError> {
    let stores = state.stores();
    let _ = records::delete::<Contact, _>(stores, &user.principal(), id).await?;

    Ok(Redirect::to(LIST_PATH))
}
