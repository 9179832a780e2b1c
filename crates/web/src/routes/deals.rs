//! Deal route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use rust_decimal::Decimal;
use tracing::instrument;

use crm_core::{DealId, Principal};

use crate::{
    error::AppError,
    filters,
    forms::{DATE_FORMAT, DealForm, FormErrors, SelectOption, company_options, deal_stage_options},
    middleware::auth::RequireAuth,
    models::{Company, CurrentUser, Deal},
    services::records,
    state::AppState,
};

use super::dashboard::UserView;
use super::{DISPLAY_FORMAT, IdPath, all_companies, company_name};

const LIST_PATH: &str = "/deals/";

/// Deal routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/deals/", get(list))
        .route("/deals/add/", get(add_page).post(add))
        .route("/deals/{id}/", get(detail))
        .route("/deals/{id}/edit/", get(edit_page).post(edit))
        .route("/deals/{id}/delete/", post(delete))
}

#[derive(Debug, Clone)]
pub struct DealRow {
    pub id: i32,
    pub title: String,
    pub amount: Decimal,
    pub stage: String,
    pub company_id: Option<i32>,
    pub company: String,
    pub close_date: String,
    pub can_mutate: bool,
}

impl DealRow {
    #[must_use]
    pub fn new(deal: &Deal, companies: &[Company], principal: &Principal) -> Self {
        Self {
            id: deal.id.as_i32(),
            title: deal.title.clone(),
            amount: deal.amount,
            stage: deal.stage.label().to_string(),
            company_id: deal.company_id.map(|id| id.as_i32()),
            company: company_name(companies, deal.company_id),
            close_date: deal
                .close_date
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
            can_mutate: principal.can_mutate(deal),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "deals/list.html")]
pub struct DealListTemplate {
    pub user: UserView,
    pub current_path: String,
    pub deals: Vec<DealRow>,
}

#[derive(Template, WebTemplate)]
#[template(path = "deals/detail.html")]
pub struct DealDetailTemplate {
    pub user: UserView,
    pub current_path: String,
    pub deal: DealRow,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "deals/form.html")]
pub struct DealFormTemplate {
    pub user: UserView,
    pub current_path: String,
    pub heading: String,
    pub action: String,
    pub form: DealForm,
    pub errors: FormErrors,
    pub stages: Vec<SelectOption>,
    pub companies: Vec<SelectOption>,
}

impl DealFormTemplate {
    fn new(
        user: &CurrentUser,
        action: String,
        form: DealForm,
        errors: FormErrors,
        companies: &[Company],
    ) -> Self {
        let heading = if action.ends_with("/add/") {
            "Add Deal"
        } else {
            "Edit Deal"
        };
        Self {
            user: UserView::from(user),
            current_path: LIST_PATH.to_string(),
            heading: heading.to_string(),
            stages: deal_stage_options(&form.stage),
            companies: company_options(companies, &form.company),
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
) -> Result<DealListTemplate, AppError> {
    let principal = user.principal();
    let stores = state.stores();
    let deals: Vec<Deal> = records::list(stores, &principal).await?;
    let companies = all_companies(state.stores()).await?;

    Ok(DealListTemplate {
        user: UserView::from(&user),
        current_path: LIST_PATH.to_string(),
        deals: deals
            .iter()
            .map(|d| DealRow::new(d, &companies, &principal))
            .collect(),
    })
}

#[instrument(skip(user, state))]
pub async fn add_page(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<DealFormTemplate, AppError> {
    let companies = all_companies(state.stores()).await?;

    Ok(DealFormTemplate::new(
        &user,
        "/deals/add/".to_string(),
        DealForm::default(),
        FormErrors::default(),
        &companies,
    ))
}

#[instrument(skip(user, state, form))]
pub async fn add(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Form(form): Form<DealForm>,
) -> Result<Response, AppError> {
    let companies = all_companies(state.stores()).await?;

    match form.validate(&companies) {
        Ok(input) => {
            let stores = state.stores();
            records::create::<Deal, _>(stores, &user.principal(), &input).await?;
            Ok(Redirect::to(LIST_PATH).into_response())
        }
        Err(errors) => Ok(DealFormTemplate::new(
            &user,
            "/deals/add/".to_string(),
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
    IdPath(id): IdPath<DealId>,
) -> Result<DealDetailTemplate, AppError> {
    let stores = state.stores();
    let deal: Deal = records::fetch(stores, id).await?;
    let companies = all_companies(state.stores()).await?;

    Ok(DealDetailTemplate {
        user: UserView::from(&user),
        current_path: LIST_PATH.to_string(),
        deal: DealRow::new(&deal, &companies, &user.principal()),
        created_at: deal.created_at.format(DISPLAY_FORMAT).to_string(),
        updated_at: deal.updated_at.format(DISPLAY_FORMAT).to_string(),
    })
}

#[instrument(skip(user, state))]
pub async fn edit_page(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    IdPath(id): IdPath<DealId>,
) -> Result<DealFormTemplate, AppError> {
    let stores = state.stores();
    let deal: Deal = records::fetch(stores, id).await?;
    let companies = all_companies(state.stores()).await?;

    Ok(DealFormTemplate::new(
        &user,
        format!("/deals/{id}/edit/"),
        DealForm::from(&deal),
        FormErrors::default(),
        &companies,
    ))
}

#[instrument(skip(user, state, form))]
pub async fn edit(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    IdPath(id): IdPath<DealId>,
    Form(form): Form<DealForm>,
) -> Result<Response, AppError> {
    let stores = state.stores();
    let _: Deal = records::fetch(stores, id).await?;
    let companies = all_companies(state.stores()).await?;

    match form.validate(&companies) {
        Ok(input) => {
            records::update::<Deal, _>(stores, &user.principal(), id, &input).await?;
            Ok(Redirect::to(LIST_PATH).into_response())
        }
        Err(errors) => Ok(DealFormTemplate::new(
            &user,
            format!("/deals/{id}/edit/"),
            form,
            errors,
            &companies,
        )
        .into_response()),
    }
}

/// Delete a deal (assignee or admin only; others are ignored).
#[instrument(skip(user, state))]
pub async fn delete(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    IdPath(id): IdPath<DealId>,
) -> Result<Redirect, AppError> {
    let stores = state.stores();
    let _ = records::delete::<Deal, _>(stores, &user.principal(), id).await?;

    Ok(Redirect::to(LIST_PATH))
}
