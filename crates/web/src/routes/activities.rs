//! Activity route handlers.
//!
//! Creating an activity emails the assignee (the creator) when they have an
//! address on file. A mail failure surfaces as a 502 after the activity has
//! been saved.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use chrono::Utc;
use tracing::instrument;

use crm_core::{ActivityId, Principal};

use crate::{
    error::AppError,
    filters,
    forms::{ActivityForm, FormErrors, SelectOption, activity_type_options},
    middleware::auth::RequireAuth,
    models::{Activity, CurrentUser},
    services::records,
    state::AppState,
};

use super::{DISPLAY_FORMAT, IdPath};
use super::dashboard::UserView;

const LIST_PATH: &str = "/activities/";

/// Activity routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/activities/", get(list))
        .route("/activities/add/", get(add_page).post(add))
        .route("/activities/{id}/", get(detail))
        .route("/activities/{id}/edit/", get(edit_page).post(edit))
        .route("/activities/{id}/delete/", post(delete))
        .route("/activities/{id}/complete/", post(complete))
}

/// Activity row for lists and the dashboard.
#[derive(Debug, Clone)]
pub struct ActivityRow {
    pub id: i32,
    pub title: String,
    pub activity_type: String,
    pub status: String,
    pub is_completed: bool,
    pub due_date: String,
    pub can_mutate: bool,
}

impl ActivityRow {
    #[must_use]
    pub fn new(activity: &Activity, principal: &Principal) -> Self {
        Self {
            id: activity.id.as_i32(),
            title: activity.title.clone(),
            activity_type: activity.activity_type.label().to_string(),
            status: activity.status.label().to_string(),
            is_completed: activity.is_completed(),
            due_date: activity.due_date.format(DISPLAY_FORMAT).to_string(),
            can_mutate: principal.can_mutate(activity),
        }
    }
}

/// Activity detail view.
#[derive(Debug, Clone)]
pub struct ActivityDetail {
    pub row: ActivityRow,
    pub description: String,
    pub completed_at: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "activities/list.html")]
pub struct ActivityListTemplate {
    pub user: UserView,
    pub current_path: String,
    pub activities: Vec<ActivityRow>,
}

#[derive(Template, WebTemplate)]
#[template(path = "activities/detail.html")]
pub struct ActivityDetailTemplate {
    pub user: UserView,
    pub current_path: String,
    pub activity: ActivityDetail,
}

#[derive(Template, WebTemplate)]
#[template(path = "activities/form.html")]
pub struct ActivityFormTemplate {
    pub user: UserView,
    pub current_path: String,
    pub heading: String,
    pub action: String,
    pub form: ActivityForm,
    pub errors: FormErrors,
    pub activity_types: Vec<SelectOption>,
}

impl ActivityFormTemplate {
    fn new(user: &CurrentUser, action: String, form: ActivityForm, errors: FormErrors) -> Self {
        let heading = if action.ends_with("/add/") {
            "Add Activity"
        } else {
            "Edit Activity"
        };
        Self {
            user: UserView::from(user),
            current_path: LIST_PATH.to_string(),
            heading: heading.to_string(),
            activity_types: activity_type_options(&form.activity_type),
            action,
            form,
            errors,
        }
    }
}

/// Activity list handler.
#[instrument(skip(user, state))]
pub async fn list(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<ActivityListTemplate, AppError> {
    let principal = user.principal();
    let stores = state.stores();
    let activities: Vec<Activity> = records::list(stores, &principal).await?;

    Ok(ActivityListTemplate {
        user: UserView::from(&user),
        current_path: LIST_PATH.to_string(),
        activities: activities
            .iter()
            .map(|a| ActivityRow::new(a, &principal))
            .collect(),
    })
}

/// New activity form.
#[instrument(skip(user))]
pub async fn add_page(RequireAuth(user): RequireAuth) -> ActivityFormTemplate {
    ActivityFormTemplate::new(
        &user,
        "/activities/add/".to_string(),
        ActivityForm::default(),
        FormErrors::default(),
    )
}

/// Create an activity and notify its assignee.
#[instrument(skip(user, state, form))]
pub async fn add(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Form(form): Form<ActivityForm>,
) -> Result<Response, AppError> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            return Ok(ActivityFormTemplate::new(
                &user,
                "/activities/add/".to_string(),
                form,
                errors,
            )
            .into_response());
        }
    };

    let stores = state.stores();
    records::create_activity(stores, stores, state.mailer(), &user, &input).await?;

    Ok(Redirect::to(LIST_PATH).into_response())
}

/// Activity detail handler.
#[instrument(skip(user, state))]
pub async fn detail(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    IdPath(id): IdPath<ActivityId>,
) -> Result<ActivityDetailTemplate, AppError> {
    let stores = state.stores();
    let activity: Activity = records::fetch(stores, id).await?;

    Ok(ActivityDetailTemplate {
        user: UserView::from(&user),
        current_path: LIST_PATH.to_string(),
        activity: ActivityDetail {
            row: ActivityRow::new(&activity, &user.principal()),
            description: activity.description.clone().unwrap_or_default(),
            completed_at: activity
                .completed_at
                .map(|at| at.format(DISPLAY_FORMAT).to_string())
                .unwrap_or_default(),
            created_at: activity.created_at.format(DISPLAY_FORMAT).to_string(),
            updated_at: activity.updated_at.format(DISPLAY_FORMAT).to_string(),
        },
    })
}

/// Pre-filled edit form.
#[instrument(skip(user, state))]
pub async fn edit_page(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    IdPath(id): IdPath<ActivityId>,
) -> Result<ActivityFormTemplate, AppError> {
    let stores = state.stores();
    let activity: Activity = records::fetch(stores, id).await?;

    Ok(ActivityFormTemplate::new(
        &user,
        format!("/activities/{id}/edit/"),
        ActivityForm::from(&activity),
        FormErrors::default(),
    ))
}

/// Save an edited activity. Status and completion time are untouched.
#[instrument(skip(user, state, form))]
pub async fn edit(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    IdPath(id): IdPath<ActivityId>,
    Form(form): Form<ActivityForm>,
) -> Result<Response, AppError> {
    let stores = state.stores();
    let _: Activity = records::fetch(stores, id).await?;

    match form.validate() {
        Ok(input) => {
            records::update::<Activity, _>(stores, &user.principal(), id, &input).await?;
            Ok(Redirect::to(LIST_PATH).into_response())
        }
        Err(errors) => Ok(ActivityFormTemplate::new(
            &user,
            format!("/activities/{id}/edit/"),
            form,
            errors,
        )
        .into_response()),
    }
}

/// Delete an activity (assignee or admin only; others are ignored).
#[instrument(skip(user, state))]
pub async fn delete(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    IdPath(id): IdPath<ActivityId>,
) -> Result<Redirect, AppError> {
    let stores = state.stores();
    let _ = records::delete::<Activity, _>(stores, &user.principal(), id).await?;

    Ok(Redirect::to(LIST_PATH))
}

/// Mark an activity completed (assignee or admin only; others are ignored).
#[instrument(skip(user, state))]
pub async fn complete(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    IdPath(id): IdPath<ActivityId>,
) -> Result<Redirect, AppError> {
    let stores = state.stores();
    let _ = records::complete_activity(stores, &user.principal(), id, Utc::now()).await?;

    Ok(Redirect::to(LIST_PATH))
}
