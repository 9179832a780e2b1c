//! Dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::instrument;

use crate::{
    error::AppError,
    filters,
    middleware::auth::RequireAuth,
    models::CurrentUser,
    services::dashboard::{DashboardSummary, summarize},
    state::AppState,
};

use super::activities::ActivityRow;

/// Logged-in user as shown in the navigation bar.
#[derive(Debug, Clone)]
pub struct UserView {
    pub username: String,
    pub is_admin: bool,
}

impl From<&CurrentUser> for UserView {
    fn from(user: &CurrentUser) -> Self {
        Self {
            username: user.username.clone(),
            is_admin: user.is_admin,
        }
    }
}

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub user: UserView,
    pub current_path: String,
    pub companies_count: i64,
    pub contacts_count: i64,
    pub leads_count: i64,
    pub deals_count: i64,
    pub total_pipeline_value: Decimal,
    pub won_deals: i64,
    pub lead_conversion_rate: String,
    pub recent_activities: Vec<ActivityRow>,
    pub upcoming_activities: Vec<ActivityRow>,
}

impl DashboardTemplate {
    fn new(user: &CurrentUser, summary: &DashboardSummary) -> Self {
        let principal = user.principal();
        Self {
            user: UserView::from(user),
            current_path: "/".to_string(),
            companies_count: summary.companies_count,
            contacts_count: summary.contacts_count,
            leads_count: summary.leads_count,
            deals_count: summary.deals_count,
            total_pipeline_value: summary.total_pipeline_value,
            won_deals: summary.won_deals,
            lead_conversion_rate: format!("{:.2}", summary.lead_conversion_rate),
            recent_activities: summary
                .recent_activities
                .iter()
                .map(|a| ActivityRow::new(a, &principal))
                .collect(),
            upcoming_activities: summary
                .upcoming_activities
                .iter()
                .map(|a| ActivityRow::new(a, &principal))
                .collect(),
        }
    }
}

/// Dashboard page handler.
#[instrument(skip(user, state), fields(user_id = %user.id))]
pub async fn dashboard(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<DashboardTemplate, AppError> {
    let stores = state.stores();
    let summary = summarize(stores, &user.principal(), Utc::now()).await?;

    Ok(DashboardTemplate::new(&user, &summary))
}
