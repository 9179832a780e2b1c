//! Dashboard aggregation.
//!
//! Counts and activity lists follow the principal's list scope. Pipeline
//! value and won deals are computed over every deal, so a regular user's
//! conversion rate compares global wins against their own leads.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crm_core::{Principal, lead_conversion_rate};

use crate::db::{DashboardStore, RepositoryError};
use crate::models::Activity;

/// Number of activities shown in each dashboard list.
pub const ACTIVITY_LIST_LIMIT: i64 = 5;

/// Everything the dashboard shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSummary {
    pub companies_count: i64,
    pub contacts_count: i64,
    pub leads_count: i64,
    pub deals_count: i64,
    pub recent_activities: Vec<Activity>,
    pub upcoming_activities: Vec<Activity>,
    pub total_pipeline_value: Decimal,
    pub won_deals: i64,
    pub lead_conversion_rate: Decimal,
}

/// Gather the dashboard for `principal` as of `now`.
///
/// # Errors
///
/// Returns the first store error.
pub async fn summarize<S: DashboardStore>(
    store: &S,
    principal: &Principal,
    now: DateTime<Utc>,
) -> Result<DashboardSummary, RepositoryError> {
    let scope = principal.scope();

    let (
        companies_count,
        contacts_count,
        leads_count,
        deals_count,
        recent_activities,
        upcoming_activities,
        total_pipeline_value,
        won_deals,
    ) = tokio::try_join!(
        store.count_companies(),
        store.count_contacts(scope),
        store.count_leads(scope),
        store.count_deals(scope),
        store.recent_activities(scope, ACTIVITY_LIST_LIMIT),
        store.upcoming_activities(scope, now, ACTIVITY_LIST_LIMIT),
        store.total_pipeline_value(),
        store.count_won_deals(),
    )?;

    Ok(DashboardSummary {
        companies_count,
        contacts_count,
        leads_count,
        deals_count,
        recent_activities,
        upcoming_activities,
        total_pipeline_value,
        won_deals,
        lead_conversion_rate: lead_conversion_rate(won_deals, leads_count),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use crm_core::{ActivityType, DealStage, UserId};

    use super::*;
    use crate::db::EntityStore;
    use crate::db::memory::MemoryStore;
    use crate::models::{ActivityInput, Deal, DealInput, Lead, LeadInput};

    fn lead(name: &str) -> LeadInput {
        LeadInput {
            name: name.to_string(),
            email: None,
            phone: None,
            source: None,
            status: crm_core::LeadStatus::New,
            notes: None,
        }
    }

    fn deal(title: &str, amount: i64, stage: DealStage) -> DealInput {
        DealInput {
            title: title.to_string(),
            amount: Decimal::new(amount, 0),
            stage,
            company_id: None,
            close_date: None,
        }
    }

    #[tokio::test]
    async fn test_empty_store() {
        let store = MemoryStore::new();
        let admin = Principal::new(UserId::new(1), true);
        let summary = summarize(&store, &admin, Utc::now()).await.unwrap();

        assert_eq!(summary.leads_count, 0);
        assert_eq!(summary.lead_conversion_rate, Decimal::ZERO);
        assert_eq!(summary.total_pipeline_value, Decimal::ZERO);
        assert!(summary.recent_activities.is_empty());
    }

    #[tokio::test]
    async fn test_four_leads_one_won_deal_is_twenty_five_percent() {
        let store = MemoryStore::new();
        let rep = Principal::new(UserId::new(7), false);
        for name in ["a", "b", "c", "d"] {
            EntityStore::<Lead>::create(&store, &lead(name), rep.user_id)
                .await
                .unwrap();
        }
        EntityStore::<Deal>::create(&store, &deal("won", 900, DealStage::Won), rep.user_id)
            .await
            .unwrap();

        let summary = summarize(&store, &rep, Utc::now()).await.unwrap();
        assert_eq!(summary.leads_count, 4);
        assert_eq!(summary.won_deals, 1);
        assert_eq!(summary.lead_conversion_rate, Decimal::new(25, 0));
    }

    #[tokio::test]
    async fn test_activity_lists_are_capped_and_ordered() {
        let store = MemoryStore::new();
        let rep = Principal::new(UserId::new(3), false);
        let now = Utc::now();

        for offset in [-2_i64, 1, 6, 3, 2, 5, 4] {
            let input = ActivityInput {
                title: format!("t{offset}"),
                activity_type: ActivityType::Task,
                description: None,
                due_date: now + Duration::hours(offset),
            };
            EntityStore::<crate::models::Activity>::create(&store, &input, rep.user_id)
                .await
                .unwrap();
        }

        let summary = summarize(&store, &rep, now).await.unwrap();
        assert_eq!(summary.recent_activities.len(), 5);

        let upcoming: Vec<_> = summary
            .upcoming_activities
            .iter()
            .map(|a| a.title.as_str())
            .collect();
        assert_eq!(upcoming, ["t1", "t2", "t3", "t4", "t5"]);
    }
}
