//! Dashboard aggregates.

#![allow(clippy::unwrap_used)]

use chrono::{Duration, Utc};
use rust_decimal::Decimal;

use crm_core::{ActivityType, DealStage};
use crm_integration_tests::{World, activity, company, contact, deal, lead};
use crm_web::models::{Activity, Contact, Deal, Lead};
use crm_web::services::dashboard::summarize;
use crm_web::services::records;

#[tokio::test]
async fn empty_dashboard_has_zero_conversion() {
    let w = World::new();
    let summary = summarize(&w.store, &w.alice.principal(), Utc::now())
        .await
        .unwrap();

    assert_eq!(summary.leads_count, 0);
    assert_eq!(summary.lead_conversion_rate, Decimal::ZERO);
    assert_eq!(summary.total_pipeline_value, Decimal::ZERO);
    assert!(summary.recent_activities.is_empty());
}

#[tokio::test]
async fn four_leads_one_won_deal_is_twenty_five_percent() {
    let w = World::new();
    let alice = w.alice.principal();
    for name in ["L1", "L2", "L3", "L4"] {
        records::create::<Lead, _>(&w.store, &alice, &lead(name)).await.unwrap();
    }
    records::create::<Deal, _>(&w.store, &alice, &deal("Closed", 50, DealStage::Won))
        .await
        .unwrap();

    let summary = summarize(&w.store, &alice, Utc::now()).await.unwrap();

    assert_eq!(summary.leads_count, 4);
    assert_eq!(summary.won_deals, 1);
    assert_eq!(summary.lead_conversion_rate, Decimal::new(25, 0));
}

#[tokio::test]
async fn pipeline_value_is_global_but_deal_count_is_scoped() {
    let w = World::new();
    records::create::<Deal, _>(
        &w.store,
        &w.alice.principal(),
        &deal("Alpha", 100, DealStage::Proposal),
    )
    .await
    .unwrap();
    records::create::<Deal, _>(
        &w.store,
        &w.bob.principal(),
        &deal("Beta", 200, DealStage::Negotiation),
    )
    .await
    .unwrap();

    let now = Utc::now();
    let for_alice = summarize(&w.store, &w.alice.principal(), now).await.unwrap();
    let for_admin = summarize(&w.store, &w.admin.principal(), now).await.unwrap();

    assert_eq!(for_alice.total_pipeline_value, Decimal::new(300, 0));
    assert_eq!(for_admin.total_pipeline_value, Decimal::new(300, 0));
    assert_eq!(for_alice.deals_count, 1);
    assert_eq!(for_admin.deals_count, 2);
}

#[tokio::test]
async fn won_deals_of_others_can_push_rate_past_one_hundred() {
    let w = World::new();
    records::create::<Lead, _>(&w.store, &w.alice.principal(), &lead("Only"))
        .await
        .unwrap();
    for title in ["W1", "W2"] {
        records::create::<Deal, _>(&w.store, &w.bob.principal(), &deal(title, 1, DealStage::Won))
            .await
            .unwrap();
    }

    let summary = summarize(&w.store, &w.alice.principal(), Utc::now())
        .await
        .unwrap();

    assert_eq!(summary.lead_conversion_rate, Decimal::new(200, 0));
}

#[tokio::test]
async fn counts_respect_scope_except_companies() {
    let w = World::new();
    let acme = records::create_company(&w.store, &w.bob.principal(), &company("Acme"))
        .await
        .unwrap();
    records::create::<Contact, _>(&w.store, &w.bob.principal(), &contact("Ada", Some(acme.id)))
        .await
        .unwrap();

    let summary = summarize(&w.store, &w.alice.principal(), Utc::now())
        .await
        .unwrap();

    assert_eq!(summary.companies_count, 1);
    assert_eq!(summary.contacts_count, 0);
}

#[tokio::test]
async fn upcoming_lists_only_future_activities_soonest_first() {
    let w = World::new();
    let alice = w.alice.principal();
    let now = Utc::now();
    for (title, offset) in [("Later", 3), ("Past", -1), ("Soon", 1)] {
        records::create::<Activity, _>(
            &w.store,
            &alice,
            &activity(title, ActivityType::Call, now + Duration::days(offset)),
        )
        .await
        .unwrap();
    }

    let summary = summarize(&w.store, &alice, now).await.unwrap();
    let titles: Vec<&str> = summary
        .upcoming_activities
        .iter()
        .map(|a| a.title.as_str())
        .collect();

    assert_eq!(titles, ["Soon", "Later"]);
    assert_eq!(summary.recent_activities.len(), 3);
}
