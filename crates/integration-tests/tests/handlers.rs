//! Logged-in requests against the record screens.
//!
//! Permission denials answer exactly like successful mutations, invalid
//! forms come back with field errors and nothing stored, and ids that name
//! no record answer 404.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use chrono::{Duration, Utc};

use crm_core::{ActivityStatus, ActivityType};
use crm_integration_tests::{Site, activity, body_text, get, lead, location, post_form};
use crm_web::db::EntityStore;
use crm_web::db::memory::MemoryStore;
use crm_web::models::{Activity, Deal, Lead};

// =============================================================================
// Silent denials
// =============================================================================

#[tokio::test]
async fn non_owner_delete_redirects_and_keeps_the_lead() {
    let site = Site::new();
    let owned = <MemoryStore as EntityStore<Lead>>::create(&site.store, &lead("Acme"), site.alice.id)
        .await
        .unwrap();
    let cookie = site.login("bob").await;

    let response = site
        .send(post_form(&format!("/leads/{}/delete/", owned.id), Some(&cookie), ""))
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/leads/");
    let kept = <MemoryStore as EntityStore<Lead>>::get(&site.store, owned.id)
        .await
        .unwrap();
    assert!(kept.is_some());
}

#[tokio::test]
async fn owner_delete_removes_the_lead() {
    let site = Site::new();
    let owned = <MemoryStore as EntityStore<Lead>>::create(&site.store, &lead("Acme"), site.alice.id)
        .await
        .unwrap();
    let cookie = site.login("alice").await;

    let response = site
        .send(post_form(&format!("/leads/{}/delete/", owned.id), Some(&cookie), ""))
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/leads/");
    assert_eq!(site.store.count::<Lead>(), 0);
}

#[tokio::test]
async fn non_owner_completion_redirects_and_leaves_activity_open() {
    let site = Site::new();
    let due = Utc::now() + Duration::days(2);
    let scheduled = <MemoryStore as EntityStore<Activity>>::create(
        &site.store,
        &activity("Kickoff call", ActivityType::Call, due),
        site.alice.id,
    )
    .await
    .unwrap();
    let cookie = site.login("bob").await;

    let response = site
        .send(post_form(
            &format!("/activities/{}/complete/", scheduled.id),
            Some(&cookie),
            "",
        ))
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/activities/");
    let stored = <MemoryStore as EntityStore<Activity>>::get(&site.store, scheduled.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, ActivityStatus::Open);
    assert!(stored.completed_at.is_none());
}

#[tokio::test]
async fn admin_completion_marks_activity_completed() {
    let site = Site::new();
    let due = Utc::now() + Duration::days(2);
    let scheduled = <MemoryStore as EntityStore<Activity>>::create(
        &site.store,
        &activity("Kickoff call", ActivityType::Call, due),
        site.alice.id,
    )
    .await
    .unwrap();
    let cookie = site.login("root").await;

    let response = site
        .send(post_form(
            &format!("/activities/{}/complete/", scheduled.id),
            Some(&cookie),
            "",
        ))
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let stored = <MemoryStore as EntityStore<Activity>>::get(&site.store, scheduled.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, ActivityStatus::Completed);
    assert!(stored.completed_at.is_some());
}

// =============================================================================
// Open detail and edit
// =============================================================================

#[tokio::test]
async fn any_user_views_and_edits_another_users_lead() {
    let site = Site::new();
    let owned = <MemoryStore as EntityStore<Lead>>::create(&site.store, &lead("Acme"), site.alice.id)
        .await
        .unwrap();
    let cookie = site.login("bob").await;

    let response = site
        .send(get(&format!("/leads/{}/", owned.id), Some(&cookie)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Acme"));

    let response = site
        .send(post_form(
            &format!("/leads/{}/edit/", owned.id),
            Some(&cookie),
            "name=Acme+Corp&email=&phone=&source=&status=contacted&notes=",
        ))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/leads/");

    let stored = <MemoryStore as EntityStore<Lead>>::get(&site.store, owned.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.name, "Acme Corp");
    assert_eq!(stored.assigned_to, site.alice.id);
}

// =============================================================================
// Validation
// =============================================================================

#[tokio::test]
async fn invalid_deal_is_rerendered_without_saving() {
    let site = Site::new();
    let cookie = site.login("alice").await;

    let response = site
        .send(post_form(
            "/deals/add/",
            Some(&cookie),
            "title=&amount=-5&stage=won&company=&close_date=",
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("This field is required."));
    assert!(html.contains("Ensure this value is greater than or equal to 0."));
    assert_eq!(site.store.count::<Deal>(), 0);
}

#[tokio::test]
async fn valid_lead_is_created_for_the_submitter() {
    let site = Site::new();
    let cookie = site.login("bob").await;

    let response = site
        .send(post_form(
            "/leads/add/",
            Some(&cookie),
            "name=Globex&email=&phone=&source=referral&status=new&notes=",
        ))
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/leads/");
    let leads = <MemoryStore as EntityStore<Lead>>::list(&site.store, site.bob.principal().scope())
        .await
        .unwrap();
    assert_eq!(leads.len(), 1);
    assert!(leads.iter().all(|l| l.assigned_to == site.bob.id));
}

// =============================================================================
// Missing records
// =============================================================================

#[tokio::test]
async fn missing_or_malformed_ids_are_not_found() {
    let site = Site::new();
    let cookie = site.login("root").await;

    for uri in [
        "/leads/999/",
        "/leads/abc/",
        "/contacts/99999999999/",
        "/deals/999/edit/",
        "/companies/-/",
        "/activities/999/",
    ] {
        let response = site.send(get(uri, Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
    }

    for uri in ["/leads/999/delete/", "/activities/999/complete/"] {
        let response = site.send(post_form(uri, Some(&cookie), "")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}
