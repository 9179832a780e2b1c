//! Ownership scoping and the silent-deny delete contract.

#![allow(clippy::unwrap_used)]

use crm_core::{Decision, DealStage};
use crm_integration_tests::{World, company, contact, deal, lead};
use crm_web::db::EntityStore;
use crm_web::models::{Company, Contact, Deal, Lead};
use crm_web::services::records::{self, RecordError};

#[tokio::test]
async fn non_admin_lists_only_assigned_records() {
    let w = World::new();
    let alice = w.alice.principal();
    let bob = w.bob.principal();

    for name in ["A1", "A2"] {
        records::create::<Lead, _>(&w.store, &alice, &lead(name)).await.unwrap();
    }
    records::create::<Lead, _>(&w.store, &bob, &lead("B1")).await.unwrap();

    let alices: Vec<Lead> = records::list(&w.store, &alice).await.unwrap();
    assert_eq!(alices.len(), 2);
    assert!(alices.iter().all(|l| l.assigned_to == w.alice.id));

    let bobs: Vec<Lead> = records::list(&w.store, &bob).await.unwrap();
    assert_eq!(bobs.len(), 1);
    assert_eq!(bobs.first().map(|l| l.name.as_str()), Some("B1"));

    let all: Vec<Lead> = records::list(&w.store, &w.admin.principal()).await.unwrap();
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn created_records_are_assigned_to_the_creator() {
    let w = World::new();
    let created = records::create::<Deal, _>(
        &w.store,
        &w.bob.principal(),
        &deal("Widgets", 10, DealStage::Prospecting),
    )
    .await
    .unwrap();

    assert_eq!(created.assigned_to, w.bob.id);
}

#[tokio::test]
async fn non_owner_delete_is_a_silent_no_op() {
    let w = World::new();
    let created = records::create::<Contact, _>(&w.store, &w.alice.principal(), &contact("Ada", None))
        .await
        .unwrap();

    let decision = records::delete::<Contact, _>(&w.store, &w.bob.principal(), created.id)
        .await
        .unwrap();

    assert_eq!(decision, Decision::Denied);
    assert_eq!(w.store.count::<Contact>(), 1);
    assert!(
        EntityStore::<Contact>::get(&w.store, created.id)
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn owner_and_admin_can_delete() {
    let w = World::new();
    let alice = w.alice.principal();
    let first = records::create::<Lead, _>(&w.store, &alice, &lead("One")).await.unwrap();
    let second = records::create::<Lead, _>(&w.store, &alice, &lead("Two")).await.unwrap();

    let by_owner = records::delete::<Lead, _>(&w.store, &alice, first.id).await.unwrap();
    let by_admin = records::delete::<Lead, _>(&w.store, &w.admin.principal(), second.id)
        .await
        .unwrap();

    assert_eq!(by_owner, Decision::Applied);
    assert_eq!(by_admin, Decision::Applied);
    assert_eq!(w.store.count::<Lead>(), 0);
}

#[tokio::test]
async fn delete_of_missing_record_is_not_found() {
    let w = World::new();
    let result =
        records::delete::<Lead, _>(&w.store, &w.admin.principal(), crm_core::LeadId::new(999)).await;

    assert!(matches!(result, Err(RecordError::NotFound("lead"))));
}

#[tokio::test]
async fn any_user_may_edit_any_record() {
    let w = World::new();
    let created = records::create::<Lead, _>(&w.store, &w.alice.principal(), &lead("Before"))
        .await
        .unwrap();

    let updated = records::update::<Lead, _>(&w.store, &w.bob.principal(), created.id, &lead("After"))
        .await
        .unwrap();

    assert_eq!(updated.name, "After");
    assert_eq!(updated.assigned_to, w.alice.id);
}

#[tokio::test]
async fn companies_are_shared_but_only_admins_delete_them() {
    let w = World::new();
    let acme = records::create_company(&w.store, &w.alice.principal(), &company("Acme"))
        .await
        .unwrap();

    let seen_by_bob: Vec<Company> = records::list(&w.store, &w.bob.principal()).await.unwrap();
    assert_eq!(seen_by_bob.len(), 1);

    let denied = records::delete_company(&w.store, &w.alice.principal(), acme.id)
        .await
        .unwrap();
    assert_eq!(denied, Decision::Denied);
    assert_eq!(w.store.count::<Company>(), 1);

    let applied = records::delete_company(&w.store, &w.admin.principal(), acme.id)
        .await
        .unwrap();
    assert_eq!(applied, Decision::Applied);
    assert_eq!(w.store.count::<Company>(), 0);
}

#[tokio::test]
async fn deleting_a_company_keeps_its_contacts() {
    let w = World::new();
    let acme = records::create_company(&w.store, &w.admin.principal(), &company("Acme"))
        .await
        .unwrap();
    let ada = records::create::<Contact, _>(
        &w.store,
        &w.alice.principal(),
        &contact("Ada", Some(acme.id)),
    )
    .await
    .unwrap();

    let decision = records::delete_company(&w.store, &w.admin.principal(), acme.id)
        .await
        .unwrap();
    assert_eq!(decision, Decision::Applied);

    let ada = EntityStore::<Contact>::get(&w.store, ada.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ada.company_id, None);
}
