//! In-memory implementation of the store traits.
//!
//! Backs the service-level tests. Mirrors the `PostgreSQL` behaviour that
//! services rely on: scoped listing, `ON DELETE SET NULL` for company
//! references, and the single-write completion transition.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crm_core::{
    ActivityId, CompanyId, ContactId, DealId, DealStage, Email, LeadId, Owned, Scope, UserId,
};

use super::{ActivityStore, DashboardStore, EntityStore, RepositoryError, UserStore};
use crate::models::{Activity, Company, Contact, Deal, Lead, Record, User};

/// Backing tables. Ids come from one shared sequence.
#[derive(Default)]
pub struct Tables {
    next_id: i32,
    users: BTreeMap<UserId, (User, String)>,
    companies: BTreeMap<CompanyId, Company>,
    contacts: BTreeMap<ContactId, Contact>,
    leads: BTreeMap<LeadId, Lead>,
    deals: BTreeMap<DealId, Deal>,
    activities: BTreeMap<ActivityId, Activity>,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

/// A record type with a table in [`MemoryStore`].
pub trait MemoryRecord: Record {
    fn table(tables: &mut Tables) -> &mut BTreeMap<Self::Id, Self>;

    /// Whether the record shows up in a list for `scope`.
    fn in_scope(&self, scope: Scope) -> bool;

    /// Cascade effects of deleting `id`.
    fn on_delete(_tables: &mut Tables, _id: Self::Id) {}
}

macro_rules! owned_memory_record {
    ($ty:ty, $field:ident) => {
        impl MemoryRecord for $ty {
            fn table(tables: &mut Tables) -> &mut BTreeMap<Self::Id, Self> {
                &mut tables.$field
            }

            fn in_scope(&self, scope: Scope) -> bool {
                scope.includes(self.assigned_to())
            }
        }
    };
}

owned_memory_record!(Contact, contacts);
owned_memory_record!(Lead, leads);
owned_memory_record!(Deal, deals);
owned_memory_record!(Activity, activities);

impl MemoryRecord for Company {
    fn table(tables: &mut Tables) -> &mut BTreeMap<Self::Id, Self> {
        &mut tables.companies
    }

    fn in_scope(&self, _scope: Scope) -> bool {
        true
    }

    fn on_delete(tables: &mut Tables, id: Self::Id) {
        for contact in tables.contacts.values_mut() {
            if contact.company_id == Some(id) {
                contact.company_id = None;
            }
        }
        for deal in tables.deals.values_mut() {
            if deal.company_id == Some(id) {
                deal.company_id = None;
            }
        }
    }
}

/// Thread-safe in-memory store.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a user with an already-hashed password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username is taken.
    pub fn add_user(
        &self,
        username: &str,
        email: Option<Email>,
        password_hash: &str,
        is_admin: bool,
    ) -> Result<User, RepositoryError> {
        let mut tables = self.lock();
        if tables.users.values().any(|(u, _)| u.username == username) {
            return Err(RepositoryError::Conflict("username already exists".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: UserId::new(tables.next_id()),
            username: username.to_string(),
            email,
            is_admin,
            created_at: now,
            updated_at: now,
        };
        tables
            .users
            .insert(user.id, (user.clone(), password_hash.to_string()));
        Ok(user)
    }

    /// Number of stored records of type `R`.
    #[must_use]
    pub fn count<R: MemoryRecord>(&self) -> usize {
        R::table(&mut self.lock()).len()
    }
}

impl<R: MemoryRecord> EntityStore<R> for MemoryStore {
    async fn list(&self, scope: Scope) -> Result<Vec<R>, RepositoryError> {
        let mut tables = self.lock();
        Ok(R::table(&mut tables)
            .values()
            .rev()
            .filter(|r| r.in_scope(scope))
            .cloned()
            .collect())
    }

    async fn get(&self, id: R::Id) -> Result<Option<R>, RepositoryError> {
        Ok(R::table(&mut self.lock()).get(&id).cloned())
    }

    async fn create(&self, input: &R::Input, owner: R::Owner) -> Result<R, RepositoryError> {
        let mut tables = self.lock();
        let id = R::Id::from(tables.next_id());
        let record = R::build(id, input.clone(), owner, Utc::now());
        R::table(&mut tables).insert(id, record.clone());
        Ok(record)
    }

    async fn update(&self, id: R::Id, input: &R::Input) -> Result<R, RepositoryError> {
        let mut tables = self.lock();
        let record = R::table(&mut tables)
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        record.apply(input.clone(), Utc::now());
        Ok(record.clone())
    }

    async fn delete(&self, id: R::Id) -> Result<(), RepositoryError> {
        let mut tables = self.lock();
        if R::table(&mut tables).remove(&id).is_some() {
            R::on_delete(&mut tables, id);
        }
        Ok(())
    }
}

impl ActivityStore for MemoryStore {
    async fn complete(&self, id: ActivityId, at: DateTime<Utc>) -> Result<Activity, RepositoryError> {
        let mut tables = self.lock();
        let activity = tables
            .activities
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        activity.complete(at);
        Ok(activity.clone())
    }
}

impl DashboardStore for MemoryStore {
    async fn count_companies(&self) -> Result<i64, RepositoryError> {
        Ok(count_i64(self.lock().companies.len()))
    }

    async fn count_contacts(&self, scope: Scope) -> Result<i64, RepositoryError> {
        Ok(count_in_scope(self.lock().contacts.values(), scope))
    }

    async fn count_leads(&self, scope: Scope) -> Result<i64, RepositoryError> {
        Ok(count_in_scope(self.lock().leads.values(), scope))
    }

    async fn count_deals(&self, scope: Scope) -> Result<i64, RepositoryError> {
        Ok(count_in_scope(self.lock().deals.values(), scope))
    }

    async fn recent_activities(
        &self,
        scope: Scope,
        limit: i64,
    ) -> Result<Vec<Activity>, RepositoryError> {
        let tables = self.lock();
        let mut activities: Vec<Activity> = scope.filter(tables.activities.values().cloned());
        activities.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        activities.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(activities)
    }

    async fn upcoming_activities(
        &self,
        scope: Scope,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Activity>, RepositoryError> {
        let tables = self.lock();
        let mut activities: Vec<Activity> = scope
            .filter(tables.activities.values().cloned())
            .into_iter()
            .filter(|a| a.due_date >= now)
            .collect();
        activities.sort_by_key(|a| (a.due_date, a.id));
        activities.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(activities)
    }

    async fn total_pipeline_value(&self) -> Result<Decimal, RepositoryError> {
        Ok(crm_core::metrics::pipeline_value(
            self.lock().deals.values().map(|d| d.amount),
        ))
    }

    async fn count_won_deals(&self) -> Result<i64, RepositoryError> {
        Ok(count_i64(
            self.lock()
                .deals
                .values()
                .filter(|d| d.stage == DealStage::Won)
                .count(),
        ))
    }
}

impl UserStore for MemoryStore {
    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.lock().users.get(&id).map(|(u, _)| u.clone()))
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|(u, _)| u.username == username)
            .cloned())
    }
}

fn count_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn count_in_scope<'a, R: Owned + 'a>(records: impl Iterator<Item = &'a R>, scope: Scope) -> i64 {
    count_i64(records.filter(|r| scope.includes(r.assigned_to())).count())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::models::{CompanyInput, ContactInput, DealInput};

    fn company_input(name: &str) -> CompanyInput {
        CompanyInput {
            name: name.to_string(),
            industry: None,
            website: None,
            phone: None,
            address: None,
        }
    }

    #[tokio::test]
    async fn test_deleting_company_detaches_contacts_and_deals() {
        let store = MemoryStore::new();
        let owner = UserId::new(1);
        let acme = EntityStore::<Company>::create(&store, &company_input("Acme"), ())
            .await
            .unwrap();

        let contact = EntityStore::<Contact>::create(
            &store,
            &ContactInput {
                first_name: "Wile".to_string(),
                last_name: Some("Coyote".to_string()),
                email: None,
                phone: None,
                position: None,
                company_id: Some(acme.id),
            },
            owner,
        )
        .await
        .unwrap();
        let deal = EntityStore::<Deal>::create(
            &store,
            &DealInput {
                title: "Rockets".to_string(),
                amount: Decimal::new(500, 0),
                stage: DealStage::Proposal,
                company_id: Some(acme.id),
                close_date: None,
            },
            owner,
        )
        .await
        .unwrap();

        EntityStore::<Company>::delete(&store, acme.id).await.unwrap();

        let contact = EntityStore::<Contact>::get(&store, contact.id)
            .await
            .unwrap()
            .unwrap();
        let deal = EntityStore::<Deal>::get(&store, deal.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(contact.company_id, None);
        assert_eq!(deal.company_id, None);
        assert_eq!(store.count::<Company>(), 0);
    }

    #[tokio::test]
    async fn test_update_missing_record_is_not_found() {
        let store = MemoryStore::new();
        let result =
            EntityStore::<Company>::update(&store, CompanyId::new(404), &company_input("Ghost"))
                .await;
        assert!(matches!(result, Err(RepositoryError::NotFound)));
    }

    #[test]
    fn test_duplicate_username_conflicts() {
        let store = MemoryStore::new();
        store.add_user("sam", None, "hash", false).unwrap();
        assert!(matches!(
            store.add_user("sam", None, "hash", true),
            Err(RepositoryError::Conflict(_))
        ));
    }
}
