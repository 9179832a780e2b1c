//! Store selection for request handlers.
//!
//! Handlers reach every table through [`Stores`]. Production wraps the
//! `PostgreSQL` pool; the `memory-store` feature adds a variant backed by
//! [`MemoryStore`](super::memory::MemoryStore) so the router can be driven
//! end to end without a database.

#[cfg(any(test, feature = "memory-store"))]
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crm_core::{ActivityId, CompanyId, Scope, UserId};

#[cfg(any(test, feature = "memory-store"))]
use super::memory::MemoryStore;
use super::{
    ActivityRepository, ActivityStore, CompanyRepository, ContactRepository, DashboardRepository,
    DashboardStore, DealRepository, EntityStore, LeadRepository, RepositoryError, UserRepository,
    UserStore,
};
use crate::models::{Activity, Company, Contact, Deal, Lead, Record, User};

/// The record store behind the web handlers.
#[derive(Clone)]
pub enum Stores {
    /// `PostgreSQL` repositories over a shared pool.
    Postgres(PgPool),
    /// In-process tables.
    #[cfg(any(test, feature = "memory-store"))]
    Memory(Arc<MemoryStore>),
}

impl Stores {
    /// Readiness check: `SELECT 1` against the pool.
    ///
    /// # Errors
    ///
    /// Returns the database error if the pool cannot serve a query.
    pub async fn ping(&self) -> Result<(), RepositoryError> {
        match self {
            Self::Postgres(pool) => {
                sqlx::query("SELECT 1").fetch_one(pool).await?;
                Ok(())
            }
            #[cfg(any(test, feature = "memory-store"))]
            Self::Memory(_) => Ok(()),
        }
    }

    /// Contacts attached to a company, inside `scope`.
    ///
    /// # Errors
    ///
    /// Returns the store error.
    pub async fn contacts_for_company(
        &self,
        company_id: CompanyId,
        scope: Scope,
    ) -> Result<Vec<Contact>, RepositoryError> {
        match self {
            Self::Postgres(pool) => {
                ContactRepository::new(pool)
                    .list_for_company(company_id, scope)
                    .await
            }
            #[cfg(any(test, feature = "memory-store"))]
            Self::Memory(memory) => {
                let contacts = <MemoryStore as EntityStore<Contact>>::list(memory, scope).await?;
                Ok(contacts
                    .into_iter()
                    .filter(|c| c.company_id == Some(company_id))
                    .collect())
            }
        }
    }

    /// Deals attached to a company, inside `scope`.
    ///
    /// # Errors
    ///
    /// Returns the store error.
    pub async fn deals_for_company(
        &self,
        company_id: CompanyId,
        scope: Scope,
    ) -> Result<Vec<Deal>, RepositoryError> {
        match self {
            Self::Postgres(pool) => {
                DealRepository::new(pool)
                    .list_for_company(company_id, scope)
                    .await
            }
            #[cfg(any(test, feature = "memory-store"))]
            Self::Memory(memory) => {
                let deals = <MemoryStore as EntityStore<Deal>>::list(memory, scope).await?;
                Ok(deals
                    .into_iter()
                    .filter(|d| d.company_id == Some(company_id))
                    .collect())
            }
        }
    }
}

macro_rules! entity_store {
    ($record:ty, $repo:ident) => {
        impl EntityStore<$record> for Stores {
            async fn list(&self, scope: Scope) -> Result<Vec<$record>, RepositoryError> {
                match self {
                    Self::Postgres(pool) => $repo::new(pool).list(scope).await,
                    #[cfg(any(test, feature = "memory-store"))]
                    Self::Memory(memory) => {
                        <MemoryStore as EntityStore<$record>>::list(memory, scope).await
                    }
                }
            }

            async fn get(
                &self,
                id: <$record as Record>::Id,
            ) -> Result<Option<$record>, RepositoryError> {
                match self {
                    Self::Postgres(pool) => $repo::new(pool).get(id).await,
                    #[cfg(any(test, feature = "memory-store"))]
                    Self::Memory(memory) => {
                        <MemoryStore as EntityStore<$record>>::get(memory, id).await
                    }
                }
            }

            async fn create(
                &self,
                input: &<$record as Record>::Input,
                owner: <$record as Record>::Owner,
            ) -> Result<$record, RepositoryError> {
                match self {
                    Self::Postgres(pool) => $repo::new(pool).create(input, owner).await,
                    #[cfg(any(test, feature = "memory-store"))]
                    Self::Memory(memory) => {
                        <MemoryStore as EntityStore<$record>>::create(memory, input, owner).await
                    }
                }
            }

            async fn update(
                &self,
                id: <$record as Record>::Id,
                input: &<$record as Record>::Input,
            ) -> Result<$record, RepositoryError> {
                match self {
                    Self::Postgres(pool) => $repo::new(pool).update(id, input).await,
                    #[cfg(any(test, feature = "memory-store"))]
                    Self::Memory(memory) => {
                        <MemoryStore as EntityStore<$record>>::update(memory, id, input).await
                    }
                }
            }

            async fn delete(&self, id: <$record as Record>::Id) -> Result<(), RepositoryError> {
                match self {
                    Self::Postgres(pool) => $repo::new(pool).delete(id).await,
                    #[cfg(any(test, feature = "memory-store"))]
                    Self::Memory(memory) => {
                        <MemoryStore as EntityStore<$record>>::delete(memory, id).await
                    }
                }
            }
        }
    };
}

entity_store!(Company, CompanyRepository);
entity_store!(Contact, ContactRepository);
entity_store!(Lead, LeadRepository);
entity_store!(Deal, DealRepository);
entity_store!(Activity, ActivityRepository);

impl ActivityStore for Stores {
    async fn complete(&self, id: ActivityId, at: DateTime<Utc>) -> Result<Activity, RepositoryError> {
        match self {
            Self::Postgres(pool) => ActivityRepository::new(pool).complete(id, at).await,
            #[cfg(any(test, feature = "memory-store"))]
            Self::Memory(memory) => memory.complete(id, at).await,
        }
    }
}

impl DashboardStore for Stores {
    async fn count_companies(&self) -> Result<i64, RepositoryError> {
        match self {
            Self::Postgres(pool) => DashboardRepository::new(pool).count_companies().await,
            #[cfg(any(test, feature = "memory-store"))]
            Self::Memory(memory) => memory.count_companies().await,
        }
    }

    async fn count_contacts(&self, scope: Scope) -> Result<i64, RepositoryError> {
        match self {
            Self::Postgres(pool) => DashboardRepository::new(pool).count_contacts(scope).await,
            #[cfg(any(test, feature = "memory-store"))]
            Self::Memory(memory) => memory.count_contacts(scope).await,
        }
    }

    async fn count_leads(&self, scope: Scope) -> Result<i64, RepositoryError> {
        match self {
            Self::Postgres(pool) => DashboardRepository::new(pool).count_leads(scope).await,
            #[cfg(any(test, feature = "memory-store"))]
            Self::Memory(memory) => memory.count_leads(scope).await,
        }
    }

    async fn count_deals(&self, scope: Scope) -> Result<i64, RepositoryError> {
        match self {
            Self::Postgres(pool) => DashboardRepository::new(pool).count_deals(scope).await,
            #[cfg(any(test, feature = "memory-store"))]
            Self::Memory(memory) => memory.count_deals(scope).await,
        }
    }

    async fn recent_activities(
        &self,
        scope: Scope,
        limit: i64,
    ) -> Result<Vec<Activity>, RepositoryError> {
        match self {
            Self::Postgres(pool) => {
                DashboardRepository::new(pool)
                    .recent_activities(scope, limit)
                    .await
            }
            #[cfg(any(test, feature = "memory-store"))]
            Self::Memory(memory) => memory.recent_activities(scope, limit).await,
        }
    }

    async fn upcoming_activities(
        &self,
        scope: Scope,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Activity>, RepositoryError> {
        match self {
            Self::Postgres(pool) => {
                DashboardRepository::new(pool)
                    .upcoming_activities(scope, now, limit)
                    .await
            }
            #[cfg(any(test, feature = "memory-store"))]
            Self::Memory(memory) => memory.upcoming_activities(scope, now, limit).await,
        }
    }

    async fn total_pipeline_value(&self) -> Result<Decimal, RepositoryError> {
        match self {
            Self::Postgres(pool) => DashboardRepository::new(pool).total_pipeline_value().await,
            #[cfg(any(test, feature = "memory-store"))]
            Self::Memory(memory) => memory.total_pipeline_value().await,
        }
    }

    async fn count_won_deals(&self) -> Result<i64, RepositoryError> {
        match self {
            Self::Postgres(pool) => DashboardRepository::new(pool).count_won_deals().await,
            #[cfg(any(test, feature = "memory-store"))]
            Self::Memory(memory) => memory.count_won_deals().await,
        }
    }
}

impl UserStore for Stores {
    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        match self {
            Self::Postgres(pool) => UserRepository::new(pool).get_user(id).await,
            #[cfg(any(test, feature = "memory-store"))]
            Self::Memory(memory) => memory.get_user(id).await,
        }
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        match self {
            Self::Postgres(pool) => UserRepository::new(pool).find_credentials(username).await,
            #[cfg(any(test, feature = "memory-store"))]
            Self::Memory(memory) => memory.find_credentials(username).await,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crm_core::Principal;

    use super::*;
    use crate::models::LeadInput;

    fn memory() -> (Arc<MemoryStore>, Stores) {
        let store = Arc::new(MemoryStore::new());
        (Arc::clone(&store), Stores::Memory(store))
    }

    #[tokio::test]
    async fn test_memory_variant_shares_tables() {
        let (store, stores) = memory();
        let owner = Principal::new(UserId::new(7), false);
        let input = LeadInput {
            name: "Road Runner".to_string(),
            email: None,
            phone: None,
            source: None,
            status: crm_core::LeadStatus::New,
            notes: None,
        };

        let lead: Lead = EntityStore::<Lead>::create(&stores, &input, owner.user_id)
            .await
            .unwrap();

        assert_eq!(store.count::<Lead>(), 1);
        let listed = EntityStore::<Lead>::list(&stores, owner.scope()).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed.iter().all(|l| l.id == lead.id));
    }

    #[tokio::test]
    async fn test_memory_ping_is_ready() {
        let (_, stores) = memory();
        assert!(stores.ping().await.is_ok());
    }
}
