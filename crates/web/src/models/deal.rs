//! Deals: revenue opportunities moving through the pipeline.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crm_core::{CompanyId, DealId, DealStage, Owned, UserId};

use super::Record;

/// A deal (domain type).
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Deal {
    pub id: DealId,
    pub title: String,
    /// Never negative; enforced by the form and a `CHECK` constraint.
    pub amount: Decimal,
    pub stage: DealStage,
    pub company_id: Option<CompanyId>,
    pub close_date: Option<NaiveDate>,
    pub assigned_to: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated deal fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealInput {
    pub title: String,
    pub amount: Decimal,
    pub stage: DealStage,
    pub company_id: Option<CompanyId>,
    pub close_date: Option<NaiveDate>,
}

impl Owned for Deal {
    fn assigned_to(&self) -> UserId {
        self.assigned_to
    }
}

impl Record for Deal {
    type Id = DealId;
    type Input = DealInput;
    type Owner = UserId;

    const KIND: &'static str = "deal";

    fn id(&self) -> DealId {
        self.id
    }

    fn build(id: DealId, input: DealInput, owner: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: input.title,
            amount: input.amount,
            stage: input.stage,
            company_id: input.company_id,
            close_date: input.close_date,
            assigned_to: owner,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, input: DealInput, now: DateTime<Utc>) {
        self.title = input.title;
        self.amount = input.amount;
        self.stage = input.stage;
        self.company_id = input.company_id;
        self.close_date = input.close_date;
        self.updated_at = now;
    }
}
