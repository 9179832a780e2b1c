//! Policy-guarded record operations.
//!
//! Each function takes the acting [`Principal`] explicitly. Denied deletes
//! and completions return [`Decision::Denied`] and leave the store untouched;
//! handlers answer them exactly like applied ones.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crm_core::{ActivityId, Decision, Owned, Principal, UserId};

use super::email::{EmailError, MailTransport};
use super::notifications::notify_activity_scheduled;
use crate::db::{ActivityStore, EntityStore, RepositoryError, UserStore};
use crate::models::{Activity, ActivityInput, Company, CurrentUser, Record};

/// Errors from record operations.
#[derive(Debug, Error)]
pub enum RecordError {
    /// No record with the requested id.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Store failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The activity was saved but its notification could not be sent.
    #[error("notification failed: {0}")]
    Mail(#[from] EmailError),
}

/// Fetch a record or fail with [`RecordError::NotFound`].
///
/// # Errors
///
/// Returns `NotFound` for a missing id, or the store error.
pub async fn fetch<R: Record, S: EntityStore<R>>(store: &S, id: R::Id) -> Result<R, RecordError> {
    store
        .get(id)
        .await?
        .ok_or(RecordError::NotFound(R::KIND))
}

/// Records the principal may list.
///
/// # Errors
///
/// Returns the store error.
pub async fn list<R: Record, S: EntityStore<R>>(
    store: &S,
    principal: &Principal,
) -> Result<Vec<R>, RecordError> {
    Ok(store.list(principal.scope()).await?)
}

/// Create an assignable record owned by the principal.
///
/// # Errors
///
/// Returns the store error.
pub async fn create<R, S>(store: &S, principal: &Principal, input: &R::Input) -> Result<R, RecordError>
where
    R: Record<Owner = UserId>,
    S: EntityStore<R>,
{
    let record = store.create(input, principal.user_id).await?;
    tracing::info!(kind = R::KIND, id = %record.id(), user_id = %principal.user_id, "Record created");
    Ok(record)
}

/// Create a company.
///
/// # Errors
///
/// Returns the store error.
pub async fn create_company<S: EntityStore<Company>>(
    store: &S,
    principal: &Principal,
    input: &<Company as Record>::Input,
) -> Result<Company, RecordError> {
    let company = store.create(input, ()).await?;
    tracing::info!(kind = Company::KIND, id = %company.id, user_id = %principal.user_id, "Record created");
    Ok(company)
}

/// Overwrite a record's editable fields. Any authenticated user may edit.
///
/// # Errors
///
/// Returns `NotFound` for a missing id, or the store error.
pub async fn update<R: Record, S: EntityStore<R>>(
    store: &S,
    principal: &Principal,
    id: R::Id,
    input: &R::Input,
) -> Result<R, RecordError> {
    match store.update(id, input).await {
        Ok(record) => {
            tracing::info!(kind = R::KIND, id = %id, user_id = %principal.user_id, "Record updated");
            Ok(record)
        }
        Err(RepositoryError::NotFound) => Err(RecordError::NotFound(R::KIND)),
        Err(e) => Err(e.into()),
    }
}

/// Delete an assignable record if the principal is its assignee or an admin.
///
/// # Errors
///
/// Returns `NotFound` for a missing id, or the store error.
pub async fn delete<R, S>(store: &S, principal: &Principal, id: R::Id) -> Result<Decision, RecordError>
where
    R: Record + Owned,
    S: EntityStore<R>,
{
    let record = fetch(store, id).await?;
    let decision = principal.decide(&record);
    apply_delete::<R, S>(store, principal, id, decision).await
}

/// Delete a company if the principal is an admin.
///
/// # Errors
///
/// Returns `NotFound` for a missing id, or the store error.
pub async fn delete_company<S: EntityStore<Company>>(
    store: &S,
    principal: &Principal,
    id: <Company as Record>::Id,
) -> Result<Decision, RecordError> {
    fetch::<Company, S>(store, id).await?;
    let decision = principal.decide_company_delete();
    apply_delete::<Company, S>(store, principal, id, decision).await
}

async fn apply_delete<R: Record, S: EntityStore<R>>(
    store: &S,
    principal: &Principal,
    id: R::Id,
    decision: Decision,
) -> Result<Decision, RecordError> {
    match decision {
        Decision::Applied => {
            store.delete(id).await?;
            tracing::info!(kind = R::KIND, id = %id, user_id = %principal.user_id, "Record deleted");
        }
        Decision::Denied => {
            tracing::warn!(kind = R::KIND, id = %id, user_id = %principal.user_id, "Delete denied");
        }
    }
    Ok(decision)
}

/// Mark an activity completed if the principal is its assignee or an admin.
///
/// # Errors
///
/// Returns `NotFound` for a missing id, or the store error.
pub async fn complete_activity<S: ActivityStore>(
    store: &S,
    principal: &Principal,
    id: ActivityId,
    now: DateTime<Utc>,
) -> Result<Decision, RecordError> {
    let activity: Activity = fetch(store, id).await?;
    let decision = principal.decide(&activity);

    match decision {
        Decision::Applied => {
            store.complete(id, now).await.map_err(|e| match e {
                RepositoryError::NotFound => RecordError::NotFound(Activity::KIND),
                other => other.into(),
            })?;
            tracing::info!(id = %id, user_id = %principal.user_id, "Activity completed");
        }
        Decision::Denied => {
            tracing::warn!(id = %id, user_id = %principal.user_id, "Completion denied");
        }
    }
    Ok(decision)
}

/// Create an activity assigned to `actor` and notify the assignee.
///
/// The activity is committed before the email is sent; a transport failure
/// is returned as [`RecordError::Mail`] with the record left in place.
///
/// # Errors
///
/// Returns the store error, or `Mail` if the notification fails.
pub async fn create_activity<A, U, M>(
    activities: &A,
    users: &U,
    mailer: &M,
    actor: &CurrentUser,
    input: &ActivityInput,
) -> Result<Activity, RecordError>
where
    A: ActivityStore,
    U: UserStore,
    M: MailTransport,
{
    let principal = actor.principal();
    let activity = create::<Activity, A>(activities, &principal, input).await?;

    let assignee_email = users
        .get_user(activity.assigned_to)
        .await?
        .and_then(|user| user.email);

    if let Err(e) =
        notify_activity_scheduled(mailer, assignee_email.as_ref(), &activity, &actor.username).await
    {
        tracing::error!(activity_id = %activity.id, error = %e, "Activity notification failed");
        return Err(e.into());
    }

    Ok(activity)
}
