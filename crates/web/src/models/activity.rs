//! Activities: scheduled calls, meetings, emails and tasks.

use chrono::{DateTime, Utc};

use crm_core::{ActivityId, ActivityStatus, ActivityType, Owned, UserId};

use super::Record;

/// An activity (domain type).
///
/// `completed_at` is `Some` exactly when `status` is `Completed`; only
/// [`Activity::complete`] moves an activity into that state.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Activity {
    pub id: ActivityId,
    pub title: String,
    pub activity_type: ActivityType,
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
    pub status: ActivityStatus,
    pub completed_at: Option<DateTime<Utc>>,
    pub assigned_to: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Activity {
    /// Mark the activity completed at `at`. Completing twice moves
    /// `completed_at` forward.
    pub fn complete(&mut self, at: DateTime<Utc>) {
        self.status = ActivityStatus::Completed;
        self.completed_at = Some(at);
        self.updated_at = at;
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == ActivityStatus::Completed
    }
}

/// Validated activity fields. Status and completion time are not editable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityInput {
    pub title: String,
    pub activity_type: ActivityType,
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
}

impl Owned for Activity {
    fn assigned_to(&self) -> UserId {
        self.assigned_to
    }
}

impl Record for Activity {
    type Id = ActivityId;
    type Input = ActivityInput;
    type Owner = UserId;

    const KIND: &'static str = "activity";

    fn id(&self) -> ActivityId {
        self.id
    }

    fn build(id: ActivityId, input: ActivityInput, owner: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: input.title,
            activity_type: input.activity_type,
            description: input.description,
            due_date: input.due_date,
            status: ActivityStatus::Open,
            completed_at: None,
            assigned_to: owner,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, input: ActivityInput, now: DateTime<Utc>) {
        self.title = input.title;
        self.activity_type = input.activity_type;
        self.description = input.description;
        self.due_date = input.due_date;
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn activity() -> Activity {
        let due = Utc.with_ymd_and_hms(2026, 3, 2, 14, 30, 0).single().unwrap_or_default();
        Activity::build(
            ActivityId::new(1),
            ActivityInput {
                title: "Kickoff".to_string(),
                activity_type: ActivityType::Meeting,
                description: None,
                due_date: due,
            },
            UserId::new(4),
            due - Duration::days(1),
        )
    }

    #[test]
    fn test_new_activity_is_open() {
        let activity = activity();
        assert_eq!(activity.status, ActivityStatus::Open);
        assert_eq!(activity.completed_at, None);
    }

    #[test]
    fn test_complete_sets_status_and_timestamp_together() {
        let mut activity = activity();
        let first = Utc::now();
        activity.complete(first);
        assert!(activity.is_completed());
        assert_eq!(activity.completed_at, Some(first));

        let second = first + Duration::minutes(5);
        activity.complete(second);
        assert!(activity.is_completed());
        assert_eq!(activity.completed_at, Some(second));
    }

    #[test]
    fn test_edit_keeps_completion_state() {
        let mut activity = activity();
        let done = Utc::now();
        activity.complete(done);
        activity.apply(
            ActivityInput {
                title: "Kickoff (moved)".to_string(),
                activity_type: ActivityType::Call,
                description: Some("dial-in".to_string()),
                due_date: done,
            },
            done,
        );
        assert!(activity.is_completed());
        assert_eq!(activity.completed_at, Some(done));
        assert_eq!(activity.assigned_to, UserId::new(4));
    }
}
