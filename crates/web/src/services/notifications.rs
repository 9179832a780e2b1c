//! Activity scheduling notifications.
//!
//! One plain-text email per newly created activity, sent to the assignee
//! when they have an address on file.

use askama::Template;

use crm_core::Email;

use super::email::{EmailError, MailTransport, OutgoingEmail};
use crate::models::Activity;

/// Format for the "Scheduled On" line.
pub const SCHEDULED_ON_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Template)]
#[template(path = "email/activity_scheduled.txt")]
struct ActivityScheduledText<'a> {
    activity_type: &'a str,
    title: &'a str,
    type_label: &'a str,
    scheduled_on: String,
    created_by: &'a str,
}

/// Build the notification for `activity`.
///
/// # Errors
///
/// Returns `EmailError::Template` if the body fails to render.
pub fn activity_scheduled_email(
    to: Email,
    activity: &Activity,
    created_by: &str,
) -> Result<OutgoingEmail, EmailError> {
    let body = ActivityScheduledText {
        activity_type: activity.activity_type.as_str(),
        title: &activity.title,
        type_label: activity.activity_type.label(),
        scheduled_on: activity.due_date.format(SCHEDULED_ON_FORMAT).to_string(),
        created_by,
    }
    .render()?;

    Ok(OutgoingEmail {
        to,
        subject: format!(
            "New {} Scheduled: {}",
            activity.activity_type.label(),
            activity.title
        ),
        body,
    })
}

/// Send the scheduling email if the assignee has an address.
///
/// Returns whether a message was sent.
///
/// # Errors
///
/// Propagates the transport error unchanged.
pub async fn notify_activity_scheduled<M: MailTransport>(
    mailer: &M,
    assignee_email: Option<&Email>,
    activity: &Activity,
    created_by: &str,
) -> Result<bool, EmailError> {
    let Some(to) = assignee_email else {
        tracing::debug!(activity_id = %activity.id, "Assignee has no email, skipping notification");
        return Ok(false);
    };

    let email = activity_scheduled_email(to.clone(), activity, created_by)?;
    mailer.send(&email).await?;
    Ok(true)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};

    use crm_core::{ActivityId, ActivityType, UserId};

    use super::*;
    use crate::models::{ActivityInput, Record};
    use crate::services::email::RecordingMailer;

    fn demo_activity() -> Activity {
        let due = Utc.with_ymd_and_hms(2026, 11, 3, 9, 15, 0).unwrap();
        Activity::build(
            ActivityId::new(12),
            ActivityInput {
                title: "Quarterly review".to_string(),
                activity_type: ActivityType::Meeting,
                description: None,
                due_date: due,
            },
            UserId::new(2),
            due,
        )
    }

    #[test]
    fn test_subject_and_body() {
        let to = Email::parse("morgan@acme.test").unwrap();
        let email = activity_scheduled_email(to.clone(), &demo_activity(), "morgan").unwrap();

        assert_eq!(email.to, to);
        assert_eq!(email.subject, "New Meeting Scheduled: Quarterly review");
        assert!(email.body.starts_with("Hello,"));
        assert!(email.body.contains("A new meeting has been scheduled for you."));
        assert!(email.body.contains("Title: Quarterly review"));
        assert!(email.body.contains("Type: Meeting"));
        assert!(email.body.contains("Scheduled On: 2026-11-03 09:15"));
        assert!(email.body.contains("Created By: morgan"));
        assert!(email.body.contains("CRM System"));
    }

    #[tokio::test]
    async fn test_no_address_sends_nothing() {
        let mailer = RecordingMailer::new();
        let sent = notify_activity_scheduled(&mailer, None, &demo_activity(), "morgan")
            .await
            .unwrap();
        assert!(!sent);
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let mailer = RecordingMailer::failing();
        let to = Email::parse("morgan@acme.test").unwrap();
        let result = notify_activity_scheduled(&mailer, Some(&to), &demo_activity(), "morgan").await;
        assert!(matches!(result, Err(EmailError::Unavailable(_))));
    }
}
