//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Username/password authentication (argon2)
//! - `dashboard` - Pipeline metrics for the landing page
//! - `email` - Mail transport seam and SMTP delivery
//! - `notifications` - Activity scheduling emails
//! - `records` - Policy-guarded create/edit/delete/complete

pub mod auth;
pub mod dashboard;
pub mod email;
pub mod notifications;
pub mod records;

pub use auth::{AuthError, AuthService};
pub use dashboard::DashboardSummary;
pub use email::{EmailError, EmailService, MailTransport, OutgoingEmail};
pub use records::RecordError;
