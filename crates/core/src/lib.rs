//! CRM Core - Shared domain types and pure business rules.
//!
//! This crate holds the pieces of the CRM that do no I/O. It is shared by:
//! - `crm-web` - The axum server (handlers, repositories, templates)
//! - `crm-cli` - Command-line tools for migrations and user management
//!
//! # Architecture
//!
//! The core crate contains only types, predicates and arithmetic - no database
//! access, no HTTP, no mail. Everything here can be unit tested directly.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, email addresses and record status enums
//! - [`policy`] - Visibility and ownership rules for the five record types
//! - [`metrics`] - Dashboard pipeline arithmetic

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod metrics;
pub mod policy;
pub mod types;

pub use metrics::lead_conversion_rate;
pub use policy::{Decision, Owned, Principal, Scope};
pub use types::*;
