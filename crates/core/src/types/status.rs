//! Enumerated record fields.
//!
//! Each enum maps to a `PostgreSQL` enum type in the `crm` schema and to the
//! `value` attribute of the matching `<select>` in the record forms, so
//! `Display`/`FromStr` use the same `snake_case` spelling as the database.

use serde::{Deserialize, Serialize};

/// Qualification status of a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "crm.lead_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Qualified,
    Lost,
}

impl LeadStatus {
    /// Every status, in pipeline order.
    pub const ALL: [Self; 4] = [Self::New, Self::Contacted, Self::Qualified, Self::Lost];

    /// Database / form spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Qualified => "qualified",
            Self::Lost => "lost",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Contacted => "Contacted",
            Self::Qualified => "Qualified",
            Self::Lost => "Lost",
        }
    }
}

impl std::fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LeadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| format!("invalid lead status: {s}"))
    }
}

/// Position of a deal in the sales pipeline.
///
/// `Won` is the only stage the dashboard treats specially.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "crm.deal_stage", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum DealStage {
    #[default]
    Prospecting,
    Qualification,
    Proposal,
    Negotiation,
    Won,
    Lost,
}

impl DealStage {
    /// Every stage, in pipeline order.
    pub const ALL: [Self; 6] = [
        Self::Prospecting,
        Self::Qualification,
        Self::Proposal,
        Self::Negotiation,
        Self::Won,
        Self::Lost,
    ];

    /// Database / form spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Prospecting => "prospecting",
            Self::Qualification => "qualification",
            Self::Proposal => "proposal",
            Self::Negotiation => "negotiation",
            Self::Won => "won",
            Self::Lost => "lost",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Prospecting => "Prospecting",
            Self::Qualification => "Qualification",
            Self::Proposal => "Proposal",
            Self::Negotiation => "Negotiation",
            Self::Won => "Won",
            Self::Lost => "Lost",
        }
    }

    /// Whether the deal is closed (won or lost).
    #[must_use]
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl std::fmt::Display for DealStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DealStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| format!("invalid deal stage: {s}"))
    }
}

/// Kind of scheduled activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "crm.activity_type", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    #[default]
    Call,
    Meeting,
    Email,
    Task,
}

impl ActivityType {
    /// Every activity type.
    pub const ALL: [Self; 4] = [Self::Call, Self::Meeting, Self::Email, Self::Task];

    /// Database / form spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Call => "call",
            Self::Meeting => "meeting",
            Self::Email => "email",
            Self::Task => "task",
        }
    }

    /// Capitalized label, as used in notification subjects.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Call => "Call",
            Self::Meeting => "Meeting",
            Self::Email => "Email",
            Self::Task => "Task",
        }
    }
}

impl std::fmt::Display for ActivityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActivityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| format!("invalid activity type: {s}"))
    }
}

/// Completion state of an activity.
///
/// Only the completion transition moves an activity to `Completed`; the edit
/// form never exposes this field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "crm.activity_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    #[default]
    Open,
    Completed,
}

impl ActivityStatus {
    /// Database spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Completed => "completed",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Completed => "Completed",
        }
    }
}

impl std::fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deal_stage_parse_and_display_agree() {
        for stage in DealStage::ALL {
            assert_eq!(stage.to_string().parse::<DealStage>().unwrap(), stage);
        }
        assert!("closed_won".parse::<DealStage>().is_err());
    }

    #[test]
    fn test_deal_stage_closed() {
        assert!(DealStage::Won.is_closed());
        assert!(DealStage::Lost.is_closed());
        assert!(!DealStage::Negotiation.is_closed());
    }

    #[test]
    fn test_lead_status_parse() {
        assert_eq!("qualified".parse::<LeadStatus>().unwrap(), LeadStatus::Qualified);
        assert!("Qualified".parse::<LeadStatus>().is_err());
    }

    #[test]
    fn test_activity_type_label_is_capitalized() {
        assert_eq!(ActivityType::Meeting.label(), "Meeting");
        assert_eq!("task".parse::<ActivityType>().unwrap(), ActivityType::Task);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(LeadStatus::default(), LeadStatus::New);
        assert_eq!(DealStage::default(), DealStage::Prospecting);
        assert_eq!(ActivityStatus::default(), ActivityStatus::Open);
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&ActivityStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
    }
}
