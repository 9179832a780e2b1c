//! HTML form payloads and their validation.
//!
//! Each `*Form` deserializes straight from `application/x-www-form-urlencoded`
//! with every field as a string, so a rejected submission can be re-rendered
//! exactly as typed. `validate` turns it into the matching `*Input`.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use crm_core::{ActivityType, CompanyId, DealStage, Email, LeadStatus};

use crate::models::{
    Activity, ActivityInput, Company, CompanyInput, Contact, ContactInput, Deal, DealInput, Lead,
    LeadInput, non_blank,
};

/// `<input type="datetime-local">` value format.
pub const DATETIME_LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// `<input type="date">` value format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const REQUIRED: &str = "This field is required.";

/// Field-level validation messages, keyed by form field name.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<&'static str, String>);

impl FormErrors {
    /// Record the first error for `field`.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    /// The error for `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    fn finish<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }

    fn required(&mut self, field: &'static str, value: &str, max: usize) -> String {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.add(field, REQUIRED);
        } else {
            self.max_len(field, trimmed, max);
        }
        trimmed.to_string()
    }

    fn optional(&mut self, field: &'static str, value: &str, max: usize) -> Option<String> {
        let value = non_blank(value);
        if let Some(v) = &value {
            self.max_len(field, v, max);
        }
        value
    }

    fn email(&mut self, field: &'static str, value: &str) -> Option<Email> {
        Email::parse_optional(value).unwrap_or_else(|_| {
            self.add(field, "Enter a valid email address.");
            None
        })
    }

    fn choice<T: FromStr>(&mut self, field: &'static str, value: &str) -> Option<T> {
        let parsed = value.trim().parse().ok();
        if parsed.is_none() {
            self.add(
                field,
                format!("Select a valid choice. {} is not one of the available choices.", value.trim()),
            );
        }
        parsed
    }

    fn company(
        &mut self,
        field: &'static str,
        value: &str,
        companies: &[Company],
    ) -> Option<CompanyId> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        let id = value
            .parse::<i32>()
            .ok()
            .map(CompanyId::new)
            .filter(|id| companies.iter().any(|c| c.id == *id));
        if id.is_none() {
            self.add(field, "Select a valid choice. That choice is not one of the available choices.");
        }
        id
    }

    fn max_len(&mut self, field: &'static str, value: &str, max: usize) {
        let len = value.chars().count();
        if len > max {
            self.add(
                field,
                format!("Ensure this value has at most {max} characters (it has {len})."),
            );
        }
    }
}

/// One `<option>` in a `<select>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    fn new(value: impl Into<String>, label: impl Into<String>, current: &str) -> Self {
        let value = value.into();
        let selected = value == current;
        Self {
            value,
            label: label.into(),
            selected,
        }
    }
}

/// Options for the company picker, with a blank first entry.
#[must_use]
pub fn company_options(companies: &[Company], current: &str) -> Vec<SelectOption> {
    std::iter::once(SelectOption::new("", "---------", current.trim()))
        .chain(
            companies
                .iter()
                .map(|c| SelectOption::new(c.id.to_string(), c.name.clone(), current.trim())),
        )
        .collect()
}

#[must_use]
pub fn lead_status_options(current: &str) -> Vec<SelectOption> {
    LeadStatus::ALL
        .iter()
        .map(|s| SelectOption::new(s.as_str(), s.label(), current))
        .collect()
}

#[must_use]
pub fn deal_stage_options(current: &str) -> Vec<SelectOption> {
    DealStage::ALL
        .iter()
        .map(|s| SelectOption::new(s.as_str(), s.label(), current))
        .collect()
}

#[must_use]
pub fn activity_type_options(current: &str) -> Vec<SelectOption> {
    ActivityType::ALL
        .iter()
        .map(|t| SelectOption::new(t.as_str(), t.label(), current))
        .collect()
}

fn opt(value: Option<&String>) -> String {
    value.cloned().unwrap_or_default()
}

// =============================================================================
// Company
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CompanyForm {
    pub name: String,
    pub industry: String,
    pub website: String,
    pub phone: String,
    pub address: String,
}

impl CompanyForm {
    /// # Errors
    ///
    /// Returns the field errors if any field is invalid.
    pub fn validate(&self) -> Result<CompanyInput, FormErrors> {
        let mut errors = FormErrors::default();
        let name = errors.required("name", &self.name, 200);
        let industry = errors.optional("industry", &self.industry, 100);
        let website = errors.optional("website", &self.website, 200);
        if let Some(site) = &website {
            let valid = url::Url::parse(site)
                .is_ok_and(|u| matches!(u.scheme(), "http" | "https") && u.host().is_some());
            if !valid {
                errors.add("website", "Enter a valid URL.");
            }
        }
        let phone = errors.optional("phone", &self.phone, 20);
        let address = non_blank(&self.address);

        errors.finish(CompanyInput {
            name,
            industry,
            website,
            phone,
            address,
        })
    }
}

impl From<&Company> for CompanyForm {
    fn from(company: &Company) -> Self {
        Self {
            name: company.name.clone(),
            industry: opt(company.industry.as_ref()),
            website: opt(company.website.as_ref()),
            phone: opt(company.phone.as_ref()),
            address: opt(company.address.as_ref()),
        }
    }
}

// =============================================================================
// Contact
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub position: String,
    pub company: String,
}

impl ContactForm {
    /// # Errors
    ///
    /// Returns the field errors if any field is invalid.
    pub fn validate(&self, companies: &[Company]) -> Result<ContactInput, FormErrors> {
        let mut errors = FormErrors::default();
        let first_name = errors.required("first_name", &self.first_name, 100);
        let last_name = errors.optional("last_name", &self.last_name, 100);
        let email = errors.email("email", &self.email);
        let phone = errors.optional("phone", &self.phone, 20);
        let position = errors.optional("position", &self.position, 100);
        let company_id = errors.company("company", &self.company, companies);

        errors.finish(ContactInput {
            first_name,
            last_name,
            email,
            phone,
            position,
            company_id,
        })
    }
}

impl From<&Contact> for ContactForm {
    fn from(contact: &Contact) -> Self {
        Self {
            first_name: contact.first_name.clone(),
            last_name: opt(contact.last_name.as_ref()),
            email: contact.email.as_ref().map(ToString::to_string).unwrap_or_default(),
            phone: opt(contact.phone.as_ref()),
            position: opt(contact.position.as_ref()),
            company: contact.company_id.map(|id| id.to_string()).unwrap_or_default(),
        }
    }
}

// =============================================================================
// Lead
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LeadForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub source: String,
    pub status: String,
    pub notes: String,
}

impl Default for LeadForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            source: String::new(),
            status: LeadStatus::default().as_str().to_string(),
            notes: String::new(),
        }
    }
}

impl LeadForm {
    /// # Errors
    ///
    /// Returns the field errors if any field is invalid.
    pub fn validate(&self) -> Result<LeadInput, FormErrors> {
        let mut errors = FormErrors::default();
        let name = errors.required("name", &self.name, 200);
        let email = errors.email("email", &self.email);
        let phone = errors.optional("phone", &self.phone, 20);
        let source = errors.optional("source", &self.source, 100);
        let status = errors.choice::<LeadStatus>("status", &self.status);
        let notes = non_blank(&self.notes);

        errors.finish(LeadInput {
            name,
            email,
            phone,
            source,
            status: status.unwrap_or_default(),
            notes,
        })
    }
}

impl From<&Lead> for LeadForm {
    fn from(lead: &Lead) -> Self {
        Self {
            name: lead.name.clone(),
            email: lead.email.as_ref().map(ToString::to_string).unwrap_or_default(),
            phone: opt(lead.phone.as_ref()),
            source: opt(lead.source.as_ref()),
            status: lead.status.as_str().to_string(),
            notes: opt(lead.notes.as_ref()),
        }
    }
}

// =============================================================================
// Deal
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DealForm {
    pub title: String,
    pub amount: String,
    pub stage: String,
    pub company: String,
    pub close_date: String,
}

impl Default for DealForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            amount: String::new(),
            stage: DealStage::default().as_str().to_string(),
            company: String::new(),
            close_date: String::new(),
        }
    }
}

/// Largest amount accepted (`DECIMAL(12, 2)`).
fn max_amount() -> Decimal {
    Decimal::new(999_999_999_999, 2)
}

impl DealForm {
    /// # Errors
    ///
    /// Returns the field errors if any field is invalid.
    pub fn validate(&self, companies: &[Company]) -> Result<DealInput, FormErrors> {
        let mut errors = FormErrors::default();
        let title = errors.required("title", &self.title, 200);

        let amount = match self.amount.trim() {
            "" => {
                errors.add("amount", REQUIRED);
                Decimal::ZERO
            }
            raw => match Decimal::from_str(raw) {
                Ok(a) if a.is_sign_negative() && !a.is_zero() => {
                    errors.add("amount", "Ensure this value is greater than or equal to 0.");
                    a
                }
                Ok(a) if a.scale() > 2 => {
                    errors.add("amount", "Ensure that there are no more than 2 decimal places.");
                    a
                }
                Ok(a) if a > max_amount() => {
                    errors.add("amount", "Ensure that there are no more than 12 digits in total.");
                    a
                }
                Ok(a) => a,
                Err(_) => {
                    errors.add("amount", "Enter a number.");
                    Decimal::ZERO
                }
            },
        };

        let stage = errors.choice::<DealStage>("stage", &self.stage);
        let company_id = errors.company("company", &self.company, companies);

        let close_date = match self.close_date.trim() {
            "" => None,
            raw => NaiveDate::parse_from_str(raw, DATE_FORMAT).map_or_else(
                |_| {
                    errors.add("close_date", "Enter a valid date.");
                    None
                },
                Some,
            ),
        };

        errors.finish(DealInput {
            title,
            amount,
            stage: stage.unwrap_or_default(),
            company_id,
            close_date,
        })
    }
}

impl From<&Deal> for DealForm {
    fn from(deal: &Deal) -> Self {
        Self {
            title: deal.title.clone(),
            amount: deal.amount.to_string(),
            stage: deal.stage.as_str().to_string(),
            company: deal.company_id.map(|id| id.to_string()).unwrap_or_default(),
            close_date: deal
                .close_date
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
        }
    }
}

// =============================================================================
// Activity
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ActivityForm {
    pub title: String,
    pub activity_type: String,
    pub description: String,
    pub due_date: String,
}

impl Default for ActivityForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            activity_type: ActivityType::default().as_str().to_string(),
            description: String::new(),
            due_date: String::new(),
        }
    }
}

/// Parse a `datetime-local` value (seconds optional) as UTC.
fn parse_due_date(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, DATETIME_LOCAL_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M"))
        .ok()
        .map(|naive| naive.and_utc())
}

impl ActivityForm {
    /// # Errors
    ///
    /// Returns the field errors if any field is invalid.
    pub fn validate(&self) -> Result<ActivityInput, FormErrors> {
        let mut errors = FormErrors::default();
        let title = errors.required("title", &self.title, 200);
        let activity_type = errors.choice::<ActivityType>("activity_type", &self.activity_type);
        let description = non_blank(&self.description);

        let due_date = match self.due_date.trim() {
            "" => {
                errors.add("due_date", REQUIRED);
                None
            }
            raw => {
                let parsed = parse_due_date(raw);
                if parsed.is_none() {
                    errors.add("due_date", "Enter a valid date/time.");
                }
                parsed
            }
        };

        errors.finish(ActivityInput {
            title,
            activity_type: activity_type.unwrap_or_default(),
            description,
            due_date: due_date.unwrap_or_default(),
        })
    }
}

impl From<&Activity> for ActivityForm {
    fn from(activity: &Activity) -> Self {
        Self {
            title: activity.title.clone(),
            activity_type: activity.activity_type.as_str().to_string(),
            description: opt(activity.description.as_ref()),
            due_date: activity.due_date.format(DATETIME_LOCAL_FORMAT).to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};

    use crate::models::Record;

    use super::*;

    fn acme() -> Company {
        Company::build(
            CompanyId::new(3),
            CompanyInput {
                name: "Acme".to_string(),
                industry: None,
                website: None,
                phone: None,
                address: None,
            },
            (),
            Utc::now(),
        )
    }

    #[test]
    fn test_company_requires_name() {
        let errors = CompanyForm::default().validate().unwrap_err();
        assert_eq!(errors.get("name"), Some(REQUIRED));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_company_website_must_be_url() {
        let form = CompanyForm {
            name: "Acme".to_string(),
            website: "acme dot com".to_string(),
            ..CompanyForm::default()
        };
        assert_eq!(form.validate().unwrap_err().get("website"), Some("Enter a valid URL."));

        let form = CompanyForm {
            website: "https://acme.test".to_string(),
            ..form
        };
        let input = form.validate().unwrap();
        assert_eq!(input.website.as_deref(), Some("https://acme.test"));
        assert_eq!(input.industry, None);
    }

    #[test]
    fn test_contact_validates_email_and_company() {
        let form = ContactForm {
            first_name: " Grace ".to_string(),
            email: "not-an-email".to_string(),
            company: "99".to_string(),
            ..ContactForm::default()
        };
        let errors = form.validate(&[acme()]).unwrap_err();
        assert!(errors.get("email").is_some());
        assert!(errors.get("company").is_some());
        assert!(errors.get("first_name").is_none());

        let form = ContactForm {
            email: "grace@navy.test".to_string(),
            company: "3".to_string(),
            ..form
        };
        let input = form.validate(&[acme()]).unwrap();
        assert_eq!(input.first_name, "Grace");
        assert_eq!(input.company_id, Some(CompanyId::new(3)));
        assert_eq!(input.email.unwrap().as_str(), "grace@navy.test");
    }

    #[test]
    fn test_lead_status_must_be_known() {
        let form = LeadForm {
            name: "Initech".to_string(),
            status: "won".to_string(),
            ..LeadForm::default()
        };
        assert!(form.validate().unwrap_err().get("status").is_some());

        let form = LeadForm {
            status: "qualified".to_string(),
            ..form
        };
        assert_eq!(form.validate().unwrap().status, LeadStatus::Qualified);
    }

    #[test]
    fn test_deal_amount_rules() {
        let base = DealForm {
            title: "Renewal".to_string(),
            ..DealForm::default()
        };

        let missing = base.validate(&[]).unwrap_err();
        assert_eq!(missing.get("amount"), Some(REQUIRED));

        let negative = DealForm {
            amount: "-5".to_string(),
            ..base.clone()
        };
        assert!(negative.validate(&[]).unwrap_err().get("amount").is_some());

        let precise = DealForm {
            amount: "1.005".to_string(),
            ..base.clone()
        };
        assert!(precise.validate(&[]).unwrap_err().get("amount").is_some());

        let ok = DealForm {
            amount: "1234.50".to_string(),
            close_date: "2026-12-31".to_string(),
            ..base
        };
        let input = ok.validate(&[]).unwrap();
        assert_eq!(input.amount, Decimal::new(123_450, 2));
        assert_eq!(input.stage, DealStage::Prospecting);
        assert_eq!(input.close_date, NaiveDate::from_ymd_opt(2026, 12, 31));
    }

    #[test]
    fn test_activity_due_date_parsing() {
        let form = ActivityForm {
            title: "Call back".to_string(),
            activity_type: "call".to_string(),
            due_date: "2026-05-01T16:45".to_string(),
            ..ActivityForm::default()
        };
        let input = form.validate().unwrap();
        assert_eq!(
            input.due_date,
            Utc.with_ymd_and_hms(2026, 5, 1, 16, 45, 0).unwrap()
        );

        let bad = ActivityForm {
            due_date: "tomorrow".to_string(),
            ..form
        };
        assert!(bad.validate().unwrap_err().get("due_date").is_some());
    }

    #[test]
    fn test_edit_form_prefill_round_trips() {
        let form = CompanyForm::from(&acme());
        assert_eq!(form.name, "Acme");
        assert_eq!(form.website, "");
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_select_options_mark_current() {
        let options = deal_stage_options("won");
        assert_eq!(options.len(), 6);
        assert_eq!(options.iter().filter(|o| o.selected).count(), 1);
        assert!(options.iter().any(|o| o.selected && o.value == "won"));

        let companies = company_options(&[acme()], "");
        assert_eq!(companies.len(), 2);
        assert!(companies.first().is_some_and(|o| o.selected));
    }
}
