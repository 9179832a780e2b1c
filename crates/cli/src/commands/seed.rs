//! Demo data for a fresh database.
//!
//! Inserts a handful of companies plus contacts, leads, deals and activities
//! assigned to one user. Records are written straight through the
//! repositories, so no notification emails are sent.

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::info;

use crm_core::{ActivityType, DealStage, Email, LeadStatus, UserId};
use crm_web::db::{
    ActivityRepository, CompanyRepository, ContactRepository, DealRepository, EntityStore,
    LeadRepository, UserRepository, UserStore,
};
use crm_web::models::{ActivityInput, CompanyInput, ContactInput, DealInput, LeadInput};

use super::connect;

const COMPANIES: &[(&str, &str, &str)] = &[
    ("Acme Corporation", "Manufacturing", "https://acme.example.com"),
    ("Globex", "Energy", "https://globex.example.com"),
    ("Initech", "Software", "https://initech.example.com"),
];

const CONTACTS: &[(&str, &str, &str, &str)] = &[
    ("Wile", "Coyote", "wile@acme.example.com", "Head of Procurement"),
    ("Hank", "Scorpio", "hank@globex.example.com", "CEO"),
    ("Bill", "Lumbergh", "bill@initech.example.com", "Division VP"),
];

const LEADS: &[(&str, &str, LeadStatus)] = &[
    ("Umbrella Corp", "Trade show", LeadStatus::New),
    ("Stark Industries", "Referral", LeadStatus::Contacted),
    ("Wayne Enterprises", "Website", LeadStatus::Qualified),
    ("Cyberdyne Systems", "Cold call", LeadStatus::Lost),
];

const DEALS: &[(&str, i64, DealStage)] = &[
    ("Anvil bulk order", 1_250_000, DealStage::Proposal),
    ("Reactor maintenance", 4_800_000, DealStage::Negotiation),
    ("TPS report licences", 320_000, DealStage::Won),
];

/// Seed demo records for `username`.
///
/// # Errors
///
/// Returns an error if the user does not exist or an insert fails.
pub async fn demo_data(username: &str) -> Result<(), Box<dyn std::error::Error>> {
    let pool = connect().await?;

    let (user, _) = UserRepository::new(&pool)
        .find_credentials(username)
        .await?
        .ok_or_else(|| format!("No such user: {username}"))?;
    let owner: UserId = user.id;
    info!(user_id = %owner, "Seeding demo data");

    let companies = CompanyRepository::new(&pool);
    let mut company_ids = Vec::with_capacity(COMPANIES.len());
    for (name, industry, website) in COMPANIES {
        let company = companies
            .create(
                &CompanyInput {
                    name: (*name).to_string(),
                    industry: Some((*industry).to_string()),
                    website: Some((*website).to_string()),
                    phone: None,
                    address: None,
                },
                (),
            )
            .await?;
        company_ids.push(company.id);
    }

    let contacts = ContactRepository::new(&pool);
    for ((first, last, email, position), company_id) in CONTACTS.iter().zip(&company_ids) {
        contacts
            .create(
                &ContactInput {
                    first_name: (*first).to_string(),
                    last_name: Some((*last).to_string()),
                    email: Some(Email::parse(email)?),
                    phone: None,
                    position: Some((*position).to_string()),
                    company_id: Some(*company_id),
                },
                owner,
            )
            .await?;
    }

    let leads = LeadRepository::new(&pool);
    for (name, source, status) in LEADS {
        leads
            .create(
                &LeadInput {
                    name: (*name).to_string(),
                    email: None,
                    phone: None,
                    source: Some((*source).to_string()),
                    status: *status,
                    notes: None,
                },
                owner,
            )
            .await?;
    }

    let deals = DealRepository::new(&pool);
    let close_date = NaiveDate::from_ymd_opt(2026, 12, 31);
    for ((title, cents, stage), company_id) in DEALS.iter().zip(&company_ids) {
        deals
            .create(
                &DealInput {
                    title: (*title).to_string(),
                    amount: Decimal::new(*cents, 2),
                    stage: *stage,
                    company_id: Some(*company_id),
                    close_date,
                },
                owner,
            )
            .await?;
    }

    let activities = ActivityRepository::new(&pool);
    let now = Utc::now();
    let schedule = [
        ("Intro call with Acme", ActivityType::Call, Duration::days(1)),
        ("Globex site visit", ActivityType::Meeting, Duration::days(3)),
        ("Send Initech proposal", ActivityType::Email, Duration::days(5)),
        ("Update forecast", ActivityType::Task, Duration::days(-2)),
    ];
    for (title, activity_type, offset) in schedule {
        activities
            .create(
                &ActivityInput {
                    title: title.to_string(),
                    activity_type,
                    description: None,
                    due_date: now + offset,
                },
                owner,
            )
            .await?;
    }

    info!("Seeding complete!");
    info!("  Companies: {}", COMPANIES.len());
    info!("  Contacts: {}", CONTACTS.len());
    info!("  Leads: {}", LEADS.len());
    info!("  Deals: {}", DEALS.len());
    info!("  Activities: {}", schedule.len());

    Ok(())
}
