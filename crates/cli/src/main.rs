//! CRM CLI - database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! crm migrate
//!
//! # Create an administrator (password from CRM_USER_PASSWORD or --password)
//! crm user create -u alice -e alice@example.com --admin
//!
//! # List users
//! crm user list
//!
//! # Load demo records assigned to a user
//! crm seed -u alice
//! ```
//!
//! # Environment Variables
//!
//! - `CRM_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "crm")]
#[command(author, version, about = "CRM CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Insert demo companies, contacts, leads, deals and activities
    Seed {
        /// Username the demo records are assigned to
        #[arg(short, long)]
        username: String,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Email address for activity notifications
        #[arg(short, long)]
        email: Option<String>,

        /// Grant administrator rights
        #[arg(long)]
        admin: bool,

        /// Password
        #[arg(long, env = "CRM_USER_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// List all users
    List,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                username,
                email,
                admin,
                password,
            } => {
                commands::user::create(&username, email.as_deref(), admin, &password).await?;
            }
            UserAction::List => commands::user::list().await?,
        },
        Commands::Seed { username } => commands::seed::demo_data(&username).await?,
    }
    Ok(())
}
