//! Tradepost CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! tradepost-cli migrate
//!
//! # Create an account with a password
//! tradepost-cli admin create -e admin@example.com -n "Admin Name" -p <password>
//!
//! # Promote an existing account to admin
//! tradepost-cli admin promote -e admin@example.com
//!
//! # Seed the database with demo data
//! tradepost-cli seed
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `admin create` / `admin promote` - Account management. Role changes
//!   happen only here; no HTTP endpoint exposes them.
//! - `seed` - Seed database with demo data

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "tradepost-cli")]
#[command(author, version, about = "Tradepost CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage accounts and roles
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Seed the database with demo data
    Seed,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new account (role `user`; promote separately)
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Initial password
        #[arg(short, long)]
        password: String,
    },
    /// Promote an existing account to admin
    Promote {
        /// Email address of the account to promote
        #[arg(short, long)]
        email: String,
    },
    /// Demote an admin back to a regular user
    Demote {
        /// Email address of the account to demote
        #[arg(short, long)]
        email: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
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
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                name,
                password,
            } => {
                commands::admin::create_account(&email, &name, &password).await?;
            }
            AdminAction::Promote { email } => {
                commands::admin::set_role(&email, tradepost_core::Role::Admin).await?;
            }
            AdminAction::Demote { email } => {
                commands::admin::set_role(&email, tradepost_core::Role::User).await?;
            }
        },
        Commands::Seed => commands::seed::run().await?,
    }
    Ok(())
}
