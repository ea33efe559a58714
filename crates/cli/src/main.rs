//! Orchard CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! orchard-cli migrate
//!
//! # Bootstrap a user (e.g. the first Admin) without the HTTP API
//! orchard-cli create-user -e admin@example.com -n "Admin Name" -g Admin -p "a strong password"
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `create-user` - Insert a user directly

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "orchard-cli")]
#[command(author, version, about = "Orchard CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Create a user directly (bootstrap an Admin account)
    CreateUser {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Capability group (`Admin`, `Viewer`, `Editor`)
        #[arg(short, long, default_value = "Admin")]
        group: String,

        /// Password (min 10 characters)
        #[arg(short, long)]
        password: String,
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
        Commands::CreateUser {
            email,
            name,
            group,
            password,
        } => {
            commands::users::create(&email, &name, &group, &password).await?;
        }
    }
    Ok(())
}
