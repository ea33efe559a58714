//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! orchard-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `ORCHARD_DATABASE_URL` - `PostgreSQL` connection string (falls back
//!   to `DATABASE_URL`)

use super::{CommandError, database_url};
use orchard_api::db::create_pool;

/// Run the embedded migrations from `crates/api/migrations/`.
pub async fn run() -> Result<(), CommandError> {
    let database_url = database_url()?;

    tracing::info!("Connecting to database...");
    let pool = create_pool(&database_url).await?;

    tracing::info!("Running migrations...");
    orchard_api::MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations complete");
    Ok(())
}
