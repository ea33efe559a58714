//! User bootstrap command.
//!
//! Inserts a user directly, bypassing the HTTP API. Mainly for creating
//! the first Admin account on a fresh database.

use orchard_api::db::create_pool;
use orchard_api::db::users::UserRepository;
use orchard_api::services::auth::hash_password;
use orchard_core::{Email, Group};

use super::{CommandError, database_url};

/// Create a user with the given email, name, group, and password.
pub async fn create(
    email: &str,
    name: &str,
    group: &str,
    password: &str,
) -> Result<(), CommandError> {
    let email = Email::parse(email)
        .map_err(|e| CommandError::InvalidInput(format!("email: {e}")))?;

    let group = Group::parse(group)
        .map_err(|e| CommandError::InvalidInput(e.to_string()))?;
    if !Group::ASSIGNABLE.contains(&group) {
        return Err(CommandError::InvalidInput(format!(
            "group {group} is not assignable"
        )));
    }

    if password.chars().count() < 10 {
        return Err(CommandError::InvalidInput(
            "password must be at least 10 characters".to_owned(),
        ));
    }

    let password_hash = hash_password(password)
        .map_err(|_| CommandError::InvalidInput("password hashing failed".to_owned()))?;

    let database_url = database_url()?;
    let pool = create_pool(&database_url).await?;

    let user = UserRepository::new(&pool)
        .create(name, &email, &password_hash, group)
        .await
        .map_err(|e| CommandError::InvalidInput(e.to_string()))?;

    tracing::info!(user_id = %user.id, email = %user.email, group = %user.group, "user created");
    Ok(())
}
