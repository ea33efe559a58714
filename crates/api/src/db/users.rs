//! User repository for database operations.
//!
//! Covers accounts, bearer tokens, and linked OAuth provider identities.
//! Queries are runtime-checked (`query_as`/`FromRow`); row types decode
//! straight into domain structs via the core newtypes' sqlx impls.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use orchard_core::{Email, Group, TokenId, UserId};

use super::RepositoryError;
use crate::models::User;

const SELECT_USER: &str =
    "SELECT id, name, email, group_name, created_at, updated_at FROM users";

/// A user row joined with its password hash.
#[derive(sqlx::FromRow)]
struct UserWithHashRow {
    id: UserId,
    name: String,
    email: Email,
    group_name: Group,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    password_hash: String,
}

impl UserWithHashRow {
    fn into_parts(self) -> (User, String) {
        (
            User {
                id: self.id,
                name: self.name,
                email: self.email,
                group: self.group_name,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            self.password_hash,
        )
    }
}

/// A token row joined with its owning user.
#[derive(sqlx::FromRow)]
struct TokenWithUserRow {
    token_hash: String,
    capability: Group,
    id: UserId,
    name: String,
    email: Email,
    group_name: Group,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        name: &str,
        email: &Email,
        password_hash: &str,
        group: Group,
    ) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (name, email, password_hash, group_name) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, name, email, group_name, created_at, updated_at",
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(group)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })
    }

    /// Whether a user with this email exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn email_exists(&self, email: &Email) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(self.pool)
                .await?;
        Ok(exists)
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(user)
    }

    /// Get a user and their password hash by email.
    ///
    /// Returns `None` if no such user exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_with_password(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserWithHashRow>(
            "SELECT id, name, email, group_name, created_at, updated_at, password_hash \
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(UserWithHashRow::into_parts))
    }

    /// Delete every token the user holds (single active session policy).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn revoke_tokens(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM user_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Store a new token digest carrying the given capability.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert_token(
        &self,
        user_id: UserId,
        token_hash: &str,
        capability: Group,
    ) -> Result<TokenId, RepositoryError> {
        let id: TokenId = sqlx::query_scalar(
            "INSERT INTO user_tokens (user_id, token_hash, capability) \
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(capability)
        .fetch_one(self.pool)
        .await?;
        Ok(id)
    }

    /// Look up a token by its ID, returning the owning user, the stored
    /// digest, and the capability the token was issued with.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_token(
        &self,
        token_id: TokenId,
    ) -> Result<Option<(User, String, Group)>, RepositoryError> {
        let row = sqlx::query_as::<_, TokenWithUserRow>(
            "SELECT t.token_hash, t.capability, \
                    u.id, u.name, u.email, u.group_name, u.created_at, u.updated_at \
             FROM user_tokens t \
             JOIN users u ON u.id = t.user_id \
             WHERE t.id = $1",
        )
        .bind(token_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| {
            (
                User {
                    id: r.id,
                    name: r.name,
                    email: r.email,
                    group: r.group_name,
                    created_at: r.created_at,
                    updated_at: r.updated_at,
                },
                r.token_hash,
                r.capability,
            )
        }))
    }

    /// First-or-create a user by email and upsert the linked provider
    /// identity, in one transaction.
    ///
    /// The identity is keyed by (provider, provider_id); a repeat callback
    /// refreshes the avatar (and relinks the identity if ownership moved).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; nothing
    /// is persisted in that case.
    pub async fn first_or_create_with_identity(
        &self,
        email: &Email,
        name: &str,
        password_hash: &str,
        provider: &str,
        provider_id: &str,
        avatar: Option<&str>,
    ) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let existing =
            sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE email = $1"))
                .bind(email)
                .fetch_optional(&mut *tx)
                .await?;

        let user = match existing {
            Some(user) => user,
            None => {
                sqlx::query_as::<_, User>(
                    "INSERT INTO users (name, email, password_hash, group_name) \
                     VALUES ($1, $2, $3, $4) \
                     RETURNING id, name, email, group_name, created_at, updated_at",
                )
                .bind(name)
                .bind(email)
                .bind(password_hash)
                .bind(Group::User)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        sqlx::query(
            "INSERT INTO provider_identities (provider, provider_id, user_id, avatar) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (provider, provider_id) \
             DO UPDATE SET avatar = EXCLUDED.avatar, user_id = EXCLUDED.user_id, \
                           updated_at = now()",
        )
        .bind(provider)
        .bind(provider_id)
        .bind(user.id)
        .bind(avatar)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(user)
    }
}
