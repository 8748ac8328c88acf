//! User repository for database operations.
//!
//! Account creation writes the `app_user`, `client` and `profile` rows in one
//! transaction so a registered user always has all three.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use windsor_goods_core::{Email, UserId, Username};

use super::{RepositoryError, conflict_on_unique};
use crate::models::User;
use crate::models::profile::DEFAULT_AVATAR;

const USER_COLUMNS: &str = "id, username, email, first_name, last_name, is_active, \
                            last_login, date_joined";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i32,
    username: String,
    email: String,
    first_name: String,
    last_name: String,
    is_active: bool,
    last_login: Option<DateTime<Utc>>,
    date_joined: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        let username = Username::parse(&r.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })?;
        let email = Email::parse(&r.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(r.id),
            username,
            email,
            first_name: r.first_name,
            last_name: r.last_name,
            is_active: r.is_active,
            last_login: r.last_login,
            date_joined: r.date_joined,
        })
    }
}

#[derive(sqlx::FromRow)]
struct LoginRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

/// Fields needed to create an account.
pub struct NewAccount<'a> {
    pub username: &'a Username,
    pub email: &'a Email,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub password_hash: &'a str,
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

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored fields are invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM storefront.app_user WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Get a user by username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored fields are invalid.
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM storefront.app_user WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Get a user and their password hash by username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, LoginRow>(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM storefront.app_user WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        let Some(r) = row else {
            return Ok(None);
        };
        Ok(Some((User::try_from(r.user)?, r.password_hash)))
    }

    /// Create a user with its client record and an empty profile.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_account(&self, account: NewAccount<'_>) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, UserRow>(&format!(
            r"
            INSERT INTO storefront.app_user
                (username, email, first_name, last_name, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(account.username.as_str())
        .bind(account.email.as_str())
        .bind(account.first_name)
        .bind(account.last_name)
        .bind(account.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, "username"))?;

        let user = User::try_from(row)?;

        sqlx::query(r"INSERT INTO storefront.client (user_id) VALUES ($1)")
            .bind(user.id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(r"INSERT INTO storefront.profile (user_id, avatar, bio) VALUES ($1, $2, '')")
            .bind(user.id)
            .bind(DEFAULT_AVATAR)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(user)
    }

    /// Record a successful login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn touch_last_login(
        &self,
        id: UserId,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(r"UPDATE storefront.app_user SET last_login = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Enable or disable login for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has this username.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_active(&self, username: &str, active: bool) -> Result<(), RepositoryError> {
        let result =
            sqlx::query(r"UPDATE storefront.app_user SET is_active = $2 WHERE username = $1")
                .bind(username)
                .bind(active)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
