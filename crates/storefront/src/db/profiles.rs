//! Profile repository.

use sqlx::PgPool;

use windsor_goods_core::{Email, ProfileId, UserId};

use super::RepositoryError;
use crate::models::Profile;
use crate::models::profile::DEFAULT_AVATAR;

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: i32,
    user_id: i32,
    avatar: String,
    bio: String,
}

impl From<ProfileRow> for Profile {
    fn from(r: ProfileRow) -> Self {
        Self {
            id: ProfileId::new(r.id),
            user_id: UserId::new(r.user_id),
            avatar: r.avatar,
            bio: r.bio,
        }
    }
}

/// Repository for profile database operations.
pub struct ProfileRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProfileRepository<'a> {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user's profile, creating an empty one if it is missing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_or_create(&self, user_id: UserId) -> Result<Profile, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r"
            INSERT INTO storefront.profile (user_id, avatar, bio)
            VALUES ($1, $2, '')
            ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING id, user_id, avatar, bio
            ",
        )
        .bind(user_id)
        .bind(DEFAULT_AVATAR)
        .fetch_one(self.pool)
        .await?;

        Ok(Profile::from(row))
    }

    /// Save a profile form: name and email on the user, bio and avatar on
    /// the profile, in one transaction.
    ///
    /// When a new avatar replaces an uploaded one, the old path is returned
    /// so the caller can delete the file.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user or their profile
    /// doesn't exist; nothing is written.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        user_id: UserId,
        changes: ProfileChanges<'_>,
    ) -> Result<SavedProfile, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r"
            UPDATE storefront.app_user
            SET first_name = $2, last_name = $3, email = $4
            WHERE id = $1
            ",
        )
        .bind(user_id)
        .bind(changes.first_name)
        .bind(changes.last_name)
        .bind(changes.email.as_str())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        let previous: Option<String> = sqlx::query_scalar(
            r"SELECT avatar FROM storefront.profile WHERE user_id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;
        let previous = previous.ok_or(RepositoryError::NotFound)?;

        let row = sqlx::query_as::<_, ProfileRow>(
            r"
            UPDATE storefront.profile
            SET bio = $2, avatar = COALESCE($3, avatar)
            WHERE user_id = $1
            RETURNING id, user_id, avatar, bio
            ",
        )
        .bind(user_id)
        .bind(changes.bio)
        .bind(changes.avatar)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(SavedProfile {
            replaced_avatar: replaced_avatar(previous, changes.avatar),
            profile: Profile::from(row),
        })
    }
}

/// Values submitted on the profile form.
#[derive(Debug, Clone, Copy)]
pub struct ProfileChanges<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a Email,
    pub bio: &'a str,
    /// Newly stored avatar; `None` keeps the current one.
    pub avatar: Option<&'a str>,
}

/// A saved profile and the uploaded avatar it no longer uses.
#[derive(Debug, Clone)]
pub struct SavedProfile {
    pub profile: Profile,
    pub replaced_avatar: Option<String>,
}

/// The previous avatar, if a new upload displaced it. The shared default
/// image is never reported.
fn replaced_avatar(previous: String, new: Option<&str>) -> Option<String> {
    match new {
        Some(new) if new != previous && previous != DEFAULT_AVATAR => Some(previous),
        _ => None,
    }
}
