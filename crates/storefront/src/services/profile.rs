//! Profile updates and avatar uploads.
//!
//! Avatars are stored as uploaded under `<media_dir>/profile_images/` with a
//! random file name; templates display them at 100x100.

use std::path::Path;

use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use windsor_goods_core::UserId;
use windsor_goods_core::forms::ProfileUpdate;

use crate::db::{ProfileChanges, ProfileRepository, RepositoryError, UserRepository};
use crate::models::{Profile, User};

/// Largest accepted avatar upload.
pub const MAX_AVATAR_BYTES: usize = 2 * 1024 * 1024;

/// Subdirectory of the media root avatars are written to.
pub const AVATAR_SUBDIR: &str = "profile_images";

/// Errors that can occur while updating a profile.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// Upload exceeds [`MAX_AVATAR_BYTES`].
    #[error("avatar must be at most {max} bytes (got {size})")]
    AvatarTooLarge { size: usize, max: usize },

    /// Upload is not a PNG, JPEG, GIF or WebP image.
    #[error("avatar must be a PNG, JPEG, GIF or WebP image")]
    UnsupportedImage,

    /// Writing the avatar file failed.
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl ProfileError {
    /// Whether the error is the visitor's to fix (shown inline on the form).
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(self, Self::AvatarTooLarge { .. } | Self::UnsupportedImage)
    }
}

/// Image formats accepted for avatars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    WebP,
}

impl ImageFormat {
    /// Identify the format from the file's leading bytes.
    #[must_use]
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(Self::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(Self::Gif)
        } else if bytes.starts_with(b"RIFF") && bytes.get(8..12) == Some(&b"WEBP"[..]) {
            Some(Self::WebP)
        } else {
            None
        }
    }

    /// File extension to store the image under.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::WebP => "webp",
        }
    }
}

/// An uploaded avatar file.
#[derive(Debug, Clone)]
pub struct AvatarUpload {
    /// Name the browser sent, for logging only.
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

impl AvatarUpload {
    /// Check size and content.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::AvatarTooLarge` or `ProfileError::UnsupportedImage`.
    pub fn validate(&self) -> Result<ImageFormat, ProfileError> {
        if self.bytes.len() > MAX_AVATAR_BYTES {
            return Err(ProfileError::AvatarTooLarge {
                size: self.bytes.len(),
                max: MAX_AVATAR_BYTES,
            });
        }
        ImageFormat::sniff(&self.bytes).ok_or(ProfileError::UnsupportedImage)
    }
}

/// Profile service.
pub struct ProfileService<'a> {
    users: UserRepository<'a>,
    profiles: ProfileRepository<'a>,
    avatar_dir: &'a Path,
}

impl<'a> ProfileService<'a> {
    /// Create a new profile service writing avatars under `avatar_dir`.
    #[must_use]
    pub const fn new(pool: &'a PgPool, avatar_dir: &'a Path) -> Self {
        Self {
            users: UserRepository::new(pool),
            profiles: ProfileRepository::new(pool),
            avatar_dir,
        }
    }

    /// Load a user and their profile.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::Repository` with `RepositoryError::NotFound` if
    /// the user doesn't exist.
    pub async fn load(&self, user_id: UserId) -> Result<(User, Profile), ProfileError> {
        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        let profile = self.profiles.get_or_create(user_id).await?;
        Ok((user, profile))
    }

    /// Apply a profile update, storing a new avatar if one was uploaded.
    ///
    /// The avatar is validated before anything is written. The database rows
    /// change together or not at all; a stored avatar whose rows failed to
    /// save is deleted again, and a replaced upload is deleted after commit.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::AvatarTooLarge` / `ProfileError::UnsupportedImage`
    /// for a bad upload, `ProfileError::Storage` if the file cannot be
    /// written, and `ProfileError::Repository` for database errors.
    pub async fn update(
        &self,
        user_id: UserId,
        update: &ProfileUpdate,
        avatar: Option<&AvatarUpload>,
    ) -> Result<Profile, ProfileError> {
        let format = avatar.map(AvatarUpload::validate).transpose()?;

        let stored = match (avatar, format) {
            (Some(upload), Some(format)) => Some(self.store_avatar(upload, format).await?),
            _ => None,
        };

        let changes = ProfileChanges {
            first_name: &update.first_name,
            last_name: &update.last_name,
            email: &update.email,
            bio: &update.bio,
            avatar: stored.as_deref(),
        };
        let saved = match self.profiles.update(user_id, changes).await {
            Ok(saved) => saved,
            Err(e) => {
                if let Some(path) = &stored {
                    self.remove_avatar(path).await;
                }
                return Err(e.into());
            }
        };

        if let Some(old) = &saved.replaced_avatar {
            self.remove_avatar(old).await;
        }

        tracing::info!(user_id = %user_id, avatar_changed = stored.is_some(), "Profile updated");

        Ok(saved.profile)
    }

    /// Write the avatar and return its path relative to the media root.
    async fn store_avatar(
        &self,
        upload: &AvatarUpload,
        format: ImageFormat,
    ) -> Result<String, ProfileError> {
        tokio::fs::create_dir_all(self.avatar_dir).await?;

        let file_name = format!("{}.{}", Uuid::new_v4(), format.extension());
        tokio::fs::write(self.avatar_dir.join(&file_name), &upload.bytes).await?;

        tracing::debug!(
            original_name = upload.file_name.as_deref().unwrap_or(""),
            stored_as = %file_name,
            bytes = upload.bytes.len(),
            "Avatar stored"
        );

        Ok(format!("{AVATAR_SUBDIR}/{file_name}"))
    }

    /// Delete an uploaded avatar given its media-relative path.
    ///
    /// Paths outside the avatar directory are left alone. Failures are
    /// logged, not returned: the profile is already consistent.
    async fn remove_avatar(&self, media_path: &str) {
        let Some(file_name) = avatar_file_name(media_path) else {
            return;
        };

        match tokio::fs::remove_file(self.avatar_dir.join(file_name)).await {
            Ok(()) => tracing::debug!(path = %media_path, "Avatar removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %media_path, error = %e, "Failed to remove avatar"),
        }
    }
}

/// File name of an avatar stored under [`AVATAR_SUBDIR`].
fn avatar_file_name(media_path: &str) -> Option<&str> {
    media_path
        .strip_prefix(AVATAR_SUBDIR)?
        .strip_prefix('/')
        .filter(|name| !name.is_empty() && !name.contains(['/', '\\']) && *name != "..")
}
