//! User profiles (avatar and bio).

use serde::Serialize;

use windsor_goods_core::{ProfileId, UserId};

/// Avatar stored for profiles that never uploaded one.
pub const DEFAULT_AVATAR: &str = "default.jpg";

/// Bundled image shown in place of [`DEFAULT_AVATAR`].
const DEFAULT_AVATAR_URL: &str = "/static/images/default-avatar.svg";

/// A user's profile.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub id: ProfileId,
    pub user_id: UserId,
    /// Path relative to the media root, or [`DEFAULT_AVATAR`].
    pub avatar: String,
    pub bio: String,
}

impl Profile {
    /// URL the avatar image is served from.
    #[must_use]
    pub fn avatar_url(&self) -> String {
        if self.avatar == DEFAULT_AVATAR {
            DEFAULT_AVATAR_URL.to_owned()
        } else {
            format!("/media/{}", self.avatar)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(avatar: &str) -> Profile {
        Profile {
            id: ProfileId::new(1),
            user_id: UserId::new(1),
            avatar: avatar.to_owned(),
            bio: String::new(),
        }
    }

    #[test]
    fn test_default_avatar_served_from_static() {
        assert_eq!(profile(DEFAULT_AVATAR).avatar_url(), "/static/images/default-avatar.svg");
    }

    #[test]
    fn test_uploaded_avatar_served_from_media() {
        assert_eq!(
            profile("profile_images/abc.png").avatar_url(),
            "/media/profile_images/abc.png"
        );
    }
}
