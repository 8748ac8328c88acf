//! Profile route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, State},
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use windsor_goods_core::forms::{FieldErrors, ProfileForm};

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, Profile};
use crate::services::{AvatarUpload, ProfileError, ProfileService};
use crate::state::AppState;

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub current_user: Option<CurrentUser>,
    pub form: ProfileForm,
    pub profile: Profile,
    pub errors: FieldErrors,
}

/// Display the profile form filled with the user's current details.
#[instrument(skip(state, current_user))]
pub async fn profile_page(
    State(state): State<AppState>,
    RequireAuth(current_user): RequireAuth,
) -> Result<Response> {
    let avatar_dir = state.config().avatar_dir();
    let (user, profile) = ProfileService::new(state.pool(), &avatar_dir)
        .load(current_user.id)
        .await?;

    let form = ProfileForm {
        first_name: user.first_name,
        last_name: user.last_name,
        email: user.email.into_inner(),
        bio: profile.bio.clone(),
    };

    Ok(ProfileTemplate {
        current_user: Some(current_user),
        form,
        profile,
        errors: FieldErrors::new(),
    }
    .into_response())
}

/// Handle a profile update (multipart: text fields plus optional avatar).
#[instrument(skip(state, current_user, multipart))]
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(current_user): RequireAuth,
    multipart: Multipart,
) -> Result<Response> {
    let (form, avatar) = read_profile_form(multipart).await?;

    let avatar_dir = state.config().avatar_dir();
    let service = ProfileService::new(state.pool(), &avatar_dir);

    let mut errors = match form.validate() {
        Ok(update) => match service.update(current_user.id, &update, avatar.as_ref()).await {
            Ok(_) => return Ok(Redirect::to("/profile").into_response()),
            Err(e) if e.is_user_error() => FieldErrors::from(e),
            Err(e) => return Err(e.into()),
        },
        Err(errors) => errors,
    };

    // Report a bad avatar alongside text field errors.
    if let Some(Err(e)) = avatar.as_ref().map(AvatarUpload::validate)
        && !errors.has("avatar")
    {
        errors.add("avatar", capitalize_first(&e.to_string()));
    }

    let (_, profile) = service.load(current_user.id).await?;

    Ok(ProfileTemplate {
        current_user: Some(current_user),
        form,
        profile,
        errors,
    }
    .into_response())
}

/// Split the multipart body into text fields and the avatar file.
///
/// An avatar part with no file name or no content means "keep the current one".
async fn read_profile_form(
    mut multipart: Multipart,
) -> Result<(ProfileForm, Option<AvatarUpload>)> {
    let mut form = ProfileForm::default();
    let mut avatar = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_owned();
        if name == "avatar" {
            let file_name = field
                .file_name()
                .filter(|f| !f.is_empty())
                .map(str::to_owned);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            if file_name.is_some() && !bytes.is_empty() {
                avatar = Some(AvatarUpload {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        match name.as_str() {
            "first_name" => form.first_name = value,
            "last_name" => form.last_name = value,
            "email" => form.email = value,
            "bio" => form.bio = value,
            _ => {}
        }
    }

    Ok((form, avatar))
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |c| {
        c.to_uppercase().chain(chars).collect::<String>() + "."
    })
}

impl From<ProfileError> for FieldErrors {
    fn from(e: ProfileError) -> Self {
        let mut errors = Self::new();
        errors.add("avatar", capitalize_first(&e.to_string()));
        errors
    }
}
