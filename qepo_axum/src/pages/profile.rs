use askama::Template;
use axum::{
    extract::{Form, Multipart},
    response::{IntoResponse, Redirect, Response},
};
use http::{HeaderMap, StatusCode};
use serde::Deserialize;

use qepo::{
    AvatarState, CoordinationError, EditProfileForm, FieldErrors, Notification, ProfileError,
    ProfileFormOutcome, ProfileProjection, get_avatar_state, get_profile, initials,
    remove_selected_avatar, save_selected_avatar, select_avatar, submit_profile_form,
};

use crate::error::IntoResponseError;
use crate::flash::{Toast, redirect_with_notification, take_flash};
use crate::session::AuthUser;

const PROFILE_PATH: &str = "/profile";

#[derive(Template)]
#[template(path = "profile.html")]
struct ProfileTemplate<'a> {
    logged_in: bool,
    toasts: Vec<Toast>,
    avatar_src: Option<String>,
    initials: String,
    has_selection: bool,
    csrf_token: &'a str,
    username: &'a str,
    bio: &'a str,
    username_error: Option<&'a str>,
    bio_error: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CsrfForm {
    #[serde(default)]
    csrf_token: String,
}

/// Stored profile and avatar state, degrading to empty values on failure
async fn load_page_state(
    user: &AuthUser,
    notifications: &mut Vec<Notification>,
) -> (ProfileProjection, AvatarState) {
    let profile = match get_profile(&user.id).await {
        Ok(profile) => profile.unwrap_or_default(),
        Err(e) => {
            tracing::error!(error = %e, "Profile lookup failed");
            notifications.push(Notification::error("Gagal mendapatkan data user"));
            ProfileProjection::default()
        }
    };
    let avatar = get_avatar_state(&user.session_id).await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Could not read the pending avatar");
        AvatarState::Idle
    });
    (profile, avatar)
}

fn render_profile_page(
    user: &AuthUser,
    profile: &ProfileProjection,
    avatar: &AvatarState,
    form: &EditProfileForm,
    errors: &FieldErrors,
    notifications: Vec<Notification>,
    headers: HeaderMap,
) -> Result<Response, (StatusCode, String)> {
    let avatar_src = match avatar {
        AvatarState::Selected(image) => Some(image.preview_data_url()),
        AvatarState::Idle => profile.profile_picture_url.clone(),
    };
    let display_name = profile.username.as_deref().unwrap_or(&user.email);

    let template = ProfileTemplate {
        logged_in: true,
        toasts: notifications.into_iter().map(Toast::from).collect(),
        avatar_src,
        initials: initials(display_name),
        has_selection: matches!(avatar, AvatarState::Selected(_)),
        csrf_token: &user.csrf_token,
        username: &form.username,
        bio: &form.bio,
        username_error: errors.get("username"),
        bio_error: errors.get("bio"),
    };
    super::render_page(&template, headers)
}

pub(super) async fn profile_page(
    user: AuthUser,
    headers: HeaderMap,
) -> Result<Response, (StatusCode, String)> {
    let (mut notifications, clear_flash) = take_flash(&headers);
    let (profile, avatar) = load_page_state(&user, &mut notifications).await;
    let form = EditProfileForm::from_profile(&profile);

    render_profile_page(
        &user,
        &profile,
        &avatar,
        &form,
        &FieldErrors::new(),
        notifications,
        clear_flash,
    )
}

/// Save the username/bio form. Only changed fields are written.
pub(super) async fn profile_submit(
    user: AuthUser,
    Form(form): Form<EditProfileForm>,
) -> Result<Response, (StatusCode, String)> {
    user.verify_form_csrf(&form.csrf_token).into_response_error()?;

    match submit_profile_form(&user.id, &form).await {
        ProfileFormOutcome::Unchanged => Ok(Redirect::to(PROFILE_PATH).into_response()),
        ProfileFormOutcome::Updated(notification) => {
            Ok(redirect_with_notification(PROFILE_PATH, notification))
        }
        ProfileFormOutcome::Rejected(failure) => {
            let mut notifications: Vec<Notification> = failure.notification.into_iter().collect();
            let (profile, avatar) = load_page_state(&user, &mut notifications).await;
            render_profile_page(
                &user,
                &profile,
                &avatar,
                &form,
                &failure.errors,
                notifications,
                HeaderMap::new(),
            )
        }
    }
}

/// Hold a newly picked image as the pending avatar
pub(super) async fn avatar_select(
    user: AuthUser,
    mut multipart: Multipart,
) -> Result<Response, (StatusCode, String)> {
    let mut csrf_token = String::new();
    let mut image: Option<(Vec<u8>, String)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("csrf_token") => {
                csrf_token = field
                    .text()
                    .await
                    .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
            }
            Some("image") => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
                image = Some((bytes.to_vec(), content_type));
            }
            _ => {}
        }
    }

    user.verify_form_csrf(&csrf_token).into_response_error()?;

    let (bytes, content_type) = image.unwrap_or_default();
    match select_avatar(&user.session_id, bytes, &content_type).await {
        Ok(()) => Ok(Redirect::to(PROFILE_PATH).into_response()),
        Err(CoordinationError::ProfileError(ProfileError::InvalidImage(reason))) => {
            tracing::info!(reason = %reason, "Avatar selection rejected");
            Ok(redirect_with_notification(
                PROFILE_PATH,
                Notification::error("Gambar tidak valid"),
            ))
        }
        Err(_) => Ok(redirect_with_notification(
            PROFILE_PATH,
            Notification::error("Gagal mengubah foto profil"),
        )),
    }
}

pub(super) async fn avatar_save(
    user: AuthUser,
    Form(form): Form<CsrfForm>,
) -> Result<Response, (StatusCode, String)> {
    user.verify_form_csrf(&form.csrf_token).into_response_error()?;

    match save_selected_avatar(&user.session_id, &user.id).await {
        Ok(Some(notification)) => Ok(redirect_with_notification(PROFILE_PATH, notification)),
        Ok(None) => Ok(Redirect::to(PROFILE_PATH).into_response()),
        Err(_) => Ok(redirect_with_notification(
            PROFILE_PATH,
            Notification::error("Gagal mengubah foto profil"),
        )),
    }
}

pub(super) async fn avatar_remove(
    user: AuthUser,
    Form(form): Form<CsrfForm>,
) -> Result<Response, (StatusCode, String)> {
    user.verify_form_csrf(&form.csrf_token).into_response_error()?;

    if let Err(e) = remove_selected_avatar(&user.session_id).await {
        tracing::error!(error = %e, "Could not drop the pending avatar");
    }
    Ok(Redirect::to(PROFILE_PATH).into_response())
}
