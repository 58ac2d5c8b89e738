use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Form;
use chrono::Local;
use serde::Serialize;

use super::{invalid_form, FormContext};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::AuthenticatedUser;
use crate::forms::account::{PasswordChangeForm, ProfileForm};
use crate::forms::FormErrors;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};
use crate::utils::flash::{FlashRedirect, Flashes};
use crate::utils::humanize::humanized_date;
use crate::utils::response::Page;

pub const PROFILE_PATH: &str = "/users/profile/";

#[derive(Serialize)]
pub struct ProfileContext {
    pub username: String,
    pub email: String,
    pub name: String,
    pub member_since: String,
    pub last_login: String,
    pub phone_number: Option<String>,
    pub profile_image: Option<String>,
    pub bio: String,
}

pub async fn profile(
    AuthenticatedUser(user): AuthenticatedUser,
    flashes: Flashes,
) -> Page<ProfileContext> {
    let now = Local::now();
    let joined = user.date_joined.with_timezone(&Local);
    let last_login = user.last_login.map(|at| at.with_timezone(&Local));

    let context = ProfileContext {
        name: user.full_name(),
        member_since: humanized_date(Some(&joined), &now),
        last_login: humanized_date(last_login.as_ref(), &now),
        username: user.username,
        email: user.email,
        phone_number: user.phone_number,
        profile_image: user.profile_image,
        bio: user.bio,
    };
    Page::new("accounts/profile.html", context).with_flashes(flashes)
}

fn edit_profile_page(form: ProfileForm, errors: FormErrors) -> Page<FormContext<ProfileForm>> {
    Page::new("accounts/update_profile.html", FormContext { form, errors })
}

pub async fn edit_profile_form(
    AuthenticatedUser(user): AuthenticatedUser,
    flashes: Flashes,
) -> Page<FormContext<ProfileForm>> {
    edit_profile_page(ProfileForm::from_user(&user), FormErrors::new()).with_flashes(flashes)
}

pub async fn edit_profile(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Form(form): Form<ProfileForm>,
) -> AppResult<Response> {
    let update = match form.clean() {
        Ok(update) => update,
        Err(errors) => return Ok(invalid_form(edit_profile_page(form, errors))),
    };

    match state.users().update_profile(user.id, update).await {
        Ok(()) => {
            tracing::info!(user_id = %user.id, "Profile updated");
            Ok(FlashRedirect::to(PROFILE_PATH).into_response())
        }
        Err(AppError::Conflict(_)) => {
            let mut errors = FormErrors::new();
            errors.add("email", "A user with that email already exists.");
            Ok(invalid_form(edit_profile_page(form, errors)))
        }
        Err(e) => Err(e),
    }
}

#[derive(Serialize)]
pub struct PasswordChangeContext {
    pub errors: FormErrors,
}

/// Password fields are never echoed back, only their errors.
fn password_change_page(errors: FormErrors) -> Page<PasswordChangeContext> {
    Page::new(
        "accounts/password_change.html",
        PasswordChangeContext { errors },
    )
}

pub async fn password_change_form(
    _user: AuthenticatedUser,
    flashes: Flashes,
) -> Page<PasswordChangeContext> {
    password_change_page(FormErrors::new()).with_flashes(flashes)
}

pub async fn password_change(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Form(form): Form<PasswordChangeForm>,
) -> AppResult<Response> {
    let old_password_ok = verify_password(&form.old_password, &user.password_hash);
    let errors = form.errors(old_password_ok);
    if !errors.is_empty() {
        return Ok(invalid_form(password_change_page(errors)));
    }

    state
        .users()
        .set_password(user.id, hash_password(&form.new_password1)?)
        .await?;
    tracing::info!(user_id = %user.id, "Password changed");

    Ok(FlashRedirect::to(PROFILE_PATH)
        .success("Your password was changed successfully")
        .into_response())
}
