//! Sign-up, activation, sign-in/out and the password reset flow.

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Form;
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{invalid_form, FormContext};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::{dashboard_for, session, AuthenticatedUser};
use crate::forms::account::{LoginForm, PasswordResetForm, RegistrationForm, SetPasswordForm};
use crate::forms::FormErrors;
use crate::mail::{activation_mail, password_reset_mail, send_or_log};
use crate::models::{NewUser, Role, User};
use crate::state::AppState;
use crate::utils::error::{is_local_path, AppError, AppResult, SIGN_IN_PATH};
use crate::utils::flash::{FlashRedirect, Flashes};
use crate::utils::response::Page;

pub const ACTIVATE_PATH: &str = "/users/activate/";
pub const PASSWORD_RESET_PATH: &str = "/users/password/reset/";

fn register_page(form: RegistrationForm, errors: FormErrors) -> Page<FormContext<RegistrationForm>> {
    Page::new("registration/register.html", FormContext { form, errors })
}

pub async fn sign_up_form(flashes: Flashes) -> Page<FormContext<RegistrationForm>> {
    register_page(RegistrationForm::default(), FormErrors::new()).with_flashes(flashes)
}

pub async fn sign_up(
    State(state): State<AppState>,
    Form(form): Form<RegistrationForm>,
) -> AppResult<Response> {
    let mut errors = form.errors();
    if !errors.has("username")
        && state
            .users()
            .find_by_username(form.username.trim())
            .await?
            .is_some()
    {
        errors.add("username", "A user with that username already exists.");
    }
    if !errors.has("email")
        && state
            .users()
            .find_by_email(form.email.trim())
            .await?
            .is_some()
    {
        errors.add("email", "Email already exists");
    }
    if !errors.is_empty() {
        tracing::debug!(username = %form.username, "Registration rejected");
        return Ok(invalid_form(register_page(form, errors)));
    }

    let new_user = NewUser {
        username: form.username.trim().to_string(),
        email: form.email.trim().to_string(),
        first_name: form.first_name.trim().to_string(),
        last_name: form.last_name.trim().to_string(),
        password_hash: hash_password(&form.password)?,
    };
    let user = match state.users().create(new_user).await {
        Ok(user) => user,
        Err(AppError::Conflict(_)) => {
            let mut errors = FormErrors::new();
            errors.add("username", "A user with that username already exists.");
            return Ok(invalid_form(register_page(form, errors)));
        }
        Err(e) => return Err(e),
    };

    match state
        .groups()
        .find_by_name(Role::Participant.group_name())
        .await?
    {
        Some(group) => state.groups().add_member(group.id, user.id).await?,
        None => tracing::warn!("Participant group is missing; new user has no role"),
    }

    let token = state.tokens().make_token(&user, Utc::now());
    let link = format!("{}{ACTIVATE_PATH}{}/{token}/", state.config().base_url, user.id);
    send_or_log(state.mailer(), activation_mail(&user, &link)).await;

    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    Ok(FlashRedirect::to(SIGN_IN_PATH)
        .success("A Confirmation mail sent. Please check your inbox")
        .into_response())
}

pub async fn activate_user(
    State(state): State<AppState>,
    Path((user_id, token)): Path<(String, String)>,
) -> AppResult<Response> {
    let user = match Uuid::parse_str(&user_id) {
        Ok(user_id) => state.users().find_by_id(user_id).await?,
        Err(_) => None,
    };
    let Some(user) = user else {
        return Err(AppError::NotFound("User not found".to_string()));
    };

    if !state.tokens().check_token(&user, &token, Utc::now()) {
        return Err(AppError::ValidationError("Invalid Id or token".to_string()));
    }

    state.users().activate(user.id).await?;
    tracing::info!(user_id = %user.id, "Account activated");

    Ok(FlashRedirect::to(SIGN_IN_PATH).into_response())
}

#[derive(Debug, Default, Deserialize)]
pub struct NextParams {
    pub next: Option<String>,
}

#[derive(Serialize)]
pub struct SignInContext {
    pub form: LoginForm,
    pub errors: FormErrors,
    pub next: Option<String>,
}

fn sign_in_page(form: LoginForm, errors: FormErrors, next: Option<String>) -> Page<SignInContext> {
    Page::new("registration/login.html", SignInContext { form, errors, next })
}

pub async fn sign_in_form(
    Query(params): Query<NextParams>,
    flashes: Flashes,
) -> Page<SignInContext> {
    sign_in_page(LoginForm::default(), FormErrors::new(), params.next).with_flashes(flashes)
}

/// Checks the credentials; a correct password on an inactive account is
/// reported as inactive, anything else as a bad login.
async fn authenticate(
    state: &AppState,
    form: &LoginForm,
) -> AppResult<Result<User, &'static str>> {
    let Some(user) = state.users().find_by_username(form.username.trim()).await? else {
        return Ok(Err(LoginForm::INVALID_LOGIN));
    };
    if !verify_password(&form.password, &user.password_hash) {
        return Ok(Err(LoginForm::INVALID_LOGIN));
    }
    if !user.is_active {
        return Ok(Err(LoginForm::INACTIVE));
    }
    Ok(Ok(user))
}

pub async fn sign_in(
    State(state): State<AppState>,
    Query(params): Query<NextParams>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let errors = form.errors();
    if !errors.is_empty() {
        return Ok(invalid_form(sign_in_page(form, errors, params.next)));
    }

    let user = match authenticate(&state, &form).await? {
        Ok(user) => user,
        Err(message) => {
            tracing::info!(username = %form.username, reason = message, "Sign-in refused");
            return Ok(invalid_form(sign_in_page(
                form,
                LoginForm::rejected(message),
                params.next,
            )));
        }
    };

    let jar = session::start(&state, jar, &user).await?;
    let destination = match params.next.as_deref() {
        Some(next) if is_local_path(next) => next.to_string(),
        _ => dashboard_for(&user).to_string(),
    };

    Ok(FlashRedirect::to(destination)
        .with_jar(jar)
        .into_response())
}

#[derive(Serialize)]
pub struct SignOutContext {
    pub username: String,
}

pub async fn sign_out_confirm(
    AuthenticatedUser(user): AuthenticatedUser,
    flashes: Flashes,
) -> Page<SignOutContext> {
    Page::new(
        "registration/logout.html",
        SignOutContext {
            username: user.username,
        },
    )
    .with_flashes(flashes)
}

pub async fn sign_out(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    jar: CookieJar,
) -> AppResult<FlashRedirect> {
    let jar = session::end(&state, jar).await?;
    tracing::info!(user_id = %user.id, "Signed out");
    Ok(FlashRedirect::to(SIGN_IN_PATH).with_jar(jar))
}

fn reset_request_page(
    form: PasswordResetForm,
    errors: FormErrors,
) -> Page<FormContext<PasswordResetForm>> {
    Page::new("registration/reset_password.html", FormContext { form, errors })
}

pub async fn password_reset_form(flashes: Flashes) -> Page<FormContext<PasswordResetForm>> {
    reset_request_page(PasswordResetForm::default(), FormErrors::new()).with_flashes(flashes)
}

/// Always answers the same way, whether or not the address is known.
pub async fn password_reset(
    State(state): State<AppState>,
    Form(form): Form<PasswordResetForm>,
) -> AppResult<Response> {
    let errors = form.errors();
    if !errors.is_empty() {
        return Ok(invalid_form(reset_request_page(form, errors)));
    }

    match state.users().find_by_email(form.email.trim()).await? {
        Some(user) if user.is_active => {
            let token = state.tokens().make_token(&user, Utc::now());
            let link = format!(
                "{}{PASSWORD_RESET_PATH}{}/{token}/",
                state.config().base_url,
                user.id
            );
            send_or_log(state.mailer(), password_reset_mail(&user, &link)).await;
            tracing::info!(user_id = %user.id, "Password reset requested");
        }
        _ => tracing::debug!("Password reset requested for an unknown or inactive address"),
    }

    Ok(FlashRedirect::to(SIGN_IN_PATH)
        .success("Reset Email Sent Check Your Inbox")
        .into_response())
}

#[derive(Serialize)]
pub struct ResetConfirmContext {
    pub validlink: bool,
    pub errors: FormErrors,
}

fn reset_confirm_page(validlink: bool, errors: FormErrors) -> Page<ResetConfirmContext> {
    Page::new(
        "registration/reset_password.html",
        ResetConfirmContext { validlink, errors },
    )
}

/// The user a reset link belongs to, if the link is still good.
async fn reset_link_user(state: &AppState, user_id: &str, token: &str) -> AppResult<Option<User>> {
    let Ok(user_id) = Uuid::parse_str(user_id) else {
        return Ok(None);
    };
    let user = state.users().find_by_id(user_id).await?;
    Ok(user.filter(|user| state.tokens().check_token(user, token, Utc::now())))
}

pub async fn password_reset_confirm_form(
    State(state): State<AppState>,
    Path((user_id, token)): Path<(String, String)>,
    flashes: Flashes,
) -> AppResult<Page<ResetConfirmContext>> {
    let validlink = reset_link_user(&state, &user_id, &token).await?.is_some();
    Ok(reset_confirm_page(validlink, FormErrors::new()).with_flashes(flashes))
}

pub async fn password_reset_confirm(
    State(state): State<AppState>,
    Path((user_id, token)): Path<(String, String)>,
    Form(form): Form<SetPasswordForm>,
) -> AppResult<Response> {
    let Some(user) = reset_link_user(&state, &user_id, &token).await? else {
        tracing::info!(user_id = %user_id, "Stale password reset link used");
        return Ok(reset_confirm_page(false, FormErrors::new()).into_response());
    };

    let errors = form.errors();
    if !errors.is_empty() {
        return Ok(invalid_form(reset_confirm_page(true, errors)));
    }

    state
        .users()
        .set_password(user.id, hash_password(&form.new_password1)?)
        .await?;
    state.sessions().delete_for_user(user.id).await?;
    tracing::info!(user_id = %user.id, "Password reset completed");

    Ok(FlashRedirect::to(SIGN_IN_PATH)
        .success("Reset Succesfull")
        .into_response())
}
