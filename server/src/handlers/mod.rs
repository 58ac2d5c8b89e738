use axum::response::{IntoResponse, Response};
use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::auth::{dashboard_for, user_role, CurrentUser};
use crate::forms::{FormErrors, FORM_ERROR_MESSAGE};
use crate::models::{Role, User};
use crate::utils::flash::{FlashLevel, Flashes};
use crate::utils::response::{success, Page};

pub mod accounts;
pub mod admin;
pub mod categories;
pub mod dashboard;
pub mod events;
pub mod profile;
pub mod record;

pub const EVENT_LIST_PATH: &str = "/events/";
pub const CATEGORY_LIST_PATH: &str = "/events/categories/";

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "eventhub-server",
    };

    success(payload, "Health check successful").into_response()
}

#[derive(Serialize)]
pub struct HomeContext {
    pub user: Option<User>,
    pub user_role: Option<Role>,
    pub dashboard: Option<&'static str>,
}

pub async fn home(CurrentUser(user): CurrentUser, flashes: Flashes) -> Page<HomeContext> {
    let context = HomeContext {
        user_role: user.as_ref().and_then(user_role),
        dashboard: user.as_ref().map(dashboard_for),
        user,
    };
    Page::new("home.html", context).with_flashes(flashes)
}

#[derive(Serialize)]
pub struct EmptyContext {}

pub async fn no_permission(flashes: Flashes) -> Page<EmptyContext> {
    Page::new("no_permission.html", EmptyContext {}).with_flashes(flashes)
}

/// The server's local calendar date; dashboards scope events against it.
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// A form echoed back with its field errors.
#[derive(Serialize)]
pub struct FormContext<F> {
    pub form: F,
    pub errors: FormErrors,
}

impl<F> FormContext<F> {
    pub fn blank(form: F) -> Self {
        Self {
            form,
            errors: FormErrors::new(),
        }
    }
}

/// Re-renders a rejected form with the generic error flash.
pub(crate) fn invalid_form<T: Serialize>(page: Page<T>) -> Response {
    page.flash(FlashLevel::Error, FORM_ERROR_MESSAGE).into_response()
}
