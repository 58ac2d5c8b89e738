use axum::{routing::get, routing::post, Router};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::{
    accounts, admin, categories, dashboard, events, health_check, home, no_permission, profile,
};
use crate::state::AppState;


fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/events/", get(events::event_list))
        .route(
            "/events/create/",
            get(events::create_event_form).post(events::create_event),
        )
        .route("/events/:id/", get(events::event_detail))
        .route(
            "/events/:id/update/",
            get(events::update_event_form).post(events::update_event),
        )
        .route("/events/:id/delete/", post(events::delete_event))
        .route("/events/:id/rsvp/", post(events::rsvp_event))
        .route("/events/categories/", get(categories::category_list))
        .route(
            "/events/categories/create/",
            get(categories::create_category_form).post(categories::create_category),
        )
        .route(
            "/events/categories/:id/update/",
            get(categories::update_category_form).post(categories::update_category),
        )
        .route(
            "/events/categories/:id/delete/",
            post(categories::delete_category),
        )
        .route("/dashboard/", get(dashboard::dashboard))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users/sign-up/",
            get(accounts::sign_up_form).post(accounts::sign_up),
        )
        .route(
            "/users/sign-in/",
            get(accounts::sign_in_form).post(accounts::sign_in),
        )
        .route(
            "/users/sign-out/",
            get(accounts::sign_out_confirm).post(accounts::sign_out),
        )
        .route(
            "/users/activate/:user_id/:token/",
            get(accounts::activate_user),
        )
        .route(
            "/users/password/reset/",
            get(accounts::password_reset_form).post(accounts::password_reset),
        )
        .route(
            "/users/password/reset/:user_id/:token/",
            get(accounts::password_reset_confirm_form).post(accounts::password_reset_confirm),
        )
        .route(
            "/users/password/change/",
            get(profile::password_change_form).post(profile::password_change),
        )
        .route("/users/profile/", get(profile::profile))
        .route(
            "/users/profile/edit/",
            get(profile::edit_profile_form).post(profile::edit_profile),
        )
        .route("/users/admin/dashboard/", get(dashboard::admin_dashboard))
        .route(
            "/users/organizer/dashboard/",
            get(dashboard::organizer_dashboard),
        )
        .route(
            "/users/participant/dashboard/",
            get(dashboard::participant_dashboard),
        )
        .route(
            "/users/admin/:user_id/assign-role/",
            get(admin::assign_role_form).post(admin::assign_role),
        )
        .route(
            "/users/admin/create-group/",
            get(admin::create_group_form).post(admin::create_group),
        )
        .route("/users/admin/groups/", get(admin::group_list))
        .route("/users/admin/users/", get(admin::user_list))
}

pub fn create_routes(state: AppState, production: bool) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/no-permission/", get(no_permission))
        .route("/health", get(health_check))
        .merge(event_routes())
        .merge(user_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer(production))
        .layer(create_cors_layer())
}
