use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Form;
use serde::Serialize;

use super::record::{not_found, RecordId, UserRecord};
use super::{invalid_form, FormContext};
use crate::auth::{role_label, AdminOnly, Authorized};
use crate::forms::admin::{AssignRoleForm, GroupForm};
use crate::forms::FormErrors;
use crate::models::{GroupSummary, Role, User};
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};
use crate::utils::flash::{FlashRedirect, Flashes};
use crate::utils::response::Page;

pub const CREATE_GROUP_PATH: &str = "/users/admin/create-group/";

fn admin_dashboard() -> FlashRedirect {
    FlashRedirect::to(Role::Admin.dashboard_path())
}

#[derive(Serialize)]
pub struct AssignRoleContext {
    pub user: User,
    pub current_role: String,
    pub groups: Vec<GroupSummary>,
    pub form: AssignRoleForm,
    pub errors: FormErrors,
}

async fn assign_role_page(
    state: &AppState,
    user: User,
    form: AssignRoleForm,
    errors: FormErrors,
) -> AppResult<Page<AssignRoleContext>> {
    let context = AssignRoleContext {
        current_role: role_label(&user),
        groups: state.groups().list().await?,
        user,
        form,
        errors,
    };
    Ok(Page::new("admin/assign_role.html", context))
}

pub async fn assign_role_form(
    State(state): State<AppState>,
    _admin: Authorized<AdminOnly>,
    RecordId(user_id, _): RecordId<UserRecord>,
    flashes: Flashes,
) -> AppResult<Response> {
    let Some(user) = state.users().find_by_id(user_id).await? else {
        return Ok(not_found::<UserRecord>().into_response());
    };

    let page = assign_role_page(&state, user, AssignRoleForm::default(), FormErrors::new()).await?;
    Ok(page.with_flashes(flashes).into_response())
}

/// Replaces every membership of the user with the selected group.
pub async fn assign_role(
    State(state): State<AppState>,
    admin: Authorized<AdminOnly>,
    RecordId(user_id, _): RecordId<UserRecord>,
    Form(form): Form<AssignRoleForm>,
) -> AppResult<Response> {
    let Some(user) = state.users().find_by_id(user_id).await? else {
        return Ok(not_found::<UserRecord>().into_response());
    };

    let group = match form.clean() {
        Ok(group_id) => state.groups().find_by_id(group_id).await?,
        Err(errors) => {
            let page = assign_role_page(&state, user, form, errors).await?;
            return Ok(invalid_form(page));
        }
    };
    let Some(group) = group else {
        let mut errors = FormErrors::new();
        errors.add(
            "role",
            "Select a valid choice. That choice is not one of the available choices.",
        );
        let page = assign_role_page(&state, user, form, errors).await?;
        return Ok(invalid_form(page));
    };

    state.groups().replace_memberships(user.id, group.id).await?;
    tracing::info!(
        user_id = %user.id,
        group = %group.name,
        admin = %admin.user.username,
        "Role assigned"
    );

    Ok(admin_dashboard()
        .success(format!(
            "User {} has been assigned to the {}",
            user.username, group.name
        ))
        .into_response())
}

fn create_group_page(form: GroupForm, errors: FormErrors) -> Page<FormContext<GroupForm>> {
    Page::new("admin/create_group.html", FormContext { form, errors })
}

pub async fn create_group_form(
    _admin: Authorized<AdminOnly>,
    flashes: Flashes,
) -> Page<FormContext<GroupForm>> {
    create_group_page(GroupForm::default(), FormErrors::new()).with_flashes(flashes)
}

pub async fn create_group(
    State(state): State<AppState>,
    admin: Authorized<AdminOnly>,
    Form(form): Form<GroupForm>,
) -> AppResult<Response> {
    let name = match form.clean() {
        Ok(name) => name,
        Err(errors) => return Ok(invalid_form(create_group_page(form, errors))),
    };

    match state.groups().create(&name).await {
        Ok(group) => {
            tracing::info!(
                group_id = %group.id,
                name = %group.name,
                admin = %admin.user.username,
                "Group created"
            );
            Ok(FlashRedirect::to(CREATE_GROUP_PATH)
                .success(format!("Group {} has been created Successfully", group.name))
                .into_response())
        }
        Err(AppError::Conflict(_)) => {
            let mut errors = FormErrors::new();
            errors.add("name", "Group with this Name already exists.");
            Ok(invalid_form(create_group_page(form, errors)))
        }
        Err(e) => Err(e),
    }
}

#[derive(Serialize)]
pub struct GroupListContext {
    pub groups: Vec<GroupSummary>,
}

pub async fn group_list(
    State(state): State<AppState>,
    _admin: Authorized<AdminOnly>,
    flashes: Flashes,
) -> AppResult<Page<GroupListContext>> {
    let groups = state.groups().list().await?;
    Ok(Page::new("admin/group_list.html", GroupListContext { groups }).with_flashes(flashes))
}

#[derive(Serialize)]
pub struct UserListContext {
    pub users: Vec<User>,
}

pub async fn user_list(
    State(state): State<AppState>,
    _admin: Authorized<AdminOnly>,
    flashes: Flashes,
) -> AppResult<Page<UserListContext>> {
    let users = state.users().list().await?;
    Ok(Page::new("admin/user_list.html", UserListContext { users }).with_flashes(flashes))
}
