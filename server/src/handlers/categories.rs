use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Form;
use serde::Serialize;

use super::record::{not_found, CategoryRecord, RecordId};
use super::{invalid_form, FormContext, CATEGORY_LIST_PATH};
use crate::auth::{AdminOnly, Authorized, EventManager};
use crate::forms::event::CategoryForm;
use crate::forms::FormErrors;
use crate::models::{Category, CategoryInput};
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};
use crate::utils::flash::{FlashRedirect, Flashes};
use crate::utils::response::Page;

const CATEGORY_TAKEN: &str = "Category with this Name already exists.";

#[derive(Serialize)]
pub struct CategoryListContext {
    pub categories: Vec<Category>,
}

fn category_form_page(form: CategoryForm, errors: FormErrors) -> Page<FormContext<CategoryForm>> {
    Page::new("category_form.html", FormContext { form, errors })
}

fn category_not_found() -> Response {
    not_found::<CategoryRecord>().into_response()
}

/// Turns a duplicate name into a field error; other failures propagate.
fn name_taken<T>(result: AppResult<T>) -> AppResult<Result<T, FormErrors>> {
    match result {
        Ok(value) => Ok(Ok(value)),
        Err(AppError::Conflict(_)) => {
            let mut errors = FormErrors::new();
            errors.add("name", CATEGORY_TAKEN);
            Ok(Err(errors))
        }
        Err(e) => Err(e),
    }
}

pub async fn category_list(
    State(state): State<AppState>,
    _manager: Authorized<EventManager>,
    flashes: Flashes,
) -> AppResult<Page<CategoryListContext>> {
    let categories = state.categories().list().await?;
    Ok(Page::new("category_list.html", CategoryListContext { categories }).with_flashes(flashes))
}

pub async fn create_category_form(
    _manager: Authorized<EventManager>,
    flashes: Flashes,
) -> Page<FormContext<CategoryForm>> {
    category_form_page(CategoryForm::default(), FormErrors::new()).with_flashes(flashes)
}

pub async fn create_category(
    State(state): State<AppState>,
    manager: Authorized<EventManager>,
    Form(form): Form<CategoryForm>,
) -> AppResult<Response> {
    let input: CategoryInput = match form.clean() {
        Ok(input) => input,
        Err(errors) => return Ok(invalid_form(category_form_page(form, errors))),
    };

    match name_taken(state.categories().create(input).await)? {
        Ok(category) => {
            tracing::info!(
                category_id = %category.id,
                name = %category.name,
                editor = %manager.user.username,
                "Category created"
            );
            Ok(FlashRedirect::to(CATEGORY_LIST_PATH)
                .success("Category Created Successfully")
                .into_response())
        }
        Err(errors) => Ok(invalid_form(category_form_page(form, errors))),
    }
}

pub async fn update_category_form(
    State(state): State<AppState>,
    _manager: Authorized<EventManager>,
    RecordId(category_id, _): RecordId<CategoryRecord>,
    flashes: Flashes,
) -> AppResult<Response> {
    let Some(category) = state.categories().find_by_id(category_id).await? else {
        return Ok(category_not_found());
    };

    Ok(
        category_form_page(CategoryForm::from_category(&category), FormErrors::new())
            .with_flashes(flashes)
            .into_response(),
    )
}

pub async fn update_category(
    State(state): State<AppState>,
    manager: Authorized<EventManager>,
    RecordId(category_id, _): RecordId<CategoryRecord>,
    Form(form): Form<CategoryForm>,
) -> AppResult<Response> {
    if state.categories().find_by_id(category_id).await?.is_none() {
        return Ok(category_not_found());
    }

    let input = match form.clean() {
        Ok(input) => input,
        Err(errors) => return Ok(invalid_form(category_form_page(form, errors))),
    };

    match name_taken(state.categories().update(category_id, input).await)? {
        Ok(true) => {
            tracing::info!(
                category_id = %category_id,
                editor = %manager.user.username,
                "Category updated"
            );
            Ok(FlashRedirect::to(CATEGORY_LIST_PATH)
                .success("Category Updated Successfully")
                .into_response())
        }
        Ok(false) => Ok(category_not_found()),
        Err(errors) => Ok(invalid_form(category_form_page(form, errors))),
    }
}

/// Admins only. Events in the category go with it.
pub async fn delete_category(
    State(state): State<AppState>,
    admin: Authorized<AdminOnly>,
    RecordId(category_id, _): RecordId<CategoryRecord>,
) -> AppResult<FlashRedirect> {
    let redirect = FlashRedirect::to(CATEGORY_LIST_PATH);

    if state.categories().delete(category_id).await? {
        tracing::info!(
            category_id = %category_id,
            admin = %admin.user.username,
            "Category deleted"
        );
        Ok(redirect.success("Category Deleted Successfully"))
    } else {
        Ok(not_found::<CategoryRecord>())
    }
}
