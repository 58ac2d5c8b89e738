use std::collections::HashSet;

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Form;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::record::{not_found, EventRecord, RecordId};
use super::{invalid_form, today, EVENT_LIST_PATH};
use crate::auth::{Authorized, CurrentUser, EventManager, ParticipantOnly};
use crate::forms::event::EventForm;
use crate::forms::FormErrors;
use crate::mail::{rsvp_confirmation_mail, send_or_log};
use crate::models::{Category, Event, EventQuery, Role, RsvpOutcome, User};
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::flash::{FlashRedirect, Flashes};
use crate::utils::response::Page;

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
}

#[derive(Serialize)]
pub struct EventEntry {
    #[serde(flatten)]
    pub event: Event,
    pub user_has_rsvped: bool,
}

#[derive(Serialize)]
pub struct EventListContext {
    pub events: Vec<EventEntry>,
    pub search: String,
}

#[derive(Serialize)]
pub struct EventDetailContext {
    pub event: Event,
    pub user_has_rsvped: bool,
}

#[derive(Serialize)]
pub struct EventFormContext {
    pub form: EventForm,
    pub errors: FormErrors,
    pub categories: Vec<Category>,
    /// Set when editing an existing event.
    pub event_id: Option<Uuid>,
}

fn event_form_page(context: EventFormContext) -> Page<EventFormContext> {
    Page::new("event_form.html", context)
}

fn event_not_found() -> Response {
    not_found::<EventRecord>().into_response()
}

/// Ids of the events `user` has RSVP'd to, fetched once per page.
async fn rsvped_event_ids(state: &AppState, user: Option<&User>) -> AppResult<HashSet<Uuid>> {
    match user {
        Some(user) => Ok(state
            .rsvps()
            .event_ids_for_user(user.id)
            .await?
            .into_iter()
            .collect()),
        None => Ok(HashSet::new()),
    }
}

pub async fn event_list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(params): Query<SearchParams>,
    flashes: Flashes,
) -> AppResult<Page<EventListContext>> {
    let query = EventQuery::search(params.search.as_deref(), today());
    let events = state.events().list(&query).await?;
    let rsvped = rsvped_event_ids(&state, user.as_ref()).await?;

    tracing::debug!(search = ?query.search, results = events.len(), "Listing events");

    let events = events
        .into_iter()
        .map(|event| EventEntry {
            user_has_rsvped: rsvped.contains(&event.id),
            event,
        })
        .collect();
    let context = EventListContext {
        events,
        search: params.search.unwrap_or_default(),
    };

    Ok(Page::new("event_list.html", context).with_flashes(flashes))
}

pub async fn event_detail(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    RecordId(event_id, _): RecordId<EventRecord>,
    flashes: Flashes,
) -> AppResult<Response> {
    let Some(event) = state.events().find_by_id(event_id).await? else {
        return Ok(event_not_found());
    };

    let user_has_rsvped = match &user {
        Some(user) => state.rsvps().exists(user.id, event.id).await?,
        None => false,
    };
    let context = EventDetailContext {
        event,
        user_has_rsvped,
    };

    Ok(Page::new("event/event_detail.html", context)
        .with_flashes(flashes)
        .into_response())
}

pub async fn create_event_form(
    State(state): State<AppState>,
    _manager: Authorized<EventManager>,
    flashes: Flashes,
) -> AppResult<Page<EventFormContext>> {
    let context = EventFormContext {
        form: EventForm::default(),
        errors: FormErrors::new(),
        categories: state.categories().list().await?,
        event_id: None,
    };
    Ok(event_form_page(context).with_flashes(flashes))
}

pub async fn create_event(
    State(state): State<AppState>,
    manager: Authorized<EventManager>,
    Form(form): Form<EventForm>,
) -> AppResult<Response> {
    let categories = state.categories().list().await?;

    match form.clean(&categories) {
        Ok(input) => {
            let event = state.events().create(input, manager.user.id).await?;
            tracing::info!(
                event_id = %event.id,
                organizer = %manager.user.username,
                "Event created"
            );
            Ok(FlashRedirect::to(EVENT_LIST_PATH)
                .success("Event Created Successfully")
                .into_response())
        }
        Err(errors) => Ok(invalid_form(event_form_page(EventFormContext {
            form,
            errors,
            categories,
            event_id: None,
        }))),
    }
}

pub async fn update_event_form(
    State(state): State<AppState>,
    _manager: Authorized<EventManager>,
    RecordId(event_id, _): RecordId<EventRecord>,
    flashes: Flashes,
) -> AppResult<Response> {
    let Some(event) = state.events().find_by_id(event_id).await? else {
        return Ok(event_not_found());
    };

    let context = EventFormContext {
        form: EventForm::from_event(&event),
        errors: FormErrors::new(),
        categories: state.categories().list().await?,
        event_id: Some(event.id),
    };
    Ok(event_form_page(context).with_flashes(flashes).into_response())
}

pub async fn update_event(
    State(state): State<AppState>,
    manager: Authorized<EventManager>,
    RecordId(event_id, _): RecordId<EventRecord>,
    Form(form): Form<EventForm>,
) -> AppResult<Response> {
    if state.events().find_by_id(event_id).await?.is_none() {
        return Ok(event_not_found());
    }
    let categories = state.categories().list().await?;

    let input = match form.clean(&categories) {
        Ok(input) => input,
        Err(errors) => {
            return Ok(invalid_form(event_form_page(EventFormContext {
                form,
                errors,
                categories,
                event_id: Some(event_id),
            })))
        }
    };

    if !state.events().update(event_id, input).await? {
        return Ok(event_not_found());
    }
    tracing::info!(event_id = %event_id, editor = %manager.user.username, "Event updated");

    Ok(FlashRedirect::to(EVENT_LIST_PATH)
        .success("Event Updated Successfully")
        .into_response())
}

pub async fn delete_event(
    State(state): State<AppState>,
    manager: Authorized<EventManager>,
    RecordId(event_id, _): RecordId<EventRecord>,
) -> AppResult<FlashRedirect> {
    let redirect = FlashRedirect::to(EVENT_LIST_PATH);

    if state.events().delete(event_id).await? {
        tracing::info!(event_id = %event_id, editor = %manager.user.username, "Event deleted");
        Ok(redirect.success("Event Deleted Successfully"))
    } else {
        Ok(not_found::<EventRecord>())
    }
}

pub async fn rsvp_event(
    State(state): State<AppState>,
    participant: Authorized<ParticipantOnly>,
    RecordId(event_id, _): RecordId<EventRecord>,
) -> AppResult<FlashRedirect> {
    let user = participant.into_user();
    let Some(event) = state.events().find_by_id(event_id).await? else {
        return Ok(not_found::<EventRecord>());
    };

    let redirect = FlashRedirect::to(Role::Participant.dashboard_path());
    match state.rsvps().create(user.id, event.id).await? {
        RsvpOutcome::AlreadyExists => {
            tracing::debug!(user_id = %user.id, event_id = %event.id, "Duplicate RSVP ignored");
            Ok(redirect.warning("You have already Rsvp."))
        }
        RsvpOutcome::Created => {
            tracing::info!(user_id = %user.id, event_id = %event.id, "RSVP recorded");
            send_or_log(state.mailer(), rsvp_confirmation_mail(&user, &event)).await;
            Ok(redirect.success("RSVP successful! Check your email."))
        }
    }
}
