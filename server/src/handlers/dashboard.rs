//! Role dashboards. Statistics are computed against the server's local date;
//! the `type` parameter narrows the event list to one date scope.

use axum::extract::{Query, State};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::today;
use crate::auth::{
    role_label, user_role, AdminOnly, Authorized, EventManager, OrganizerOnly, ParticipantOnly,
};
use crate::models::{DateScope, Event, EventQuery, Role, User};
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::flash::Flashes;
use crate::utils::response::Page;

#[derive(Debug, Default, Deserialize)]
pub struct DashboardParams {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl DashboardParams {
    fn scope(&self) -> DateScope {
        DateScope::from_param(self.kind.as_deref())
    }
}

#[derive(Serialize)]
pub struct EventStats {
    pub total_events: i64,
    pub total_users: i64,
    pub todays_events: Vec<Event>,
    pub upcoming_events: i64,
    pub past_events: i64,
}

async fn event_stats(state: &AppState, today: NaiveDate) -> AppResult<EventStats> {
    let events = state.events();
    Ok(EventStats {
        total_events: events.count(DateScope::All, today).await?,
        total_users: state.users().count().await?,
        todays_events: events
            .list(&EventQuery::scoped(DateScope::Today, today))
            .await?,
        upcoming_events: events.count(DateScope::Upcoming, today).await?,
        past_events: events.count(DateScope::Past, today).await?,
    })
}

#[derive(Serialize)]
pub struct DashboardContext {
    #[serde(flatten)]
    pub stats: EventStats,
    pub selected: DateScope,
    pub show_event: Vec<Event>,
}

async fn scoped_dashboard(state: &AppState, scope: DateScope) -> AppResult<DashboardContext> {
    let today = today();
    Ok(DashboardContext {
        stats: event_stats(state, today).await?,
        selected: scope,
        show_event: state
            .events()
            .list(&EventQuery::scoped(scope, today))
            .await?,
    })
}

pub async fn dashboard(
    State(state): State<AppState>,
    _manager: Authorized<EventManager>,
    Query(params): Query<DashboardParams>,
    flashes: Flashes,
) -> AppResult<Page<DashboardContext>> {
    let context = scoped_dashboard(&state, params.scope()).await?;
    Ok(Page::new("dashboard.html", context).with_flashes(flashes))
}

#[derive(Serialize)]
pub struct UserRow {
    #[serde(flatten)]
    pub user: User,
    pub group_name: String,
}

#[derive(Serialize)]
pub struct AdminDashboardContext {
    #[serde(flatten)]
    pub dashboard: DashboardContext,
    pub total_participants: i64,
    pub users: Vec<UserRow>,
    pub user_role: Option<Role>,
}

pub async fn admin_dashboard(
    State(state): State<AppState>,
    admin: Authorized<AdminOnly>,
    Query(params): Query<DashboardParams>,
    flashes: Flashes,
) -> AppResult<Page<AdminDashboardContext>> {
    let dashboard = scoped_dashboard(&state, params.scope()).await?;
    let total_participants = state
        .groups()
        .count_members(Role::Participant.group_name())
        .await?;
    let users = state
        .users()
        .list()
        .await?
        .into_iter()
        .map(|user| UserRow {
            group_name: role_label(&user),
            user,
        })
        .collect();

    let context = AdminDashboardContext {
        dashboard,
        total_participants,
        users,
        user_role: user_role(&admin.user),
    };
    Ok(Page::new("dashboard/admin_dashboard.html", context).with_flashes(flashes))
}

#[derive(Serialize)]
pub struct OrganizerDashboardContext {
    #[serde(flatten)]
    pub dashboard: DashboardContext,
    pub user_role: Option<Role>,
}

pub async fn organizer_dashboard(
    State(state): State<AppState>,
    organizer: Authorized<OrganizerOnly>,
    Query(params): Query<DashboardParams>,
    flashes: Flashes,
) -> AppResult<Page<OrganizerDashboardContext>> {
    let context = OrganizerDashboardContext {
        dashboard: scoped_dashboard(&state, params.scope()).await?,
        user_role: user_role(&organizer.user),
    };
    Ok(Page::new("dashboard/organizer_dashboard.html", context).with_flashes(flashes))
}

#[derive(Serialize)]
pub struct ParticipantDashboardContext {
    pub rsvp_events: Vec<Event>,
}

pub async fn participant_dashboard(
    State(state): State<AppState>,
    participant: Authorized<ParticipantOnly>,
    flashes: Flashes,
) -> AppResult<Page<ParticipantDashboardContext>> {
    let rsvp_events = state.rsvps().events_for_user(participant.user.id).await?;
    Ok(Page::new(
        "dashboard/participant_dashboard.html",
        ParticipantDashboardContext { rsvp_events },
    )
    .with_flashes(flashes))
}
