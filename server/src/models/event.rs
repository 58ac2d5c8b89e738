use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: String,
    pub category_id: Uuid,
    pub category_name: String,
    pub organizer_id: Option<Uuid>,
    pub rsvp_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct EventInput {
    pub name: String,
    pub description: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: String,
    pub category_id: Uuid,
}

/// Which slice of the calendar a dashboard shows, relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateScope {
    #[default]
    All,
    Today,
    #[serde(rename = "upcoming_events")]
    Upcoming,
    #[serde(rename = "past_events")]
    Past,
}

impl DateScope {
    /// Maps the dashboard `type` parameter; anything unrecognised means all.
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("today") => DateScope::Today,
            Some("upcoming_events") => DateScope::Upcoming,
            Some("past_events") => DateScope::Past,
            _ => DateScope::All,
        }
    }

    pub fn contains(self, date: NaiveDate, today: NaiveDate) -> bool {
        match self {
            DateScope::All => true,
            DateScope::Today => date == today,
            DateScope::Upcoming => date > today,
            DateScope::Past => date < today,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventQuery {
    pub search: Option<String>,
    pub scope: DateScope,
    pub today: NaiveDate,
}

impl EventQuery {
    #[cfg(test)]
    pub fn all(today: NaiveDate) -> Self {
        Self {
            search: None,
            scope: DateScope::All,
            today,
        }
    }

    pub fn search(search: Option<&str>, today: NaiveDate) -> Self {
        let search = search
            .filter(|term| !term.is_empty())
            .map(str::to_string);
        Self {
            search,
            scope: DateScope::All,
            today,
        }
    }

    pub fn scoped(scope: DateScope, today: NaiveDate) -> Self {
        Self {
            search: None,
            scope,
            today,
        }
    }

    pub fn matches(&self, event: &Event) -> bool {
        let in_scope = self.scope.contains(event.date, self.today);
        let found = match &self.search {
            Some(term) => matches_search(event, term),
            None => true,
        };
        in_scope && found
    }
}

/// Case-insensitive substring match against the event's name or location.
pub fn matches_search(event: &Event, term: &str) -> bool {
    let term = term.to_lowercase();
    event.name.to_lowercase().contains(&term) || event.location.to_lowercase().contains(&term)
}
