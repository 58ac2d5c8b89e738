use chrono::{NaiveDate, NaiveTime};
use garde::Validate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::FormErrors;
use crate::models::{Category, CategoryInput, Event, EventInput};

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct EventForm {
    #[garde(length(min = 1, max = 250))]
    pub name: String,
    #[garde(skip)]
    pub description: String,
    #[garde(skip)]
    pub date: String,
    #[garde(skip)]
    pub time: String,
    #[garde(length(min = 1, max = 250))]
    pub location: String,
    /// Category id.
    #[garde(skip)]
    pub category: String,
}

impl EventForm {
    pub fn from_event(event: &Event) -> Self {
        Self {
            name: event.name.clone(),
            description: event.description.clone(),
            date: event.date.format("%Y-%m-%d").to_string(),
            time: event.time.format("%H:%M").to_string(),
            location: event.location.clone(),
            category: event.category_id.to_string(),
        }
    }

    /// Validates and parses the form; `categories` are the valid choices.
    pub fn clean(&self, categories: &[Category]) -> Result<EventInput, FormErrors> {
        let mut trimmed = self.clone();
        trimmed.name = self.name.trim().to_string();
        trimmed.location = self.location.trim().to_string();
        let mut errors = FormErrors::from_garde(&trimmed);

        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok();
        if date.is_none() {
            errors.add("date", "Enter a valid date.");
        }

        let time = parse_time(self.time.trim());
        if time.is_none() {
            errors.add("time", "Enter a valid time.");
        }

        let category_id = Uuid::parse_str(self.category.trim())
            .ok()
            .filter(|id| categories.iter().any(|c| c.id == *id));
        if category_id.is_none() {
            errors.add(
                "category",
                "Select a valid choice. That choice is not one of the available choices.",
            );
        }

        match (date, time, category_id) {
            (Some(date), Some(time), Some(category_id)) if errors.is_empty() => Ok(EventInput {
                name: trimmed.name,
                description: self.description.trim().to_string(),
                date,
                time,
                location: trimmed.location,
                category_id,
            }),
            _ => Err(errors),
        }
    }
}

/// Accepts `HH:MM` from time inputs as well as `HH:MM:SS`.
fn parse_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct CategoryForm {
    #[garde(length(min = 1, max = 100))]
    pub name: String,
    #[garde(skip)]
    pub description: String,
}

impl CategoryForm {
    pub fn from_category(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            description: category.description.clone(),
        }
    }

    pub fn clean(&self) -> Result<CategoryInput, FormErrors> {
        let input = CategoryInput {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
        };
        let trimmed = Self {
            name: input.name.clone(),
            description: input.description.clone(),
        };
        FormErrors::from_garde(&trimmed).into_result(input)
    }
}
