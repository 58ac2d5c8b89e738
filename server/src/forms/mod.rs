//! Form payloads and their validation. Each form validates declaratively
//! with `garde`, then applies the checks that need other fields or parsing.

use std::collections::BTreeMap;

use serde::Serialize;

pub mod account;
pub mod admin;
pub mod event;

pub const FORM_ERROR_MESSAGE: &str = "Please correct the errors below.";

/// Field name to messages; `__all__` holds errors not tied to one field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

pub const NON_FIELD: &str = "__all__";

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_garde<T>(form: &T) -> Self
    where
        T: garde::Validate<Context = ()>,
    {
        let mut errors = Self::new();
        if let Err(report) = form.validate() {
            for (path, error) in report.iter() {
                let field = path.to_string();
                let field = if field.is_empty() {
                    NON_FIELD.to_string()
                } else {
                    field
                };
                errors.add(&field, error.to_string());
            }
        }
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    #[cfg(test)]
    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn into_result<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

/// Trimmed text, or `None` when blank.
pub(crate) fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
