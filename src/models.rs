use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const TITLE_MAX_LEN: usize = 100;
pub const DESCRIPTION_MAX_LEN: usize = 500;

/// A stored todo item. `id` is only ever assigned by the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub is_completed: bool,
}

/// Request body for create and update.
///
/// Everything is optional at the serde level so that a missing title is
/// reported as a validation error instead of a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TodoItemPayload {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
}

/// Field-level validation failures, keyed by the JSON field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }
}

impl TodoItemPayload {
    /// Checks the field constraints and, if they hold, turns the payload into
    /// an entity carrying `id`. Create passes 0 and lets the database assign it.
    pub fn validate(self, id: i64) -> Result<TodoItem, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        match &self.title {
            // blank counts as missing
            Some(title) if title.trim().is_empty() => {
                errors.add("title", "The Title field is required.")
            }
            None => errors.add("title", "The Title field is required."),
            Some(title) => {
                let len = title.chars().count();
                if len > TITLE_MAX_LEN {
                    errors.add(
                        "title",
                        format!(
                            "The field Title must be a string with a minimum length of 1 and a maximum length of {TITLE_MAX_LEN}."
                        ),
                    );
                }
            }
        }

        if let Some(description) = &self.description {
            if description.chars().count() > DESCRIPTION_MAX_LEN {
                errors.add(
                    "description",
                    format!(
                        "The field Description must be a string with a maximum length of {DESCRIPTION_MAX_LEN}."
                    ),
                );
            }
        }

        match self.title {
            Some(title) if errors.is_empty() => Ok(TodoItem {
                id,
                title,
                description: self.description,
                is_completed: self.is_completed,
            }),
            _ => Err(errors),
        }
    }
}
