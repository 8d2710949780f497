use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use super::types::{FavoriteEntry, FavoriteKind};

const MAX_TEXT_LEN: usize = 200;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteFormValues {
    #[validate(custom(function = "validate_title"))]
    pub title: String,
    #[serde(rename = "type")]
    pub kind: FavoriteKind,
    #[validate(custom(function = "validate_director"))]
    pub director: String,
    #[validate(length(min = 1, message = "Budget is required"))]
    pub budget: String,
    #[validate(custom(function = "validate_location"))]
    pub location: String,
    #[validate(length(min = 1, message = "Duration is required"))]
    pub duration: String,
    #[validate(length(equal = 4, message = "Year must be 4 digits"))]
    pub year: String,
    #[validate(custom(function = "validate_poster_url"))]
    pub poster_url: String,
}

impl FavoriteFormValues {
    pub fn from_entry(entry: &FavoriteEntry) -> Self {
        Self {
            title: entry.title.clone(),
            kind: entry.kind,
            director: entry.director.clone(),
            budget: entry.budget.clone(),
            location: entry.location.clone(),
            duration: entry.duration.clone(),
            year: entry.year.clone(),
            poster_url: entry.poster_url.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut flattened: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, failures)| {
            let field = field.to_string();
            failures.iter().map(move |failure| FieldError {
                field: field.clone(),
                message: failure
                    .message
                    .as_ref()
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| failure.code.to_string()),
            })
        })
        .collect();
    flattened.sort_by(|a, b| a.field.cmp(&b.field));
    flattened
}

pub(crate) fn failure(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

fn bounded_text(
    value: &str,
    missing: &'static str,
    too_long: &'static str,
) -> Result<(), ValidationError> {
    let length = value.chars().count();
    if length == 0 {
        return Err(failure("required", missing));
    }
    if length > MAX_TEXT_LEN {
        return Err(failure("too_long", too_long));
    }
    Ok(())
}

fn validate_title(value: &str) -> Result<(), ValidationError> {
    bounded_text(value, "Title is required", "Title is too long")
}

fn validate_director(value: &str) -> Result<(), ValidationError> {
    bounded_text(value, "Director is required", "Director name is too long")
}

fn validate_location(value: &str) -> Result<(), ValidationError> {
    bounded_text(value, "Location is required", "Location is too long")
}

fn validate_poster_url(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || reqwest::Url::parse(value).is_ok() {
        return Ok(());
    }
    Err(failure("url", "Must be a valid URL"))
}
