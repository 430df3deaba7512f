// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request payload validation.
//!
//! Payloads deserialize leniently (every field optional) and are then checked
//! with `validator` rules plus a per-schema cross-field refinement. Failures
//! are reported as one [`AppError::Validation`] carrying every field issue.

pub mod checklist;
pub mod event;
pub mod expense;

use std::borrow::Cow;

use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::time_utils::parse_date_input;

pub use checklist::{CreateChecklistItemInput, NewChecklistItem};
pub use event::{CreateEventInput, NewEvent, UpdateEventInput};
pub use expense::{CreateExpenseInput, NewExpense};

const VALIDATION_FAILED: &str = "Validation failed";

/// One field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ValidationIssue {
    /// Offending field (or `body` for unparsable payloads)
    pub path: String,
    pub code: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(
        path: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

/// A request payload with field rules, an optional cross-field refinement,
/// and a conversion into the typed value services consume.
pub trait Schema: Validate {
    type Output;

    /// Cross-field checks. Only runs on top of field rules; issues are merged.
    fn refine(&self, _errors: &mut ValidationErrors) {}

    /// Convert a payload that passed validation.
    fn into_output(self) -> Result<Self::Output>;
}

/// Validate `input` and convert it, or fail with every issue found.
pub fn parse<S: Schema>(input: S) -> Result<S::Output> {
    let mut errors = match input.validate() {
        Ok(()) => ValidationErrors::new(),
        Err(errors) => errors,
    };
    input.refine(&mut errors);

    if !errors.errors().is_empty() {
        let issues = collect_issues(&errors);
        tracing::debug!(issues = issues.len(), "Payload failed validation");
        return Err(AppError::Validation {
            message: VALIDATION_FAILED.to_string(),
            issues,
        });
    }

    input.into_output()
}

fn collect_issues(errors: &ValidationErrors) -> Vec<ValidationIssue> {
    let mut issues: Vec<ValidationIssue> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, field_errors)| {
            let path = field.to_string();
            field_errors
                .iter()
                .map(move |error| issue_from(&path, error))
        })
        .collect();

    issues.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.code.cmp(&b.code)));
    issues
}

fn issue_from(path: &str, error: &ValidationError) -> ValidationIssue {
    let message = match &error.message {
        Some(message) => message.to_string(),
        None => match error.code.as_ref() {
            "required" => "Required".to_string(),
            code => format!("Invalid value ({})", code),
        },
    };
    ValidationIssue::new(path, error.code.to_string(), message)
}

/// Build a `ValidationError` with a fixed code and message.
pub(crate) fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// Field rule: the string must be a date `parse_date_input` understands.
pub(crate) fn valid_date(value: &str) -> std::result::Result<(), ValidationError> {
    match parse_date_input(value) {
        Some(_) => Ok(()),
        None => Err(invalid("invalid_date", "Invalid date format")),
    }
}

/// Parse a date field that validation already accepted.
pub(crate) fn required_date(
    value: Option<&str>,
    path: &'static str,
) -> Result<chrono::DateTime<chrono::Utc>> {
    value.and_then(parse_date_input).ok_or_else(|| AppError::Validation {
        message: VALIDATION_FAILED.to_string(),
        issues: vec![ValidationIssue::new(path, "invalid_date", "Invalid date format")],
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

/// Deserialize a number that may arrive as a JSON number or a numeric string.
///
/// Blank strings coerce to 0 and unparsable strings to NaN, so both fail the
/// usual positivity rules instead of being rejected as malformed JSON.
pub(crate) fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<NumberOrString>::deserialize(deserializer)?.map(|value| match value {
            NumberOrString::Number(n) => n,
            NumberOrString::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    0.0
                } else {
                    text.parse().unwrap_or(f64::NAN)
                }
            }
        }),
    )
}

/// JSON body extractor whose rejections use the API's validation error shape.
pub struct JsonPayload<T>(pub T);

impl<S, T> FromRequest<S> for JsonPayload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!(error = %rejection.body_text(), "Rejected request body");
                Err(AppError::invalid_body(rejection.body_text()))
            }
        }
    }
}
