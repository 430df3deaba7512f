// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Event create/update payloads.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::{Validate, ValidationErrors};

use super::{invalid, required_date, valid_date, Schema};
use crate::error::Result;
use crate::models::EventPatch;
use crate::time_utils::parse_date_input;

const DATE_ORDER_MESSAGE: &str = "End date must be after start date";

/// `POST /api/events` body.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CreateEventInput {
    #[validate(
        required(message = "Title is required"),
        length(min = 1, max = 120, message = "Title must be 1-120 characters")
    )]
    pub title: Option<String>,
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
    #[validate(length(max = 120, message = "Location name must be at most 120 characters"))]
    pub location_name: Option<String>,
    #[validate(length(max = 200, message = "Location address must be at most 200 characters"))]
    pub location_address: Option<String>,
    #[validate(required(message = "Start date is required"), custom(function = "valid_date"))]
    pub start_date: Option<String>,
    #[validate(required(message = "End date is required"), custom(function = "valid_date"))]
    pub end_date: Option<String>,
    pub is_public: Option<bool>,
    #[validate(length(max = 2000, message = "Notices must be at most 2000 characters"))]
    pub notices: Option<String>,
    #[validate(length(max = 500, message = "Cover image must be at most 500 characters"))]
    pub cover_image: Option<String>,
    #[validate(length(max = 500, message = "Map URL must be at most 500 characters"))]
    pub google_map_url: Option<String>,
}

/// A validated event ready to be created.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub location_name: String,
    pub location_address: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_public: bool,
    pub notices: String,
    pub cover_image: String,
    pub google_map_url: String,
}

/// Add the ordering issue if both dates parse and end precedes start.
fn check_date_order(start: Option<&str>, end: Option<&str>, errors: &mut ValidationErrors) {
    let (Some(start), Some(end)) = (
        start.and_then(parse_date_input),
        end.and_then(parse_date_input),
    ) else {
        return;
    };
    if end < start {
        errors.add("end_date", invalid("date_order", DATE_ORDER_MESSAGE));
    }
}

impl Schema for CreateEventInput {
    type Output = NewEvent;

    fn refine(&self, errors: &mut ValidationErrors) {
        check_date_order(
            self.start_date.as_deref(),
            self.end_date.as_deref(),
            errors,
        );
    }

    fn into_output(self) -> Result<NewEvent> {
        Ok(NewEvent {
            start_date: required_date(self.start_date.as_deref(), "start_date")?,
            end_date: required_date(self.end_date.as_deref(), "end_date")?,
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            location_name: self.location_name.unwrap_or_default(),
            location_address: self.location_address.unwrap_or_default(),
            is_public: self.is_public.unwrap_or(false),
            notices: self.notices.unwrap_or_default(),
            cover_image: self.cover_image.unwrap_or_default(),
            google_map_url: self.google_map_url.unwrap_or_default(),
        })
    }
}

/// `PUT /api/events/{id}` body. Every field is optional.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UpdateEventInput {
    #[validate(length(min = 1, max = 120, message = "Title must be 1-120 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
    #[validate(length(max = 120, message = "Location name must be at most 120 characters"))]
    pub location_name: Option<String>,
    #[validate(length(max = 200, message = "Location address must be at most 200 characters"))]
    pub location_address: Option<String>,
    #[validate(custom(function = "valid_date"))]
    pub start_date: Option<String>,
    #[validate(custom(function = "valid_date"))]
    pub end_date: Option<String>,
    pub is_public: Option<bool>,
    #[validate(length(max = 2000, message = "Notices must be at most 2000 characters"))]
    pub notices: Option<String>,
    #[validate(length(max = 500, message = "Cover image must be at most 500 characters"))]
    pub cover_image: Option<String>,
    #[validate(length(max = 500, message = "Map URL must be at most 500 characters"))]
    pub google_map_url: Option<String>,
}

impl Schema for UpdateEventInput {
    type Output = EventPatch;

    /// Ordering is only checked when the patch carries both dates. A patch
    /// moving just one of them is not compared with the stored value.
    fn refine(&self, errors: &mut ValidationErrors) {
        check_date_order(
            self.start_date.as_deref(),
            self.end_date.as_deref(),
            errors,
        );
    }

    fn into_output(self) -> Result<EventPatch> {
        let start_date = match self.start_date.as_deref() {
            Some(raw) => Some(required_date(Some(raw), "start_date")?),
            None => None,
        };
        let end_date = match self.end_date.as_deref() {
            Some(raw) => Some(required_date(Some(raw), "end_date")?),
            None => None,
        };

        Ok(EventPatch {
            title: self.title,
            description: self.description,
            location_name: self.location_name,
            location_address: self.location_address,
            start_date,
            end_date,
            is_public: self.is_public,
            notices: self.notices,
            cover_image: self.cover_image,
            google_map_url: self.google_map_url,
        })
    }
}
