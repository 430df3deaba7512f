// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Event model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::time_utils::rfc3339_secs;

/// A camping event stored in the `events` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Event {
    pub id: String,
    pub title: String,
    /// Lower-cased title, used for prefix search.
    pub title_lower: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location_name: String,
    #[serde(default)]
    pub location_address: String,
    #[serde(with = "rfc3339_secs")]
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub start_date: DateTime<Utc>,
    #[serde(with = "rfc3339_secs")]
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub end_date: DateTime<Utc>,
    pub host_id: String,
    /// Members of the event, host included. No duplicates.
    #[serde(default)]
    pub attendee_ids: Vec<String>,
    pub invite_token: String,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub notices: String,
    #[serde(default)]
    pub cover_image: String,
    #[serde(default)]
    pub google_map_url: String,
    #[serde(with = "rfc3339_secs")]
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub created_at: DateTime<Utc>,
    #[serde(with = "rfc3339_secs")]
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub updated_at: DateTime<Utc>,
}

/// A validated partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location_name: Option<String>,
    pub location_address: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_public: Option<bool>,
    pub notices: Option<String>,
    pub cover_image: Option<String>,
    pub google_map_url: Option<String>,
}

impl Event {
    pub fn has_attendee(&self, user_id: &str) -> bool {
        self.attendee_ids.iter().any(|id| id == user_id)
    }

    /// Apply `patch` in place and return the names of the stored fields that
    /// must be written back. `title_lower` follows `title`; `updated_at` is
    /// always stamped.
    pub fn apply_patch(&mut self, patch: EventPatch, now: DateTime<Utc>) -> Vec<&'static str> {
        let mut fields = Vec::new();

        if let Some(title) = patch.title {
            self.title_lower = title.to_lowercase();
            self.title = title;
            fields.push("title");
            fields.push("title_lower");
        }
        if let Some(description) = patch.description {
            self.description = description;
            fields.push("description");
        }
        if let Some(location_name) = patch.location_name {
            self.location_name = location_name;
            fields.push("location_name");
        }
        if let Some(location_address) = patch.location_address {
            self.location_address = location_address;
            fields.push("location_address");
        }
        if let Some(start_date) = patch.start_date {
            self.start_date = start_date;
            fields.push("start_date");
        }
        if let Some(end_date) = patch.end_date {
            self.end_date = end_date;
            fields.push("end_date");
        }
        if let Some(is_public) = patch.is_public {
            self.is_public = is_public;
            fields.push("is_public");
        }
        if let Some(notices) = patch.notices {
            self.notices = notices;
            fields.push("notices");
        }
        if let Some(cover_image) = patch.cover_image {
            self.cover_image = cover_image;
            fields.push("cover_image");
        }
        if let Some(google_map_url) = patch.google_map_url {
            self.google_map_url = google_map_url;
            fields.push("google_map_url");
        }

        self.updated_at = now;
        fields.push("updated_at");
        fields
    }
}
