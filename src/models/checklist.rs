// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Checklist item model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::time_utils::rfc3339_secs;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "UPPERCASE")]
pub enum ItemType {
    #[default]
    Gear,
    Food,
}

/// A member's claim to bring part of an item's quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Claim {
    pub user_id: String,
    pub quantity: u32,
}

/// A gear or food item on an event's shared checklist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ChecklistItem {
    pub id: String,
    /// Owning event; never changes after creation.
    pub event_id: String,
    pub name: String,
    pub quantity: u32,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub item_type: ItemType,
    #[serde(default)]
    pub is_personal: bool,
    #[serde(default)]
    pub is_checked: bool,
    #[serde(default)]
    pub assigned_to_id: Option<String>,
    #[serde(default)]
    pub claims: Vec<Claim>,
    #[serde(with = "rfc3339_secs")]
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub created_at: DateTime<Utc>,
}
