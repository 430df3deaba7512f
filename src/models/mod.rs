// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod checklist;
pub mod event;
pub mod expense;
pub mod user;

pub use checklist::{ChecklistItem, Claim, ItemType};
pub use event::{Event, EventPatch};
pub use expense::Expense;
pub use user::{Identity, User, ADMIN_ROLE};

/// A page of results from a cursor-paginated listing.
#[derive(Debug, Clone, serde::Serialize)]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Id of the last returned item when another page exists.
    pub next_cursor: Option<String>,
}

/// Generate a new document id.
pub fn new_document_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
