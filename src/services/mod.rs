// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod access;
pub mod checklist;
pub mod events;
pub mod expenses;
pub mod firebase_auth;
pub mod users;

pub use access::AccessPolicy;
pub use checklist::ChecklistService;
pub use events::{EventFilter, EventService};
pub use expenses::ExpenseService;
pub use firebase_auth::{FirebaseTokenVerifier, VerifyError};
pub use users::UserDirectory;

use crate::db::DocumentStore;
use crate::error::{AppError, Result};
use crate::models::{Event, Page};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 50;

/// Cursor pagination request: the id of the last item already seen plus a
/// page size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    pub cursor: Option<String>,
    pub limit: u32,
}

impl Pager {
    /// Build from raw query values. A non-integer limit falls back to the
    /// default; the result is clamped to `[1, MAX_PAGE_SIZE]`. Blank cursors
    /// mean the first page.
    pub fn from_query(limit: Option<&str>, cursor: Option<&str>) -> Self {
        let limit = limit
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .unwrap_or(i64::from(DEFAULT_PAGE_SIZE))
            .clamp(1, i64::from(MAX_PAGE_SIZE)) as u32;
        let cursor = cursor
            .map(str::trim)
            .filter(|cursor| !cursor.is_empty())
            .map(str::to_string);

        Self { cursor, limit }
    }
}

impl Default for Pager {
    fn default() -> Self {
        Self {
            cursor: None,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Turn a `limit + 1` fetch into a page; the cursor is only set when the
/// extra row shows another page exists.
pub(crate) fn page_from<T>(mut items: Vec<T>, limit: u32, id_of: impl Fn(&T) -> String) -> Page<T> {
    let has_more = items.len() > limit as usize;
    items.truncate(limit as usize);
    let next_cursor = if has_more {
        items.last().map(id_of)
    } else {
        None
    };
    Page { items, next_cursor }
}

/// Fetch an event or fail with 404.
pub(crate) async fn load_event(db: &dyn DocumentStore, id: &str) -> Result<Event> {
    db.get_event(id).await?.ok_or_else(AppError::event_not_found)
}
