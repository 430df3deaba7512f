//! Database layer.
//!
//! Services talk to a [`DocumentStore`]; production uses Firestore, tests and
//! local runs can use the in-process [`MemoryDb`].

pub mod firestore;
pub mod memory;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{ChecklistItem, Event, Expense, User};

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const EVENTS: &str = "events";
    pub const CHECKLIST_ITEMS: &str = "checklist_items";
    pub const EXPENSES: &str = "expenses";
}

/// Which events a listing may return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventScope {
    /// Only events with `is_public == true`.
    Public,
    /// Only events whose `attendee_ids` contain this user id.
    Attending(String),
}

/// A cursor-paginated event query, ordered by `(start_date desc, id desc)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    pub scope: EventScope,
    /// Lower-case prefix matched against `title_lower`.
    pub title_prefix: Option<String>,
    /// Id of the last event of the previous page. Unknown ids are ignored.
    pub cursor: Option<String>,
    pub limit: u32,
}

/// Result of the transactional checklist toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The item was flipped; carries the new `is_checked` value.
    Toggled(bool),
    NotFound,
    /// The item exists but belongs to another event. Nothing was written.
    EventMismatch,
}

/// Typed operations over the application's collections.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    // ─── Users ───────────────────────────────────────────────────

    async fn get_user(&self, id: &str) -> Result<Option<User>, AppError>;

    /// Create or replace the user document keyed by `user.id`.
    async fn upsert_user(&self, user: &User) -> Result<(), AppError>;

    /// Users ordered by `(created_at desc, id desc)`, starting after `cursor`.
    async fn list_users(&self, cursor: Option<&str>, limit: u32) -> Result<Vec<User>, AppError>;

    // ─── Events ──────────────────────────────────────────────────

    async fn get_event(&self, id: &str) -> Result<Option<Event>, AppError>;

    async fn create_event(&self, event: &Event) -> Result<(), AppError>;

    /// Write only the named fields of `event`, leaving the rest of the stored
    /// document (notably `attendee_ids`) untouched.
    async fn update_event_fields(&self, event: &Event, fields: &[&str]) -> Result<(), AppError>;

    /// Delete an event together with its checklist items and expenses.
    async fn delete_event(&self, id: &str) -> Result<(), AppError>;

    /// Add `user_id` to the event's attendees with set-union semantics.
    async fn add_attendee(&self, event_id: &str, user_id: &str) -> Result<(), AppError>;

    async fn list_events(&self, query: &EventQuery) -> Result<Vec<Event>, AppError>;

    /// Every event, ordered by `(start_date desc, id desc)`.
    async fn list_all_events(&self) -> Result<Vec<Event>, AppError>;

    // ─── Checklist ───────────────────────────────────────────────

    async fn list_checklist_items(&self, event_id: &str) -> Result<Vec<ChecklistItem>, AppError>;

    async fn create_checklist_item(&self, item: &ChecklistItem) -> Result<(), AppError>;

    /// Atomically flip `is_checked` on an item, verifying it belongs to `event_id`.
    async fn toggle_checklist_item(
        &self,
        event_id: &str,
        item_id: &str,
    ) -> Result<ToggleOutcome, AppError>;

    // ─── Expenses ────────────────────────────────────────────────

    async fn list_expenses(&self, event_id: &str) -> Result<Vec<Expense>, AppError>;

    async fn create_expense(&self, expense: &Expense) -> Result<(), AppError>;
}
