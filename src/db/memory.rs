// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process document store.
//!
//! Mirrors the Firestore ordering, cursor and atomicity semantics so the
//! same service code runs against either backend. Data lives for the
//! lifetime of the process.

use std::cmp::Reverse;
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{DocumentStore, EventQuery, EventScope, ToggleOutcome};
use crate::error::AppError;
use crate::models::{ChecklistItem, Event, Expense, User};

#[derive(Default)]
struct Collections {
    users: HashMap<String, User>,
    events: HashMap<String, Event>,
    checklist_items: HashMap<String, ChecklistItem>,
    expenses: HashMap<String, Expense>,
}

/// Document store backed by hash maps behind a single lock.
#[derive(Default)]
pub struct MemoryDb {
    inner: RwLock<Collections>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Sort newest first with the id as tie-breaker, then keep only documents
/// strictly after `after`, the `(key, id)` position of the cursor document.
///
/// The position comes from the whole collection, so a cursor document that
/// no longer matches the filter still marks where the previous page ended.
fn page_after<T, K, F>(
    mut docs: Vec<T>,
    key: F,
    id_of: fn(&T) -> &str,
    after: Option<(K, String)>,
    limit: u32,
) -> Vec<T>
where
    K: Ord + Clone,
    F: Fn(&T) -> K,
{
    docs.sort_by_key(|doc| Reverse((key(doc), id_of(doc).to_string())));

    docs.into_iter()
        .filter(|doc| match &after {
            Some((cursor_key, cursor_id)) => {
                (key(doc), id_of(doc)) < (cursor_key.clone(), cursor_id.as_str())
            }
            None => true,
        })
        .take(limit as usize)
        .collect()
}

#[async_trait]
impl DocumentStore for MemoryDb {
    async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        Ok(self.inner.read().await.users.get(id).cloned())
    }

    async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        self.inner
            .write()
            .await
            .users
            .insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn list_users(&self, cursor: Option<&str>, limit: u32) -> Result<Vec<User>, AppError> {
        let inner = self.inner.read().await;
        let after = cursor
            .and_then(|id| inner.users.get(id))
            .map(|user| (user.created_at, user.id.clone()));
        let users: Vec<User> = inner.users.values().cloned().collect();

        Ok(page_after(
            users,
            |user| user.created_at,
            |user| user.id.as_str(),
            after,
            limit,
        ))
    }

    async fn get_event(&self, id: &str) -> Result<Option<Event>, AppError> {
        Ok(self.inner.read().await.events.get(id).cloned())
    }

    async fn create_event(&self, event: &Event) -> Result<(), AppError> {
        self.inner
            .write()
            .await
            .events
            .insert(event.id.clone(), event.clone());
        Ok(())
    }

    async fn update_event_fields(&self, event: &Event, fields: &[&str]) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        // A field update never recreates a deleted event.
        let stored = inner
            .events
            .get_mut(&event.id)
            .ok_or_else(AppError::event_not_found)?;

        for field in fields {
            match *field {
                "title" => stored.title = event.title.clone(),
                "title_lower" => stored.title_lower = event.title_lower.clone(),
                "description" => stored.description = event.description.clone(),
                "location_name" => stored.location_name = event.location_name.clone(),
                "location_address" => stored.location_address = event.location_address.clone(),
                "start_date" => stored.start_date = event.start_date,
                "end_date" => stored.end_date = event.end_date,
                "host_id" => stored.host_id = event.host_id.clone(),
                "attendee_ids" => stored.attendee_ids = event.attendee_ids.clone(),
                "invite_token" => stored.invite_token = event.invite_token.clone(),
                "is_public" => stored.is_public = event.is_public,
                "notices" => stored.notices = event.notices.clone(),
                "cover_image" => stored.cover_image = event.cover_image.clone(),
                "google_map_url" => stored.google_map_url = event.google_map_url.clone(),
                "created_at" => stored.created_at = event.created_at,
                "updated_at" => stored.updated_at = event.updated_at,
                other => {
                    return Err(AppError::Database(format!("Unknown event field: {}", other)));
                }
            }
        }
        Ok(())
    }

    async fn delete_event(&self, id: &str) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        inner.events.remove(id);
        inner.checklist_items.retain(|_, item| item.event_id != id);
        inner.expenses.retain(|_, expense| expense.event_id != id);
        Ok(())
    }

    async fn add_attendee(&self, event_id: &str, user_id: &str) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        let event = inner
            .events
            .get_mut(event_id)
            .ok_or_else(AppError::event_not_found)?;
        if !event.has_attendee(user_id) {
            event.attendee_ids.push(user_id.to_string());
        }
        Ok(())
    }

    async fn list_events(&self, query: &EventQuery) -> Result<Vec<Event>, AppError> {
        let inner = self.inner.read().await;
        let after = query
            .cursor
            .as_deref()
            .and_then(|id| inner.events.get(id))
            .map(|event| (event.start_date, event.id.clone()));
        let events: Vec<Event> = inner
            .events
            .values()
            .filter(|event| match &query.scope {
                EventScope::Public => event.is_public,
                EventScope::Attending(user_id) => event.has_attendee(user_id),
            })
            .filter(|event| match &query.title_prefix {
                Some(prefix) => event.title_lower.starts_with(prefix.as_str()),
                None => true,
            })
            .cloned()
            .collect();

        Ok(page_after(
            events,
            |event| event.start_date,
            |event| event.id.as_str(),
            after,
            query.limit,
        ))
    }

    async fn list_all_events(&self) -> Result<Vec<Event>, AppError> {
        let events: Vec<Event> = self.inner.read().await.events.values().cloned().collect();
        Ok(page_after(
            events,
            |event| event.start_date,
            |event| event.id.as_str(),
            None,
            u32::MAX,
        ))
    }

    async fn list_checklist_items(&self, event_id: &str) -> Result<Vec<ChecklistItem>, AppError> {
        Ok(self
            .inner
            .read()
            .await
            .checklist_items
            .values()
            .filter(|item| item.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn create_checklist_item(&self, item: &ChecklistItem) -> Result<(), AppError> {
        self.inner
            .write()
            .await
            .checklist_items
            .insert(item.id.clone(), item.clone());
        Ok(())
    }

    async fn toggle_checklist_item(
        &self,
        event_id: &str,
        item_id: &str,
    ) -> Result<ToggleOutcome, AppError> {
        // Read, check and write under one write guard.
        let mut inner = self.inner.write().await;
        let Some(item) = inner.checklist_items.get_mut(item_id) else {
            return Ok(ToggleOutcome::NotFound);
        };
        if item.event_id != event_id {
            return Ok(ToggleOutcome::EventMismatch);
        }
        item.is_checked = !item.is_checked;
        Ok(ToggleOutcome::Toggled(item.is_checked))
    }

    async fn list_expenses(&self, event_id: &str) -> Result<Vec<Expense>, AppError> {
        Ok(self
            .inner
            .read()
            .await
            .expenses
            .values()
            .filter(|expense| expense.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn create_expense(&self, expense: &Expense) -> Result<(), AppError> {
        self.inner
            .write()
            .await
            .expenses
            .insert(expense.id.clone(), expense.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemType;
    use chrono::{TimeZone, Utc};

    fn event(id: &str, day: u32, is_public: bool, attendees: &[&str]) -> Event {
        let start = Utc.with_ymd_and_hms(2026, 3, day, 0, 0, 0).unwrap();
        Event {
            id: id.to_string(),
            title: format!("Trip {}", id),
            title_lower: format!("trip {}", id),
            description: String::new(),
            location_name: String::new(),
            location_address: String::new(),
            start_date: start,
            end_date: start,
            host_id: attendees.first().unwrap_or(&"host").to_string(),
            attendee_ids: attendees.iter().map(|a| a.to_string()).collect(),
            invite_token: "tok".to_string(),
            is_public,
            notices: String::new(),
            cover_image: String::new(),
            google_map_url: String::new(),
            created_at: start,
            updated_at: start,
        }
    }

    fn item(id: &str, event_id: &str) -> ChecklistItem {
        ChecklistItem {
            id: id.to_string(),
            event_id: event_id.to_string(),
            name: "Tent".to_string(),
            quantity: 1,
            note: String::new(),
            item_type: ItemType::Gear,
            is_personal: false,
            is_checked: false,
            assigned_to_id: None,
            claims: vec![],
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
        }
    }

    fn ids(events: &[Event]) -> Vec<&str> {
        events.iter().map(|e| e.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_list_events_orders_and_pages() {
        let db = MemoryDb::new();
        for (id, day) in [("a", 1), ("b", 3), ("c", 2), ("d", 3)] {
            db.create_event(&event(id, day, true, &["host"])).await.unwrap();
        }

        let mut query = EventQuery {
            scope: EventScope::Public,
            title_prefix: None,
            cursor: None,
            limit: 2,
        };
        let first = db.list_events(&query).await.unwrap();
        // Same start date: higher id first.
        assert_eq!(ids(&first), vec!["d", "b"]);

        query.cursor = Some("b".to_string());
        let second = db.list_events(&query).await.unwrap();
        assert_eq!(ids(&second), vec!["c", "a"]);

        query.cursor = Some("missing".to_string());
        let restarted = db.list_events(&query).await.unwrap();
        assert_eq!(ids(&restarted), vec!["d", "b"]);
    }

    #[tokio::test]
    async fn test_cursor_outside_filter_keeps_position() {
        let db = MemoryDb::new();
        for (id, day) in [("a", 1), ("b", 2), ("c", 3), ("d", 4)] {
            db.create_event(&event(id, day, true, &["host"])).await.unwrap();
        }

        // The cursor event turns private after the first page was served.
        let hidden = event("c", 3, false, &["host"]);
        db.update_event_fields(&hidden, &["is_public"]).await.unwrap();

        let second = db
            .list_events(&EventQuery {
                scope: EventScope::Public,
                title_prefix: None,
                cursor: Some("c".to_string()),
                limit: 2,
            })
            .await
            .unwrap();
        assert_eq!(ids(&second), vec!["b", "a"]);

        // A search that excludes the cursor event continues after it too.
        let searched = db
            .list_events(&EventQuery {
                scope: EventScope::Public,
                title_prefix: Some("trip a".to_string()),
                cursor: Some("d".to_string()),
                limit: 2,
            })
            .await
            .unwrap();
        assert_eq!(ids(&searched), vec!["a"]);
    }

    #[tokio::test]
    async fn test_list_events_scope_and_prefix() {
        let db = MemoryDb::new();
        db.create_event(&event("pub", 1, true, &["alice"])).await.unwrap();
        db.create_event(&event("priv", 2, false, &["bob", "alice"])).await.unwrap();

        let public = db
            .list_events(&EventQuery {
                scope: EventScope::Public,
                title_prefix: None,
                cursor: None,
                limit: 10,
            })
            .await
            .unwrap();
        assert_eq!(ids(&public), vec!["pub"]);

        let mine = db
            .list_events(&EventQuery {
                scope: EventScope::Attending("alice".to_string()),
                title_prefix: Some("trip pr".to_string()),
                cursor: None,
                limit: 10,
            })
            .await
            .unwrap();
        assert_eq!(ids(&mine), vec!["priv"]);
    }

    #[tokio::test]
    async fn test_add_attendee_is_idempotent() {
        let db = MemoryDb::new();
        db.create_event(&event("e", 1, true, &["host"])).await.unwrap();

        db.add_attendee("e", "guest").await.unwrap();
        db.add_attendee("e", "guest").await.unwrap();

        let stored = db.get_event("e").await.unwrap().unwrap();
        assert_eq!(stored.attendee_ids, vec!["host", "guest"]);
    }

    #[tokio::test]
    async fn test_field_update_keeps_concurrent_join() {
        let db = MemoryDb::new();
        let original = event("e", 1, true, &["host"]);
        db.create_event(&original).await.unwrap();

        // A join lands between the handler's read and its write.
        db.add_attendee("e", "guest").await.unwrap();

        let mut edited = original.clone();
        edited.title = "Renamed".to_string();
        db.update_event_fields(&edited, &["title"]).await.unwrap();

        let stored = db.get_event("e").await.unwrap().unwrap();
        assert_eq!(stored.title, "Renamed");
        assert_eq!(stored.attendee_ids, vec!["host", "guest"]);
    }

    #[tokio::test]
    async fn test_writes_do_not_recreate_deleted_event() {
        let db = MemoryDb::new();
        let stale = event("e1", 1, true, &["host"]);
        db.create_event(&stale).await.unwrap();
        db.delete_event("e1").await.unwrap();

        let mut renamed = stale.clone();
        renamed.title = "Renamed".to_string();
        assert!(matches!(
            db.update_event_fields(&renamed, &["title"]).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            db.add_attendee("e1", "guest").await,
            Err(AppError::NotFound(_))
        ));

        assert!(db.get_event("e1").await.unwrap().is_none());
        assert!(db.list_all_events().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_outcomes() {
        let db = MemoryDb::new();
        db.create_checklist_item(&item("i", "e1")).await.unwrap();

        assert_eq!(
            db.toggle_checklist_item("e1", "i").await.unwrap(),
            ToggleOutcome::Toggled(true)
        );
        assert_eq!(
            db.toggle_checklist_item("e2", "i").await.unwrap(),
            ToggleOutcome::EventMismatch
        );
        assert_eq!(
            db.toggle_checklist_item("e1", "nope").await.unwrap(),
            ToggleOutcome::NotFound
        );
        assert_eq!(
            db.toggle_checklist_item("e1", "i").await.unwrap(),
            ToggleOutcome::Toggled(false)
        );
    }

    #[tokio::test]
    async fn test_delete_event_cascades() {
        let db = MemoryDb::new();
        db.create_event(&event("e1", 1, true, &["host"])).await.unwrap();
        db.create_checklist_item(&item("i1", "e1")).await.unwrap();
        db.create_checklist_item(&item("i2", "e2")).await.unwrap();

        db.delete_event("e1").await.unwrap();

        assert!(db.get_event("e1").await.unwrap().is_none());
        assert!(db.list_checklist_items("e1").await.unwrap().is_empty());
        assert_eq!(db.list_checklist_items("e2").await.unwrap().len(), 1);
    }
}
