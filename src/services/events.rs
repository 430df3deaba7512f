// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Event service: listing, CRUD and the join workflow.
//!
//! Each operation loads the event once and reuses it for every
//! authorization check in the request.

use std::sync::Arc;

use crate::db::{DocumentStore, EventQuery, EventScope};
use crate::error::{AppError, Result};
use crate::models::{new_document_id, Event, Identity, Page};
use crate::services::{load_event, page_from, AccessPolicy, Pager};
use crate::time_utils::now_secs;
use crate::validation::{self, NewEvent, UpdateEventInput};

/// Which events a listing covers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventFilter {
    /// Only events the caller attends (requires a caller).
    pub mine: bool,
    /// Lower-case title prefix.
    pub search: Option<String>,
}

pub struct EventService {
    db: Arc<dyn DocumentStore>,
    policy: AccessPolicy,
}

impl EventService {
    pub fn new(db: Arc<dyn DocumentStore>, policy: AccessPolicy) -> Self {
        Self { db, policy }
    }

    /// List public events, or the caller's events, newest start date first.
    pub async fn list(
        &self,
        filter: EventFilter,
        pager: Pager,
        caller: Option<&Identity>,
    ) -> Result<Page<Event>> {
        let scope = if filter.mine {
            let caller = caller.ok_or(AppError::Unauthorized("Unauthorized"))?;
            EventScope::Attending(caller.id.clone())
        } else {
            EventScope::Public
        };

        let query = EventQuery {
            scope,
            title_prefix: filter.search,
            cursor: pager.cursor,
            limit: pager.limit + 1,
        };
        let events = self.db.list_events(&query).await?;

        Ok(page_from(events, pager.limit, |event| event.id.clone()))
    }

    /// Every event. Admin only.
    pub async fn list_all(&self, caller: &Identity) -> Result<Vec<Event>> {
        self.policy.ensure_admin(caller)?;
        self.db.list_all_events().await
    }

    /// Fetch one event. No authorization: single-event reads are public.
    pub async fn get(&self, id: &str) -> Result<Event> {
        load_event(self.db.as_ref(), id).await
    }

    pub async fn create(&self, input: NewEvent, caller: &Identity) -> Result<Event> {
        let now = now_secs();
        let event = Event {
            id: new_document_id(),
            title_lower: input.title.to_lowercase(),
            title: input.title,
            description: input.description,
            location_name: input.location_name,
            location_address: input.location_address,
            start_date: input.start_date,
            end_date: input.end_date,
            host_id: caller.id.clone(),
            attendee_ids: vec![caller.id.clone()],
            invite_token: uuid::Uuid::new_v4().to_string(),
            is_public: input.is_public,
            notices: input.notices,
            cover_image: input.cover_image,
            google_map_url: input.google_map_url,
            created_at: now,
            updated_at: now,
        };

        self.db.create_event(&event).await?;

        tracing::info!(event_id = %event.id, host_id = %caller.id, "Event created");
        Ok(event)
    }

    /// Apply a partial update. Authorization is checked before the payload
    /// is validated.
    pub async fn update(
        &self,
        id: &str,
        input: UpdateEventInput,
        caller: &Identity,
    ) -> Result<Event> {
        let mut event = load_event(self.db.as_ref(), id).await?;
        self.policy.ensure_can_manage(&event, caller)?;

        let patch = validation::parse(input)?;
        let fields = event.apply_patch(patch, now_secs());
        self.db.update_event_fields(&event, &fields).await?;

        tracing::info!(
            event_id = %event.id,
            user_id = %caller.id,
            fields = ?fields,
            "Event updated"
        );
        Ok(event)
    }

    pub async fn delete(&self, id: &str, caller: &Identity) -> Result<()> {
        let event = load_event(self.db.as_ref(), id).await?;
        self.policy.ensure_can_manage(&event, caller)?;

        self.db.delete_event(&event.id).await?;

        tracing::info!(event_id = %event.id, user_id = %caller.id, "Event deleted");
        Ok(())
    }

    /// Add the caller to the attendees. Joining twice is a no-op.
    pub async fn join(&self, id: &str, caller: &Identity) -> Result<()> {
        let event = load_event(self.db.as_ref(), id).await?;

        if event.has_attendee(&caller.id) {
            tracing::debug!(event_id = %event.id, user_id = %caller.id, "Already attending");
            return Ok(());
        }

        self.db.add_attendee(&event.id, &caller.id).await?;

        tracing::info!(event_id = %event.id, user_id = %caller.id, "Joined event");
        Ok(())
    }
}
