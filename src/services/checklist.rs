// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Checklist service. Every operation requires event membership.

use std::sync::Arc;

use crate::db::{DocumentStore, ToggleOutcome};
use crate::error::{AppError, Result};
use crate::models::{new_document_id, ChecklistItem, Identity};
use crate::services::{load_event, AccessPolicy};
use crate::time_utils::now_secs;
use crate::validation::{self, CreateChecklistItemInput};

pub struct ChecklistService {
    db: Arc<dyn DocumentStore>,
    policy: AccessPolicy,
}

impl ChecklistService {
    pub fn new(db: Arc<dyn DocumentStore>, policy: AccessPolicy) -> Self {
        Self { db, policy }
    }

    /// Items of an event, oldest first.
    pub async fn list(&self, event_id: &str, caller: &Identity) -> Result<Vec<ChecklistItem>> {
        let event = load_event(self.db.as_ref(), event_id).await?;
        self.policy.ensure_member(&event, caller)?;

        let mut items = self.db.list_checklist_items(&event.id).await?;
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(items)
    }

    pub async fn add(
        &self,
        event_id: &str,
        input: CreateChecklistItemInput,
        caller: &Identity,
    ) -> Result<ChecklistItem> {
        let event = load_event(self.db.as_ref(), event_id).await?;
        self.policy.ensure_member(&event, caller)?;

        let input = validation::parse(input)?;
        let item = ChecklistItem {
            id: new_document_id(),
            event_id: event.id.clone(),
            name: input.name,
            quantity: input.quantity,
            note: input.note,
            item_type: input.item_type,
            is_personal: input.is_personal,
            is_checked: false,
            assigned_to_id: input.assigned_to_id,
            claims: Vec::new(),
            created_at: now_secs(),
        };

        self.db.create_checklist_item(&item).await?;

        tracing::info!(
            event_id = %event.id,
            item_id = %item.id,
            user_id = %caller.id,
            "Checklist item added"
        );
        Ok(item)
    }

    /// Flip `is_checked` atomically and return the new value.
    pub async fn toggle(&self, event_id: &str, item_id: &str, caller: &Identity) -> Result<bool> {
        let event = load_event(self.db.as_ref(), event_id).await?;
        self.policy.ensure_member(&event, caller)?;

        match self.db.toggle_checklist_item(&event.id, item_id).await? {
            ToggleOutcome::Toggled(is_checked) => {
                tracing::info!(
                    event_id = %event.id,
                    item_id,
                    is_checked,
                    "Checklist item toggled"
                );
                Ok(is_checked)
            }
            ToggleOutcome::NotFound => Err(AppError::NotFound("Item not found".to_string())),
            ToggleOutcome::EventMismatch => {
                tracing::warn!(event_id = %event.id, item_id, "Toggle for item of another event");
                Err(AppError::Conflict("Item does not belong to event".to_string()))
            }
        }
    }
}
