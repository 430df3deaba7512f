// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper implementing [`DocumentStore`].
//!
//! Collections:
//! - `users` (profiles, keyed by identity id)
//! - `events`
//! - `checklist_items` (filtered by `event_id`)
//! - `expenses` (filtered by `event_id`)

use async_trait::async_trait;
use firestore::errors::{BackoffError, FirestoreError};
use firestore::{FirestoreQueryCursor, FirestoreQueryDirection, FirestoreWritePrecondition};

use super::{collections, DocumentStore, EventQuery, EventScope, ToggleOutcome};
use crate::error::AppError;
use crate::models::{ChecklistItem, Event, Expense, User};
use crate::time_utils::format_utc_rfc3339;

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Upper bound for a title prefix range query.
const PREFIX_RANGE_END: char = '\u{f8ff}';

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Write a whole document, creating or replacing it.
    async fn set_document<T>(&self, collection: &str, id: &str, doc: &T) -> Result<(), AppError>
    where
        T: serde::Serialize + serde::de::DeserializeOwned + Send + Sync,
    {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collection)
            .document_id(id)
            .object(doc)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// All documents in `collection` whose `event_id` matches.
    async fn query_by_event<T>(&self, collection: &str, event_id: &str) -> Result<Vec<T>, AppError>
    where
        T: serde::de::DeserializeOwned + Send,
    {
        self.get_client()?
            .fluent()
            .select()
            .from(collection)
            .filter(|q| q.for_all([q.field("event_id").eq(event_id)]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Helper to batch delete documents using transactions.
    async fn batch_delete<T, F>(
        &self,
        items: &[T],
        collection: &str,
        id_extractor: F,
    ) -> Result<(), AppError>
    where
        F: Fn(&T) -> String,
    {
        let client = self.get_client()?;

        for chunk in items.chunks(BATCH_SIZE) {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for item in chunk {
                let doc_id = id_extractor(item);
                client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(&doc_id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            collection, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(())
    }
}

/// Writes guarded by an existence precondition fail with NOT_FOUND once the
/// event is gone.
fn map_event_write_error(err: FirestoreError, context: &str) -> AppError {
    match err {
        FirestoreError::DataNotFoundError(_) => AppError::event_not_found(),
        other => AppError::Database(format!("{}: {}", context, other)),
    }
}

#[async_trait]
impl DocumentStore for FirestoreDb {
    // ─── User Operations ─────────────────────────────────────────

    async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        self.set_document(collections::USERS, &user.id, user).await
    }

    async fn list_users(&self, cursor: Option<&str>, limit: u32) -> Result<Vec<User>, AppError> {
        let cursor_user = match cursor {
            Some(id) => self.get_user(id).await?,
            None => None,
        };

        let query = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .order_by([
                ("created_at", FirestoreQueryDirection::Descending),
                ("id", FirestoreQueryDirection::Descending),
            ])
            .limit(limit);

        let query = match cursor_user {
            Some(user) => query.start_at(FirestoreQueryCursor::AfterValue(vec![
                format_utc_rfc3339(user.created_at).into(),
                user.id.into(),
            ])),
            None => query,
        };

        query
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Event Operations ────────────────────────────────────────

    async fn get_event(&self, id: &str) -> Result<Option<Event>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::EVENTS)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn create_event(&self, event: &Event) -> Result<(), AppError> {
        self.set_document(collections::EVENTS, &event.id, event).await
    }

    async fn update_event_fields(&self, event: &Event, fields: &[&str]) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(fields.iter().copied())
            .in_col(collections::EVENTS)
            .precondition(FirestoreWritePrecondition::Exists(true))
            .document_id(&event.id)
            .object(event)
            .execute()
            .await
            .map_err(|e| map_event_write_error(e, "Failed to update event"))?;
        Ok(())
    }

    async fn delete_event(&self, id: &str) -> Result<(), AppError> {
        let items: Vec<ChecklistItem> = self
            .query_by_event(collections::CHECKLIST_ITEMS, id)
            .await?;
        self.batch_delete(&items, collections::CHECKLIST_ITEMS, |item: &ChecklistItem| {
            item.id.clone()
        })
        .await?;

        let expenses: Vec<Expense> = self.query_by_event(collections::EXPENSES, id).await?;
        self.batch_delete(&expenses, collections::EXPENSES, |expense: &Expense| {
            expense.id.clone()
        })
        .await?;

        self.get_client()?
            .fluent()
            .delete()
            .from(collections::EVENTS)
            .document_id(id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(
            event_id = id,
            checklist_items = items.len(),
            expenses = expenses.len(),
            "Deleted event and its sub-collections"
        );

        Ok(())
    }

    async fn add_attendee(&self, event_id: &str, user_id: &str) -> Result<(), AppError> {
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        // Server-side array union: concurrent joins never overwrite each other.
        client
            .fluent()
            .update()
            .in_col(collections::EVENTS)
            .precondition(FirestoreWritePrecondition::Exists(true))
            .document_id(event_id)
            .transforms(|t| {
                t.fields([t
                    .field("attendee_ids")
                    .append_missing_elements([user_id])])
            })
            .only_transform()
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add join to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| map_event_write_error(e, "Transaction commit failed"))?;

        Ok(())
    }

    async fn list_events(&self, query: &EventQuery) -> Result<Vec<Event>, AppError> {
        let cursor_event = match query.cursor.as_deref() {
            Some(id) => self.get_event(id).await?,
            None => None,
        };

        let attending = match &query.scope {
            EventScope::Attending(user_id) => Some(user_id.clone()),
            EventScope::Public => None,
        };
        let prefix_end = query
            .title_prefix
            .as_ref()
            .map(|prefix| format!("{}{}", prefix, PREFIX_RANGE_END));

        let select = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::EVENTS)
            .filter(|q| {
                q.for_all([
                    match &attending {
                        Some(user_id) => q.field("attendee_ids").array_contains(user_id.as_str()),
                        None => q.field("is_public").eq(true),
                    },
                    query
                        .title_prefix
                        .as_ref()
                        .and_then(|prefix| {
                            q.field("title_lower")
                                .greater_than_or_equal(prefix.as_str())
                        }),
                    prefix_end
                        .as_ref()
                        .and_then(|end| q.field("title_lower").less_than_or_equal(end.as_str())),
                ])
            })
            .order_by([
                ("start_date", FirestoreQueryDirection::Descending),
                ("id", FirestoreQueryDirection::Descending),
            ])
            .limit(query.limit);

        let select = match cursor_event {
            Some(event) => select.start_at(FirestoreQueryCursor::AfterValue(vec![
                format_utc_rfc3339(event.start_date).into(),
                event.id.into(),
            ])),
            None => select,
        };

        select
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn list_all_events(&self) -> Result<Vec<Event>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::EVENTS)
            .order_by([
                ("start_date", FirestoreQueryDirection::Descending),
                ("id", FirestoreQueryDirection::Descending),
            ])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Checklist Operations ────────────────────────────────────

    async fn list_checklist_items(&self, event_id: &str) -> Result<Vec<ChecklistItem>, AppError> {
        self.query_by_event(collections::CHECKLIST_ITEMS, event_id)
            .await
    }

    async fn create_checklist_item(&self, item: &ChecklistItem) -> Result<(), AppError> {
        self.set_document(collections::CHECKLIST_ITEMS, &item.id, item)
            .await
    }

    /// The read happens inside the transaction, so Firestore retries the
    /// closure if another toggle commits first. Each flip sees a fresh
    /// before-image and no write is lost.
    async fn toggle_checklist_item(
        &self,
        event_id: &str,
        item_id: &str,
    ) -> Result<ToggleOutcome, AppError> {
        let event_id = event_id.to_string();
        let item_id = item_id.to_string();

        self.get_client()?
            .run_transaction(|db, transaction| {
                let event_id = event_id.clone();
                let item_id = item_id.clone();
                Box::pin(async move {
                    let item: Option<ChecklistItem> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::CHECKLIST_ITEMS)
                        .obj()
                        .one(&item_id)
                        .await?;

                    let Some(mut item) = item else {
                        return Ok(ToggleOutcome::NotFound);
                    };
                    if item.event_id != event_id {
                        return Ok(ToggleOutcome::EventMismatch);
                    }

                    item.is_checked = !item.is_checked;
                    db.fluent()
                        .update()
                        .fields(["is_checked"])
                        .in_col(collections::CHECKLIST_ITEMS)
                        .document_id(&item_id)
                        .object(&item)
                        .add_to_transaction(transaction)?;

                    Ok::<_, BackoffError<FirestoreError>>(ToggleOutcome::Toggled(item.is_checked))
                })
            })
            .await
            .map_err(|e| AppError::Database(format!("Checklist toggle transaction failed: {}", e)))
    }

    // ─── Expense Operations ──────────────────────────────────────

    async fn list_expenses(&self, event_id: &str) -> Result<Vec<Expense>, AppError> {
        self.query_by_event(collections::EXPENSES, event_id).await
    }

    async fn create_expense(&self, expense: &Expense) -> Result<(), AppError> {
        self.set_document(collections::EXPENSES, &expense.id, expense)
            .await
    }
}
