// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Event, checklist and expense routes.
//!
//! Reads of single events and the public listing accept anonymous callers;
//! everything else is mounted behind `require_auth` in routes/mod.rs.

use crate::error::Result;
use crate::middleware::MaybeIdentity;
use crate::models::{ChecklistItem, Event, Expense, Identity, Page};
use crate::services::{EventFilter, Pager};
use crate::validation::{
    self, CreateChecklistItemInput, CreateEventInput, CreateExpenseInput, JsonPayload,
    UpdateEventInput,
};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Routes that accept anonymous callers.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/events", get(list_events))
        .route("/api/events/{id}", get(get_event))
}

/// Routes that need a verified identity.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/events", post(create_event))
        .route("/api/events/{id}", put(update_event).delete(delete_event))
        .route("/api/events/{id}/join", post(join_event))
        .route(
            "/api/events/{id}/checklist",
            get(list_checklist).post(add_checklist_item),
        )
        .route(
            "/api/events/{event_id}/checklist/{item_id}/toggle",
            put(toggle_checklist_item),
        )
        .route(
            "/api/events/{id}/expenses",
            get(list_expenses).post(add_expense),
        )
}

/// Routes that need an admin caller.
pub fn admin_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/events/admin/all", get(list_all_events))
}

/// Shared `{success: true}` acknowledgement.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    fn ok() -> Json<Self> {
        Json(Self { success: true })
    }
}

// ─── Events ──────────────────────────────────────────────────

/// Query parameters for the event listing. Kept as raw strings so malformed
/// values fall back to defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListEventsParams {
    limit: Option<String>,
    cursor: Option<String>,
    scope: Option<String>,
    search: Option<String>,
}

impl ListEventsParams {
    fn filter(&self) -> EventFilter {
        EventFilter {
            mine: self.scope.as_deref() == Some("mine"),
            search: self
                .search
                .as_deref()
                .map(|search| search.trim().to_lowercase())
                .filter(|search| !search.is_empty()),
        }
    }
}

async fn list_events(
    State(state): State<Arc<AppState>>,
    MaybeIdentity(caller): MaybeIdentity,
    Query(params): Query<ListEventsParams>,
) -> Result<Json<Page<Event>>> {
    let pager = Pager::from_query(params.limit.as_deref(), params.cursor.as_deref());
    let page = state
        .events
        .list(params.filter(), pager, caller.as_ref())
        .await?;
    Ok(Json(page))
}

async fn list_all_events(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Identity>,
) -> Result<Json<Vec<Event>>> {
    Ok(Json(state.events.list_all(&caller).await?))
}

async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Event>> {
    Ok(Json(state.events.get(&id).await?))
}

async fn create_event(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Identity>,
    JsonPayload(input): JsonPayload<CreateEventInput>,
) -> Result<(StatusCode, Json<Event>)> {
    let input = validation::parse(input)?;
    let event = state.events.create(input, &caller).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

async fn update_event(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Identity>,
    Path(id): Path<String>,
    JsonPayload(input): JsonPayload<UpdateEventInput>,
) -> Result<Json<Event>> {
    Ok(Json(state.events.update(&id, input, &caller).await?))
}

async fn delete_event(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>> {
    state.events.delete(&id, &caller).await?;
    Ok(SuccessResponse::ok())
}

async fn join_event(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>> {
    state.events.join(&id, &caller).await?;
    Ok(SuccessResponse::ok())
}

// ─── Checklist ───────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ToggleResponse {
    pub is_checked: bool,
}

async fn list_checklist(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ChecklistItem>>> {
    Ok(Json(state.checklist.list(&id, &caller).await?))
}

async fn add_checklist_item(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Identity>,
    Path(id): Path<String>,
    JsonPayload(input): JsonPayload<CreateChecklistItemInput>,
) -> Result<(StatusCode, Json<ChecklistItem>)> {
    let item = state.checklist.add(&id, input, &caller).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn toggle_checklist_item(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Identity>,
    Path((event_id, item_id)): Path<(String, String)>,
) -> Result<Json<ToggleResponse>> {
    let is_checked = state
        .checklist
        .toggle(&event_id, &item_id, &caller)
        .await?;
    Ok(Json(ToggleResponse { is_checked }))
}

// ─── Expenses ────────────────────────────────────────────────

async fn list_expenses(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Expense>>> {
    Ok(Json(state.expenses.list(&id, &caller).await?))
}

async fn add_expense(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Identity>,
    Path(id): Path<String>,
    JsonPayload(input): JsonPayload<CreateExpenseInput>,
) -> Result<(StatusCode, Json<Expense>)> {
    let expense = state.expenses.add(&id, input, &caller).await?;
    Ok((StatusCode::CREATED, Json(expense)))
}
