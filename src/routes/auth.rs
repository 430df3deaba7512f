// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User profile routes.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::Result;
use crate::models::{Identity, Page, User};
use crate::services::Pager;
use crate::AppState;

/// Routes that need a verified identity.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/me", get(get_me))
        .route("/api/auth/user/{id}", get(get_user))
}

/// Routes that need an admin caller.
pub fn admin_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/auth/users", get(list_users))
}

/// Current user, created or refreshed from the token claims.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Identity>,
) -> Result<Json<User>> {
    Ok(Json(state.users.get_or_create(&caller).await?))
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<User>> {
    Ok(Json(state.users.get_by_id(&id, &caller).await?))
}

#[derive(Debug, Deserialize)]
pub struct ListUsersParams {
    limit: Option<String>,
    cursor: Option<String>,
}

async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Identity>,
    Query(params): Query<ListUsersParams>,
) -> Result<Json<Page<User>>> {
    let pager = Pager::from_query(params.limit.as_deref(), params.cursor.as_deref());
    Ok(Json(state.users.list(pager, &caller).await?))
}
