// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User directory: upsert-on-login, lookup and admin listing.

use std::sync::Arc;

use crate::db::DocumentStore;
use crate::error::{AppError, Result};
use crate::models::{Identity, Page, User};
use crate::services::{page_from, AccessPolicy, Pager};
use crate::time_utils::now_secs;

pub struct UserDirectory {
    db: Arc<dyn DocumentStore>,
    policy: AccessPolicy,
}

/// Overwrite `stored` only with a non-empty new value.
fn refresh_field(stored: &mut String, fresh: Option<&str>) {
    if let Some(fresh) = fresh.filter(|value| !value.is_empty()) {
        *stored = fresh.to_string();
    }
}

impl UserDirectory {
    pub fn new(db: Arc<dyn DocumentStore>, policy: AccessPolicy) -> Self {
        Self { db, policy }
    }

    /// Create or refresh the caller's record. Roles are recomputed from the
    /// admin allowlist every time, so removing an address revokes admin at
    /// the next login.
    pub async fn get_or_create(&self, identity: &Identity) -> Result<User> {
        let now = now_secs();
        let roles = self.policy.roles_for(identity);

        let user = match self.db.get_user(&identity.id).await? {
            Some(mut user) => {
                refresh_field(&mut user.email, identity.email.as_deref());
                refresh_field(&mut user.display_name, identity.display_name.as_deref());
                refresh_field(&mut user.photo_url, identity.picture.as_deref());
                user.roles = roles;
                user.last_login_at = now;
                user
            }
            None => {
                tracing::info!(user_id = %identity.id, "Creating user on first login");
                User {
                    id: identity.id.clone(),
                    uid: identity.id.clone(),
                    email: identity.email.clone().unwrap_or_default(),
                    display_name: identity.display_name.clone().unwrap_or_default(),
                    photo_url: identity.picture.clone().unwrap_or_default(),
                    roles,
                    created_at: now,
                    last_login_at: now,
                }
            }
        };

        self.db.upsert_user(&user).await?;
        Ok(user)
    }

    /// Look up a user. Visible to the user themself and to admins.
    pub async fn get_by_id(&self, id: &str, caller: &Identity) -> Result<User> {
        if !self.policy.can_view_user(id, caller) {
            tracing::debug!(user_id = %caller.id, target = id, "User lookup denied");
            return Err(AppError::Forbidden);
        }

        self.db
            .get_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// All users, newest first. Admin only.
    pub async fn list(&self, pager: Pager, caller: &Identity) -> Result<Page<User>> {
        self.policy.ensure_admin(caller)?;

        let users = self
            .db
            .list_users(pager.cursor.as_deref(), pager.limit + 1)
            .await?;
        Ok(page_from(users, pager.limit, |user| user.id.clone()))
    }
}
