// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authorization decisions over already-loaded entities.
//!
//! Everything here is pure: callers fetch the event once and reuse it for
//! every check in a request. A missing identity fails every check.

use crate::config::AdminAllowlist;
use crate::error::AppError;
use crate::models::{Event, Identity, ADMIN_ROLE};

/// Role and membership rules, parameterised by the admin allowlist.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    admins: AdminAllowlist,
}

impl AccessPolicy {
    pub fn new(admins: AdminAllowlist) -> Self {
        Self { admins }
    }

    /// True iff the identity's verified e-mail is on the allowlist.
    pub fn is_admin<'a>(&self, identity: impl Into<Option<&'a Identity>>) -> bool {
        identity
            .into()
            .and_then(verified_email)
            .is_some_and(|email| self.admins.contains(email))
    }

    /// Admins and the event host may modify or delete an event.
    pub fn can_manage_event<'a>(
        &self,
        event: &Event,
        identity: impl Into<Option<&'a Identity>>,
    ) -> bool {
        let Some(identity) = identity.into() else {
            return false;
        };
        self.is_admin(identity) || event.host_id == identity.id
    }

    /// Admins, the host and listed attendees may use an event's checklist
    /// and expenses.
    pub fn is_event_member<'a>(
        &self,
        event: &Event,
        identity: impl Into<Option<&'a Identity>>,
    ) -> bool {
        let Some(identity) = identity.into() else {
            return false;
        };
        self.is_admin(identity) || event.host_id == identity.id || event.has_attendee(&identity.id)
    }

    /// A user record is visible to its owner and to admins.
    pub fn can_view_user(&self, user_id: &str, identity: &Identity) -> bool {
        identity.id == user_id || self.is_admin(identity)
    }

    /// Roles granted at login. Recomputed every time, never read back from storage.
    pub fn roles_for(&self, identity: &Identity) -> Vec<String> {
        if self.is_admin(identity) {
            vec![ADMIN_ROLE.to_string()]
        } else {
            Vec::new()
        }
    }

    pub fn ensure_admin(&self, identity: &Identity) -> Result<(), AppError> {
        if self.is_admin(identity) {
            Ok(())
        } else {
            tracing::warn!(user_id = %identity.id, "Admin access denied");
            Err(AppError::Forbidden)
        }
    }

    pub fn ensure_can_manage(&self, event: &Event, identity: &Identity) -> Result<(), AppError> {
        if self.can_manage_event(event, identity) {
            Ok(())
        } else {
            tracing::debug!(
                event_id = %event.id,
                user_id = %identity.id,
                "Event management denied"
            );
            Err(AppError::Forbidden)
        }
    }

    pub fn ensure_member(&self, event: &Event, identity: &Identity) -> Result<(), AppError> {
        if self.is_event_member(event, identity) {
            Ok(())
        } else {
            tracing::debug!(
                event_id = %event.id,
                user_id = %identity.id,
                "Event membership required"
            );
            Err(AppError::Forbidden)
        }
    }
}

fn verified_email(identity: &Identity) -> Option<&str> {
    identity
        .email
        .as_deref()
        .filter(|_| identity.email_verified)
}
