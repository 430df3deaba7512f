//! User model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::time_utils::rfc3339_secs;

/// Role granted to identities on the admin allowlist.
pub const ADMIN_ROLE: &str = "admin";

/// Caller identity produced by a verified ID token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Identity provider user id (token `sub`)
    pub id: String,
    pub email: Option<String>,
    /// Token `email_verified` claim; an unverified address grants no role.
    pub email_verified: bool,
    pub display_name: Option<String>,
    pub picture: Option<String>,
}

/// User profile stored in Firestore, keyed by identity id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct User {
    /// Document id (same as `uid`)
    pub id: String,
    /// Identity provider user id
    pub uid: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub photo_url: String,
    /// Derived from the admin allowlist at every login, never trusted as a grant.
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(with = "rfc3339_secs")]
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub created_at: DateTime<Utc>,
    #[serde(with = "rfc3339_secs")]
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub last_login_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|role| role == ADMIN_ROLE)
    }
}
