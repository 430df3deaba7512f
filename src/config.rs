//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup and treated as immutable for the
//! lifetime of the process. In particular the admin allowlist has no runtime
//! mutation path: changing it requires a restart.

use std::collections::HashSet;
use std::env;
use std::sync::Arc;

/// Project ID used when neither `FIREBASE_PROJECT_ID` nor `GCP_PROJECT_ID` is set.
pub const DEFAULT_PROJECT_ID: &str = "camptogether";

/// Origins allowed by CORS when `CORS_ORIGINS` is not set.
const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:5173",
    "http://localhost:3000",
    "https://camptogether.gooddaybnb.com",
    "https://camptogether.web.app",
    "https://camptogether.firebaseapp.com",
];

const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 100;

/// Which document store implementation backs the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Google Cloud Firestore (production, or the emulator).
    Firestore,
    /// In-process store; data is lost on restart.
    Memory,
}

impl StoreBackend {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "firestore" => Ok(Self::Firestore),
            "memory" => Ok(Self::Memory),
            other => Err(ConfigError::Invalid {
                name: "STORE_BACKEND",
                value: other.to_string(),
            }),
        }
    }
}

/// Set of e-mail addresses whose owners are administrators.
///
/// Entries are stored lower-cased. An empty allowlist never matches, so a
/// missing `ADMIN_EMAILS` variable means "no admins" rather than "everyone".
#[derive(Debug, Clone, Default)]
pub struct AdminAllowlist {
    emails: Arc<HashSet<String>>,
}

impl AdminAllowlist {
    /// Parse a comma-separated list, trimming and lower-casing each entry.
    pub fn parse(raw: &str) -> Self {
        let emails = raw
            .split(',')
            .map(|entry| entry.trim().to_lowercase())
            .filter(|entry| !entry.is_empty())
            .collect();
        Self {
            emails: Arc::new(emails),
        }
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, email: &str) -> bool {
        if self.emails.is_empty() {
            return false;
        }
        self.emails.contains(&email.trim().to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }

    pub fn len(&self) -> usize {
        self.emails.len()
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Firebase/GCP project; also the expected ID token audience
    pub gcp_project_id: String,
    /// Admin e-mail allowlist
    pub admin_emails: AdminAllowlist,
    /// Browser origins allowed by CORS
    pub cors_origins: Vec<String>,
    /// Document store implementation
    pub store_backend: StoreBackend,
    /// Requests per client IP per minute (0 disables limiting)
    pub rate_limit_per_minute: u32,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let gcp_project_id = env::var("FIREBASE_PROJECT_ID")
            .or_else(|_| env::var("GCP_PROJECT_ID"))
            .unwrap_or_else(|_| DEFAULT_PROJECT_ID.to_string());

        let cors_origins = match env::var("CORS_ORIGINS") {
            Ok(raw) => split_list(&raw),
            Err(_) => DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        let rate_limit_per_minute = match env::var("RATE_LIMIT_PER_MINUTE") {
            Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "RATE_LIMIT_PER_MINUTE",
                value: raw,
            })?,
            Err(_) => DEFAULT_RATE_LIMIT_PER_MINUTE,
        };

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            gcp_project_id,
            admin_emails: AdminAllowlist::parse(&env::var("ADMIN_EMAILS").unwrap_or_default()),
            cors_origins,
            store_backend: StoreBackend::parse(&env::var("STORE_BACKEND").unwrap_or_default())?,
            rate_limit_per_minute,
        })
    }

    /// Config for tests: in-memory store, one admin, rate limiting off.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            gcp_project_id: "test-project".to_string(),
            admin_emails: AdminAllowlist::parse("admin@example.com"),
            cors_origins: vec!["http://localhost:5173".to_string()],
            store_backend: StoreBackend::Memory,
            rate_limit_per_minute: 0,
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|entry| entry.trim().to_string())
        .filter(|entry| !entry.is_empty())
        .collect()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}
