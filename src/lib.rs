// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! CampTogether: plan group camping trips.
//!
//! This crate provides the backend API for events, their shared checklists
//! and expenses, and the membership rules that decide who may see and change
//! them.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;
pub mod validation;

use std::sync::Arc;
use std::time::Instant;

use config::Config;
use db::DocumentStore;
use middleware::RateLimiter;
use services::{
    AccessPolicy, ChecklistService, EventService, ExpenseService, FirebaseTokenVerifier,
    UserDirectory,
};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Arc<dyn DocumentStore>,
    pub verifier: Arc<FirebaseTokenVerifier>,
    pub policy: AccessPolicy,
    pub rate_limiter: RateLimiter,
    pub started_at: Instant,
    pub events: EventService,
    pub checklist: ChecklistService,
    pub expenses: ExpenseService,
    pub users: UserDirectory,
}

impl AppState {
    /// Wire the services over one store and one admin policy.
    pub fn new(
        config: Config,
        db: Arc<dyn DocumentStore>,
        verifier: Arc<FirebaseTokenVerifier>,
    ) -> Self {
        let policy = AccessPolicy::new(config.admin_emails.clone());

        Self {
            rate_limiter: RateLimiter::new(config.rate_limit_per_minute),
            started_at: Instant::now(),
            events: EventService::new(db.clone(), policy.clone()),
            checklist: ChecklistService::new(db.clone(), policy.clone()),
            expenses: ExpenseService::new(db.clone(), policy.clone()),
            users: UserDirectory::new(db.clone(), policy.clone()),
            config,
            db,
            verifier,
            policy,
        }
    }
}
