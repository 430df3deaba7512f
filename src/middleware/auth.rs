// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bearer token authentication middleware.
//!
//! `identify` runs on every request and records a [`Credential`]. Routes then
//! choose how strict to be: `require_auth` turns anything but a verified
//! token into an error, while optional-auth handlers take [`MaybeIdentity`].

use crate::error::AppError;
use crate::models::Identity;
use crate::services::firebase_auth::extract_bearer_token;
use crate::services::VerifyError;
use crate::AppState;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use std::convert::Infallible;
use std::sync::Arc;

/// What the request's `Authorization` header amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// No bearer token was presented.
    Missing,
    /// A token was presented and failed verification.
    Rejected,
    /// The verifier could not judge the token (key fetch failed).
    Unavailable,
    Verified(Identity),
}

impl Credential {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Credential::Verified(identity) => Some(identity),
            _ => None,
        }
    }
}

/// Verify the bearer token, if any, and store the outcome in the request
/// extensions.
pub async fn identify(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = extract_bearer_token(request.headers().get(header::AUTHORIZATION))
        .map(str::to_string);

    let credential = match token {
        None => Credential::Missing,
        Some(token) => match state.verifier.verify(&token).await {
            Ok(identity) => Credential::Verified(identity),
            Err(VerifyError::Rejected(reason)) => {
                tracing::debug!(reason = %reason, "Rejected bearer token");
                Credential::Rejected
            }
            Err(VerifyError::Unavailable(reason)) => {
                tracing::error!(reason = %reason, "Token verification unavailable");
                Credential::Unavailable
            }
        },
    };

    request.extensions_mut().insert(credential);
    next.run(request).await
}

/// Middleware that requires a verified identity.
///
/// On success the [`Identity`] is available to handlers as an `Extension`.
pub async fn require_auth(mut request: Request, next: Next) -> Result<Response, AppError> {
    let credential = request
        .extensions()
        .get::<Credential>()
        .cloned()
        .unwrap_or(Credential::Missing);

    let identity = match credential {
        Credential::Verified(identity) => identity,
        Credential::Missing => return Err(AppError::Unauthorized("Missing auth token")),
        Credential::Rejected => return Err(AppError::Unauthorized("Invalid auth token")),
        Credential::Unavailable => {
            return Err(AppError::Internal(anyhow::anyhow!(
                "identity verification unavailable"
            )))
        }
    };

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Middleware that requires an admin caller. Must run after `require_auth`.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = request
        .extensions()
        .get::<Identity>()
        .ok_or(AppError::Unauthorized("Unauthorized"))?;

    state.policy.ensure_admin(identity)?;

    Ok(next.run(request).await)
}

/// Extractor for optional-auth routes: the verified identity, if any.
///
/// Rejected or unverifiable tokens are treated as anonymous.
#[derive(Debug, Clone)]
pub struct MaybeIdentity(pub Option<Identity>);

impl<S> FromRequestParts<S> for MaybeIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeIdentity(
            parts
                .extensions
                .get::<Credential>()
                .and_then(Credential::identity)
                .cloned(),
        ))
    }
}
