// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::validation::ValidationIssue;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing or invalid credential.
    #[error("{0}")]
    Unauthorized(&'static str),

    /// Authenticated, but lacking role, ownership or membership.
    #[error("Forbidden")]
    Forbidden,

    #[error("{0}")]
    NotFound(String),

    /// Payload failed schema validation.
    #[error("{message}")]
    Validation {
        message: String,
        issues: Vec<ValidationIssue>,
    },

    /// Request refers to resources that do not belong together.
    #[error("{0}")]
    Conflict(String),

    #[error("Too many requests")]
    TooManyRequests { retry_after_secs: u64 },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn event_not_found() -> Self {
        AppError::NotFound("Event not found".to_string())
    }

    /// The generic failure used for malformed request bodies.
    pub fn invalid_body(reason: impl Into<String>) -> Self {
        AppError::Validation {
            message: "Validation failed".to_string(),
            issues: vec![ValidationIssue::new("body", "invalid_body", reason)],
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<ErrorDetails>,
}

#[derive(Serialize)]
struct ErrorDetails {
    issues: Vec<ValidationIssue>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.to_string(), None),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden".to_string(), None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            AppError::Validation { message, issues } => (
                StatusCode::BAD_REQUEST,
                message,
                Some(ErrorDetails { issues }),
            ),
            AppError::Conflict(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::TooManyRequests { retry_after_secs } => {
                let body = ErrorResponse {
                    error: "Too many requests".to_string(),
                    details: None,
                };
                let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
                return response;
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                internal_error()
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                internal_error()
            }
        };

        let body = ErrorResponse { error, details };

        (status, Json(body)).into_response()
    }
}

fn internal_error() -> (StatusCode, String, Option<ErrorDetails>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
        None,
    )
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
