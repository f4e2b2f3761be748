// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Scholar Seal

//! Error types shared by the adapters, the workflows and the HTTP layer.
//!
//! [`ScholarError`] is the workflow taxonomy: every adapter failure is
//! surfaced as exactly one of its kinds, and its `Display` output is the
//! message shown to the user. [`ApiError`] is the HTTP rendering of it.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Failure kinds surfaced by the submission and query workflows.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScholarError {
    /// Missing or invalid addresses or keys. Not retried.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Encryption context setup failed after bounded retries.
    #[error("Initialization error: {0}")]
    Initialization(String),

    /// Upload to the content store failed.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("Decryption error: {0}")]
    Decryption(String),

    /// On-chain revert, signature rejection or confirmation timeout.
    #[error("Submission error: {0}")]
    Submission(String),

    /// Chain read failed.
    #[error("Query error: {0}")]
    Query(String),
}

impl ScholarError {
    /// Short machine-readable kind name.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Initialization(_) => "initialization",
            Self::Storage(_) => "storage",
            Self::Encryption(_) => "encryption",
            Self::Decryption(_) => "decryption",
            Self::Submission(_) => "submission",
            Self::Query(_) => "query",
        }
    }

    /// The adapter's underlying message without the kind prefix.
    pub fn detail(&self) -> &str {
        match self {
            Self::Configuration(m)
            | Self::Initialization(m)
            | Self::Storage(m)
            | Self::Encryption(m)
            | Self::Decryption(m)
            | Self::Submission(m)
            | Self::Query(m) => m,
        }
    }
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }
}

impl From<ScholarError> for ApiError {
    fn from(err: ScholarError) -> Self {
        let status = match err {
            ScholarError::Configuration(_) | ScholarError::Initialization(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ScholarError::Storage(_)
            | ScholarError::Encryption(_)
            | ScholarError::Decryption(_)
            | ScholarError::Submission(_)
            | ScholarError::Query(_) => StatusCode::BAD_GATEWAY,
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}
