// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Scholar Seal

//! Per-viewer form session.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;
use uuid::Uuid;

use super::query::DecryptionBook;
use super::submission::{SubmissionServices, SubmissionWorkflow};

/// One viewer's form and decryption state.
///
/// Owns the submission slot and the decrypted values. Both are discarded
/// when the session ends, either explicitly or after sitting idle.
pub struct ViewerSession {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub submission: SubmissionWorkflow,
    pub decrypted: DecryptionBook,
    last_seen: Mutex<Instant>,
}

impl ViewerSession {
    pub fn new(services: SubmissionServices) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            created_at: Utc::now(),
            submission: SubmissionWorkflow::new(id, services),
            decrypted: DecryptionBook::default(),
            last_seen: Mutex::new(Instant::now()),
        }
    }

    /// Record viewer activity.
    pub fn touch(&self) {
        *self.last_seen.lock().unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .elapsed()
    }

    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.idle_for() >= ttl
    }

    /// Drop decrypted values and abandon any in-flight submission.
    pub fn end(&self) {
        self.submission.reset();
        self.decrypted.clear();
        tracing::info!(session_id = %self.id, "Session ended");
    }
}
