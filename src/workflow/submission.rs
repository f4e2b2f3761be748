// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Scholar Seal

//! Application submission state machine.
//!
//! ```text
//! Idle -> Validating -> [UploadingFiles] -> Encrypting -> AwaitingSignature
//!      -> Pending -> Confirmed | Failed
//! ```
//!
//! A session runs at most one submission at a time. [`SubmissionWorkflow::begin`]
//! claims the session and hands out a [`SubmissionTicket`]; every step after
//! an adapter call re-checks that ticket, so a reset session drops the
//! remainder of an in-flight attempt instead of overwriting newer state.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::uploads::{upload_attachments, PinnedManifest};
use crate::application::ApplicationDraft;
use crate::blockchain::{ChainSubmitter, ProfileFields, SubmittedTx, WalletProvider};
use crate::config::{resolve_contract_address, PINATA_API_KEY_ENV, PINATA_SECRET_KEY_ENV};
use crate::encryption::EncryptionContext;
use crate::error::ScholarError;
use crate::providers::ContentStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SubmissionState {
    Idle,
    Validating,
    UploadingFiles,
    Encrypting,
    AwaitingSignature,
    Pending {
        tx_hash: String,
    },
    Confirmed {
        tx_hash: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        manifest_cid: Option<String>,
    },
    Failed {
        message: String,
    },
}

impl SubmissionState {
    /// Whether a new submit action may start from this state.
    pub fn accepts_submit(&self) -> bool {
        matches!(
            self,
            SubmissionState::Idle
                | SubmissionState::Failed { .. }
                | SubmissionState::Confirmed { .. }
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            SubmissionState::Idle => "idle",
            SubmissionState::Validating => "validating",
            SubmissionState::UploadingFiles => "uploading_files",
            SubmissionState::Encrypting => "encrypting",
            SubmissionState::AwaitingSignature => "awaiting_signature",
            SubmissionState::Pending { .. } => "pending",
            SubmissionState::Confirmed { .. } => "confirmed",
            SubmissionState::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// User-visible message emitted by the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Point-in-time view of a session's submission.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubmissionSnapshot {
    pub state: SubmissionState,
    /// Reason the last submit action was turned back to `idle`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_cid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_url: Option<String>,
    /// States visited by the current attempt, in order.
    pub history: Vec<String>,
    pub notifications: Vec<Notification>,
}

/// Adapters a submission runs against.
#[derive(Clone)]
pub struct SubmissionServices {
    pub encryption: Arc<EncryptionContext>,
    pub wallet: Arc<dyn WalletProvider>,
    /// `None` when no storage key pair is configured.
    pub store: Option<Arc<dyn ContentStore>>,
    pub chain: Arc<dyn ChainSubmitter>,
    /// Raw configured value, validated on every attempt.
    pub contract_address: Option<String>,
}

/// Claim on a session's single submission slot.
#[derive(Debug)]
pub struct SubmissionTicket {
    generation: u64,
}

/// How a submit action ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Another attempt was in flight; nothing happened.
    Ignored,
    /// Preconditions unmet; back to `Idle` with this reason.
    Rejected(String),
    Confirmed {
        tx_hash: String,
        manifest_cid: Option<String>,
    },
    Failed(ScholarError),
    /// The session was reset while this attempt was suspended.
    Abandoned,
}

enum Halt {
    Rejected(String),
    Failed(ScholarError),
    Abandoned,
}

impl From<ScholarError> for Halt {
    fn from(err: ScholarError) -> Self {
        Halt::Failed(err)
    }
}

struct Progress {
    state: SubmissionState,
    generation: u64,
    rejection: Option<String>,
    submitted: Option<SubmittedTx>,
    manifest: Option<PinnedManifest>,
    history: Vec<String>,
    notifications: Vec<Notification>,
}

impl Progress {
    fn notify(&mut self, level: NotificationLevel, title: &str, message: impl Into<String>) {
        self.notifications.push(Notification {
            level,
            title: title.to_string(),
            message: message.into(),
            at: Utc::now(),
        });
    }

    fn enter(&mut self, state: SubmissionState) {
        self.history.push(state.name().to_string());
        self.state = state;
    }
}

pub struct SubmissionWorkflow {
    session_id: Uuid,
    services: SubmissionServices,
    progress: Mutex<Progress>,
}

impl SubmissionWorkflow {
    pub fn new(session_id: Uuid, services: SubmissionServices) -> Self {
        Self {
            session_id,
            services,
            progress: Mutex::new(Progress {
                state: SubmissionState::Idle,
                generation: 0,
                rejection: None,
                submitted: None,
                manifest: None,
                history: Vec::new(),
                notifications: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Progress> {
        self.progress.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> SubmissionState {
        self.lock().state.clone()
    }

    pub fn snapshot(&self) -> SubmissionSnapshot {
        let progress = self.lock();
        SubmissionSnapshot {
            state: progress.state.clone(),
            rejection: progress.rejection.clone(),
            explorer_url: progress.submitted.as_ref().map(|s| s.explorer_url.clone()),
            manifest_cid: progress.manifest.as_ref().map(|m| m.cid.clone()),
            manifest_url: progress.manifest.as_ref().map(|m| m.gateway_url.clone()),
            history: progress.history.clone(),
            notifications: progress.notifications.clone(),
        }
    }

    /// Claim the submission slot. Returns `None` while an attempt is in
    /// flight.
    pub fn begin(&self) -> Option<SubmissionTicket> {
        let mut progress = self.lock();
        if !progress.state.accepts_submit() {
            tracing::debug!(
                session_id = %self.session_id,
                state = progress.state.name(),
                "Submit ignored, attempt in flight"
            );
            return None;
        }

        progress.generation += 1;
        progress.rejection = None;
        progress.submitted = None;
        progress.manifest = None;
        progress.history.clear();
        progress.enter(SubmissionState::Validating);
        tracing::info!(session_id = %self.session_id, state = "validating", "Submission started");

        Some(SubmissionTicket {
            generation: progress.generation,
        })
    }

    /// Begin and run a submission in one call.
    pub async fn submit(&self, draft: ApplicationDraft) -> SubmitOutcome {
        match self.begin() {
            Some(ticket) => self.run(ticket, draft).await,
            None => SubmitOutcome::Ignored,
        }
    }

    /// Return to `Idle`, abandoning any in-flight attempt at its next
    /// suspension point.
    pub fn reset(&self) {
        let mut progress = self.lock();
        progress.generation += 1;
        progress.state = SubmissionState::Idle;
        progress.rejection = None;
        progress.submitted = None;
        progress.manifest = None;
        progress.history.clear();
        progress.notifications.clear();
        tracing::info!(session_id = %self.session_id, "Submission state reset");
    }

    /// Drive a claimed attempt to completion.
    pub async fn run(&self, ticket: SubmissionTicket, draft: ApplicationDraft) -> SubmitOutcome {
        match self.execute(&ticket, &draft).await {
            Ok((tx_hash, manifest_cid)) => SubmitOutcome::Confirmed {
                tx_hash,
                manifest_cid,
            },
            Err(Halt::Abandoned) => {
                tracing::info!(session_id = %self.session_id, "Submission abandoned");
                SubmitOutcome::Abandoned
            }
            Err(Halt::Rejected(reason)) => {
                let mut progress = self.lock();
                if progress.generation != ticket.generation {
                    return SubmitOutcome::Abandoned;
                }
                tracing::info!(
                    session_id = %self.session_id,
                    reason = %reason,
                    "Submission rejected"
                );
                progress.enter(SubmissionState::Idle);
                progress.rejection = Some(reason.clone());
                progress.notify(NotificationLevel::Warning, "Submission Blocked", reason.clone());
                SubmitOutcome::Rejected(reason)
            }
            Err(Halt::Failed(err)) => {
                let mut progress = self.lock();
                if progress.generation != ticket.generation {
                    return SubmitOutcome::Abandoned;
                }
                let message = err.to_string();
                tracing::warn!(
                    session_id = %self.session_id,
                    kind = err.kind(),
                    error = %message,
                    "Submission failed"
                );
                progress.enter(SubmissionState::Failed {
                    message: message.clone(),
                });
                progress.notify(NotificationLevel::Error, "Submission Failed", message);
                SubmitOutcome::Failed(err)
            }
        }
    }

    async fn execute(
        &self,
        ticket: &SubmissionTicket,
        draft: &ApplicationDraft,
    ) -> Result<(String, Option<String>), Halt> {
        let services = &self.services;

        let contract = resolve_contract_address(services.contract_address.as_deref())?;
        let account = services
            .wallet
            .account()
            .ok_or_else(|| Halt::Rejected("Please connect your wallet first".to_string()))?;
        if !services.encryption.is_initialized() {
            return Err(Halt::Rejected(
                "Encryption service is not ready. Please wait for initialization to complete."
                    .to_string(),
            ));
        }
        if let Some(field) = draft.missing_field() {
            return Err(Halt::Rejected(format!("Please fill in the {field} field")));
        }

        let mut manifest_cid = None;
        if draft.has_attachments() {
            let store = services.store.clone().ok_or_else(|| {
                ScholarError::Configuration(format!(
                    "Pinata API keys not configured. Please set {PINATA_API_KEY_ENV} and {PINATA_SECRET_KEY_ENV} in your environment."
                ))
            })?;
            self.advance(ticket, SubmissionState::UploadingFiles, |_| {})?;

            let pinned = upload_attachments(store, draft).await?;

            manifest_cid = Some(pinned.cid.clone());
            self.advance(ticket, SubmissionState::Encrypting, |p| {
                p.manifest = Some(pinned)
            })?;
        } else {
            self.advance(ticket, SubmissionState::Encrypting, |_| {})?;
        }

        let mut input = services.encryption.build_encrypted_input(contract, account)?;
        for value in draft.encrypted_values() {
            input.add32(value);
        }
        let bundle = input.encrypt().await?;
        let handle = bundle.primary_handle().ok_or_else(|| {
            ScholarError::Encryption("gateway returned no ciphertext handle".to_string())
        })?;

        self.advance(ticket, SubmissionState::AwaitingSignature, |_| {})?;

        let fields = ProfileFields {
            name: draft.full_name.clone(),
            institution: draft.university.clone(),
            specialization: draft.essay.clone(),
        };
        let sent = services
            .chain
            .submit(contract, &fields, handle, &bundle.proof)
            .await?;
        let tx_hash = sent.tx_hash.clone();

        self.advance(
            ticket,
            SubmissionState::Pending {
                tx_hash: tx_hash.clone(),
            },
            |p| {
                p.notify(
                    NotificationLevel::Info,
                    "Transaction Submitted",
                    format!("Waiting for confirmation. View it at {}", sent.explorer_url),
                );
                p.submitted = Some(sent);
            },
        )?;

        let receipt = services.chain.await_confirmation(&tx_hash).await?;

        self.advance(
            ticket,
            SubmissionState::Confirmed {
                tx_hash: tx_hash.clone(),
                manifest_cid: manifest_cid.clone(),
            },
            |p| {
                let mut message = format!(
                    "Transaction hash: {} (block {})",
                    receipt.tx_hash, receipt.block_number
                );
                if let Some(manifest) = &p.manifest {
                    message.push_str(&format!("\nDocuments: {}", manifest.gateway_url));
                }
                p.notify(NotificationLevel::Success, "Transaction Confirmed!", message);
            },
        )?;

        Ok((tx_hash, manifest_cid))
    }

    /// Move to `state` if `ticket` still owns the session.
    fn advance<F>(
        &self,
        ticket: &SubmissionTicket,
        state: SubmissionState,
        update: F,
    ) -> Result<(), Halt>
    where
        F: FnOnce(&mut Progress),
    {
        let mut progress = self.lock();
        if progress.generation != ticket.generation {
            return Err(Halt::Abandoned);
        }
        tracing::info!(
            session_id = %self.session_id,
            from = progress.state.name(),
            to = state.name(),
            "Submission state changed"
        );
        progress.enter(state);
        update(&mut progress);
        Ok(())
    }
}
