// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Scholar Seal

//! Profile listing and per-field decryption.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use alloy::primitives::Address;
use serde::Serialize;
use tokio::task::JoinSet;
use utoipa::ToSchema;

use crate::blockchain::{ProfileField, ProfileReader, ScholarProfile};
use crate::config::resolve_contract_address;
use crate::encryption::EncryptionContext;
use crate::error::ScholarError;

/// A profile whose record could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ProfileLoadFailure {
    pub profile_id: u64,
    pub error: String,
}

/// Profiles owned by one account, including the ones that failed to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileListing {
    /// Loaded profiles, in the order the contract listed them.
    pub profiles: Vec<ScholarProfile>,
    pub failures: Vec<ProfileLoadFailure>,
}

impl ProfileListing {
    /// Some profiles failed to load.
    pub fn partial_failure(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Read side of the profile contract.
#[derive(Clone)]
pub struct ProfileQuery {
    reader: Arc<dyn ProfileReader>,
    contract_address: Option<String>,
}

impl ProfileQuery {
    pub fn new(reader: Arc<dyn ProfileReader>, contract_address: Option<String>) -> Self {
        Self {
            reader,
            contract_address,
        }
    }

    pub fn contract(&self) -> Result<Address, ScholarError> {
        resolve_contract_address(self.contract_address.as_deref())
    }

    pub async fn count(&self) -> Result<u64, ScholarError> {
        let contract = self.contract()?;
        self.reader.profile_count(contract).await
    }

    /// One profile record.
    pub async fn profile(&self, profile_id: u64) -> Result<ScholarProfile, ScholarError> {
        let contract = self.contract()?;
        self.reader.profile(contract, profile_id).await
    }

    /// Every profile owned by `owner`.
    ///
    /// Enumeration failing is an error. A single record failing is recorded
    /// in the listing and the other fetches carry on.
    pub async fn load_owned(&self, owner: Address) -> Result<ProfileListing, ScholarError> {
        let contract = self.contract()?;
        let ids = self.reader.profile_ids_by_owner(contract, owner).await?;
        tracing::debug!(owner = %owner, count = ids.len(), "Listing owned profiles");

        let mut set = JoinSet::new();
        for (index, profile_id) in ids.iter().copied().enumerate() {
            let reader = Arc::clone(&self.reader);
            set.spawn(async move {
                let result = reader.profile(contract, profile_id).await;
                (index, profile_id, result)
            });
        }

        let mut loaded = Vec::with_capacity(ids.len());
        let mut failures = Vec::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, _, Ok(profile))) => loaded.push((index, profile)),
                Ok((index, profile_id, Err(err))) => {
                    tracing::warn!(profile_id, error = %err, "Profile fetch failed");
                    failures.push((
                        index,
                        ProfileLoadFailure {
                            profile_id,
                            error: err.to_string(),
                        },
                    ));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Profile fetch task failed");
                }
            }
        }

        // Tasks that died without reporting still count as failures.
        let reported: Vec<usize> = loaded
            .iter()
            .map(|(i, _)| *i)
            .chain(failures.iter().map(|(i, _)| *i))
            .collect();
        for (index, profile_id) in ids.iter().copied().enumerate() {
            if !reported.contains(&index) {
                failures.push((
                    index,
                    ProfileLoadFailure {
                        profile_id,
                        error: "Query error: profile fetch was interrupted".to_string(),
                    },
                ));
            }
        }

        loaded.sort_by_key(|(i, _)| *i);
        failures.sort_by_key(|(i, _)| *i);

        Ok(ProfileListing {
            profiles: loaded.into_iter().map(|(_, p)| p).collect(),
            failures: failures.into_iter().map(|(_, f)| f).collect(),
        })
    }
}

/// Progress of one field's decryption for the current viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DecryptState {
    NotRequested,
    InFlight,
    Resolved { value: u32 },
    Failed { error: String },
}

/// Per-session decrypted values keyed by profile and field.
///
/// Entries change independently; no operation here touches more than one
/// key at a time. Values never leave the session.
#[derive(Debug, Default)]
pub struct DecryptionBook {
    entries: Mutex<HashMap<(u64, ProfileField), DecryptState>>,
}

impl DecryptionBook {
    fn lock(&self) -> MutexGuard<'_, HashMap<(u64, ProfileField), DecryptState>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self, profile_id: u64, field: ProfileField) -> DecryptState {
        self.lock()
            .get(&(profile_id, field))
            .cloned()
            .unwrap_or(DecryptState::NotRequested)
    }

    /// All three fields of a profile.
    pub fn fields(&self, profile_id: u64) -> BTreeMap<ProfileField, DecryptState> {
        let entries = self.lock();
        ProfileField::ALL
            .into_iter()
            .map(|field| {
                let state = entries
                    .get(&(profile_id, field))
                    .cloned()
                    .unwrap_or(DecryptState::NotRequested);
                (field, state)
            })
            .collect()
    }

    /// Mark a key in flight.
    ///
    /// Keys already in flight or resolved are left alone and their current
    /// state is returned as the error. Failed keys may be retried.
    pub fn begin(&self, profile_id: u64, field: ProfileField) -> Result<(), DecryptState> {
        let mut entries = self.lock();
        let entry = entries
            .entry((profile_id, field))
            .or_insert(DecryptState::NotRequested);
        match entry {
            DecryptState::InFlight | DecryptState::Resolved { .. } => Err(entry.clone()),
            _ => {
                *entry = DecryptState::InFlight;
                Ok(())
            }
        }
    }

    pub fn resolve(
        &self,
        profile_id: u64,
        field: ProfileField,
        result: &Result<u32, ScholarError>,
    ) -> DecryptState {
        let state = match result {
            Ok(value) => DecryptState::Resolved { value: *value },
            Err(err) => DecryptState::Failed {
                error: err.to_string(),
            },
        };
        self.lock().insert((profile_id, field), state.clone());
        state
    }

    /// Decrypt one field of `profile` for `viewer`.
    ///
    /// Returns the current state without calling the gateway when the key
    /// is already being decrypted or was decrypted before.
    pub async fn decrypt(
        &self,
        context: &EncryptionContext,
        contract: Address,
        viewer: Address,
        profile: &ScholarProfile,
        field: ProfileField,
    ) -> DecryptState {
        let profile_id = profile.profile_id;
        if let Err(current) = self.begin(profile_id, field) {
            return current;
        }

        let result = context
            .decrypt_field(contract, viewer, profile.handle(field))
            .await;
        match &result {
            Ok(_) => tracing::info!(profile_id, field = %field, "Field decrypted"),
            Err(err) => {
                tracing::warn!(profile_id, field = %field, error = %err, "Field decryption failed")
            }
        }
        self.resolve(profile_id, field, &result)
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}
