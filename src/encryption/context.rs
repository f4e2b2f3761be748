// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Scholar Seal

//! Process-wide encryption context.
//!
//! Created once by [`EncryptionContext::initialize`] and read-only after
//! that. Concurrent initialization calls wait on the same cell; calls after
//! success return immediately.

use std::sync::{Arc, Mutex};

use alloy::primitives::Address;
use serde::Serialize;
use tokio::sync::OnceCell;
use utoipa::ToSchema;

use super::{
    decrypt_authorization_message, CiphertextHandle, EncryptInputRequest, EncryptedInputBundle,
    EncryptionService, KeyMaterial, RetryPolicy, UserDecryptRequest,
};
use crate::blockchain::{NetworkConfig, WalletProvider};
use crate::error::ScholarError;

/// Lifecycle of the encryption context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ContextStatus {
    Uninitialized,
    Initializing,
    Ready { key_id: String },
    Failed { error: String },
}

pub struct EncryptionContext {
    service: Arc<dyn EncryptionService>,
    wallet: Arc<dyn WalletProvider>,
    network: NetworkConfig,
    retry: RetryPolicy,
    keys: OnceCell<Arc<KeyMaterial>>,
    status: Mutex<ContextStatus>,
}

impl EncryptionContext {
    pub fn new(
        service: Arc<dyn EncryptionService>,
        wallet: Arc<dyn WalletProvider>,
        network: NetworkConfig,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            service,
            wallet,
            network,
            retry,
            keys: OnceCell::new(),
            status: Mutex::new(ContextStatus::Uninitialized),
        }
    }

    /// Establish the context. Idempotent.
    pub async fn initialize(&self) -> Result<(), ScholarError> {
        if self.keys.initialized() {
            return Ok(());
        }

        if !self.wallet.is_connected() {
            let err = ScholarError::Initialization("Ethereum provider not found".to_string());
            self.set_status(ContextStatus::Failed {
                error: err.to_string(),
            });
            return Err(err);
        }

        let result = self
            .keys
            .get_or_try_init(|| async {
                self.set_status(ContextStatus::Initializing);
                tracing::info!(network = %self.network.name, "Initializing encryption context");

                let chain_id = self.network.chain_id;
                self.retry
                    .run("fhe_key_material", || self.service.fetch_key_material(chain_id))
                    .await
                    .map(Arc::new)
                    .map_err(|(e, attempts)| {
                        ScholarError::Initialization(format!(
                            "Failed to initialize encryption service after {attempts} attempt(s): {e}"
                        ))
                    })
            })
            .await;

        match result {
            Ok(keys) => {
                tracing::info!(key_id = %keys.key_id, "Encryption context ready");
                self.set_status(ContextStatus::Ready {
                    key_id: keys.key_id.clone(),
                });
                Ok(())
            }
            Err(err) => {
                self.set_status(ContextStatus::Failed {
                    error: err.to_string(),
                });
                Err(err)
            }
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.keys.initialized()
    }

    pub fn status(&self) -> ContextStatus {
        self.status
            .lock()
            .map(|s| s.clone())
            .unwrap_or(ContextStatus::Uninitialized)
    }

    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    /// Start an encrypted input bound to `contract` and `account`.
    pub fn build_encrypted_input(
        &self,
        contract: Address,
        account: Address,
    ) -> Result<EncryptedInputBuilder, ScholarError> {
        if !self.is_initialized() {
            return Err(ScholarError::Encryption(
                "encryption context not initialized".to_string(),
            ));
        }
        Ok(EncryptedInputBuilder {
            service: Arc::clone(&self.service),
            contract,
            account,
            chain_id: self.network.chain_id,
            values: Vec::new(),
        })
    }

    /// Decrypt a single handle on behalf of `account`.
    ///
    /// Each call asks the wallet for a fresh signature; there is no batch
    /// form.
    pub async fn decrypt_field(
        &self,
        contract: Address,
        account: Address,
        handle: CiphertextHandle,
    ) -> Result<u32, ScholarError> {
        if !self.is_initialized() {
            return Err(ScholarError::Decryption(
                "encryption context not initialized".to_string(),
            ));
        }
        if self.wallet.account() != Some(account) {
            return Err(ScholarError::Decryption(format!(
                "account {account} is not the connected wallet"
            )));
        }

        let message = decrypt_authorization_message(contract, account, handle);
        let signature = self
            .wallet
            .sign_message(message.as_bytes())
            .await
            .map_err(|e| ScholarError::Decryption(format!("signature rejected: {e}")))?;

        let request = UserDecryptRequest {
            contract,
            account,
            handle,
            signature,
        };
        self.service
            .user_decrypt(&request)
            .await
            .map_err(|e| ScholarError::Decryption(e.to_string()))
    }

    fn set_status(&self, status: ContextStatus) {
        if let Ok(mut guard) = self.status.lock() {
            *guard = status;
        }
    }
}

/// Ordered sequence of 32-bit values awaiting encryption.
pub struct EncryptedInputBuilder {
    service: Arc<dyn EncryptionService>,
    contract: Address,
    account: Address,
    chain_id: u64,
    values: Vec<u32>,
}

impl EncryptedInputBuilder {
    pub fn add32(&mut self, value: u32) -> &mut Self {
        self.values.push(value);
        self
    }

    /// Encrypt the accumulated values and return handles plus proof.
    pub async fn encrypt(self) -> Result<EncryptedInputBundle, ScholarError> {
        if self.values.is_empty() {
            return Err(ScholarError::Encryption(
                "no values added to encrypted input".to_string(),
            ));
        }

        let request = EncryptInputRequest {
            contract: self.contract,
            account: self.account,
            chain_id: self.chain_id,
            values: self.values,
        };
        let bundle = self
            .service
            .encrypt_input(&request)
            .await
            .map_err(|e| ScholarError::Encryption(e.to_string()))?;

        if bundle.handles.len() != request.values.len() {
            return Err(ScholarError::Encryption(format!(
                "gateway returned {} handle(s) for {} value(s)",
                bundle.handles.len(),
                request.values.len()
            )));
        }
        Ok(bundle)
    }
}
