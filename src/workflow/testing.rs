// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Scholar Seal

//! Recording fakes for the external adapters.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use alloy::primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Notify;

use crate::application::Attachment;
use crate::blockchain::{
    ChainClientError, ChainSubmitter, ProfileFields, ProfileReader, ScholarProfile, SubmittedTx,
    TxReceipt, WalletProvider, SEPOLIA,
};
use crate::encryption::{
    CiphertextHandle, EncryptInputRequest, EncryptedInputBundle, EncryptionService, KeyMaterial,
    RelayerError, UserDecryptRequest,
};
use crate::error::ScholarError;
use crate::providers::{ContentStore, UploadMetadata};

pub(crate) const CONTRACT: &str = "0x7AC73d56fF5be33C2122E10a738072DB7c9FB34c";

pub(crate) fn test_account() -> Address {
    Address::repeat_byte(0xaa)
}

pub(crate) fn contract_address() -> Address {
    CONTRACT.parse().unwrap()
}

// =============================================================================
// Encryption
// =============================================================================

#[derive(Default)]
pub(crate) struct FakeEncryption {
    key_fetches: AtomicU32,
    failing_key_fetches: AtomicU32,
    fail_encrypt: AtomicBool,
    encrypted: Mutex<Vec<Vec<u32>>>,
    decrypt_calls: AtomicU32,
    plaintexts: Mutex<HashMap<CiphertextHandle, Result<u32, String>>>,
}

impl FakeEncryption {
    /// Fail the next `n` key material fetches.
    pub fn fail_key_fetches(&self, n: u32) {
        self.failing_key_fetches.store(n, Ordering::SeqCst);
    }

    pub fn fail_encryption(&self) {
        self.fail_encrypt.store(true, Ordering::SeqCst);
    }

    pub fn key_fetches(&self) -> u32 {
        self.key_fetches.load(Ordering::SeqCst)
    }

    pub fn encrypted_values(&self) -> Vec<Vec<u32>> {
        self.encrypted.lock().unwrap().clone()
    }

    pub fn decrypt_calls(&self) -> u32 {
        self.decrypt_calls.load(Ordering::SeqCst)
    }

    pub fn set_plaintext(&self, handle: CiphertextHandle, value: u32) {
        self.plaintexts.lock().unwrap().insert(handle, Ok(value));
    }

    pub fn fail_decrypt(&self, handle: CiphertextHandle, message: &str) {
        self.plaintexts
            .lock()
            .unwrap()
            .insert(handle, Err(message.to_string()));
    }
}

#[async_trait]
impl EncryptionService for FakeEncryption {
    async fn fetch_key_material(&self, _chain_id: u64) -> Result<KeyMaterial, RelayerError> {
        self.key_fetches.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failing_key_fetches.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_key_fetches.store(remaining - 1, Ordering::SeqCst);
            return Err(RelayerError::Request("gateway unreachable".to_string()));
        }
        // Yield so concurrent initializers actually overlap.
        tokio::task::yield_now().await;
        Ok(KeyMaterial {
            key_id: "test-key".to_string(),
            public_key_urls: vec!["https://keys.test/pk".to_string()],
        })
    }

    async fn encrypt_input(
        &self,
        request: &EncryptInputRequest,
    ) -> Result<EncryptedInputBundle, RelayerError> {
        self.encrypted.lock().unwrap().push(request.values.clone());
        if self.fail_encrypt.load(Ordering::SeqCst) {
            return Err(RelayerError::Rejected("proof generation failed".to_string()));
        }
        let handles = (0..request.values.len())
            .map(|i| CiphertextHandle(B256::repeat_byte(i as u8 + 1)))
            .collect();
        Ok(EncryptedInputBundle {
            handles,
            proof: Bytes::from(vec![0xaa, 0xbb]),
        })
    }

    async fn user_decrypt(&self, request: &UserDecryptRequest) -> Result<u32, RelayerError> {
        self.decrypt_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        match self.plaintexts.lock().unwrap().get(&request.handle) {
            Some(Ok(value)) => Ok(*value),
            Some(Err(message)) => Err(RelayerError::Rejected(message.clone())),
            None => Err(RelayerError::Rejected(format!(
                "unknown handle {}",
                request.handle
            ))),
        }
    }
}

// =============================================================================
// Wallet
// =============================================================================

pub(crate) struct FakeWallet {
    account: Option<Address>,
}

impl FakeWallet {
    pub fn connected() -> Self {
        Self {
            account: Some(test_account()),
        }
    }

    pub fn disconnected() -> Self {
        Self { account: None }
    }
}

#[async_trait]
impl WalletProvider for FakeWallet {
    fn account(&self) -> Option<Address> {
        self.account
    }

    async fn sign_message(&self, _message: &[u8]) -> Result<String, ChainClientError> {
        match self.account {
            Some(_) => Ok("0x5151".to_string()),
            None => Err(ChainClientError::Signing("wallet not connected".to_string())),
        }
    }
}

// =============================================================================
// Content store
// =============================================================================

/// Store that fails any file whose name contains `fail`.
#[derive(Default)]
pub(crate) struct FakeStore {
    files: Mutex<Vec<(String, UploadMetadata)>>,
    documents: Mutex<Vec<(Value, UploadMetadata)>>,
}

impl FakeStore {
    pub fn file_uploads(&self) -> Vec<String> {
        self.files
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn file_metadata(&self) -> Vec<UploadMetadata> {
        self.files
            .lock()
            .unwrap()
            .iter()
            .map(|(_, metadata)| metadata.clone())
            .collect()
    }

    pub fn json_uploads(&self) -> Vec<(Value, UploadMetadata)> {
        self.documents.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.files.lock().unwrap().len() + self.documents.lock().unwrap().len()
    }
}

#[async_trait]
impl ContentStore for FakeStore {
    async fn upload_file(
        &self,
        file: &Attachment,
        metadata: &UploadMetadata,
    ) -> Result<String, ScholarError> {
        self.files
            .lock()
            .unwrap()
            .push((file.file_name.clone(), metadata.clone()));
        tokio::task::yield_now().await;
        if file.file_name.contains("fail") {
            return Err(ScholarError::Storage(
                "Pinata upload failed: Bad Gateway".to_string(),
            ));
        }
        Ok(format!("Qm{}", file.file_name))
    }

    async fn upload_json(
        &self,
        document: &Value,
        metadata: &UploadMetadata,
    ) -> Result<String, ScholarError> {
        self.documents
            .lock()
            .unwrap()
            .push((document.clone(), metadata.clone()));
        Ok("QmManifest".to_string())
    }

    fn gateway_url(&self, cid: &str) -> String {
        format!("https://gateway.test/ipfs/{cid}")
    }
}

// =============================================================================
// Chain
// =============================================================================

pub(crate) const TX_HASH: &str =
    "0xabababababababababababababababababababababababababababababababab";

#[derive(Default)]
pub(crate) struct FakeChain {
    submitted: Mutex<Vec<(Address, ProfileFields, CiphertextHandle)>>,
    submit_error: Mutex<Option<ScholarError>>,
    confirm_error: Mutex<Option<ScholarError>>,
    confirmation_gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeChain {
    pub fn submits(&self) -> usize {
        self.submitted.lock().unwrap().len()
    }

    pub fn submitted(&self) -> Vec<(Address, ProfileFields, CiphertextHandle)> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn fail_submit(&self, err: ScholarError) {
        *self.submit_error.lock().unwrap() = Some(err);
    }

    pub fn fail_confirmation(&self, err: ScholarError) {
        *self.confirm_error.lock().unwrap() = Some(err);
    }

    /// Block confirmation until the returned gate is notified.
    pub fn hold_confirmation(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.confirmation_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }
}

#[async_trait]
impl ChainSubmitter for FakeChain {
    async fn submit(
        &self,
        contract: Address,
        fields: &ProfileFields,
        handle: CiphertextHandle,
        _proof: &Bytes,
    ) -> Result<SubmittedTx, ScholarError> {
        self.submitted
            .lock()
            .unwrap()
            .push((contract, fields.clone(), handle));
        if let Some(err) = self.submit_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(SubmittedTx {
            tx_hash: TX_HASH.to_string(),
            explorer_url: SEPOLIA.tx_url(TX_HASH),
        })
    }

    async fn await_confirmation(&self, tx_hash: &str) -> Result<TxReceipt, ScholarError> {
        let gate = self.confirmation_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if let Some(err) = self.confirm_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(TxReceipt {
            tx_hash: tx_hash.to_string(),
            block_number: 42,
            gas_used: 210_000,
        })
    }
}

// =============================================================================
// Reader
// =============================================================================

pub(crate) fn sample_profile(profile_id: u64) -> ScholarProfile {
    let seed = (profile_id as u8).wrapping_mul(3);
    ScholarProfile {
        profile_id,
        name: format!("Scholar {profile_id}"),
        institution: "University of London".to_string(),
        specialization: "Analytical engines".to_string(),
        owner: test_account(),
        is_verified: false,
        is_active: true,
        created_at: 1_760_000_000,
        last_updated: 1_760_000_000,
        academic_score: CiphertextHandle(B256::repeat_byte(seed.wrapping_add(0x10))),
        verification_level: CiphertextHandle(B256::repeat_byte(seed.wrapping_add(0x11))),
        reputation_score: CiphertextHandle(B256::repeat_byte(seed.wrapping_add(0x12))),
    }
}

#[derive(Default)]
pub(crate) struct FakeReader {
    ids: Vec<u64>,
    failing: HashSet<u64>,
    fetches: AtomicU32,
    offline: bool,
}

impl FakeReader {
    pub fn with_profiles(ids: &[u64]) -> Self {
        Self {
            ids: ids.to_vec(),
            ..Self::default()
        }
    }

    pub fn failing_on(mut self, profile_id: u64) -> Self {
        self.failing.insert(profile_id);
        self
    }

    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    pub fn fetches(&self) -> u32 {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileReader for FakeReader {
    async fn profile_count(&self, _contract: Address) -> Result<u64, ScholarError> {
        if self.offline {
            return Err(ScholarError::Query("rpc unreachable".to_string()));
        }
        Ok(self.ids.len() as u64)
    }

    async fn profile_ids_by_owner(
        &self,
        _contract: Address,
        owner: Address,
    ) -> Result<Vec<u64>, ScholarError> {
        if self.offline {
            return Err(ScholarError::Query("rpc unreachable".to_string()));
        }
        if owner == test_account() {
            Ok(self.ids.clone())
        } else {
            Ok(Vec::new())
        }
    }

    async fn profile(
        &self,
        _contract: Address,
        profile_id: u64,
    ) -> Result<ScholarProfile, ScholarError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        if self.failing.contains(&profile_id) {
            return Err(ScholarError::Query(format!(
                "profile {profile_id}: execution reverted"
            )));
        }
        Ok(sample_profile(profile_id))
    }

    async fn chain_head(&self) -> Result<u64, ScholarError> {
        if self.offline {
            return Err(ScholarError::Query("rpc unreachable".to_string()));
        }
        Ok(9_000_000)
    }
}

// =============================================================================
// Application state
// =============================================================================

pub(crate) struct TestApp {
    pub state: crate::state::AppState,
    pub encryption: Arc<FakeEncryption>,
    pub store: Arc<FakeStore>,
    pub chain: Arc<FakeChain>,
}

/// Application state over fakes, with a configured contract and a
/// connected wallet.
pub(crate) async fn test_app(reader: FakeReader, initialize: bool) -> TestApp {
    use std::time::Duration;

    use crate::config::AppConfig;
    use crate::encryption::{EncryptionContext, RetryPolicy};

    let encryption = Arc::new(FakeEncryption::default());
    let wallet = Arc::new(FakeWallet::connected());
    let context = Arc::new(EncryptionContext::new(
        encryption.clone(),
        wallet.clone(),
        SEPOLIA,
        RetryPolicy::new(1, Duration::ZERO),
    ));
    if initialize {
        context.initialize().await.unwrap();
    }

    let config = AppConfig {
        contract_address: Some(CONTRACT.to_string()),
        ..AppConfig::default()
    };
    let store = Arc::new(FakeStore::default());
    let chain = Arc::new(FakeChain::default());
    let state = crate::state::AppState::new(
        config,
        context,
        wallet,
        Some(store.clone()),
        chain.clone(),
        Arc::new(reader),
    );

    TestApp {
        state,
        encryption,
        store,
        chain,
    }
}
