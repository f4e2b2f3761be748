// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Scholar Seal

//! FHE encryption adapter.
//!
//! - [`EncryptionService`] is the raw external gateway (key material,
//!   input encryption, user decryption).
//! - [`EncryptionContext`] is the process-wide context built on top of it:
//!   initialized once with bounded retries, then shared read-only by every
//!   workflow.

pub mod context;
pub mod relayer;
pub mod retry;

use alloy::primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use serde::{Serialize, Serializer};

pub use context::{ContextStatus, EncryptedInputBuilder, EncryptionContext};
pub use relayer::{RelayerClient, RelayerError};
pub use retry::RetryPolicy;

/// Opaque 32-byte identifier of an encrypted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CiphertextHandle(pub B256);

impl CiphertextHandle {
    pub fn to_hex(&self) -> String {
        alloy::hex::encode_prefixed(self.0)
    }
}

impl std::fmt::Display for CiphertextHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for CiphertextHandle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Ciphertext handles plus the proof that binds them to a contract and
/// account. Produced once per submission attempt and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedInputBundle {
    pub handles: Vec<CiphertextHandle>,
    pub proof: Bytes,
}

impl EncryptedInputBundle {
    /// Handle of the first encrypted value.
    pub fn primary_handle(&self) -> Option<CiphertextHandle> {
        self.handles.first().copied()
    }
}

/// Public key material fetched during initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMaterial {
    pub key_id: String,
    pub public_key_urls: Vec<String>,
}

/// Values to encrypt for a given contract and account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptInputRequest {
    pub contract: Address,
    pub account: Address,
    pub chain_id: u64,
    pub values: Vec<u32>,
}

/// User-authorized decryption of one handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDecryptRequest {
    pub contract: Address,
    pub account: Address,
    pub handle: CiphertextHandle,
    /// Wallet signature over [`decrypt_authorization_message`].
    pub signature: String,
}

/// External FHE gateway.
#[async_trait]
pub trait EncryptionService: Send + Sync {
    async fn fetch_key_material(&self, chain_id: u64) -> Result<KeyMaterial, RelayerError>;

    async fn encrypt_input(
        &self,
        request: &EncryptInputRequest,
    ) -> Result<EncryptedInputBundle, RelayerError>;

    async fn user_decrypt(&self, request: &UserDecryptRequest) -> Result<u32, RelayerError>;
}

/// Message the wallet signs to authorize decryption of one handle.
pub fn decrypt_authorization_message(
    contract: Address,
    account: Address,
    handle: CiphertextHandle,
) -> String {
    format!(
        "Scholar Seal decryption request\ncontract: {contract}\naccount: {account}\nhandle: {handle}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_serializes_as_prefixed_hex() {
        let handle = CiphertextHandle(B256::repeat_byte(0xab));
        let json = serde_json::to_string(&handle).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "ab".repeat(32)));
    }

    #[test]
    fn authorization_message_names_every_party() {
        let handle = CiphertextHandle(B256::repeat_byte(0x01));
        let message = decrypt_authorization_message(
            Address::repeat_byte(0x02),
            Address::repeat_byte(0x03),
            handle,
        );
        assert!(message.contains(&handle.to_hex()));
        assert!(message.contains("contract: 0x0202"));
        assert!(message.contains("account: 0x0303"));
    }
}
