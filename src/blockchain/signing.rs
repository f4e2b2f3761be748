// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Scholar Seal

//! Local signing wallet.
//!
//! The service acts on behalf of a single account whose key is supplied
//! through configuration. Without a key the wallet reports itself as
//! disconnected and every signing request is refused.

use alloy::{
    network::EthereumWallet,
    primitives::{Address, Signature},
    signers::{local::PrivateKeySigner, Signer},
};
use async_trait::async_trait;

use super::client::ChainClientError;
use super::WalletProvider;

/// Wallet backed by an optional local private key.
#[derive(Clone, Default)]
pub struct LocalWallet {
    signer: Option<PrivateKeySigner>,
}

impl std::fmt::Debug for LocalWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalWallet")
            .field("account", &self.signer.as_ref().map(|s| s.address()))
            .finish()
    }
}

impl LocalWallet {
    /// A wallet with no account.
    pub fn disconnected() -> Self {
        Self { signer: None }
    }

    /// Create a wallet from a hex private key (with or without `0x`).
    pub fn from_hex(private_key_hex: &str) -> Result<Self, ChainClientError> {
        Ok(Self {
            signer: Some(create_signer(private_key_hex)?),
        })
    }

    /// Build the transaction-signing wallet, if connected.
    pub fn ethereum_wallet(&self) -> Option<EthereumWallet> {
        self.signer.clone().map(EthereumWallet::from)
    }

    /// EIP-191 personal signature over `message`.
    pub async fn sign(&self, message: &[u8]) -> Result<Signature, ChainClientError> {
        let signer = self
            .signer
            .as_ref()
            .ok_or_else(|| ChainClientError::Signing("wallet not connected".to_string()))?;
        signer
            .sign_message(message)
            .await
            .map_err(|e| ChainClientError::Signing(e.to_string()))
    }
}

#[async_trait]
impl WalletProvider for LocalWallet {
    fn account(&self) -> Option<Address> {
        self.signer.as_ref().map(|s| s.address())
    }

    async fn sign_message(&self, message: &[u8]) -> Result<String, ChainClientError> {
        let signature = self.sign(message).await?;
        Ok(alloy::hex::encode_prefixed(signature.as_bytes()))
    }
}

/// Create a signer from a hex-encoded private key.
pub fn create_signer(private_key_hex: &str) -> Result<PrivateKeySigner, ChainClientError> {
    let trimmed = private_key_hex.trim();
    let hex = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let key_bytes =
        alloy::hex::decode(hex).map_err(|e| ChainClientError::InvalidPrivateKey(e.to_string()))?;

    PrivateKeySigner::from_slice(&key_bytes)
        .map_err(|e| ChainClientError::InvalidPrivateKey(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    #[test]
    fn parses_key_with_and_without_prefix() {
        let with_prefix = LocalWallet::from_hex(TEST_KEY).unwrap();
        let without_prefix = LocalWallet::from_hex(&TEST_KEY[2..]).unwrap();
        assert!(with_prefix.is_connected());
        assert_eq!(with_prefix.account(), without_prefix.account());
    }

    #[test]
    fn rejects_malformed_key() {
        assert!(matches!(
            LocalWallet::from_hex("0xnot-hex"),
            Err(ChainClientError::InvalidPrivateKey(_))
        ));
    }

    #[tokio::test]
    async fn signature_recovers_to_account() {
        let wallet = LocalWallet::from_hex(TEST_KEY).unwrap();
        let message = b"authorize decrypt";
        let signature = wallet.sign(message).await.unwrap();
        let recovered = signature.recover_address_from_msg(message).unwrap();
        assert_eq!(Some(recovered), wallet.account());
    }

    #[tokio::test]
    async fn disconnected_wallet_cannot_sign() {
        let wallet = LocalWallet::disconnected();
        assert!(!wallet.is_connected());
        assert!(wallet.ethereum_wallet().is_none());
        assert!(wallet.sign_message(b"hello").await.is_err());
    }
}
