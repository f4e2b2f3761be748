// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Scholar Seal

//! Profile creation transactions.
//!
//! Builds the `createScholarProfile` call, broadcasts it through a wallet
//! filled provider, and polls for the receipt until it lands or the
//! confirmation window closes.

use std::time::Duration;

use alloy::{
    network::EthereumWallet,
    primitives::{Address, Bytes, TxHash},
    providers::{Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
    sol_types::SolCall,
};
use async_trait::async_trait;
use tokio::time::{sleep, Instant};

use super::client::ChainClientError;
use super::contract::ISecureScholarSeal;
use super::types::{NetworkConfig, ProfileFields, SubmittedTx, TxReceipt};
use super::ChainSubmitter;
use crate::encryption::CiphertextHandle;
use crate::error::ScholarError;

/// Signing transaction sender for profile creation.
pub struct ProfileSubmitter {
    network: NetworkConfig,
    confirmation_timeout: Duration,
    poll_interval: Duration,
    provider: alloy::providers::fillers::FillProvider<
        alloy::providers::fillers::JoinFill<
            alloy::providers::fillers::JoinFill<
                alloy::providers::Identity,
                alloy::providers::fillers::JoinFill<
                    alloy::providers::fillers::GasFiller,
                    alloy::providers::fillers::JoinFill<
                        alloy::providers::fillers::BlobGasFiller,
                        alloy::providers::fillers::JoinFill<
                            alloy::providers::fillers::NonceFiller,
                            alloy::providers::fillers::ChainIdFiller,
                        >,
                    >,
                >,
            >,
            alloy::providers::fillers::WalletFiller<EthereumWallet>,
        >,
        alloy::providers::RootProvider<alloy::network::Ethereum>,
    >,
}

impl ProfileSubmitter {
    /// Create a new submitter with signing capabilities.
    pub fn new(
        network: NetworkConfig,
        rpc_url: &str,
        wallet: EthereumWallet,
        confirmation_timeout: Duration,
        poll_interval: Duration,
    ) -> Result<Self, ChainClientError> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e: url::ParseError| ChainClientError::InvalidRpcUrl(e.to_string()))?;

        let provider = ProviderBuilder::new().wallet(wallet).connect_http(url);

        Ok(Self {
            network,
            confirmation_timeout,
            poll_interval,
            provider,
        })
    }

    /// Internal helper to send a transaction and return the hash.
    async fn send_transaction(
        &self,
        tx: TransactionRequest,
    ) -> Result<SubmittedTx, ChainClientError> {
        let pending = self.provider.send_transaction(tx).await.map_err(|e| {
            ChainClientError::TransactionFailed(format!("Failed to send: {}", e))
        })?;

        let tx_hash = format!("{:?}", pending.tx_hash());
        let explorer_url = self.network.tx_url(&tx_hash);

        Ok(SubmittedTx {
            tx_hash,
            explorer_url,
        })
    }

    /// Get the transaction status by checking for a receipt.
    ///
    /// Returns `Ok(None)` while the transaction is still pending and an
    /// error once the receipt shows a revert.
    pub async fn get_transaction_status(
        &self,
        tx_hash: &str,
    ) -> Result<Option<TxReceipt>, ChainClientError> {
        let hash: TxHash = tx_hash
            .parse()
            .map_err(|e| ChainClientError::InvalidAddress(format!("Invalid tx hash: {}", e)))?;

        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .map_err(|e| ChainClientError::RpcError(format!("Failed to get receipt: {}", e)))?;

        match receipt {
            None => Ok(None),
            Some(r) if !r.status() => Err(ChainClientError::TransactionFailed(format!(
                "transaction {tx_hash} reverted"
            ))),
            Some(r) => Ok(Some(TxReceipt {
                tx_hash: tx_hash.to_string(),
                block_number: r.block_number.unwrap_or(0),
                gas_used: r.gas_used as u64,
            })),
        }
    }
}

#[async_trait]
impl ChainSubmitter for ProfileSubmitter {
    async fn submit(
        &self,
        contract: Address,
        fields: &ProfileFields,
        handle: CiphertextHandle,
        proof: &Bytes,
    ) -> Result<SubmittedTx, ScholarError> {
        let data = encode_create_profile(fields, handle, proof);
        let tx = TransactionRequest::default()
            .to(contract)
            .input(data.into());

        let sent = self
            .send_transaction(tx)
            .await
            .map_err(ChainClientError::into_submission)?;

        tracing::info!(
            tx_hash = %sent.tx_hash,
            network = %self.network.name,
            "Profile creation broadcast"
        );
        Ok(sent)
    }

    async fn await_confirmation(&self, tx_hash: &str) -> Result<TxReceipt, ScholarError> {
        let deadline = Instant::now() + self.confirmation_timeout;
        loop {
            match self.get_transaction_status(tx_hash).await {
                Ok(Some(receipt)) => return Ok(receipt),
                Ok(None) => {}
                Err(e @ ChainClientError::TransactionFailed(_)) => {
                    return Err(e.into_submission())
                }
                Err(e) => {
                    tracing::warn!(
                        tx_hash = %tx_hash,
                        error = %e,
                        "Receipt poll failed, will retry"
                    );
                }
            }

            if Instant::now() + self.poll_interval > deadline {
                return Err(ScholarError::Submission(format!(
                    "transaction {tx_hash} not confirmed within {}s",
                    self.confirmation_timeout.as_secs()
                )));
            }
            sleep(self.poll_interval).await;
        }
    }
}

/// Stand-in used when no signing key is configured.
pub struct DisconnectedSubmitter;

#[async_trait]
impl ChainSubmitter for DisconnectedSubmitter {
    async fn submit(
        &self,
        _contract: Address,
        _fields: &ProfileFields,
        _handle: CiphertextHandle,
        _proof: &Bytes,
    ) -> Result<SubmittedTx, ScholarError> {
        Err(ScholarError::Submission("wallet not connected".to_string()))
    }

    async fn await_confirmation(&self, _tx_hash: &str) -> Result<TxReceipt, ScholarError> {
        Err(ScholarError::Submission("wallet not connected".to_string()))
    }
}

/// ABI-encode `createScholarProfile(name, institution, specialization, handle, proof)`.
pub fn encode_create_profile(
    fields: &ProfileFields,
    handle: CiphertextHandle,
    proof: &Bytes,
) -> Vec<u8> {
    ISecureScholarSeal::createScholarProfileCall {
        name: fields.name.clone(),
        institution: fields.institution.clone(),
        specialization: fields.specialization.clone(),
        academicScore: handle.0,
        inputProof: proof.clone(),
    }
    .abi_encode()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::B256;

    #[test]
    fn encoded_call_carries_handle_and_proof() {
        let fields = ProfileFields {
            name: "Ada".into(),
            institution: "UoL".into(),
            specialization: "essay".into(),
        };
        let handle = CiphertextHandle(B256::repeat_byte(0x42));
        let proof = Bytes::from(vec![1, 2, 3]);

        let data = encode_create_profile(&fields, handle, &proof);
        let decoded = ISecureScholarSeal::createScholarProfileCall::abi_decode(&data).unwrap();
        assert_eq!(decoded.academicScore, handle.0);
        assert_eq!(decoded.inputProof, proof);
        assert_eq!(decoded.specialization, "essay");
    }

    #[tokio::test]
    async fn disconnected_submitter_refuses() {
        let fields = ProfileFields {
            name: "Ada".into(),
            institution: "UoL".into(),
            specialization: "essay".into(),
        };
        let err = DisconnectedSubmitter
            .submit(
                Address::ZERO,
                &fields,
                CiphertextHandle(B256::ZERO),
                &Bytes::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ScholarError::Submission(_)));
    }
}
