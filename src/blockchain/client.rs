// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Scholar Seal

//! Read-only EVM client for scholar profile queries.

use alloy::{
    network::Ethereum,
    primitives::Address,
    providers::{
        fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
        Identity, Provider, ProviderBuilder, RootProvider,
    },
};
use async_trait::async_trait;

use super::contract::ScholarContract;
use super::types::*;
use super::ProfileReader;
use crate::error::ScholarError;

/// HTTP provider type (with all fillers).
type HttpProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider<Ethereum>,
>;

/// Chain client used by the query workflow.
pub struct ScholarClient {
    /// Network configuration
    network: NetworkConfig,
    /// Alloy HTTP provider
    provider: HttpProvider,
}

impl ScholarClient {
    /// Create a new client against `rpc_url`.
    pub fn new(network: NetworkConfig, rpc_url: &str) -> Result<Self, ChainClientError> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e: url::ParseError| ChainClientError::InvalidRpcUrl(e.to_string()))?;

        let provider = ProviderBuilder::new().connect_http(url);

        Ok(Self { network, provider })
    }

    /// Get the current block number.
    pub async fn get_block_number(&self) -> Result<u64, ChainClientError> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| ChainClientError::RpcError(e.to_string()))
    }

    /// Get the network configuration.
    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    fn contract(&self, address: Address) -> ScholarContract<HttpProvider> {
        ScholarContract::new(&self.provider, address)
    }
}

#[async_trait]
impl ProfileReader for ScholarClient {
    async fn profile_count(&self, contract: Address) -> Result<u64, ScholarError> {
        self.contract(contract)
            .profile_count()
            .await
            .map_err(ChainClientError::into_query)
    }

    async fn profile_ids_by_owner(
        &self,
        contract: Address,
        owner: Address,
    ) -> Result<Vec<u64>, ScholarError> {
        self.contract(contract)
            .profile_ids(owner)
            .await
            .map_err(ChainClientError::into_query)
    }

    async fn profile(
        &self,
        contract: Address,
        profile_id: u64,
    ) -> Result<ScholarProfile, ScholarError> {
        self.contract(contract)
            .profile(profile_id)
            .await
            .map_err(ChainClientError::into_query)
    }

    async fn chain_head(&self) -> Result<u64, ScholarError> {
        self.get_block_number()
            .await
            .map_err(ChainClientError::into_query)
    }
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, thiserror::Error)]
pub enum ChainClientError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Contract error: {0}")]
    ContractError(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),
}

impl ChainClientError {
    pub fn into_query(self) -> ScholarError {
        ScholarError::Query(self.to_string())
    }

    pub fn into_submission(self) -> ScholarError {
        ScholarError::Submission(self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_rpc_url() {
        let result = ScholarClient::new(SEPOLIA, "not a url");
        assert!(matches!(result, Err(ChainClientError::InvalidRpcUrl(_))));
    }

    #[test]
    fn read_failures_become_query_errors() {
        let err = ChainClientError::RpcError("connection refused".into()).into_query();
        assert_eq!(err, ScholarError::Query("RPC error: connection refused".into()));
    }
}
