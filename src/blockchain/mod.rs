// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Scholar Seal

//! EVM integration for the scholar profile contract.
//!
//! This module provides functionality for:
//! - Reading profile identifiers and records
//! - Building, signing and broadcasting profile creation transactions
//! - Tracking confirmation of broadcast transactions
//!
//! Workflows consume the traits below so that tests and alternative
//! networks can supply their own implementations.

pub mod client;
pub mod contract;
pub mod signing;
pub mod transactions;
pub mod types;

use alloy::primitives::{Address, Bytes};
use async_trait::async_trait;

pub use client::{ChainClientError, ScholarClient};
pub use signing::LocalWallet;
pub use transactions::{DisconnectedSubmitter, ProfileSubmitter};
pub use types::*;

use crate::encryption::CiphertextHandle;
use crate::error::ScholarError;

/// The connected account and its signing capability.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    fn account(&self) -> Option<Address>;

    fn is_connected(&self) -> bool {
        self.account().is_some()
    }

    /// Hex-encoded personal signature over `message`.
    async fn sign_message(&self, message: &[u8]) -> Result<String, ChainClientError>;
}

/// State-changing profile creation.
#[async_trait]
pub trait ChainSubmitter: Send + Sync {
    /// Broadcast the creation call; returns without waiting for inclusion.
    async fn submit(
        &self,
        contract: Address,
        fields: &ProfileFields,
        handle: CiphertextHandle,
        proof: &Bytes,
    ) -> Result<SubmittedTx, ScholarError>;

    /// Resolve once mined, or fail on revert or timeout.
    async fn await_confirmation(&self, tx_hash: &str) -> Result<TxReceipt, ScholarError>;
}

/// Read entry points of the profile contract.
#[async_trait]
pub trait ProfileReader: Send + Sync {
    async fn profile_count(&self, contract: Address) -> Result<u64, ScholarError>;

    async fn profile_ids_by_owner(
        &self,
        contract: Address,
        owner: Address,
    ) -> Result<Vec<u64>, ScholarError>;

    async fn profile(&self, contract: Address, profile_id: u64)
        -> Result<ScholarProfile, ScholarError>;

    /// Latest block number, used as a reachability probe.
    async fn chain_head(&self) -> Result<u64, ScholarError>;
}
