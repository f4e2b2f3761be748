// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Scholar Seal

//! Scholar profile contract interactions.

use alloy::{
    primitives::{Address, U256},
    providers::Provider,
    sol,
};

use super::client::ChainClientError;
use super::types::ScholarProfile;
use crate::encryption::CiphertextHandle;

// Encrypted inputs are passed as `bytes32` handles plus the gateway proof.
sol! {
    #[sol(rpc)]
    interface ISecureScholarSeal {
        function createScholarProfile(
            string name,
            string institution,
            string specialization,
            bytes32 academicScore,
            bytes inputProof
        ) external returns (uint256);
        function getScholarProfileCount() external view returns (uint256);
        function getScholarProfiles(address scholar) external view returns (uint256[]);
        function getScholarProfile(uint256 profileId) external view returns (
            bytes32 academicScore,
            bytes32 verificationLevel,
            bytes32 reputationScore,
            string name,
            string institution,
            string specialization,
            address scholar,
            bool isVerified,
            bool isActive,
            uint256 createdAt,
            uint256 lastUpdated
        );
    }
}

/// Read-only wrapper around the scholar profile contract.
pub struct ScholarContract<P> {
    contract: ISecureScholarSeal::ISecureScholarSealInstance<P>,
}

impl<P: Provider + Clone> ScholarContract<P> {
    pub fn new(provider: &P, address: Address) -> Self {
        Self {
            contract: ISecureScholarSeal::new(address, provider.clone()),
        }
    }

    /// Total number of profiles ever created.
    pub async fn profile_count(&self) -> Result<u64, ChainClientError> {
        let count: U256 = self
            .contract
            .getScholarProfileCount()
            .call()
            .await
            .map_err(|e| ChainClientError::ContractError(e.to_string()))?;
        to_u64(count, "profile count")
    }

    /// Profile identifiers owned by `owner`.
    pub async fn profile_ids(&self, owner: Address) -> Result<Vec<u64>, ChainClientError> {
        let ids: Vec<U256> = self
            .contract
            .getScholarProfiles(owner)
            .call()
            .await
            .map_err(|e| ChainClientError::ContractError(e.to_string()))?;
        ids.into_iter().map(|id| to_u64(id, "profile id")).collect()
    }

    /// Full profile record.
    pub async fn profile(&self, profile_id: u64) -> Result<ScholarProfile, ChainClientError> {
        let record = self
            .contract
            .getScholarProfile(U256::from(profile_id))
            .call()
            .await
            .map_err(|e| ChainClientError::ContractError(e.to_string()))?;

        Ok(ScholarProfile {
            profile_id,
            name: record.name,
            institution: record.institution,
            specialization: record.specialization,
            owner: record.scholar,
            is_verified: record.isVerified,
            is_active: record.isActive,
            created_at: saturating_u64(record.createdAt),
            last_updated: saturating_u64(record.lastUpdated),
            academic_score: CiphertextHandle(record.academicScore),
            verification_level: CiphertextHandle(record.verificationLevel),
            reputation_score: CiphertextHandle(record.reputationScore),
        })
    }
}

fn to_u64(value: U256, what: &str) -> Result<u64, ChainClientError> {
    u64::try_from(value)
        .map_err(|_| ChainClientError::ContractError(format!("{what} {value} exceeds u64")))
}

fn saturating_u64(value: U256) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}
