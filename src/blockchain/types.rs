// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Scholar Seal

//! Blockchain types and constants.

use std::str::FromStr;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::encryption::CiphertextHandle;

/// EVM network configuration.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Network name for display
    pub name: &'static str,
    /// Chain ID
    pub chain_id: u64,
    /// Default RPC endpoint URL
    pub rpc_url: &'static str,
    /// Block explorer URL
    pub explorer_url: &'static str,
}

/// Ethereum Sepolia testnet, the network the FHE gateway serves.
pub const SEPOLIA: NetworkConfig = NetworkConfig {
    name: "Ethereum Sepolia",
    chain_id: 11_155_111,
    rpc_url: "https://ethereum-sepolia-rpc.publicnode.com",
    explorer_url: "https://sepolia.etherscan.io",
};

impl NetworkConfig {
    pub fn tx_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.explorer_url.trim_end_matches('/'), tx_hash)
    }
}

/// Plaintext metadata carried by a profile creation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileFields {
    pub name: String,
    pub institution: String,
    /// The essay is stored here as plaintext metadata.
    pub specialization: String,
}

/// The three encrypted fields of a scholar profile.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    AcademicScore,
    VerificationLevel,
    ReputationScore,
}

impl ProfileField {
    pub const ALL: [ProfileField; 3] = [
        ProfileField::AcademicScore,
        ProfileField::VerificationLevel,
        ProfileField::ReputationScore,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProfileField::AcademicScore => "academic_score",
            ProfileField::VerificationLevel => "verification_level",
            ProfileField::ReputationScore => "reputation_score",
        }
    }
}

impl std::fmt::Display for ProfileField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        ProfileField::ALL
            .into_iter()
            .find(|field| field.as_str() == normalized)
            .ok_or_else(|| format!("Unknown profile field `{s}`"))
    }
}

/// On-chain scholar profile as read back from the contract.
///
/// Plaintext fields are always visible; the three handles stay opaque until
/// the viewer decrypts them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScholarProfile {
    pub profile_id: u64,
    pub name: String,
    pub institution: String,
    pub specialization: String,
    pub owner: Address,
    pub is_verified: bool,
    pub is_active: bool,
    /// Unix seconds
    pub created_at: u64,
    /// Unix seconds
    pub last_updated: u64,
    pub academic_score: CiphertextHandle,
    pub verification_level: CiphertextHandle,
    pub reputation_score: CiphertextHandle,
}

impl ScholarProfile {
    pub fn handle(&self, field: ProfileField) -> CiphertextHandle {
        match field {
            ProfileField::AcademicScore => self.academic_score,
            ProfileField::VerificationLevel => self.verification_level,
            ProfileField::ReputationScore => self.reputation_score,
        }
    }
}

/// Broadcast transaction awaiting confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedTx {
    /// Transaction hash
    pub tx_hash: String,
    /// Explorer URL for the transaction
    pub explorer_url: String,
}

/// Transaction receipt after confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: String,
    /// Block number where transaction was included
    pub block_number: u64,
    /// Gas actually used
    pub gas_used: u64,
}
