// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Scholar Seal

//! HTTP client for the FHE relayer gateway.

use std::str::FromStr;
use std::time::Duration;

use alloy::primitives::{Bytes, B256};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    CiphertextHandle, EncryptInputRequest, EncryptedInputBundle, EncryptionService, KeyMaterial,
    UserDecryptRequest,
};

#[derive(Debug, thiserror::Error)]
pub enum RelayerError {
    #[error("Relayer request failed: {0}")]
    Request(String),

    #[error("Relayer rejected request: {0}")]
    Rejected(String),

    #[error("Relayer response was invalid: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone)]
pub struct RelayerClient {
    base_url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct KeyUrlResponse {
    response: KeyUrlBody,
}

#[derive(Debug, Deserialize)]
struct KeyUrlBody {
    fhe_key_info: Vec<FheKeyInfo>,
}

#[derive(Debug, Deserialize)]
struct FheKeyInfo {
    fhe_public_key: KeyLocation,
}

#[derive(Debug, Deserialize)]
struct KeyLocation {
    data_id: String,
    urls: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EncryptInputBody<'a> {
    contract_address: String,
    user_address: String,
    contract_chain_id: u64,
    values: &'a [u32],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EncryptInputResponse {
    handles: Vec<String>,
    input_proof: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UserDecryptBody<'a> {
    handle: String,
    contract_address: String,
    user_address: String,
    signature: &'a str,
}

impl RelayerClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, RelayerError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| RelayerError::Request(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.into(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn get_json(&self, path: &str) -> Result<Value, RelayerError> {
        let response = self
            .http
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| RelayerError::Request(format!("GET {path} failed: {e}")))?;

        read_json(response, "GET", path).await
    }

    async fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Result<Value, RelayerError> {
        let response = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| RelayerError::Request(format!("POST {path} failed: {e}")))?;

        read_json(response, "POST", path).await
    }
}

#[async_trait]
impl EncryptionService for RelayerClient {
    async fn fetch_key_material(&self, chain_id: u64) -> Result<KeyMaterial, RelayerError> {
        let value = self.get_json("/v1/keyurl").await?;
        let keys = parse_key_material(value)?;
        tracing::debug!(chain_id, key_id = %keys.key_id, "Fetched FHE key material");
        Ok(keys)
    }

    async fn encrypt_input(
        &self,
        request: &EncryptInputRequest,
    ) -> Result<EncryptedInputBundle, RelayerError> {
        let body = EncryptInputBody {
            contract_address: request.contract.to_string(),
            user_address: request.account.to_string(),
            contract_chain_id: request.chain_id,
            values: &request.values,
        };
        let value = self.post_json("/v1/encrypt-input", &body).await?;
        parse_bundle(value)
    }

    async fn user_decrypt(&self, request: &UserDecryptRequest) -> Result<u32, RelayerError> {
        let body = UserDecryptBody {
            handle: request.handle.to_hex(),
            contract_address: request.contract.to_string(),
            user_address: request.account.to_string(),
            signature: &request.signature,
        };
        let value = self.post_json("/v1/user-decrypt", &body).await?;
        parse_decrypted_value(&value)
    }
}

async fn read_json(
    response: reqwest::Response,
    method: &str,
    path: &str,
) -> Result<Value, RelayerError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(RelayerError::Rejected(format!(
            "{method} {path} returned {status}: {body}"
        )));
    }

    response
        .json()
        .await
        .map_err(|e| RelayerError::InvalidResponse(format!("{method} {path} invalid JSON: {e}")))
}

fn parse_key_material(value: Value) -> Result<KeyMaterial, RelayerError> {
    let parsed: KeyUrlResponse = serde_json::from_value(value)
        .map_err(|e| RelayerError::InvalidResponse(format!("keyurl: {e}")))?;
    let info = parsed
        .response
        .fhe_key_info
        .into_iter()
        .next()
        .ok_or_else(|| RelayerError::InvalidResponse("keyurl: no FHE key listed".to_string()))?;
    if info.fhe_public_key.urls.is_empty() {
        return Err(RelayerError::InvalidResponse(
            "keyurl: public key has no download URL".to_string(),
        ));
    }
    Ok(KeyMaterial {
        key_id: info.fhe_public_key.data_id,
        public_key_urls: info.fhe_public_key.urls,
    })
}

fn parse_bundle(value: Value) -> Result<EncryptedInputBundle, RelayerError> {
    let parsed: EncryptInputResponse = serde_json::from_value(value)
        .map_err(|e| RelayerError::InvalidResponse(format!("encrypt-input: {e}")))?;

    let handles = parsed
        .handles
        .iter()
        .map(|h| {
            B256::from_str(h)
                .map(CiphertextHandle)
                .map_err(|e| RelayerError::InvalidResponse(format!("handle `{h}`: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let proof_hex = parsed.input_proof.trim();
    let proof = alloy::hex::decode(proof_hex.strip_prefix("0x").unwrap_or(proof_hex))
        .map_err(|e| RelayerError::InvalidResponse(format!("input proof: {e}")))?;

    Ok(EncryptedInputBundle {
        handles,
        proof: Bytes::from(proof),
    })
}

fn parse_decrypted_value(value: &Value) -> Result<u32, RelayerError> {
    let raw = value
        .get("value")
        .ok_or_else(|| RelayerError::InvalidResponse("user-decrypt: missing value".to_string()))?;

    let number = match raw {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
    .ok_or_else(|| RelayerError::InvalidResponse(format!("user-decrypt: bad value {raw}")))?;

    u32::try_from(number).map_err(|_| {
        RelayerError::InvalidResponse(format!("user-decrypt: {number} exceeds 32 bits"))
    })
}
