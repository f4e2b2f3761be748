// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Scholar Seal

//! Pinata IPFS pinning integration.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{ContentStore, UploadMetadata};
use crate::application::Attachment;
use crate::config::{PinataCredentials, DEFAULT_PINATA_API_URL, DEFAULT_PINATA_GATEWAY_URL};
use crate::error::ScholarError;

const PIN_FILE_PATH: &str = "/pinning/pinFileToIPFS";
const PIN_JSON_PATH: &str = "/pinning/pinJSONToIPFS";

#[derive(Debug, Clone)]
pub struct PinataClient {
    api_base_url: String,
    gateway_url: String,
    credentials: PinataCredentials,
    http: Client,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PinResponse {
    ipfs_hash: String,
    #[allow(dead_code)]
    pin_size: Option<u64>,
    #[allow(dead_code)]
    timestamp: Option<String>,
}

impl PinataClient {
    pub fn new(
        credentials: PinataCredentials,
        api_base_url: impl Into<String>,
        gateway_url: impl Into<String>,
    ) -> Result<Self, ScholarError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| ScholarError::Storage(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_base_url: api_base_url.into(),
            gateway_url: gateway_url.into(),
            credentials,
            http,
        })
    }

    /// Client against the public Pinata endpoints.
    pub fn with_defaults(credentials: PinataCredentials) -> Result<Self, ScholarError> {
        Self::new(credentials, DEFAULT_PINATA_API_URL, DEFAULT_PINATA_GATEWAY_URL)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url.trim_end_matches('/'), path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("pinata_api_key", &self.credentials.api_key)
            .header("pinata_secret_api_key", &self.credentials.secret_key)
    }
}

#[async_trait]
impl ContentStore for PinataClient {
    async fn upload_file(
        &self,
        file: &Attachment,
        metadata: &UploadMetadata,
    ) -> Result<String, ScholarError> {
        let part = multipart::Part::bytes(file.data.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.mime_type)
            .map_err(|e| {
                ScholarError::Storage(format!("invalid mime type `{}`: {e}", file.mime_type))
            })?;

        let metadata_json = serde_json::to_string(metadata)
            .map_err(|e| ScholarError::Storage(format!("serialize metadata failed: {e}")))?;

        let form = multipart::Form::new()
            .part("file", part)
            .text("pinataMetadata", metadata_json);

        let response = self
            .authorize(self.http.post(self.url(PIN_FILE_PATH)))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ScholarError::Storage(format!("Pinata upload failed: {e}")))?;

        let cid = read_pin_response(response).await?;
        tracing::info!(
            file_name = %file.file_name,
            size = file.size(),
            cid = %cid,
            "Pinned file"
        );
        Ok(cid)
    }

    async fn upload_json(
        &self,
        document: &Value,
        metadata: &UploadMetadata,
    ) -> Result<String, ScholarError> {
        let payload = json!({
            "pinataContent": document,
            "pinataMetadata": metadata,
        });

        let response = self
            .authorize(self.http.post(self.url(PIN_JSON_PATH)))
            .json(&payload)
            .send()
            .await
            .map_err(|e| ScholarError::Storage(format!("Pinata upload failed: {e}")))?;

        let cid = read_pin_response(response).await?;
        tracing::info!(cid = %cid, name = ?metadata.name, "Pinned JSON document");
        Ok(cid)
    }

    fn gateway_url(&self, cid: &str) -> String {
        format!("{}/ipfs/{}", self.gateway_url.trim_end_matches('/'), cid)
    }
}

async fn read_pin_response(response: Response) -> Result<String, ScholarError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ScholarError::Storage(upload_failure(status)));
    }

    let parsed: PinResponse = response
        .json()
        .await
        .map_err(|e| ScholarError::Storage(format!("Pinata response was invalid: {e}")))?;

    if parsed.ipfs_hash.trim().is_empty() {
        return Err(ScholarError::Storage(
            "Pinata response did not include IpfsHash".to_string(),
        ));
    }
    Ok(parsed.ipfs_hash)
}

fn upload_failure(status: StatusCode) -> String {
    let text = status.canonical_reason().unwrap_or(status.as_str());
    format!("Pinata upload failed: {text}")
}
