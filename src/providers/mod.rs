// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Scholar Seal

//! Content-addressed storage for application attachments.

pub mod pinata;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

pub use pinata::PinataClient;

use crate::application::Attachment;
use crate::error::ScholarError;

/// Name and key/value tags pinned alongside an upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub keyvalues: BTreeMap<String, String>,
}

impl UploadMetadata {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            keyvalues: BTreeMap::new(),
        }
    }

    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.keyvalues.insert(key.into(), value.into());
        self
    }
}

/// External content store. Every failure is a [`ScholarError::Storage`].
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Upload one file; returns its content identifier.
    async fn upload_file(
        &self,
        file: &Attachment,
        metadata: &UploadMetadata,
    ) -> Result<String, ScholarError>;

    /// Upload a JSON document; returns its content identifier.
    async fn upload_json(
        &self,
        document: &Value,
        metadata: &UploadMetadata,
    ) -> Result<String, ScholarError>;

    /// Gateway URL resolving `cid`.
    fn gateway_url(&self, cid: &str) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_serializes_like_pinata_expects() {
        let metadata = UploadMetadata::named("transcript.pdf")
            .tag("type", "scholarship-document")
            .tag("student", "Ada");
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["name"], "transcript.pdf");
        assert_eq!(json["keyvalues"]["type"], "scholarship-document");

        let empty = serde_json::to_string(&UploadMetadata::default()).unwrap();
        assert_eq!(empty, "{}");
    }
}
