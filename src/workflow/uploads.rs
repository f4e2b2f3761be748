// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Scholar Seal

//! Attachment fan-out and manifest pinning.
//!
//! Every attachment is uploaded as its own task. The manifest is built and
//! uploaded only after all of them have joined successfully. The first
//! failure aborts the remaining uploads; files that already landed are left
//! in the store.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use utoipa::ToSchema;

use crate::application::{ApplicationDraft, Attachment};
use crate::error::ScholarError;
use crate::providers::{ContentStore, UploadMetadata};

/// One pinned attachment as listed in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ManifestEntry {
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Content identifier of the file.
    pub hash: String,
}

/// Document listing every attachment of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadManifest {
    pub files: Vec<ManifestEntry>,
    /// RFC 3339 timestamp.
    pub uploaded_at: String,
    pub student: String,
    pub university: String,
}

/// The manifest after it has been pinned itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinnedManifest {
    pub manifest: UploadManifest,
    pub cid: String,
    pub gateway_url: String,
}

fn file_metadata(file: &Attachment, draft: &ApplicationDraft) -> UploadMetadata {
    UploadMetadata::named(file.file_name.clone())
        .tag("type", "scholarship-document")
        .tag("student", draft.full_name.clone())
        .tag("university", draft.university.clone())
}

fn manifest_metadata(draft: &ApplicationDraft) -> UploadMetadata {
    UploadMetadata::named(format!("scholarship-application-{}", draft.full_name))
        .tag("type", "scholarship-manifest")
        .tag("student", draft.full_name.clone())
}

/// Upload every attachment of `draft`, then the manifest listing them.
pub async fn upload_attachments(
    store: Arc<dyn ContentStore>,
    draft: &ApplicationDraft,
) -> Result<PinnedManifest, ScholarError> {
    let hashes = upload_files(Arc::clone(&store), draft).await?;

    let files = draft
        .attachments
        .iter()
        .zip(hashes)
        .map(|(file, hash)| ManifestEntry {
            name: file.file_name.clone(),
            size: file.size(),
            mime_type: file.mime_type.clone(),
            hash,
        })
        .collect();

    let manifest = UploadManifest {
        files,
        uploaded_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        student: draft.full_name.clone(),
        university: draft.university.clone(),
    };

    let document = serde_json::to_value(&manifest)
        .map_err(|e| ScholarError::Storage(format!("failed to encode manifest: {e}")))?;
    let cid = store
        .upload_json(&document, &manifest_metadata(draft))
        .await?;
    let gateway_url = store.gateway_url(&cid);

    tracing::info!(cid = %cid, files = manifest.files.len(), "Manifest pinned");

    Ok(PinnedManifest {
        manifest,
        cid,
        gateway_url,
    })
}

/// Content identifiers in the draft's attachment order.
async fn upload_files(
    store: Arc<dyn ContentStore>,
    draft: &ApplicationDraft,
) -> Result<Vec<String>, ScholarError> {
    let mut set = JoinSet::new();
    for (index, file) in draft.attachments.iter().enumerate() {
        let store = Arc::clone(&store);
        let file = file.clone();
        let metadata = file_metadata(&file, draft);
        set.spawn(async move {
            let result = store.upload_file(&file, &metadata).await;
            (index, file.file_name, result)
        });
    }

    let mut hashes: Vec<Option<String>> = vec![None; draft.attachments.len()];
    while let Some(joined) = set.join_next().await {
        let (index, file_name, result) = match joined {
            Ok(done) => done,
            Err(e) => {
                set.abort_all();
                return Err(ScholarError::Storage(format!("upload task failed: {e}")));
            }
        };

        match result {
            Ok(cid) => {
                tracing::debug!(file_name = %file_name, cid = %cid, "Attachment pinned");
                hashes[index] = Some(cid);
            }
            Err(err) => {
                tracing::warn!(file_name = %file_name, error = %err, "Attachment upload failed");
                set.abort_all();
                return Err(err);
            }
        }
    }

    hashes
        .into_iter()
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| ScholarError::Storage("attachment upload did not complete".to_string()))
}
