// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Scholar Seal

//! # API Data Models
//!
//! Request and response bodies of the REST API. All types derive `ToSchema`
//! for the OpenAPI document.
//!
//! ## Model Categories
//!
//! - **Applications**: the submitted draft and its attachments
//! - **Sessions**: form session handles and submission progress
//! - **Profiles**: on-chain records with opaque handles
//! - **Decryption**: per-field plaintext results for the session viewer

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::{describe_score, ApplicationDraft, Attachment, GpaTier};
use crate::blockchain::{ProfileField, ScholarProfile};
use crate::encryption::ContextStatus;
use crate::workflow::{DecryptState, ProfileListing, ProfileLoadFailure, SubmissionSnapshot};

// =============================================================================
// Application Models
// =============================================================================

/// A file attached to an application, base64 encoded.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AttachmentUpload {
    pub file_name: String,
    #[serde(default = "default_mime_type")]
    pub mime_type: String,
    /// Standard base64 file content.
    pub data_base64: String,
}

fn default_mime_type() -> String {
    "application/octet-stream".to_string()
}

/// Scholarship application as entered by the applicant.
///
/// GPA, contact info and essay are reduced to 32-bit values and encrypted
/// before anything reaches the chain.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ApplicationRequest {
    pub full_name: String,
    pub email: String,
    pub university: String,
    /// One of `3.0-3.1`, `3.2-3.4`, `3.5-3.7`, `3.8-4.0`.
    pub gpa: GpaTier,
    pub essay: String,
    #[serde(default)]
    pub contact_info: Option<String>,
    #[serde(default)]
    pub attachments: Vec<AttachmentUpload>,
}

impl TryFrom<ApplicationRequest> for ApplicationDraft {
    type Error = String;

    fn try_from(request: ApplicationRequest) -> Result<Self, Self::Error> {
        let attachments = request
            .attachments
            .into_iter()
            .map(|upload| {
                let data = STANDARD
                    .decode(upload.data_base64.trim())
                    .map_err(|e| {
                        format!("attachment `{}` is not valid base64: {e}", upload.file_name)
                    })?;
                Ok(Attachment {
                    file_name: upload.file_name,
                    mime_type: upload.mime_type,
                    data,
                })
            })
            .collect::<Result<Vec<_>, String>>()?;

        Ok(ApplicationDraft {
            full_name: request.full_name,
            email: request.email,
            university: request.university,
            gpa: request.gpa,
            essay: request.essay,
            contact_info: request.contact_info,
            attachments,
        })
    }
}

// =============================================================================
// Session Models
// =============================================================================

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub submission: SubmissionSnapshot,
}

// =============================================================================
// Encryption Models
// =============================================================================

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EncryptionStatusResponse {
    pub status: ContextStatus,
    pub network: String,
    pub chain_id: u64,
}

// =============================================================================
// Profile Models
// =============================================================================

/// On-chain profile. Encrypted fields are shown as opaque handles.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct ProfileView {
    pub profile_id: u64,
    pub name: String,
    pub institution: String,
    pub specialization: String,
    pub owner: String,
    pub is_verified: bool,
    pub is_active: bool,
    /// Unix seconds
    pub created_at: u64,
    /// Unix seconds
    pub last_updated: u64,
    pub academic_score: String,
    pub verification_level: String,
    pub reputation_score: String,
}

impl From<&ScholarProfile> for ProfileView {
    fn from(profile: &ScholarProfile) -> Self {
        Self {
            profile_id: profile.profile_id,
            name: profile.name.clone(),
            institution: profile.institution.clone(),
            specialization: profile.specialization.clone(),
            owner: profile.owner.to_string(),
            is_verified: profile.is_verified,
            is_active: profile.is_active,
            created_at: profile.created_at,
            last_updated: profile.last_updated,
            academic_score: profile.academic_score.to_hex(),
            verification_level: profile.verification_level.to_hex(),
            reputation_score: profile.reputation_score.to_hex(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProfileListResponse {
    pub owner: String,
    pub profiles: Vec<ProfileView>,
    pub failures: Vec<ProfileLoadFailure>,
    /// Some profiles failed to load; `profiles` is incomplete.
    pub partial_failure: bool,
}

impl ProfileListResponse {
    pub fn new(owner: String, listing: &ProfileListing) -> Self {
        Self {
            owner,
            profiles: listing.profiles.iter().map(ProfileView::from).collect(),
            failures: listing.failures.clone(),
            partial_failure: listing.partial_failure(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProfileCountResponse {
    pub count: u64,
}

// =============================================================================
// Decryption Models
// =============================================================================

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct DecryptedFieldView {
    pub field: ProfileField,
    pub state: DecryptState,
    /// GPA tier label for a resolved academic score.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl DecryptedFieldView {
    pub fn new(field: ProfileField, state: DecryptState) -> Self {
        let label = match (&state, field) {
            (DecryptState::Resolved { value }, ProfileField::AcademicScore) => {
                Some(describe_score(*value).to_string())
            }
            _ => None,
        };
        Self {
            field,
            state,
            label,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DecryptedFieldsResponse {
    pub profile_id: u64,
    pub fields: Vec<DecryptedFieldView>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn application_request_decodes_attachments() {
        let request: ApplicationRequest = serde_json::from_value(json!({
            "full_name": "Ada Lovelace",
            "email": "ada@example.edu",
            "university": "University of London",
            "gpa": "3.8-4.0",
            "essay": "Engines",
            "attachments": [{ "file_name": "a.txt", "data_base64": "aGVsbG8=" }]
        }))
        .unwrap();

        let draft = ApplicationDraft::try_from(request).unwrap();
        assert_eq!(draft.gpa, GpaTier::From38To40);
        assert_eq!(draft.attachments[0].data, b"hello");
        assert_eq!(draft.attachments[0].mime_type, "application/octet-stream");
    }

    #[test]
    fn unknown_gpa_label_is_rejected() {
        let result = serde_json::from_value::<ApplicationRequest>(json!({
            "full_name": "A", "email": "a@b", "university": "U",
            "gpa": "2.0-2.9", "essay": "E"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn bad_base64_is_reported_with_file_name() {
        let request = ApplicationRequest {
            full_name: "A".into(),
            email: "a@b".into(),
            university: "U".into(),
            gpa: GpaTier::From30To31,
            essay: "E".into(),
            contact_info: None,
            attachments: vec![AttachmentUpload {
                file_name: "cv.pdf".into(),
                mime_type: "application/pdf".into(),
                data_base64: "***".into(),
            }],
        };
        let err = ApplicationDraft::try_from(request).unwrap_err();
        assert!(err.contains("cv.pdf"));
    }

    #[test]
    fn resolved_academic_score_carries_tier_label() {
        let view = DecryptedFieldView::new(
            ProfileField::AcademicScore,
            DecryptState::Resolved { value: 4 },
        );
        assert_eq!(view.label.as_deref(), Some("3.8 - 4.0"));

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["field"], "academic_score");
        assert_eq!(json["state"]["status"], "resolved");
        assert_eq!(json["state"]["value"], 4);
    }
}
