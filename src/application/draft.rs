// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Scholar Seal

//! Transient application drafts and the values derived from them.

use super::fingerprint::fingerprint;
use super::gpa::GpaTier;

/// A file attached to a draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl Attachment {
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// User-entered application, owned by a single form session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationDraft {
    pub full_name: String,
    pub email: String,
    pub university: String,
    pub gpa: GpaTier,
    pub essay: String,
    pub contact_info: Option<String>,
    pub attachments: Vec<Attachment>,
}

impl ApplicationDraft {
    /// Reason the draft cannot be submitted, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        [
            ("full name", &self.full_name),
            ("email", &self.email),
            ("university", &self.university),
            ("essay", &self.essay),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
    }

    pub fn has_attachments(&self) -> bool {
        !self.attachments.is_empty()
    }

    /// Contact text used for the fingerprint; falls back to the email.
    pub fn contact_source(&self) -> &str {
        self.contact_info
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(&self.email)
    }

    /// Ordered plaintext sequence fed to the encryption builder:
    /// GPA ordinal, contact fingerprint, essay fingerprint.
    pub fn encrypted_values(&self) -> [u32; 3] {
        [
            self.gpa.ordinal(),
            fingerprint(self.contact_source()),
            fingerprint(&self.essay),
        ]
    }
}

#[cfg(test)]
pub(crate) fn sample_draft() -> ApplicationDraft {
    ApplicationDraft {
        full_name: "Ada Lovelace".to_string(),
        email: "ada@example.edu".to_string(),
        university: "University of London".to_string(),
        gpa: GpaTier::From38To40,
        essay: "Analytical engines can weave algebraic patterns.".to_string(),
        contact_info: None,
        attachments: Vec::new(),
    }
}
