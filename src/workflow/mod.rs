// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Scholar Seal

//! Workflows composed from the encryption, storage and chain adapters.
//!
//! - [`submission`]: the per-session submission state machine
//! - [`uploads`]: attachment fan-out joined before the manifest upload
//! - [`query`]: profile listing and per-field decryption
//! - [`session`]: the viewer session tying a submission slot to its
//!   decrypted values

pub mod query;
pub mod session;
pub mod submission;
pub mod uploads;

#[cfg(test)]
pub(crate) mod testing;

pub use query::{DecryptState, DecryptionBook, ProfileListing, ProfileLoadFailure, ProfileQuery};
pub use session::ViewerSession;
pub use submission::{
    Notification, NotificationLevel, SubmissionServices, SubmissionSnapshot, SubmissionState,
    SubmissionTicket, SubmissionWorkflow, SubmitOutcome,
};
pub use uploads::{upload_attachments, ManifestEntry, PinnedManifest, UploadManifest};
