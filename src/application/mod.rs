// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Scholar Seal

//! Application drafts and their deterministic integer encodings.

pub mod draft;
pub mod fingerprint;
pub mod gpa;

pub use draft::{ApplicationDraft, Attachment};
pub use fingerprint::fingerprint;
pub use gpa::{describe_score, GpaTier};
