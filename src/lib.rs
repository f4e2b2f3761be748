// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Scholar Seal

//! Scholar Seal - Encrypted Scholarship Application Service
//!
//! Applicants submit a scholarship form whose numeric fields are encrypted
//! through an FHE gateway before they reach an EVM contract. Supporting
//! documents are pinned to IPFS and referenced by a manifest.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `application` - Form draft, GPA tiers and input fingerprints
//! - `blockchain` - Scholarship contract reads and profile submission
//! - `encryption` - FHE context, gateway client and init retries
//! - `providers` - IPFS pinning (Pinata)
//! - `session_sweeper` - Ends sessions left idle
//! - `workflow` - Submission state machine and profile queries

pub mod api;
pub mod application;
pub mod blockchain;
pub mod config;
pub mod encryption;
pub mod error;
pub mod models;
pub mod providers;
pub mod session_sweeper;
pub mod state;
pub mod workflow;
