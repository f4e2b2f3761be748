// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Scholar Seal

//! GPA tier encoding.
//!
//! The ordinal assigned to each bucket is embedded in submitted ciphertext
//! and decoded again on display, so the mapping below must never change.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One of the four GPA buckets offered on the application form.
///
/// Deserializes through [`FromStr`], so surrounding whitespace is ignored and
/// unknown labels are rejected with the list of accepted ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String")]
pub enum GpaTier {
    #[serde(rename = "3.0-3.1")]
    From30To31,
    #[serde(rename = "3.2-3.4")]
    From32To34,
    #[serde(rename = "3.5-3.7")]
    From35To37,
    #[serde(rename = "3.8-4.0")]
    From38To40,
}

impl GpaTier {
    pub const ALL: [GpaTier; 4] = [
        GpaTier::From30To31,
        GpaTier::From32To34,
        GpaTier::From35To37,
        GpaTier::From38To40,
    ];

    /// Form label, e.g. `3.8-4.0`.
    pub fn label(self) -> &'static str {
        match self {
            GpaTier::From30To31 => "3.0-3.1",
            GpaTier::From32To34 => "3.2-3.4",
            GpaTier::From35To37 => "3.5-3.7",
            GpaTier::From38To40 => "3.8-4.0",
        }
    }

    /// Human label used when a decrypted score is shown again.
    pub fn display_label(self) -> &'static str {
        match self {
            GpaTier::From30To31 => "3.0 - 3.1",
            GpaTier::From32To34 => "3.2 - 3.4",
            GpaTier::From35To37 => "3.5 - 3.7",
            GpaTier::From38To40 => "3.8 - 4.0",
        }
    }

    /// Encrypted ordinal, 1 (lowest) through 4 (highest).
    pub fn ordinal(self) -> u32 {
        match self {
            GpaTier::From30To31 => 1,
            GpaTier::From32To34 => 2,
            GpaTier::From35To37 => 3,
            GpaTier::From38To40 => 4,
        }
    }

    pub fn from_ordinal(value: u32) -> Option<Self> {
        match value {
            1 => Some(GpaTier::From30To31),
            2 => Some(GpaTier::From32To34),
            3 => Some(GpaTier::From35To37),
            4 => Some(GpaTier::From38To40),
            _ => None,
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|tier| tier.label() == label)
    }
}

impl FromStr for GpaTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| {
            let accepted: Vec<&str> = Self::ALL.iter().map(|tier| tier.label()).collect();
            format!(
                "Unknown GPA tier `{}`, expected one of {}",
                s.trim(),
                accepted.join(", ")
            )
        })
    }
}

impl TryFrom<String> for GpaTier {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl std::fmt::Display for GpaTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Render a decrypted academic score, `Unknown` when out of range.
pub fn describe_score(score: u32) -> &'static str {
    GpaTier::from_ordinal(score)
        .map(GpaTier::display_label)
        .unwrap_or("Unknown")
}
