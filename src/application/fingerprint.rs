// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Scholar Seal

//! 32-bit fingerprints for free-text fields.
//!
//! The encryption gateway only accepts fixed-width integers, so contact info
//! and essay text are reduced to a `u32` before encryption: SHA-256 over the
//! exact UTF-8 bytes, then the eight big-endian words of the digest are
//! XOR-folded together. The mapping is one-way; it can be re-derived from
//! the text but never inverted.

use sha2::{Digest, Sha256};

pub fn fingerprint(text: &str) -> u32 {
    let digest = Sha256::digest(text.as_bytes());
    digest
        .chunks_exact(4)
        .map(|word| u32::from_be_bytes([word[0], word[1], word[2], word[3]]))
        .fold(0, |acc, word| acc ^ word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_reproducible() {
        let essay = "I want to study distributed systems.";
        assert_eq!(fingerprint(essay), fingerprint(essay));
    }

    #[test]
    fn fingerprint_is_byte_exact() {
        assert_ne!(fingerprint("alice@uni.edu"), fingerprint("alice@uni.edu "));
        assert_ne!(fingerprint("Alice"), fingerprint("alice"));
    }

    #[test]
    fn empty_input_folds_known_digest() {
        // SHA-256("") = e3b0c442 98fc1c14 9afbf4c8 996fb924 27ae41e4 649b934c a495991b 7852b855
        let expected = 0xe3b0c442u32
            ^ 0x98fc1c14
            ^ 0x9afbf4c8
            ^ 0x996fb924
            ^ 0x27ae41e4
            ^ 0x649b934c
            ^ 0xa495991b
            ^ 0x7852b855;
        assert_eq!(fingerprint(""), expected);
    }
}
