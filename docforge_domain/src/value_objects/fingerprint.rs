// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Chunk fingerprint used by `chunk_prep` for within-document deduplication
//! (§3 `IntelligenceChunk`, §4.E `chunk_prep`, §8 property 6).

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// SHA-256 of whitespace-normalized, lowercased chunk text. Unique only
/// within one document's chunk set - not a global dedup key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of(text: &str) -> Self {
        let normalized = normalize_text(text);
        let mut hasher = Sha256::new();
        hasher.update(normalized.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Reconstructs a fingerprint already computed elsewhere (e.g. read back
    /// from storage), without re-hashing.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lowercase, collapse runs of whitespace to a single space, trim. Per the
/// glossary definition this is the entirety of the normalization rule - no
/// stemming, no punctuation stripping.
pub fn normalize_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut normalized = String::with_capacity(lowered.len());
    let mut last_was_space = false;
    for ch in lowered.chars() {
        if ch.is_whitespace() {
            if !last_was_space {
                normalized.push(' ');
            }
            last_was_space = true;
        } else {
            normalized.push(ch);
            last_was_space = false;
        }
    }
    normalized.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_and_whitespace_variants_fingerprint_identically() {
        let a = Fingerprint::of("Error code 13.20.01");
        let b = Fingerprint::of("ERROR CODE 13.20.01");
        let c = Fingerprint::of("Error   code   13.20.01");
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn distinct_text_fingerprints_differently() {
        assert_ne!(Fingerprint::of("error 1"), Fingerprint::of("error 2"));
    }

    #[test]
    fn normalize_collapses_and_trims() {
        assert_eq!(normalize_text("  Foo\t\tBar\n"), "foo bar");
    }
}
