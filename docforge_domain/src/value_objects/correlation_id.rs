// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Correlation id ties together logs, error records and retry tasks for one
//! logical operation (glossary; §4.C step 6).

use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Form `err-<epoch_ms>-<rand8>`, e.g. `err-1732471200123-a8f31c2e`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(String);

impl CorrelationId {
    pub fn generate(now_epoch_ms: i64) -> Self {
        let suffix: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(8)
            .map(char::from)
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Self(format!("err-{now_epoch_ms}-{suffix}"))
    }

    /// Reconstructs a `CorrelationId` already assigned elsewhere (e.g. read
    /// back from storage or copied from an inbound retry task), without
    /// re-deriving it.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CorrelationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_follow_the_err_epoch_rand_shape() {
        let id = CorrelationId::generate(1_732_471_200_123);
        assert!(id.as_str().starts_with("err-1732471200123-"));
        assert_eq!(id.as_str().len(), "err-1732471200123-".len() + 8);
    }

    #[test]
    fn two_generations_differ() {
        let a = CorrelationId::generate(1);
        let b = CorrelationId::generate(1);
        assert_ne!(a, b);
    }
}
