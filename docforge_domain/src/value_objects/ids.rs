// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Typed entity identifiers.
//!
//! Every entity gets its own newtype over `Uuid` so `DocumentId` and
//! `ImageId` can never be swapped at a call site by mistake. Each is
//! `v4`-generated at construction and round-trips through `Display`/`FromStr`
//! for storage as a Postgres `uuid` column.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::DomainError;

macro_rules! typed_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|e| DomainError::ValidationFailed(format!("invalid {}: {e}", stringify!($name))))
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

typed_id!(DocumentId);
typed_id!(ImageId);
typed_id!(ManufacturerId);
typed_id!(ProductId);
typed_id!(SeriesId);
typed_id!(VideoId);
typed_id!(IntelligenceChunkId);
typed_id!(EmbeddingId);
typed_id!(QueueTaskId);
typed_id!(ErrorRecordId);
typed_id!(BatchTaskId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_roundtrip_through_strings() {
        let a = DocumentId::new();
        let b = DocumentId::new();
        assert_ne!(a, b);

        let parsed: DocumentId = a.to_string().parse().unwrap();
        assert_eq!(a, parsed);
    }

    #[test]
    fn rejects_malformed_strings() {
        assert!("not-a-uuid".parse::<ImageId>().is_err());
    }
}
