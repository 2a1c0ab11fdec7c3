// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Shared helpers the stage processors draw on: the manufacturer error-code
//! pattern table (§4.E `metadata_extraction`) and a deterministic
//! manufacturer-id scheme.
//!
//! There is no manufacturer CRUD port in the persistence gateway — §3 scopes
//! `Manufacturer`/`Product`/`Series` as lightweight reference entities, not
//! as something `classification` creates on the fly. Rather than widen the
//! gateway's surface for a handful of well-known manufacturer names, a
//! manufacturer's id is derived deterministically from its name (UUID v5,
//! mirroring the content-addressing idiom the domain already uses for
//! documents and images via `ContentHash`) so the same name always resolves
//! to the same id without a lookup round trip.

use docforge_domain::value_objects::ManufacturerId;
use uuid::Uuid;

const MANUFACTURER_NAMESPACE: Uuid = Uuid::from_bytes([
    0x6d, 0x61, 0x6e, 0x75, 0x66, 0x61, 0x63, 0x74, 0x75, 0x72, 0x65, 0x72, 0x2d, 0x6e, 0x73, 0x00,
]);

pub fn manufacturer_id_for(name: &str) -> ManufacturerId {
    ManufacturerId::from_uuid(Uuid::new_v5(&MANUFACTURER_NAMESPACE, name.to_lowercase().as_bytes()))
}

/// One manufacturer's error-code regex, in the priority order patterns are
/// tried (§4.E: "manufacturer-specific regex patterns first").
pub struct ManufacturerPattern {
    pub name: &'static str,
    pub pattern: &'static str,
}

pub const MANUFACTURER_PATTERNS: &[ManufacturerPattern] = &[
    ManufacturerPattern { name: "hp", pattern: r"\d{2}\.\d{2,3}\.\d{2}" },
    ManufacturerPattern { name: "canon", pattern: r"E\d{3,4}" },
    ManufacturerPattern { name: "xerox", pattern: r"\d{3}-\d{3}" },
    ManufacturerPattern { name: "ricoh", pattern: r"SC\d{3,4}" },
];

/// Minimum pattern-match confidence to accept a code (§4.E: "A confidence
/// ≥ 0.6 is required to accept").
pub const PATTERN_MATCH_MIN_CONFIDENCE: f32 = 0.6;

/// Matches the document text against the same manufacturer name list the
/// pattern table covers, so `classification` and `metadata_extraction`
/// agree on a manufacturer without a reverse id-to-name lookup (the domain
/// does not expose one - see the module comment above).
pub fn detect_manufacturer_name(text: &str) -> &'static str {
    let lower = text.to_lowercase();
    MANUFACTURER_PATTERNS.iter().map(|p| p.name).find(|name| lower.contains(*name)).unwrap_or("unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_name_resolves_to_the_same_id() {
        assert_eq!(manufacturer_id_for("HP"), manufacturer_id_for("hp"));
    }

    #[test]
    fn different_names_resolve_differently() {
        assert_ne!(manufacturer_id_for("hp"), manufacturer_id_for("canon"));
    }
}
