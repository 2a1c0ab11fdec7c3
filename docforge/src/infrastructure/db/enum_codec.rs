// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Every domain enum already derives `snake_case` `Serialize`/`Deserialize`
//! for JSON event payloads; these two helpers reuse that derive to map the
//! same value to and from a Postgres `TEXT` column instead of hand-writing a
//! match arm per enum per table.

use docforge_domain::error::DomainError;
use serde::{de::DeserializeOwned, Serialize};

pub fn to_text<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => s,
        other => panic!("enum_codec::to_text called on a non-unit-variant value: {other:?}"),
    }
}

pub fn from_text<T: DeserializeOwned>(text: &str) -> Result<T, DomainError> {
    serde_json::from_value(serde_json::Value::String(text.to_string()))
        .map_err(|e| DomainError::SerializationError(format!("invalid enum text '{text}': {e}")))
}
