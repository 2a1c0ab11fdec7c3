// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `core.manufacturers` / `core.products` / `core.product_series` (§6).
//! Lightweight reference entities that `classification`, `parts_extraction`
//! and `series_detection` attach documents to.

use serde::{Deserialize, Serialize};

use crate::value_objects::{ManufacturerId, ProductId, SeriesId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manufacturer {
    pub id: ManufacturerId,
    pub name: String,
    /// The manufacturer-specific error-code regex pattern used by
    /// `metadata_extraction` (§4.E), e.g. HP's `\d{2}\.\d{2,3}\.\d{2}`.
    pub error_code_pattern: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub manufacturer_id: ManufacturerId,
    pub name: String,
    pub model_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
    pub id: SeriesId,
    pub manufacturer_id: ManufacturerId,
    pub name: String,
}
