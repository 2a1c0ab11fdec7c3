// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `Embedding` — `(source_type, source_id, vector, model_name, dimension)`
//! (§3). Vector length must equal the declared dimension; referential
//! integrity to the source row must hold (§8 property 7).

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::EmbeddingId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    TextChunk,
    Image,
    Table,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Embedding {
    pub id: EmbeddingId,
    pub source_type: SourceType,
    pub source_id: uuid::Uuid,
    pub vector: Vec<f32>,
    pub model_name: String,
    pub dimension: u32,
}

impl Embedding {
    pub fn new(source_type: SourceType, source_id: uuid::Uuid, vector: Vec<f32>, model_name: impl Into<String>) -> Result<Self, DomainError> {
        let dimension = vector.len() as u32;
        if dimension == 0 {
            return Err(DomainError::ValidationFailed("embedding vector must not be empty".into()));
        }
        Ok(Self {
            id: EmbeddingId::new(),
            source_type,
            source_id,
            vector,
            model_name: model_name.into(),
            dimension,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_is_derived_from_the_vector_length() {
        let embedding = Embedding::new(SourceType::TextChunk, uuid::Uuid::new_v4(), vec![0.1, 0.2, 0.3], "text-embed-3").unwrap();
        assert_eq!(embedding.dimension, 3);
    }

    #[test]
    fn empty_vector_is_rejected() {
        assert!(Embedding::new(SourceType::Image, uuid::Uuid::new_v4(), vec![], "vision-embed").is_err());
    }
}
