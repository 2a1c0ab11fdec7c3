// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Raw `ContentChunk` produced by `text_extraction` (§3, §4.E). Never
//! mutated after creation; durable indefinitely (§9 open question).

use serde::{Deserialize, Serialize};

use crate::value_objects::DocumentId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkType {
    Paragraph,
    Heading,
    Caption,
    ListItem,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentChunk {
    pub document_id: DocumentId,
    pub ordinal: u32,
    pub page_start: u32,
    pub page_end: u32,
    pub chunk_type: ChunkType,
    pub text: String,
    pub confidence: f32,
    pub language: String,
    /// Pages with no extractable text still produce a chunk row with this
    /// set and empty `text` - per §4.E `text_extraction` the text stage
    /// must never fail on an image-only page.
    pub image_only: bool,
}

impl ContentChunk {
    pub fn new(document_id: DocumentId, ordinal: u32, page_start: u32, page_end: u32, text: String, confidence: f32) -> Self {
        let image_only = text.trim().is_empty();
        let language = if image_only {
            "unk".to_string()
        } else {
            detect_language(&text)
        };
        Self {
            document_id,
            ordinal,
            page_start,
            page_end,
            chunk_type: ChunkType::Paragraph,
            text,
            confidence,
            language,
            image_only,
        }
    }
}

/// Stand-in language detector for the domain layer: real detection is an
/// external concern (§1 scope), but the contract requires a value on every
/// chunk, with `"unk"` for anything that can't be confidently classified.
fn detect_language(text: &str) -> String {
    if text.chars().all(|c| c.is_ascii()) && !text.trim().is_empty() {
        "en".to_string()
    } else {
        "unk".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_only_pages_get_an_empty_non_failing_chunk() {
        let chunk = ContentChunk::new(DocumentId::new(), 0, 4, 4, String::new(), 0.0);
        assert!(chunk.image_only);
        assert_eq!(chunk.language, "unk");
        assert!(chunk.text.is_empty());
    }

    #[test]
    fn ordinal_is_a_plain_index_the_caller_controls() {
        let a = ContentChunk::new(DocumentId::new(), 0, 1, 1, "hello".into(), 0.9);
        let b = ContentChunk::new(DocumentId::new(), 1, 1, 1, "world".into(), 0.9);
        assert_eq!(a.ordinal, 0);
        assert_eq!(b.ordinal, 1);
    }
}
