// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `Link` — hyperlinks extracted from a document (§3, §4.E
//! `link_extraction`).

use serde::{Deserialize, Serialize};

use crate::value_objects::{DocumentId, VideoId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkCategory {
    Video,
    Support,
    Download,
    Tutorial,
    External,
    Email,
    Phone,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub document_id: DocumentId,
    pub url: String,
    pub category: LinkCategory,
    pub confidence_score: f32,
    pub video_id: Option<VideoId>,
}

impl Link {
    pub fn new(document_id: DocumentId, url: impl Into<String>, category: LinkCategory, confidence_score: f32) -> Self {
        Self {
            document_id,
            url: url.into(),
            category,
            confidence_score,
            video_id: None,
        }
    }
}
