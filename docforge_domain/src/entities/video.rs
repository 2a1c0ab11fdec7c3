// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `Video` — created on first encounter of a recognized video-platform URL
//! (§3, §4.E `link_extraction`, §8 scenario S6). Shared across documents;
//! lifecycle independent of any single document.

use serde::{Deserialize, Serialize};

use crate::value_objects::{ManufacturerId, SeriesId, VideoId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub id: VideoId,
    pub platform: String,
    pub platform_video_id: String,
    pub title: Option<String>,
    pub duration_s: Option<u32>,
    pub thumbnail_url: Option<String>,
    pub channel_title: Option<String>,
    /// Denormalized for unified search (§3 "Link / Video"); a video may be
    /// linked to more than one manufacturer/series across documents.
    pub manufacturer_ids: Vec<ManufacturerId>,
    pub series_ids: Vec<SeriesId>,
}

impl Video {
    pub fn new(platform: impl Into<String>, platform_video_id: impl Into<String>) -> Self {
        Self {
            id: VideoId::new(),
            platform: platform.into(),
            platform_video_id: platform_video_id.into(),
            title: None,
            duration_s: None,
            thumbnail_url: None,
            channel_title: None,
            manufacturer_ids: Vec::new(),
            series_ids: Vec::new(),
        }
    }

    /// Auto-links a manufacturer/series, deduplicating (§8 scenario S6: a
    /// video shared across documents with differing manufacturers is
    /// linked to both, not re-created).
    pub fn link_to(&mut self, manufacturer_id: ManufacturerId, series_id: Option<SeriesId>) {
        if !self.manufacturer_ids.contains(&manufacturer_id) {
            self.manufacturer_ids.push(manufacturer_id);
        }
        if let Some(series_id) = series_id {
            if !self.series_ids.contains(&series_id) {
                self.series_ids.push(series_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linking_the_same_manufacturer_twice_does_not_duplicate() {
        let mut video = Video::new("youtube", "xyz");
        let manufacturer = ManufacturerId::new();
        video.link_to(manufacturer, None);
        video.link_to(manufacturer, None);
        assert_eq!(video.manufacturer_ids.len(), 1);
    }

    #[test]
    fn linking_two_differing_manufacturers_keeps_both() {
        let mut video = Video::new("youtube", "xyz");
        video.link_to(ManufacturerId::new(), None);
        video.link_to(ManufacturerId::new(), None);
        assert_eq!(video.manufacturer_ids.len(), 2);
    }
}
