// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `reqwest`-backed adapters for the four enrichment collaborator ports
//! (§6). Each one is a thin JSON-over-HTTP client against an
//! externally-run service; none of them interpret the response beyond
//! mapping it onto the port's result type, and every network failure maps
//! to `EnrichmentError` so stage processors can apply §4.E's
//! graceful-degradation rule uniformly.

mod text_embedding;
mod video_metadata;
mod vision_model;
mod web_scraper;

pub use text_embedding::HttpTextEmbeddingModel;
pub use video_metadata::HttpVideoMetadataService;
pub use vision_model::HttpVisionModel;
pub use web_scraper::HttpWebScraper;
