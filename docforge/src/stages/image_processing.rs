// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `image_processing` (§4.E): walks each page's `/XObject` resources for
//! raster images, hashes each one, and dedups across documents via
//! `getImageByHash`/`saveImage`. OCR is best-effort; a failed OCR pass
//! never fails the stage.

use std::sync::Arc;

use async_trait::async_trait;
use lopdf::{Document as PdfDocument, Object, ObjectId};
use serde_json::{json, Map};

use docforge_domain::entities::{Image, ProcessingContext};
use docforge_domain::error::ErrorKind;
use docforge_domain::repositories::{PersistenceGateway, VisionModel};
use docforge_domain::services::{ProcessingResult, StageProcessor};
use docforge_domain::value_objects::{ContentHash, StageName};

pub struct ImageProcessingProcessor {
    gateway: Arc<dyn PersistenceGateway>,
    vision: Arc<dyn VisionModel>,
    blobs: Arc<dyn docforge_domain::repositories::BlobStore>,
}

impl ImageProcessingProcessor {
    pub fn new(
        gateway: Arc<dyn PersistenceGateway>,
        vision: Arc<dyn VisionModel>,
        blobs: Arc<dyn docforge_domain::repositories::BlobStore>,
    ) -> Self {
        Self { gateway, vision, blobs }
    }
}

#[async_trait]
impl StageProcessor for ImageProcessingProcessor {
    fn stage_name(&self) -> StageName {
        StageName::ImageProcessing
    }

    async fn process(&self, ctx: ProcessingContext) -> ProcessingResult {
        let bytes = match self.blobs.get(&ctx.file_reference).await {
            Ok(bytes) => bytes,
            Err(e) => return ProcessingResult::failure(ErrorKind::Transient, format!("reading PDF bytes: {e}")),
        };

        let pdf = match PdfDocument::load_mem(&bytes) {
            Ok(pdf) => pdf,
            Err(e) => return ProcessingResult::failure(ErrorKind::Permanent, format!("parsing PDF structure: {e}")),
        };

        let mut inserted = 0u32;
        let mut reused = 0u32;
        let mut ocr_failures = 0u32;

        for (page_number, page_id) in pdf.get_pages() {
            for image_bytes in page_image_streams(&pdf, page_id) {
                let hash = ContentHash::of(&image_bytes);

                match self.gateway.get_image_by_hash(&hash).await {
                    Ok(Some(_)) => {
                        reused += 1;
                        continue;
                    }
                    Ok(None) => {}
                    Err(e) => return ProcessingResult::failure(ErrorKind::Transient, format!("checking image dedup: {e}")),
                }

                let storage_key = hash.image_key("bin");
                if let Err(e) = self.blobs.put(&storage_key, image_bytes.clone(), "application/octet-stream").await {
                    return ProcessingResult::failure(ErrorKind::Transient, format!("storing image: {e}"));
                }

                let mut image = Image::new(ctx.document_id, page_number, hash, storage_key);

                match self.vision.describe(&image_bytes, "Describe this image from a service manual.").await {
                    Ok(described) => image.ai_description = Some(described.text),
                    Err(_) => ocr_failures += 1,
                }

                if let Err(e) = self.gateway.save_image(&image).await {
                    return ProcessingResult::failure(ErrorKind::Transient, format!("saving image: {e}"));
                }
                inserted += 1;
            }
        }

        let mut data = Map::new();
        data.insert("images_inserted".to_string(), json!(inserted));
        data.insert("images_reused".to_string(), json!(reused));
        let mut metadata = Map::new();
        metadata.insert("ocr_failures".to_string(), json!(ocr_failures));
        ProcessingResult::success(data, metadata)
    }
}

/// Returns the raw bytes of every `/Subtype /Image` XObject referenced by
/// `page_id`'s `/Resources /XObject` dictionary.
fn page_image_streams(pdf: &PdfDocument, page_id: ObjectId) -> Vec<Vec<u8>> {
    let mut images = Vec::new();

    let Ok(page_object) = pdf.get_object(page_id) else { return images };
    let Ok(page_dict) = page_object.as_dict() else { return images };
    let Some(resources_ref) = page_dict.get(b"Resources").ok() else { return images };
    let Ok((_, resources_object)) = pdf.dereference(resources_ref) else { return images };
    let Ok(resources) = resources_object.as_dict() else { return images };

    let Some(xobjects_ref) = resources.get(b"XObject").ok() else { return images };
    let Ok((_, xobjects_object)) = pdf.dereference(xobjects_ref) else { return images };
    let Ok(xobjects) = xobjects_object.as_dict() else { return images };

    for (_name, entry) in xobjects.iter() {
        let Ok((_, resolved)) = pdf.dereference(entry) else { continue };
        let Object::Stream(stream) = resolved else { continue };
        let is_image = stream.dict.get(b"Subtype").ok().and_then(|s| s.as_name_str().ok()) == Some("Image");
        if is_image {
            images.push(stream.content.clone());
        }
    }

    images
}
