// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Postgres implementation of `docforge_domain::repositories::PersistenceGateway`.
//!
//! One adapter talking to the `core`/`content`/`intelligence` schemas plus
//! the advisory-lock primitives. Grounded on the donor's repository-adapter
//! shape (`infrastructure/adapters/repositories/sqlite_repository_adapter.rs`):
//! a thin struct wrapping a pool, one method per port operation, domain
//! errors constructed at the SQL boundary rather than leaking `sqlx::Error`.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use sqlx::{PgPool, Row};

use docforge_domain::entities::{
    ChunkType, ContentChunk, Document, DocumentType, Embedding, ErrorCode, ExtractionType, Image,
    IntelligenceChunk, IntelligenceStatus, Link, LinkCategory, ProcessingStatus, SourceType,
    StructuredExtraction, StructuredTable, ValidationStatus, Video,
};
use docforge_domain::error::DomainError;
use docforge_domain::repositories::{advisory_lock_key, CountSummary, PersistenceGateway, StageCountSummary};
use docforge_domain::value_objects::{
    ContentHash, DocumentId, EmbeddingId, Fingerprint, ImageId, IntelligenceChunkId, ManufacturerId,
    Priority, ProductId, SeriesId, StageName, VideoId,
};

use super::enum_codec::{from_text, to_text};

fn db_err(e: sqlx::Error) -> DomainError {
    match &e {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("40001") => {
            DomainError::DatabaseContention(db.message().to_string())
        }
        _ => DomainError::DatabaseError(e.to_string()),
    }
}

pub struct PostgresGateway {
    pool: PgPool,
    /// Connections currently holding an advisory lock, keyed by lock key.
    /// `pg_advisory_lock`/`pg_advisory_unlock` are session-scoped, so the
    /// connection that acquired a lock is the only one allowed to release
    /// it - pulling one from `self.pool` per call would let acquire and
    /// release land on different physical connections and silently lose
    /// the mutual-exclusion guarantee.
    advisory_locks: Mutex<HashMap<i64, sqlx::pool::PoolConnection<sqlx::Postgres>>>,
}

impl PostgresGateway {
    pub fn new(pool: PgPool) -> Self {
        Self { pool, advisory_locks: Mutex::new(HashMap::new()) }
    }
}

fn row_to_document(row: &sqlx::postgres::PgRow) -> Result<Document, DomainError> {
    let product_ids_json: serde_json::Value = row.try_get("product_ids").map_err(db_err)?;
    let product_ids = product_ids_json
        .as_array()
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str())
                .filter_map(|s| s.parse::<uuid::Uuid>().ok())
                .map(ProductId::from_uuid)
                .collect()
        })
        .unwrap_or_default();

    let document_type: Option<String> = row.try_get("document_type").map_err(db_err)?;
    let priority: Option<i16> = row.try_get("priority").map_err(db_err)?;

    Ok(Document {
        id: DocumentId::from_uuid(row.try_get("id").map_err(db_err)?),
        content_hash: ContentHash::from_raw(row.try_get::<String, _>("content_hash").map_err(db_err)?),
        filename: row.try_get("filename").map_err(db_err)?,
        byte_size: row.try_get::<i64, _>("byte_size").map_err(db_err)? as u64,
        manufacturer_id: row
            .try_get::<Option<uuid::Uuid>, _>("manufacturer_id")
            .map_err(db_err)?
            .map(ManufacturerId::from_uuid),
        product_ids,
        document_type: document_type.map(|s| from_text::<DocumentType>(&s)).transpose()?,
        priority: priority.map(priority_from_i16).transpose()?,
        processing_status: from_text(&row.try_get::<String, _>("processing_status").map_err(db_err)?)?,
        created_at: row.try_get("created_at").map_err(db_err)?,
        updated_at: row.try_get("updated_at").map_err(db_err)?,
    })
}

/// `Priority` carries no derive for round-tripping through its numeric
/// discriminant, so the four values are matched explicitly here rather than
/// in the domain crate, which only ever constructs `Priority` from a
/// document type string.
fn priority_from_i16(n: i16) -> Result<Priority, DomainError> {
    match n {
        1 => Ok(Priority::ServiceBulletin),
        2 => Ok(Priority::Cpmd),
        3 => Ok(Priority::ServiceManual),
        4 => Ok(Priority::PartsCatalog),
        5 => Ok(Priority::Other),
        other => Err(DomainError::SerializationError(format!("invalid priority {other}"))),
    }
}

#[async_trait]
impl PersistenceGateway for PostgresGateway {
    async fn upsert_document_by_hash(
        &self,
        hash: &ContentHash,
        meta: Document,
    ) -> Result<(DocumentId, bool), DomainError> {
        let existing: Option<uuid::Uuid> =
            sqlx::query_scalar("SELECT id FROM core.documents WHERE content_hash = $1")
                .bind(hash.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;

        if let Some(id) = existing {
            return Ok((DocumentId::from_uuid(id), true));
        }

        let product_ids: Vec<String> = meta.product_ids.iter().map(|p| p.as_uuid().to_string()).collect();

        sqlx::query(
            "INSERT INTO core.documents
                (id, content_hash, filename, byte_size, manufacturer_id, product_ids,
                 document_type, priority, processing_status, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             ON CONFLICT (content_hash) DO NOTHING",
        )
        .bind(meta.id.as_uuid())
        .bind(hash.as_str())
        .bind(&meta.filename)
        .bind(meta.byte_size as i64)
        .bind(meta.manufacturer_id.map(|m| m.as_uuid()))
        .bind(serde_json::to_value(&product_ids).unwrap_or_default())
        .bind(meta.document_type.map(|t| to_text(&t)))
        .bind(meta.priority.map(|p| p.as_u8() as i16))
        .bind(to_text(&meta.processing_status))
        .bind(meta.created_at)
        .bind(meta.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok((meta.id, false))
    }

    async fn get_document(&self, id: DocumentId) -> Result<Option<Document>, DomainError> {
        let row = sqlx::query("SELECT * FROM core.documents WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.as_ref().map(row_to_document).transpose()
    }

    async fn save_document(&self, document: &Document) -> Result<(), DomainError> {
        let product_ids: Vec<String> = document.product_ids.iter().map(|p| p.as_uuid().to_string()).collect();

        sqlx::query(
            "UPDATE core.documents SET
                filename = $2, byte_size = $3, manufacturer_id = $4, product_ids = $5,
                document_type = $6, priority = $7, processing_status = $8, updated_at = $9
             WHERE id = $1",
        )
        .bind(document.id.as_uuid())
        .bind(&document.filename)
        .bind(document.byte_size as i64)
        .bind(document.manufacturer_id.map(|m| m.as_uuid()))
        .bind(serde_json::to_value(&product_ids).unwrap_or_default())
        .bind(document.document_type.map(|t| to_text(&t)))
        .bind(document.priority.map(|p| p.as_u8() as i16))
        .bind(to_text(&document.processing_status))
        .bind(document.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn get_image_by_hash(&self, hash: &ContentHash) -> Result<Option<Image>, DomainError> {
        let row = sqlx::query("SELECT * FROM content.images WHERE file_hash = $1")
            .bind(hash.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.map(|r| {
            Ok(Image {
                id: ImageId::from_uuid(r.try_get("id").map_err(db_err)?),
                document_id: DocumentId::from_uuid(r.try_get("document_id").map_err(db_err)?),
                page: r.try_get::<i32, _>("page").map_err(db_err)? as u32,
                file_hash: hash.clone(),
                storage_key: r.try_get("storage_key").map_err(db_err)?,
                ocr_text: r.try_get("ocr_text").map_err(db_err)?,
                ai_description: r.try_get("ai_description").map_err(db_err)?,
                visual_embedding_id: r
                    .try_get::<Option<uuid::Uuid>, _>("visual_embedding_id")
                    .map_err(db_err)?
                    .map(EmbeddingId::from_uuid),
            })
        })
        .transpose()
    }

    async fn save_image(&self, image: &Image) -> Result<ImageId, DomainError> {
        sqlx::query(
            "INSERT INTO content.images
                (id, document_id, page, file_hash, storage_key, ocr_text, ai_description, visual_embedding_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT (file_hash) DO UPDATE SET
                ocr_text = EXCLUDED.ocr_text,
                ai_description = EXCLUDED.ai_description,
                visual_embedding_id = EXCLUDED.visual_embedding_id",
        )
        .bind(image.id.as_uuid())
        .bind(image.document_id.as_uuid())
        .bind(image.page as i32)
        .bind(image.file_hash.as_str())
        .bind(&image.storage_key)
        .bind(&image.ocr_text)
        .bind(&image.ai_description)
        .bind(image.visual_embedding_id.map(|e| e.as_uuid()))
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(image.id)
    }

    async fn get_images_for_document(&self, document_id: DocumentId) -> Result<Vec<Image>, DomainError> {
        let rows = sqlx::query("SELECT * FROM content.images WHERE document_id = $1")
            .bind(document_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        rows.into_iter()
            .map(|r| {
                Ok(Image {
                    id: ImageId::from_uuid(r.try_get("id").map_err(db_err)?),
                    document_id,
                    page: r.try_get::<i32, _>("page").map_err(db_err)? as u32,
                    file_hash: ContentHash::from_raw(r.try_get::<String, _>("file_hash").map_err(db_err)?),
                    storage_key: r.try_get("storage_key").map_err(db_err)?,
                    ocr_text: r.try_get("ocr_text").map_err(db_err)?,
                    ai_description: r.try_get("ai_description").map_err(db_err)?,
                    visual_embedding_id: r
                        .try_get::<Option<uuid::Uuid>, _>("visual_embedding_id")
                        .map_err(db_err)?
                        .map(EmbeddingId::from_uuid),
                })
            })
            .collect()
    }

    async fn insert_content_chunks(&self, chunks: &[ContentChunk]) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        for chunk in chunks {
            sqlx::query(
                "INSERT INTO content.content_chunks
                    (document_id, ordinal, page_start, page_end, chunk_type, text, confidence, language, image_only)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                 ON CONFLICT (document_id, ordinal) DO UPDATE SET
                    text = EXCLUDED.text, confidence = EXCLUDED.confidence",
            )
            .bind(chunk.document_id.as_uuid())
            .bind(chunk.ordinal as i32)
            .bind(chunk.page_start as i32)
            .bind(chunk.page_end as i32)
            .bind(to_text(&chunk.chunk_type))
            .bind(&chunk.text)
            .bind(chunk.confidence)
            .bind(&chunk.language)
            .bind(chunk.image_only)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }
        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn get_content_chunks(&self, document_id: DocumentId) -> Result<Vec<ContentChunk>, DomainError> {
        let rows = sqlx::query("SELECT * FROM content.content_chunks WHERE document_id = $1 ORDER BY ordinal")
            .bind(document_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        rows.into_iter()
            .map(|r| {
                Ok(ContentChunk {
                    document_id,
                    ordinal: r.try_get::<i32, _>("ordinal").map_err(db_err)? as u32,
                    page_start: r.try_get::<i32, _>("page_start").map_err(db_err)? as u32,
                    page_end: r.try_get::<i32, _>("page_end").map_err(db_err)? as u32,
                    chunk_type: from_text::<ChunkType>(&r.try_get::<String, _>("chunk_type").map_err(db_err)?)?,
                    text: r.try_get("text").map_err(db_err)?,
                    confidence: r.try_get("confidence").map_err(db_err)?,
                    language: r.try_get("language").map_err(db_err)?,
                    image_only: r.try_get("image_only").map_err(db_err)?,
                })
            })
            .collect()
    }

    async fn insert_intelligence_chunks(
        &self,
        chunks: Vec<IntelligenceChunk>,
    ) -> Result<Vec<IntelligenceChunk>, DomainError> {
        let mut inserted = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let row = sqlx::query(
                "INSERT INTO intelligence.intelligence_chunks
                    (id, document_id, text, page_start, page_end, fingerprint, processing_status,
                     metadata, source_chunk_ordinal)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                 ON CONFLICT (document_id, fingerprint) DO NOTHING
                 RETURNING id",
            )
            .bind(chunk.id.as_uuid())
            .bind(chunk.document_id.as_uuid())
            .bind(&chunk.text)
            .bind(chunk.page_start as i32)
            .bind(chunk.page_end as i32)
            .bind(chunk.fingerprint.as_str())
            .bind(to_text(&chunk.processing_status))
            .bind(&chunk.metadata)
            .bind(chunk.source_chunk_ordinal as i32)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

            if row.is_some() {
                inserted.push(chunk);
            }
        }
        Ok(inserted)
    }

    async fn mark_intelligence_chunks_embedded(&self, ids: Vec<IntelligenceChunkId>) -> Result<(), DomainError> {
        let uuids: Vec<uuid::Uuid> = ids.iter().map(|id| id.as_uuid()).collect();
        sqlx::query("UPDATE intelligence.intelligence_chunks SET processing_status = $1 WHERE id = ANY($2)")
            .bind(to_text(&IntelligenceStatus::Completed))
            .bind(&uuids)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn get_intelligence_chunks(&self, document_id: DocumentId) -> Result<Vec<IntelligenceChunk>, DomainError> {
        let rows = sqlx::query(
            "SELECT * FROM intelligence.intelligence_chunks WHERE document_id = $1 ORDER BY source_chunk_ordinal",
        )
        .bind(document_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter()
            .map(|r| {
                Ok(IntelligenceChunk {
                    id: IntelligenceChunkId::from_uuid(r.try_get("id").map_err(db_err)?),
                    document_id,
                    text: r.try_get("text").map_err(db_err)?,
                    page_start: r.try_get::<i32, _>("page_start").map_err(db_err)? as u32,
                    page_end: r.try_get::<i32, _>("page_end").map_err(db_err)? as u32,
                    fingerprint: Fingerprint::from_raw(r.try_get::<String, _>("fingerprint").map_err(db_err)?),
                    processing_status: from_text::<IntelligenceStatus>(
                        &r.try_get::<String, _>("processing_status").map_err(db_err)?,
                    )?,
                    metadata: r.try_get("metadata").map_err(db_err)?,
                    source_chunk_ordinal: r.try_get::<i32, _>("source_chunk_ordinal").map_err(db_err)? as u32,
                })
            })
            .collect()
    }

    async fn create_embeddings(&self, batch: Vec<Embedding>) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        for embedding in &batch {
            sqlx::query(
                "INSERT INTO intelligence.embeddings (id, source_type, source_id, vector, model_name, dimension)
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(embedding.id.as_uuid())
            .bind(to_text(&embedding.source_type))
            .bind(embedding.source_id)
            .bind(serde_json::to_value(&embedding.vector).unwrap_or_default())
            .bind(&embedding.model_name)
            .bind(embedding.dimension as i32)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }
        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn exists_embeddings_for_document(&self, document_id: DocumentId) -> Result<bool, DomainError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM intelligence.embeddings e
             JOIN intelligence.intelligence_chunks c ON c.id = e.source_id
             WHERE c.document_id = $1",
        )
        .bind(document_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(count > 0)
    }

    async fn insert_structured_extractions(&self, extractions: Vec<StructuredExtraction>) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        for extraction in &extractions {
            sqlx::query(
                "INSERT INTO intelligence.structured_extractions
                    (source_type, source_id, extraction_type, extracted_data, confidence, validation_status)
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(to_text(&extraction.source_type))
            .bind(extraction.source_id)
            .bind(to_text(&extraction.extraction_type))
            .bind(&extraction.extracted_data)
            .bind(extraction.confidence)
            .bind(to_text(&extraction.validation_status))
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }
        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn insert_structured_tables(&self, tables: Vec<StructuredTable>) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        for table in &tables {
            sqlx::query(
                "INSERT INTO content.structured_tables
                    (document_id, page, index_on_page, data_rows, markdown_rendering, caption, surrounding_context)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)
                 ON CONFLICT (document_id, page, index_on_page) DO UPDATE SET
                    data_rows = EXCLUDED.data_rows, markdown_rendering = EXCLUDED.markdown_rendering",
            )
            .bind(table.document_id.as_uuid())
            .bind(table.page as i32)
            .bind(table.index_on_page as i32)
            .bind(&table.data_rows)
            .bind(&table.markdown_rendering)
            .bind(&table.caption)
            .bind(&table.surrounding_context)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }
        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn upsert_error_codes(&self, codes: Vec<ErrorCode>) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        for code in &codes {
            // The conflict target expressions must match `error_codes_identity_key`'s
            // definition exactly since it's an expression index, not a plain
            // column-list constraint.
            sqlx::query(
                "INSERT INTO intelligence.error_codes
                    (id, code, manufacturer_id, product_id, document_id, video_id,
                     description, solution, confidence, ai_extracted, verified)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                 ON CONFLICT (
                    code,
                    manufacturer_id,
                    COALESCE(product_id, '00000000-0000-0000-0000-000000000000'),
                    COALESCE(document_id, '00000000-0000-0000-0000-000000000000'),
                    COALESCE(video_id, '00000000-0000-0000-0000-000000000000')
                 ) DO UPDATE SET
                    description = EXCLUDED.description,
                    solution = EXCLUDED.solution,
                    confidence = GREATEST(intelligence.error_codes.confidence, EXCLUDED.confidence),
                    verified = intelligence.error_codes.verified OR EXCLUDED.verified",
            )
            .bind(uuid::Uuid::new_v4())
            .bind(&code.code)
            .bind(code.manufacturer_id.as_uuid())
            .bind(code.product_id.map(|p| p.as_uuid()))
            .bind(code.document_id.map(|d| d.as_uuid()))
            .bind(code.video_id.map(|v| v.as_uuid()))
            .bind(&code.description)
            .bind(&code.solution)
            .bind(code.confidence)
            .bind(code.ai_extracted)
            .bind(code.verified)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }
        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn insert_links(&self, links: Vec<Link>) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        for link in &links {
            sqlx::query(
                "INSERT INTO content.links (document_id, url, category, confidence_score, video_id)
                 VALUES ($1, $2, $3, $4, $5)
                 ON CONFLICT (document_id, url) DO NOTHING",
            )
            .bind(link.document_id.as_uuid())
            .bind(&link.url)
            .bind(to_text(&link.category))
            .bind(link.confidence_score)
            .bind(link.video_id.map(|v| v.as_uuid()))
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }
        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn find_or_create_video(&self, platform: &str, platform_video_id: &str) -> Result<Video, DomainError> {
        if let Some(row) = sqlx::query("SELECT * FROM core.videos WHERE platform = $1 AND platform_video_id = $2")
            .bind(platform)
            .bind(platform_video_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
        {
            return row_to_video(&row);
        }

        let video = Video::new(platform.to_string(), platform_video_id.to_string());
        self.save_video(&video).await?;
        Ok(video)
    }

    async fn save_video(&self, video: &Video) -> Result<(), DomainError> {
        let manufacturer_ids: Vec<String> = video.manufacturer_ids.iter().map(|m| m.as_uuid().to_string()).collect();
        let series_ids: Vec<String> = video.series_ids.iter().map(|s| s.as_uuid().to_string()).collect();

        sqlx::query(
            "INSERT INTO core.videos
                (id, platform, platform_video_id, title, duration_s, thumbnail_url, channel_title,
                 manufacturer_ids, series_ids)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             ON CONFLICT (platform, platform_video_id) DO UPDATE SET
                title = EXCLUDED.title,
                duration_s = EXCLUDED.duration_s,
                thumbnail_url = EXCLUDED.thumbnail_url,
                channel_title = EXCLUDED.channel_title,
                manufacturer_ids = EXCLUDED.manufacturer_ids,
                series_ids = EXCLUDED.series_ids",
        )
        .bind(video.id.as_uuid())
        .bind(&video.platform)
        .bind(&video.platform_video_id)
        .bind(&video.title)
        .bind(video.duration_s.map(|d| d as i32))
        .bind(&video.thumbnail_url)
        .bind(&video.channel_title)
        .bind(serde_json::to_value(&manufacturer_ids).unwrap_or_default())
        .bind(serde_json::to_value(&series_ids).unwrap_or_default())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn get_video(&self, id: VideoId) -> Result<Option<Video>, DomainError> {
        let row = sqlx::query("SELECT * FROM core.videos WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.as_ref().map(row_to_video).transpose()
    }

    async fn count_by_document(&self, document_id: DocumentId) -> Result<CountSummary, DomainError> {
        let content_chunks: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM content.content_chunks WHERE document_id = $1")
                .bind(document_id.as_uuid())
                .fetch_one(&self.pool)
                .await
                .map_err(db_err)?;
        let intelligence_chunks: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM intelligence.intelligence_chunks WHERE document_id = $1")
                .bind(document_id.as_uuid())
                .fetch_one(&self.pool)
                .await
                .map_err(db_err)?;
        let images: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM content.images WHERE document_id = $1")
            .bind(document_id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        let embeddings: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM intelligence.embeddings e
             JOIN intelligence.intelligence_chunks c ON c.id = e.source_id
             WHERE c.document_id = $1",
        )
        .bind(document_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(CountSummary {
            content_chunks: content_chunks as u64,
            intelligence_chunks: intelligence_chunks as u64,
            images: images as u64,
            embeddings: embeddings as u64,
        })
    }

    async fn count_by_stage(&self, stage: StageName) -> Result<StageCountSummary, DomainError> {
        let rows = sqlx::query("SELECT state, COUNT(*) AS n FROM system.stage_status WHERE stage = $1 GROUP BY state")
            .bind(stage.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        let mut summary = StageCountSummary::default();
        for row in rows {
            let state: String = row.try_get("state").map_err(db_err)?;
            let n: i64 = row.try_get("n").map_err(db_err)?;
            match state.as_str() {
                "pending" => summary.pending = n as u64,
                "in_progress" => summary.in_progress = n as u64,
                "completed" => summary.completed = n as u64,
                "failed" => summary.failed = n as u64,
                "skipped" => summary.skipped = n as u64,
                _ => {}
            }
        }
        Ok(summary)
    }

    async fn try_acquire_advisory_lock(&self, key: i64) -> Result<bool, DomainError> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        let acquired: bool = sqlx::query_scalar("SELECT pg_try_advisory_lock($1)")
            .bind(key)
            .fetch_one(&mut *conn)
            .await
            .map_err(db_err)?;
        if acquired {
            self.advisory_locks.lock().insert(key, conn);
        }
        Ok(acquired)
    }

    async fn release_advisory_lock(&self, key: i64) -> Result<(), DomainError> {
        let held = self.advisory_locks.lock().remove(&key);
        let Some(mut conn) = held else {
            return Ok(());
        };
        sqlx::query("SELECT pg_advisory_unlock($1)")
            .bind(key)
            .execute(&mut *conn)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}

fn row_to_video(row: &sqlx::postgres::PgRow) -> Result<Video, DomainError> {
    let manufacturer_ids: serde_json::Value = row.try_get("manufacturer_ids").map_err(db_err)?;
    let series_ids: serde_json::Value = row.try_get("series_ids").map_err(db_err)?;

    Ok(Video {
        id: VideoId::from_uuid(row.try_get("id").map_err(db_err)?),
        platform: row.try_get("platform").map_err(db_err)?,
        platform_video_id: row.try_get("platform_video_id").map_err(db_err)?,
        title: row.try_get("title").map_err(db_err)?,
        duration_s: row.try_get::<Option<i32>, _>("duration_s").map_err(db_err)?.map(|d| d as u32),
        thumbnail_url: row.try_get("thumbnail_url").map_err(db_err)?,
        channel_title: row.try_get("channel_title").map_err(db_err)?,
        manufacturer_ids: manufacturer_ids
            .as_array()
            .map(|a| {
                a.iter()
                    .filter_map(|v| v.as_str())
                    .filter_map(|s| s.parse::<uuid::Uuid>().ok())
                    .map(ManufacturerId::from_uuid)
                    .collect()
            })
            .unwrap_or_default(),
        series_ids: series_ids
            .as_array()
            .map(|a| {
                a.iter()
                    .filter_map(|v| v.as_str())
                    .filter_map(|s| s.parse::<uuid::Uuid>().ok())
                    .map(SeriesId::from_uuid)
                    .collect()
            })
            .unwrap_or_default(),
    })
}
