use anyhow::{Context, Result};
use futures_util::TryStreamExt;
use mongodb::bson::{Document, doc, oid::ObjectId, to_bson};
use mongodb::options::ReturnDocument;
use mongodb::{Collection, Database};

use crate::models::qr_code::{CreateQrCodeDto, QrCodeRecord, UpdateQrCodeDto};

const COLLECTION: &str = "qr_codes";

/// One page of records for a user, newest first.
#[derive(Debug)]
pub struct QrCodePage {
    pub data: Vec<QrCodeRecord>,
    pub total: u64,
    pub current_page: u64,
    pub total_pages: u64,
}

impl QrCodePage {
    pub fn new(data: Vec<QrCodeRecord>, total: u64, page: u64, limit: u64) -> Self {
        Self {
            data,
            total,
            current_page: page,
            total_pages: total.div_ceil(limit.max(1)),
        }
    }
}

/// Persistence seam for QR-code records. Handlers and services only see
/// this trait; tests substitute an in-memory implementation.
#[allow(async_fn_in_trait)]
pub trait QrCodeRepository {
    async fn create(&self, dto: CreateQrCodeDto) -> Result<QrCodeRecord>;
    /// Missing or unparseable ids resolve to `None`, not an error.
    async fn find_by_id(&self, id: &str) -> Result<Option<QrCodeRecord>>;
    async fn find_by_user_id(&self, user_id: &str, page: u64, limit: u64) -> Result<QrCodePage>;
    /// Returns the updated record, or `None` when the id does not exist.
    async fn update(&self, id: &str, dto: UpdateQrCodeDto) -> Result<Option<QrCodeRecord>>;
    /// Returns whether a record was actually deleted.
    async fn delete(&self, id: &str) -> Result<bool>;
}

#[derive(Clone)]
pub struct MongoQrCodeRepository {
    collection: Collection<QrCodeRecord>,
}

impl MongoQrCodeRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<QrCodeRecord>(COLLECTION),
        }
    }
}

impl QrCodeRepository for MongoQrCodeRepository {
    async fn create(&self, dto: CreateQrCodeDto) -> Result<QrCodeRecord> {
        let mut record = QrCodeRecord::new(dto);
        let result = self
            .collection
            .insert_one(&record)
            .await
            .context("Failed to insert QR code")?;

        record.id = result.inserted_id.as_object_id();
        Ok(record)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<QrCodeRecord>> {
        let oid = match ObjectId::parse_str(id) {
            Ok(oid) => oid,
            Err(_) => return Ok(None),
        };

        self.collection
            .find_one(doc! { "_id": oid })
            .await
            .context("Failed to look up QR code")
    }

    async fn find_by_user_id(&self, user_id: &str, page: u64, limit: u64) -> Result<QrCodePage> {
        let filter = doc! { "user_id": user_id };
        // Saturate: absurd page numbers yield an empty page, not a panic
        let offset = page.saturating_sub(1).saturating_mul(limit);

        let cursor = self
            .collection
            .find(filter.clone())
            .sort(doc! { "created_at": -1 })
            .skip(offset)
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .await
            .context("Failed to query QR codes")?;

        let data: Vec<QrCodeRecord> = cursor
            .try_collect()
            .await
            .context("Failed to read QR code page")?;

        let total = self
            .collection
            .count_documents(filter)
            .await
            .context("Failed to count QR codes")?;

        Ok(QrCodePage::new(data, total, page, limit))
    }

    async fn update(&self, id: &str, dto: UpdateQrCodeDto) -> Result<Option<QrCodeRecord>> {
        let oid = match ObjectId::parse_str(id) {
            Ok(oid) => oid,
            Err(_) => return Ok(None),
        };

        let set = update_document(&dto)?;

        self.collection
            .find_one_and_update(doc! { "_id": oid }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await
            .context("Failed to update QR code")
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let oid = match ObjectId::parse_str(id) {
            Ok(oid) => oid,
            Err(_) => return Ok(false),
        };

        let result = self
            .collection
            .delete_one(doc! { "_id": oid })
            .await
            .context("Failed to delete QR code")?;

        Ok(result.deleted_count > 0)
    }
}

/// Build the `$set` document from the fields actually present in the
/// patch. `user_id` is deliberately absent; ownership never changes.
fn update_document(dto: &UpdateQrCodeDto) -> Result<Document> {
    let mut set = doc! { "updated_at": chrono::Utc::now().timestamp_millis() };

    if let Some(url) = &dto.url {
        set.insert("url", url);
    }
    if let Some(description) = &dto.description {
        set.insert("description", description);
    }
    if let Some(size) = dto.size {
        set.insert("size", size as i64);
    }
    if let Some(fg_color) = &dto.fg_color {
        set.insert("fg_color", fg_color);
    }
    if let Some(bg_color) = &dto.bg_color {
        set.insert("bg_color", bg_color);
    }
    if let Some(qr_style) = dto.qr_style {
        set.insert("qr_style", to_bson(&qr_style)?);
    }
    if let Some(error_level) = dto.error_level {
        set.insert("error_level", to_bson(&error_level)?);
    }
    if let Some(logo) = &dto.logo {
        set.insert("logo", logo);
    }

    Ok(set)
}
