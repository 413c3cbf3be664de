use anyhow::Result;
use mongodb::Database;

use crate::models::qr_code::{CreateQrCodeDto, QrCodeRecord, UpdateQrCodeDto};
use crate::repository::qr_repository::{
    MongoQrCodeRepository, QrCodePage, QrCodeRepository,
};

const DEFAULT_PAGE: u64 = 1;
const DEFAULT_LIMIT: u64 = 10;

/// Persists a validated DTO. The seam exists so business rules can be
/// added without touching the API layer; none apply today.
pub struct CreateQrCode<R> {
    repository: R,
}

impl<R: QrCodeRepository> CreateQrCode<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, dto: CreateQrCodeDto) -> Result<QrCodeRecord> {
        self.repository.create(dto).await
    }
}

/// Lists a user's records, applying default pagination when the caller
/// omits it.
pub struct GetUserQrCodes<R> {
    repository: R,
}

impl<R: QrCodeRepository> GetUserQrCodes<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub async fn execute(
        &self,
        user_id: &str,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> Result<QrCodePage> {
        let page = page.unwrap_or(DEFAULT_PAGE);
        let limit = limit.unwrap_or(DEFAULT_LIMIT);
        self.repository.find_by_user_id(user_id, page, limit).await
    }
}

/// Facade consumed by the API layer. Owns repository construction and
/// composes the use cases; the item operations pass straight through to
/// the repository.
pub struct QrCodeService<R> {
    create_qr_code: CreateQrCode<R>,
    get_user_qr_codes: GetUserQrCodes<R>,
    repository: R,
}

impl QrCodeService<MongoQrCodeRepository> {
    pub fn new(db: &Database) -> Self {
        Self::with_repository(MongoQrCodeRepository::new(db))
    }
}

impl<R: QrCodeRepository + Clone> QrCodeService<R> {
    pub fn with_repository(repository: R) -> Self {
        Self {
            create_qr_code: CreateQrCode::new(repository.clone()),
            get_user_qr_codes: GetUserQrCodes::new(repository.clone()),
            repository,
        }
    }

    pub async fn create_qr_code(&self, dto: CreateQrCodeDto) -> Result<QrCodeRecord> {
        self.create_qr_code.execute(dto).await
    }

    pub async fn get_user_qr_codes(
        &self,
        user_id: &str,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> Result<QrCodePage> {
        self.get_user_qr_codes.execute(user_id, page, limit).await
    }

    pub async fn get_qr_code(&self, id: &str) -> Result<Option<QrCodeRecord>> {
        self.repository.find_by_id(id).await
    }

    pub async fn update_qr_code(
        &self,
        id: &str,
        dto: UpdateQrCodeDto,
    ) -> Result<Option<QrCodeRecord>> {
        self.repository.update(id, dto).await
    }

    pub async fn delete_qr_code(&self, id: &str) -> Result<bool> {
        self.repository.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::qr_code::{ErrorLevel, QrStyle};
    use mongodb::bson::oid::ObjectId;
    use std::sync::{Arc, Mutex};

    /// In-memory stand-in for the Mongo repository. Creation timestamps
    /// come from a counter so ordering is deterministic.
    #[derive(Clone, Default)]
    struct InMemoryRepository {
        records: Arc<Mutex<Vec<QrCodeRecord>>>,
        clock: Arc<Mutex<i64>>,
    }

    impl QrCodeRepository for InMemoryRepository {
        async fn create(&self, dto: CreateQrCodeDto) -> Result<QrCodeRecord> {
            let mut record = QrCodeRecord::new(dto);
            let mut clock = self.clock.lock().unwrap();
            *clock += 1;
            record.created_at = *clock;
            record.updated_at = *clock;
            record.id = Some(ObjectId::new());
            self.records.lock().unwrap().push(record.clone());
            Ok(record)
        }

        async fn find_by_id(&self, id: &str) -> Result<Option<QrCodeRecord>> {
            let oid = match ObjectId::parse_str(id) {
                Ok(oid) => oid,
                Err(_) => return Ok(None),
            };
            Ok(self
                .records
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.id == Some(oid))
                .cloned())
        }

        async fn find_by_user_id(
            &self,
            user_id: &str,
            page: u64,
            limit: u64,
        ) -> Result<QrCodePage> {
            let mut matching: Vec<QrCodeRecord> = self
                .records
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.user_id == user_id)
                .cloned()
                .collect();
            matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

            let total = matching.len() as u64;
            let offset = page.saturating_sub(1).saturating_mul(limit);
            let data: Vec<QrCodeRecord> = matching
                .into_iter()
                .skip(usize::try_from(offset).unwrap_or(usize::MAX))
                .take(usize::try_from(limit).unwrap_or(usize::MAX))
                .collect();

            Ok(QrCodePage::new(data, total, page, limit))
        }

        async fn update(&self, id: &str, dto: UpdateQrCodeDto) -> Result<Option<QrCodeRecord>> {
            let oid = match ObjectId::parse_str(id) {
                Ok(oid) => oid,
                Err(_) => return Ok(None),
            };
            let mut records = self.records.lock().unwrap();
            let record = match records.iter_mut().find(|r| r.id == Some(oid)) {
                Some(record) => record,
                None => return Ok(None),
            };
            if let Some(url) = dto.url {
                record.url = url;
            }
            if let Some(size) = dto.size {
                record.size = size;
            }
            Ok(Some(record.clone()))
        }

        async fn delete(&self, id: &str) -> Result<bool> {
            let oid = match ObjectId::parse_str(id) {
                Ok(oid) => oid,
                Err(_) => return Ok(false),
            };
            let mut records = self.records.lock().unwrap();
            let before = records.len();
            records.retain(|r| r.id != Some(oid));
            Ok(records.len() < before)
        }
    }

    fn dto(url: &str, user_id: &str) -> CreateQrCodeDto {
        CreateQrCodeDto {
            url: url.to_string(),
            description: None,
            size: 200,
            fg_color: "#000000".to_string(),
            bg_color: "#FFFFFF".to_string(),
            qr_style: QrStyle::Squares,
            error_level: ErrorLevel::H,
            logo: None,
            user_id: user_id.to_string(),
        }
    }

    fn service() -> QrCodeService<InMemoryRepository> {
        QrCodeService::with_repository(InMemoryRepository::default())
    }

    #[actix_web::test]
    async fn create_persists_record_with_owner() {
        let service = service();
        let record = service
            .create_qr_code(dto("https://example.com/promo", "U1"))
            .await
            .unwrap();

        assert!(record.id.is_some());
        assert_eq!(record.user_id, "U1");
        assert_eq!(record.url, "https://example.com/promo");
    }

    #[actix_web::test]
    async fn list_applies_default_pagination() {
        let service = service();
        for i in 0..15 {
            service
                .create_qr_code(dto(&format!("https://example.com/{}", i), "U1"))
                .await
                .unwrap();
        }

        let page = service.get_user_qr_codes("U1", None, None).await.unwrap();
        assert_eq!(page.current_page, 1);
        assert_eq!(page.data.len(), 10);
        assert_eq!(page.total, 15);
        assert_eq!(page.total_pages, 2);
    }

    #[actix_web::test]
    async fn last_page_holds_the_remainder() {
        let service = service();
        for i in 0..23 {
            service
                .create_qr_code(dto(&format!("https://example.com/{}", i), "U1"))
                .await
                .unwrap();
        }

        let page = service
            .get_user_qr_codes("U1", Some(3), Some(10))
            .await
            .unwrap();
        assert_eq!(page.total, 23);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.current_page, 3);
        assert_eq!(page.data.len(), 3);
        // Newest first: page 3 holds the three oldest records
        assert_eq!(page.data[0].url, "https://example.com/2");
        assert_eq!(page.data[2].url, "https://example.com/0");
    }

    #[actix_web::test]
    async fn list_is_scoped_to_the_requesting_user() {
        let service = service();
        service
            .create_qr_code(dto("https://example.com/a", "U1"))
            .await
            .unwrap();
        service
            .create_qr_code(dto("https://example.com/b", "U2"))
            .await
            .unwrap();

        let page = service.get_user_qr_codes("U1", None, None).await.unwrap();
        assert_eq!(page.total, 1);
        assert!(page.data.iter().all(|r| r.user_id == "U1"));
    }

    #[actix_web::test]
    async fn list_orders_newest_first_and_is_stable() {
        let service = service();
        for i in 0..3 {
            service
                .create_qr_code(dto(&format!("https://example.com/{}", i), "U1"))
                .await
                .unwrap();
        }

        let first = service.get_user_qr_codes("U1", None, None).await.unwrap();
        let second = service.get_user_qr_codes("U1", None, None).await.unwrap();

        let urls: Vec<&str> = first.data.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://example.com/2",
                "https://example.com/1",
                "https://example.com/0"
            ]
        );
        let again: Vec<&str> = second.data.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, again);
    }

    #[actix_web::test]
    async fn absurd_page_numbers_yield_an_empty_page() {
        let service = service();
        for i in 0..3 {
            service
                .create_qr_code(dto(&format!("https://example.com/{}", i), "U1"))
                .await
                .unwrap();
        }

        let page = service
            .get_user_qr_codes("U1", Some(u64::MAX), Some(25))
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.current_page, u64::MAX);
        assert!(page.data.is_empty());
    }

    #[actix_web::test]
    async fn missing_ids_resolve_to_absent() {
        let service = service();
        let missing = ObjectId::new().to_hex();

        assert!(service.get_qr_code(&missing).await.unwrap().is_none());
        assert!(service.get_qr_code("not-an-oid").await.unwrap().is_none());
        assert!(
            service
                .update_qr_code(&missing, UpdateQrCodeDto::default())
                .await
                .unwrap()
                .is_none()
        );
        assert!(!service.delete_qr_code(&missing).await.unwrap());
    }

    #[actix_web::test]
    async fn delete_removes_the_record() {
        let service = service();
        let record = service
            .create_qr_code(dto("https://example.com/promo", "U1"))
            .await
            .unwrap();
        let id = record.id.unwrap().to_hex();

        assert!(service.delete_qr_code(&id).await.unwrap());
        assert!(service.get_qr_code(&id).await.unwrap().is_none());
    }
}
