use crate::repository::qr_repository::MongoQrCodeRepository;
use crate::services::qr_service::QrCodeService;
use mongodb::Database;

pub struct AppState {
    pub db: Database,
    pub qr: QrCodeService<MongoQrCodeRepository>,
}
