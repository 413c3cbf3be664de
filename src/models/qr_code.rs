use mongodb::bson::oid::ObjectId;
use qrcode::EcLevel;
use serde::{Deserialize, Serialize};

/// Visual rendering hint only; has no effect on the encoded payload.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QrStyle {
    Dots,
    Squares,
}

/// QR error-correction tier, passed through to the renderer.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorLevel {
    L,
    M,
    Q,
    H,
}

impl From<ErrorLevel> for EcLevel {
    fn from(level: ErrorLevel) -> Self {
        match level {
            ErrorLevel::L => EcLevel::L,
            ErrorLevel::M => EcLevel::M,
            ErrorLevel::Q => EcLevel::Q,
            ErrorLevel::H => EcLevel::H,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct QrCodeRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub size: u32,
    pub fg_color: String,
    pub bg_color: String,
    pub qr_style: QrStyle,
    pub error_level: ErrorLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    pub user_id: String,
    pub created_at: i64, // Timestamps in milliseconds
    pub updated_at: i64,
}

/// Validated fields for creating a record. `user_id` always comes from the
/// session, never from the request body.
#[derive(Debug, Clone)]
pub struct CreateQrCodeDto {
    pub url: String,
    pub description: Option<String>,
    pub size: u32,
    pub fg_color: String,
    pub bg_color: String,
    pub qr_style: QrStyle,
    pub error_level: ErrorLevel,
    pub logo: Option<String>,
    pub user_id: String,
}

/// Partial patch for updating a record. Ownership is immutable, so there
/// is no `user_id` here.
#[derive(Debug, Clone, Default)]
pub struct UpdateQrCodeDto {
    pub url: Option<String>,
    pub description: Option<String>,
    pub size: Option<u32>,
    pub fg_color: Option<String>,
    pub bg_color: Option<String>,
    pub qr_style: Option<QrStyle>,
    pub error_level: Option<ErrorLevel>,
    pub logo: Option<String>,
}

impl QrCodeRecord {
    pub fn new(dto: CreateQrCodeDto) -> Self {
        let now = chrono::Utc::now().timestamp_millis();

        Self {
            id: None,
            url: dto.url,
            description: dto.description,
            size: dto.size,
            fg_color: dto.fg_color,
            bg_color: dto.bg_color,
            qr_style: dto.qr_style,
            error_level: dto.error_level,
            logo: dto.logo,
            user_id: dto.user_id,
            created_at: now,
            updated_at: now,
        }
    }
}
