use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use validator::Validate;

use crate::models::qr_code::{
    CreateQrCodeDto, ErrorLevel, QrCodeRecord, QrStyle, UpdateQrCodeDto,
};

static HEX_COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").unwrap());

const DEFAULT_PAGE: u64 = 1;
const DEFAULT_LIMIT: u64 = 10;
const MAX_LIMIT: u64 = 100;

/// Create payload. Unknown fields (including any client-supplied userId)
/// are dropped by serde; ownership comes from the session claims only.
#[derive(Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQrRequest {
    #[validate(url(message = "Invalid URL format"))]
    pub url: String,
    pub description: Option<String>,
    #[validate(range(min = 100, max = 400, message = "Size must be between 100 and 400"))]
    pub size: u32,
    #[validate(regex(path = *HEX_COLOR_RE, message = "Color must match #RRGGBB"))]
    pub fg_color: String,
    #[validate(regex(path = *HEX_COLOR_RE, message = "Color must match #RRGGBB"))]
    pub bg_color: String,
    pub qr_style: QrStyle,
    pub error_level: ErrorLevel,
    pub logo: Option<String>,
}

impl CreateQrRequest {
    pub fn into_dto(self, user_id: String) -> CreateQrCodeDto {
        CreateQrCodeDto {
            url: self.url,
            description: self.description,
            size: self.size,
            fg_color: self.fg_color,
            bg_color: self.bg_color,
            qr_style: self.qr_style,
            error_level: self.error_level,
            logo: self.logo,
            user_id,
        }
    }
}

/// Partial update payload; every field optional, same constraints.
#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQrRequest {
    #[validate(url(message = "Invalid URL format"))]
    pub url: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 100, max = 400, message = "Size must be between 100 and 400"))]
    pub size: Option<u32>,
    #[validate(regex(path = *HEX_COLOR_RE, message = "Color must match #RRGGBB"))]
    pub fg_color: Option<String>,
    #[validate(regex(path = *HEX_COLOR_RE, message = "Color must match #RRGGBB"))]
    pub bg_color: Option<String>,
    pub qr_style: Option<QrStyle>,
    pub error_level: Option<ErrorLevel>,
    pub logo: Option<String>,
}

impl UpdateQrRequest {
    pub fn into_dto(self) -> UpdateQrCodeDto {
        UpdateQrCodeDto {
            url: self.url,
            description: self.description,
            size: self.size,
            fg_color: self.fg_color,
            bg_color: self.bg_color,
            qr_style: self.qr_style,
            error_level: self.error_level,
            logo: self.logo,
        }
    }
}

/// Raw query parameters for list requests. Values are kept as strings so
/// that non-numeric input falls back to the defaults instead of failing
/// deserialization. `limit` is capped so a single request cannot ask for
/// an unbounded page.
#[derive(Deserialize)]
pub struct PaginationParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl PaginationParams {
    pub fn page(&self) -> u64 {
        parse_or(self.page.as_deref(), DEFAULT_PAGE)
    }

    pub fn limit(&self) -> u64 {
        parse_or(self.limit.as_deref(), DEFAULT_LIMIT).min(MAX_LIMIT)
    }
}

fn parse_or(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|value| value.parse::<u64>().ok())
        .filter(|&value| value >= 1)
        .unwrap_or(default)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QrCodeResponse {
    pub id: String,
    pub url: String,
    pub description: Option<String>,
    pub size: u32,
    pub fg_color: String,
    pub bg_color: String,
    pub qr_style: QrStyle,
    pub error_level: ErrorLevel,
    pub logo: Option<String>,
    pub user_id: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<QrCodeRecord> for QrCodeResponse {
    fn from(record: QrCodeRecord) -> Self {
        Self {
            id: record.id.map(|id| id.to_hex()).unwrap_or_default(),
            url: record.url,
            description: record.description,
            size: record.size,
            fg_color: record.fg_color,
            bg_color: record.bg_color,
            qr_style: record.qr_style,
            error_level: record.error_level,
            logo: record.logo,
            user_id: record.user_id,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Pagination envelope returned by the list endpoint.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QrCodeListResponse {
    pub data: Vec<QrCodeResponse>,
    pub total: u64,
    pub current_page: u64,
    pub total_pages: u64,
}
