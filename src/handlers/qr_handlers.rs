use actix_web::{HttpMessage, HttpRequest, HttpResponse, Responder, Result, web};
use qrcode::QrCode;
use qrcode::render::svg;
use validator::Validate;

use crate::state::app_state::AppState;
use crate::structs::qr_request::{
    CreateQrRequest, PaginationParams, QrCodeListResponse, QrCodeResponse, UpdateQrRequest,
};
use crate::utils::jwt::Claims;

/// Claims are inserted by the auth middleware; a missing entry means the
/// request never went through it.
fn session_claims(req: &HttpRequest) -> Option<Claims> {
    req.extensions().get::<Claims>().cloned()
}

fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(serde_json::json!({
        "error": "Authentication required"
    }))
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "error": "QR code not found"
    }))
}

/// Create a QR code for the authenticated user
pub async fn create_qr_code(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    web::Json(body): web::Json<CreateQrRequest>,
) -> Result<impl Responder> {
    let claims = match session_claims(&req) {
        Some(claims) => claims,
        None => return Ok(unauthorized()),
    };

    if let Err(errors) = body.validate() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Invalid request data",
            "details": errors
        })));
    }

    // The session decides ownership; anything the client sent is ignored
    let dto = body.into_dto(claims.user_id);

    match app_state.qr.create_qr_code(dto).await {
        Ok(record) => Ok(HttpResponse::Ok().json(QrCodeResponse::from(record))),
        Err(e) => {
            log::error!("Failed to create QR code: {}", e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to create QR code"
            })))
        }
    }
}

/// List the authenticated user's QR codes, newest first
pub async fn list_qr_codes(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<PaginationParams>,
) -> Result<impl Responder> {
    let claims = match session_claims(&req) {
        Some(claims) => claims,
        None => return Ok(unauthorized()),
    };

    let page = app_state
        .qr
        .get_user_qr_codes(&claims.user_id, Some(query.page()), Some(query.limit()))
        .await;

    match page {
        Ok(page) => Ok(HttpResponse::Ok().json(QrCodeListResponse {
            data: page.data.into_iter().map(QrCodeResponse::from).collect(),
            total: page.total,
            current_page: page.current_page,
            total_pages: page.total_pages,
        })),
        Err(e) => {
            log::error!("Failed to list QR codes: {}", e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to fetch QR codes"
            })))
        }
    }
}

/// Fetch a single QR code. Records owned by other users are reported as
/// missing rather than forbidden.
pub async fn get_qr_code(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<impl Responder> {
    let claims = match session_claims(&req) {
        Some(claims) => claims,
        None => return Ok(unauthorized()),
    };
    let id = path.into_inner();

    match app_state.qr.get_qr_code(&id).await {
        Ok(Some(record)) if record.user_id == claims.user_id => {
            Ok(HttpResponse::Ok().json(QrCodeResponse::from(record)))
        }
        Ok(_) => Ok(not_found()),
        Err(e) => {
            log::error!("Failed to fetch QR code {}: {}", id, e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to fetch QR code"
            })))
        }
    }
}

/// Patch a QR code after checking the caller owns it
pub async fn update_qr_code(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    web::Json(body): web::Json<UpdateQrRequest>,
) -> Result<impl Responder> {
    let claims = match session_claims(&req) {
        Some(claims) => claims,
        None => return Ok(unauthorized()),
    };
    let id = path.into_inner();

    if let Err(errors) = body.validate() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Invalid request data",
            "details": errors
        })));
    }

    // Ownership check before touching the store
    match app_state.qr.get_qr_code(&id).await {
        Ok(Some(record)) if record.user_id == claims.user_id => {}
        Ok(_) => return Ok(not_found()),
        Err(e) => {
            log::error!("Failed to fetch QR code {}: {}", id, e);
            return Ok(HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to update QR code"
            })));
        }
    }

    match app_state.qr.update_qr_code(&id, body.into_dto()).await {
        Ok(Some(record)) => Ok(HttpResponse::Ok().json(QrCodeResponse::from(record))),
        Ok(None) => Ok(not_found()),
        Err(e) => {
            log::error!("Failed to update QR code {}: {}", id, e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to update QR code"
            })))
        }
    }
}

/// Delete a QR code after checking the caller owns it
pub async fn delete_qr_code(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<impl Responder> {
    let claims = match session_claims(&req) {
        Some(claims) => claims,
        None => return Ok(unauthorized()),
    };
    let id = path.into_inner();

    match app_state.qr.get_qr_code(&id).await {
        Ok(Some(record)) if record.user_id == claims.user_id => {}
        Ok(_) => return Ok(not_found()),
        Err(e) => {
            log::error!("Failed to fetch QR code {}: {}", id, e);
            return Ok(HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to delete QR code"
            })));
        }
    }

    match app_state.qr.delete_qr_code(&id).await {
        Ok(true) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "message": "QR code deleted"
        }))),
        Ok(false) => Ok(not_found()),
        Err(e) => {
            log::error!("Failed to delete QR code {}: {}", id, e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to delete QR code"
            })))
        }
    }
}

/// Render a stored QR code as SVG. The dot style is a client-side
/// rendering hint and does not change the symbol.
pub async fn render_qr_code(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<impl Responder> {
    let claims = match session_claims(&req) {
        Some(claims) => claims,
        None => return Ok(unauthorized()),
    };
    let id = path.into_inner();

    let record = match app_state.qr.get_qr_code(&id).await {
        Ok(Some(record)) if record.user_id == claims.user_id => record,
        Ok(_) => return Ok(not_found()),
        Err(e) => {
            log::error!("Failed to fetch QR code {}: {}", id, e);
            return Ok(HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to render QR code"
            })));
        }
    };

    let qr_code =
        match QrCode::with_error_correction_level(record.url.as_bytes(), record.error_level.into())
        {
            Ok(qr_code) => qr_code,
            Err(e) => {
                log::error!("QR code generation error for {}: {}", id, e);
                return Ok(HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Failed to render QR code"
                })));
            }
        };

    let svg = qr_code
        .render::<svg::Color>()
        .min_dimensions(record.size, record.size)
        .dark_color(svg::Color(&record.fg_color))
        .light_color(svg::Color(&record.bg_color))
        .quiet_zone(true)
        .build();

    Ok(HttpResponse::Ok().content_type("image/svg+xml").body(svg))
}
