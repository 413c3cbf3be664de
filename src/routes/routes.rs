use actix_web::{HttpRequest, HttpResponse, error, web};

use crate::handlers::auth_handlers::{login, signup};
use crate::handlers::health_handlers::health_check;
use crate::handlers::qr_handlers::{
    create_qr_code, delete_qr_code, get_qr_code, list_qr_codes, render_qr_code, update_qr_code,
};
use crate::middlewares::authmw::JwtAuth;

/// Bodies that fail to deserialize (wrong types, unknown enum variants)
/// get the same `{error, details}` shape as validator failures.
fn json_error_handler(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let detail = err.to_string();
    let response = HttpResponse::BadRequest().json(serde_json::json!({
        "error": "Invalid request data",
        "details": [detail]
    }));
    error::InternalError::from_response(err, response).into()
}

/// Configure the routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler));
    // Authentication routes - no auth required
    cfg.service(
        web::scope("/api/auth")
            .route("/login", web::post().to(login))
            .route("/signup", web::post().to(signup)),
    );
    // API routes - require authentication
    cfg.service(
        web::scope("/api")
            .wrap(JwtAuth)
            .route("/qr", web::post().to(create_qr_code))
            .route("/qr", web::get().to(list_qr_codes))
            .route("/qr/{id}", web::get().to(get_qr_code))
            .route("/qr/{id}", web::put().to(update_qr_code))
            .route("/qr/{id}", web::delete().to(delete_qr_code))
            .route("/qr/{id}/image", web::get().to(render_qr_code))
            .route("/health/check", web::get().to(health_check)),
    );
}
