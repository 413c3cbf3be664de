use actix_web::{HttpResponse, web};
use mongodb::bson::doc;

use crate::state::app_state::AppState;

/// Liveness probe: pings the MongoDB instance that holds the QR-code and
/// user collections.
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    match state.db.run_command(doc! { "ping": 1 }).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({ "success": true })),
        Err(e) => {
            log::error!("Health check could not reach MongoDB: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "success": false,
                "error": "qrvault cannot reach its database"
            }))
        }
    }
}
