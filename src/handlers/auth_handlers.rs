use actix_web::{HttpResponse, Result, error, web};
use bcrypt::{DEFAULT_COST, hash, verify};
use mongodb::bson::doc;
use serde::Serialize;
use validator::Validate;

use crate::models::user::{User, UserResponse};
use crate::state::app_state::AppState;
use crate::structs::user::{LoginRequest, SignupRequest};
use crate::utils::jwt::create_token;

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub email: String,
}

pub async fn login(
    app_state: web::Data<AppState>,
    web::Json(req): web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    let db = &app_state.db;
    let users_collection = db.collection::<User>("users");

    // Find the user
    let user = users_collection
        .find_one(doc! { "email": &req.email, "is_active": true })
        .await
        .map_err(|e| {
            log::error!("Database error during login: {}", e);
            error::ErrorInternalServerError("Login failed")
        })?;

    match user {
        Some(mut user) => {
            // Verify password
            let password_matches = verify(&req.password, &user.password_hash)
                .map_err(|_| error::ErrorInternalServerError("Password verification failed"))?;

            if !password_matches {
                return Ok(HttpResponse::Unauthorized().json(serde_json::json!({
                    "error": "Invalid credentials"
                })));
            }

            let user_id = user.id.map(|id| id.to_hex()).unwrap_or_default();

            // Generate JWT token carrying the user's id and role
            let token = create_token(&user_id, &user.email, user.role).map_err(|e| {
                log::error!("Token generation failed: {}", e);
                error::ErrorInternalServerError("Login failed")
            })?;

            // Update last login time
            user.update_last_login();
            users_collection
                .update_one(
                    doc! { "email": &user.email },
                    doc! { "$set": { "last_login": user.last_login } },
                )
                .await
                .map_err(|e| {
                    log::error!("Failed to update last login: {}", e);
                    error::ErrorInternalServerError("Login failed")
                })?;

            Ok(HttpResponse::Ok().json(LoginResponse {
                token,
                email: user.email,
            }))
        }
        None => Ok(HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "Invalid credentials"
        }))),
    }
}

pub async fn signup(
    app_state: web::Data<AppState>,
    web::Json(req): web::Json<SignupRequest>,
) -> Result<HttpResponse> {
    if let Err(errors) = req.validate() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Invalid request data",
            "details": errors
        })));
    }

    let db = &app_state.db;
    let users_collection = db.collection::<User>("users");

    // Reject duplicate emails
    let existing = users_collection
        .find_one(doc! { "email": &req.email })
        .await
        .map_err(|e| {
            log::error!("Database error during signup: {}", e);
            error::ErrorInternalServerError("Signup failed")
        })?;

    if existing.is_some() {
        return Ok(HttpResponse::Conflict().json(serde_json::json!({
            "error": "Email already registered"
        })));
    }

    // Hash password
    let password_hash = hash(&req.password, DEFAULT_COST).map_err(|e| {
        log::error!("Failed to hash password: {}", e);
        error::ErrorInternalServerError("Signup failed")
    })?;

    let mut user = User::new(req.email, req.name, password_hash);

    let result = users_collection.insert_one(&user).await.map_err(|e| {
        log::error!("Failed to create user: {}", e);
        error::ErrorInternalServerError("Signup failed")
    })?;

    user.id = result.inserted_id.as_object_id();

    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}
