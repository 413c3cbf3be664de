use anyhow::{Context, Result};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::env;

use crate::models::role::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (email)
    pub user_id: String,
    pub role: Role,
    pub exp: usize, // Expiration time (as UTC timestamp)
    pub iat: usize, // Issued at (as UTC timestamp)
}

/// Build the claims for a freshly authenticated user. The session-visible
/// identity (id and role) is attached here and nowhere else.
fn build_claims(user_id: &str, email: &str, role: Role) -> Claims {
    let now = chrono::Utc::now();
    let expiry = now + chrono::Duration::days(10); // 10 days validity

    Claims {
        sub: email.to_string(),
        user_id: user_id.to_string(),
        role,
        exp: expiry.timestamp() as usize,
        iat: now.timestamp() as usize,
    }
}

fn encode_token(claims: &Claims, secret: &str) -> Result<String> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .context("Failed to encode JWT")
}

fn decode_token(token: &str, secret: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .context("Failed to decode JWT")?;

    Ok(token_data.claims)
}

pub fn create_token(user_id: &str, email: &str, role: Role) -> Result<String> {
    let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET not set")?;
    encode_token(&build_claims(user_id, email, role), &jwt_secret)
}

pub fn validate_token(token: &str) -> Result<Claims> {
    let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET not set")?;
    decode_token(token, &jwt_secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn claims_carry_id_and_role() {
        let claims = build_claims("abc123", "user@example.com", Role::Admin);
        assert_eq!(claims.sub, "user@example.com");
        assert_eq!(claims.user_id, "abc123");
        assert_eq!(claims.role, Role::Admin);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_round_trip_preserves_claims() {
        let claims = build_claims("abc123", "user@example.com", Role::User);
        let token = encode_token(&claims, SECRET).unwrap();
        let decoded = decode_token(&token, SECRET).unwrap();
        assert_eq!(decoded.user_id, "abc123");
        assert_eq!(decoded.sub, "user@example.com");
        assert_eq!(decoded.role, Role::User);
    }

    #[test]
    fn token_with_wrong_secret_is_rejected() {
        let claims = build_claims("abc123", "user@example.com", Role::User);
        let token = encode_token(&claims, SECRET).unwrap();
        assert!(decode_token(&token, "other-secret").is_err());
    }
}
