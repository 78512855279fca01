use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;
use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl AuthUser {
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.role == "admin" {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "Not authorized. Admin access required.".to_string(),
            ))
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

pub fn create_access_token(email: &str, jwt: &JwtConfig) -> Result<String, ApiError> {
    let expires_at = Utc::now() + chrono::Duration::hours(jwt.expires_in_hours);
    let claims = Claims {
        sub: email.to_string(),
        exp: expires_at.timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt.secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("token creation failed: {e}")))
}

// Row shape for the lookup below, no macros.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    role: String,
}

// Bearer JWT extractor. The token carries the email in `sub`; the user row
// is re-read on every request so a deleted account loses access immediately.
impl FromRequestParts<Arc<crate::AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<crate::AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(state.config.jwt.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| ApiError::Unauthorized("Could not validate credentials".to_string()))?;

        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, name, email, role FROM users WHERE email = $1")
                .bind(&data.claims.sub)
                .fetch_optional(&state.db.pool)
                .await?;

        let user =
            row.ok_or_else(|| ApiError::Unauthorized("Could not validate credentials".to_string()))?;

        Ok(AuthUser {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        })
    }
}
