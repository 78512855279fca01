use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::error::ApiError;
use crate::middleware::create_access_token;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/* ---------- REGISTER ---------- */

#[derive(Debug, Deserialize, Validate)]
struct RegisterRequest {
    #[validate(length(min = 1))]
    name: String,
    #[validate(email)]
    email: String,
    #[validate(length(min = 6))]
    password: String,
}

// POST /register
async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let password_hash = bcrypt::hash(&req.password, bcrypt::DEFAULT_COST)
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))?;

    let inserted = sqlx::query("INSERT INTO users (name, email, password_hash) VALUES ($1, $2, $3)")
        .bind(&req.name)
        .bind(&req.email)
        .bind(&password_hash)
        .execute(&state.db.pool)
        .await;

    match inserted {
        Ok(_) => {
            tracing::info!("Registered user {}", req.email);
            Ok((
                StatusCode::CREATED,
                Json(json!({ "message": "User registered successfully" })),
            ))
        }
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(ApiError::BadRequest(
            "Email already registered".to_string(),
        )),
        Err(e) => Err(e.into()),
    }
}

/* ---------- LOGIN ---------- */

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    access_token: String,
    token_type: String,
    role: String,
}

// POST /login
async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let row: Option<(String, String)> =
        sqlx::query_as("SELECT password_hash, role FROM users WHERE email = $1")
            .bind(&req.email)
            .fetch_optional(&state.db.pool)
            .await?;

    // One rejection message for both unknown email and wrong password.
    let (password_hash, role) =
        row.ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let verified = bcrypt::verify(&req.password, &password_hash)
        .map_err(|e| ApiError::Internal(format!("password verification failed: {e}")))?;
    if !verified {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let access_token = create_access_token(&req.email, &state.config.jwt)?;

    Ok(Json(LoginResponse {
        access_token,
        token_type: "bearer".to_string(),
        role,
    }))
}
