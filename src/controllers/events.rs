use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::{Event, Show};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route("/shows/event/{event_id}", get(list_shows_for_event))
        .route("/shows", post(create_show))
}

/* ---------- EVENTS ---------- */

// GET /events
async fn list_events(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let events = state.cache.get_events().await?;
    Ok(Json(events))
}

// POST /events (admin)
#[derive(Debug, Deserialize, Validate)]
struct CreateEventRequest {
    #[validate(length(min = 1))]
    title: String,
    #[serde(rename = "type")]
    #[validate(length(min = 1))]
    event_type: String,
    #[validate(length(min = 1))]
    location: String,
    date_time: NaiveDateTime,
    #[validate(range(min = 1))]
    total_seats: i32,
    banner_url: Option<String>,
}

async fn create_event(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, ApiError> {
    user.require_admin()?;
    req.validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let event: Event = sqlx::query_as(
        "INSERT INTO events (title, event_type, location, date_time, total_seats, banner_url)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING id, title, event_type, location, date_time, total_seats, banner_url",
    )
    .bind(&req.title)
    .bind(&req.event_type)
    .bind(&req.location)
    .bind(req.date_time)
    .bind(req.total_seats)
    .bind(&req.banner_url)
    .fetch_one(&state.db.pool)
    .await?;

    state.cache.invalidate_events().await;
    tracing::info!("Created event {} ({})", event.id, event.title);

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Event created successfully", "event": event })),
    ))
}

/* ---------- SHOWS ---------- */

// GET /shows/event/{event_id}
async fn list_shows_for_event(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM events WHERE id = $1)")
        .bind(event_id)
        .fetch_one(&state.db.pool)
        .await?;
    if !exists {
        return Err(ApiError::NotFound("Event not found".to_string()));
    }

    let shows: Vec<Show> = sqlx::query_as(
        "SELECT id, event_id, theater_name, show_time, price, total_seats
         FROM shows
         WHERE event_id = $1
         ORDER BY show_time",
    )
    .bind(event_id)
    .fetch_all(&state.db.pool)
    .await?;

    Ok(Json(shows))
}

// POST /shows (admin)
#[derive(Debug, Deserialize, Validate)]
struct CreateShowRequest {
    event_id: i64,
    #[validate(length(min = 1))]
    theater_name: String,
    show_time: NaiveDateTime,
    // Capped so per-booking totals stay well inside i64.
    #[validate(range(min = 1, max = 1_000_000))]
    price: i64,
    #[validate(range(min = 1))]
    total_seats: i32,
}

async fn create_show(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<CreateShowRequest>,
) -> Result<impl IntoResponse, ApiError> {
    user.require_admin()?;
    req.validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let event_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM events WHERE id = $1)")
            .bind(req.event_id)
            .fetch_one(&state.db.pool)
            .await?;
    if !event_exists {
        return Err(ApiError::NotFound("Event not found".to_string()));
    }

    let show: Show = sqlx::query_as(
        "INSERT INTO shows (event_id, theater_name, show_time, price, total_seats)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id, event_id, theater_name, show_time, price, total_seats",
    )
    .bind(req.event_id)
    .bind(&req.theater_name)
    .bind(req.show_time)
    .bind(req.price)
    .bind(req.total_seats)
    .fetch_one(&state.db.pool)
    .await?;

    tracing::info!("Created show {} for event {}", show.id, show.event_id);

    Ok((StatusCode::CREATED, Json(show)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn show_request(price: i64) -> CreateShowRequest {
        CreateShowRequest {
            event_id: 7,
            theater_name: "Hall 2".to_string(),
            show_time: NaiveDate::from_ymd_opt(2026, 9, 12)
                .unwrap()
                .and_hms_opt(19, 30, 0)
                .unwrap(),
            price,
            total_seats: 80,
        }
    }

    #[test]
    fn show_prices_are_bounded_on_both_ends() {
        assert!(show_request(0).validate().is_err());
        assert!(show_request(1).validate().is_ok());
        assert!(show_request(1_000_000).validate().is_ok());
        assert!(show_request(1_000_001).validate().is_err());
        assert!(show_request(i64::MAX).validate().is_err());
    }
}
