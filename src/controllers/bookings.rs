use std::collections::HashSet;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiError;
use crate::mailer::TicketEmail;
use crate::middleware::AuthUser;
use crate::models::SeatCode;
use crate::pricing::PriceBreakdown;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/booked-seats/{show_id}", get(get_booked_seats))
        .route("/book", post(book))
}

/* ---------- helpers ---------- */

fn new_booking_reference() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("SP-{}", id[..8].to_uppercase())
}

fn unique_violation_on(err: &sqlx::Error, name: &str) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            db.is_unique_violation() && db.constraint().is_some_and(|c| c.contains(name))
        }
        _ => false,
    }
}

// Trim, uppercase and parse every label. Rejects the whole submission on the
// first class of problem found so the detail message stays unambiguous.
fn normalize_seats(raw: &[String]) -> Result<Vec<SeatCode>, ApiError> {
    if raw.is_empty() {
        return Err(ApiError::BadRequest(
            "At least one seat is required".to_string(),
        ));
    }

    let mut seats = Vec::with_capacity(raw.len());
    let mut invalid = Vec::new();
    for label in raw {
        match label.parse::<SeatCode>() {
            Ok(seat) => seats.push(seat),
            Err(e) => invalid.push(e.0),
        }
    }
    if !invalid.is_empty() {
        return Err(ApiError::BadRequest(format!(
            "Invalid seat labels: {}",
            invalid.join(", ")
        )));
    }

    let mut unique = HashSet::new();
    if !seats.iter().all(|seat| unique.insert(*seat)) {
        return Err(ApiError::BadRequest("Duplicate seats selected".to_string()));
    }

    Ok(seats)
}

async fn find_by_idempotency_key(
    pool: &sqlx::PgPool,
    key: &str,
) -> Result<Option<BookingCreated>, ApiError> {
    #[derive(sqlx::FromRow)]
    struct StoredBooking {
        id: i64,
        booking_reference: String,
        event_id: i64,
        show_id: i64,
        amount: i64,
    }

    let stored: Option<StoredBooking> = sqlx::query_as(
        "SELECT id, booking_reference, event_id, show_id, amount
         FROM bookings
         WHERE idempotency_key = $1",
    )
    .bind(key)
    .fetch_optional(pool)
    .await?;

    let stored = match stored {
        Some(stored) => stored,
        None => return Ok(None),
    };

    let seats: Vec<String> =
        sqlx::query_scalar("SELECT seat_label FROM booking_seats WHERE booking_id = $1 ORDER BY id")
            .bind(stored.id)
            .fetch_all(pool)
            .await?;

    Ok(Some(BookingCreated {
        message: "Booking successful".to_string(),
        booking_reference: stored.booking_reference,
        event_id: stored.event_id,
        show_id: stored.show_id,
        seats,
        amount: stored.amount,
    }))
}

// Builds the 409 detail after a seat insert lost the race. Reads which of
// the requested labels are now taken; the lookup itself is best-effort.
async fn already_booked(pool: &sqlx::PgPool, show_id: i64, labels: &[String]) -> ApiError {
    let taken: Vec<String> = sqlx::query_scalar(
        "SELECT seat_label FROM booking_seats
         WHERE show_id = $1 AND seat_label = ANY($2)
         ORDER BY seat_label",
    )
    .bind(show_id)
    .bind(labels)
    .fetch_all(pool)
    .await
    .unwrap_or_default();

    let detail = if taken.is_empty() {
        "Seat(s) already booked".to_string()
    } else {
        format!("Seat(s) already booked: {}", taken.join(", "))
    };
    ApiError::Conflict(detail)
}

/* ---------- BOOKED SEATS ---------- */

#[derive(Debug, Serialize)]
struct BookedSeatsResponse {
    show_id: i64,
    booked_seats: Vec<String>,
}

// GET /booked-seats/{show_id}
async fn get_booked_seats(
    State(state): State<Arc<AppState>>,
    Path(show_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM shows WHERE id = $1)")
        .bind(show_id)
        .fetch_one(&state.db.pool)
        .await?;
    if !exists {
        return Err(ApiError::NotFound("Show not found".to_string()));
    }

    let booked_seats = state.cache.booked_seats(show_id).await?;
    Ok(Json(BookedSeatsResponse {
        show_id,
        booked_seats,
    }))
}

/* ---------- BOOK ---------- */

#[derive(Debug, Deserialize)]
struct BookRequest {
    event_id: i64,
    show_id: i64,
    seats: Vec<String>,
}

#[derive(Debug, Serialize)]
struct BookingCreated {
    message: String,
    booking_reference: String,
    event_id: i64,
    show_id: i64,
    seats: Vec<String>,
    amount: i64,
}

// POST /book
//
// Seat ownership is decided by the UNIQUE(show_id, seat_label) constraint:
// concurrent submissions for the same seat race on the insert and exactly
// one transaction commits. Resubmissions with a known Idempotency-Key are
// answered from the stored booking instead of being re-run.
async fn book(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    headers: HeaderMap,
    Json(req): Json<BookRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let event: Option<(String, String)> =
        sqlx::query_as("SELECT title, location FROM events WHERE id = $1")
            .bind(req.event_id)
            .fetch_optional(&state.db.pool)
            .await?;
    let (event_title, event_location) =
        event.ok_or_else(|| ApiError::NotFound("Event not found".to_string()))?;

    let show: Option<(i64, String, NaiveDateTime)> = sqlx::query_as(
        "SELECT price, theater_name, show_time FROM shows WHERE id = $1 AND event_id = $2",
    )
    .bind(req.show_id)
    .bind(req.event_id)
    .fetch_optional(&state.db.pool)
    .await?;
    let (price_per_seat, theater_name, show_time) =
        show.ok_or_else(|| ApiError::NotFound("Show not found for this event".to_string()))?;

    let seats = normalize_seats(&req.seats)?;
    let labels: Vec<String> = seats.iter().map(ToString::to_string).collect();

    let idempotency_key = headers
        .get("idempotency-key")
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    if let Some(stored) = find_by_idempotency_key(&state.db.pool, &idempotency_key).await? {
        tracing::info!(
            "Replayed booking {} for idempotency key {}",
            stored.booking_reference,
            idempotency_key
        );
        return Ok((StatusCode::OK, Json(stored)));
    }

    let amount = PriceBreakdown::compute(seats.len() as u32, price_per_seat).grand_total;
    let booking_reference = new_booking_reference();

    let mut tx = state.db.pool.begin().await?;

    let inserted = sqlx::query_scalar::<_, i64>(
        "INSERT INTO bookings (booking_reference, idempotency_key, user_id, event_id, show_id, amount)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING id",
    )
    .bind(&booking_reference)
    .bind(&idempotency_key)
    .bind(user.id)
    .bind(req.event_id)
    .bind(req.show_id)
    .bind(amount)
    .fetch_one(&mut *tx)
    .await;

    let booking_id = match inserted {
        Ok(id) => id,
        Err(ref e) if unique_violation_on(e, "idempotency_key") => {
            // Lost the race against a concurrent retry of the same submission.
            let _ = tx.rollback().await;
            let stored = find_by_idempotency_key(&state.db.pool, &idempotency_key)
                .await?
                .ok_or_else(|| ApiError::Conflict("Booking already in progress".to_string()))?;
            return Ok((StatusCode::OK, Json(stored)));
        }
        Err(e) => {
            let _ = tx.rollback().await;
            tracing::error!("book: failed to insert booking: {:?}", e);
            return Err(e.into());
        }
    };

    for seat in &seats {
        let claimed = sqlx::query(
            "INSERT INTO booking_seats (booking_id, show_id, seat_label, seat_number)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(booking_id)
        .bind(req.show_id)
        .bind(seat.to_string())
        .bind(seat.number() as i32)
        .execute(&mut *tx)
        .await;

        if let Err(e) = claimed {
            let _ = tx.rollback().await;
            if unique_violation_on(&e, "uq_booking_seats_show_seat") {
                return Err(already_booked(&state.db.pool, req.show_id, &labels).await);
            }
            tracing::error!("book: failed to claim seat {}: {:?}", seat, e);
            return Err(e.into());
        }
    }

    tx.commit().await?;

    // Post-commit work is advisory: the booking stands even if Redis is down.
    state.cache.mark_booked(req.show_id, &seats).await;
    state
        .redis
        .publish_json(
            &format!("notifications:user:{}", user.id),
            &json!({
                "type": "booking_confirmed",
                "message": format!("Booking confirmed for {}: {}", event_title, labels.join(", ")),
                "booking_reference": booking_reference,
            }),
        )
        .await;

    // The ticket email goes out on its own task so the response is never
    // held up by SMTP.
    let mailer = state.mailer.clone();
    let recipient = user.email.clone();
    let ticket = TicketEmail {
        recipient_name: user.name.clone(),
        booking_reference: booking_reference.clone(),
        event_title,
        event_location,
        theater_name,
        show_time,
        seats: seats.clone(),
        amount,
    };
    tokio::spawn(async move {
        if let Err(e) = mailer.send_booking_confirmation(&recipient, &ticket).await {
            tracing::warn!("Booking email for {} failed: {}", ticket.booking_reference, e);
        }
    });

    tracing::info!(
        "Booked {} seat(s) for show {} as {} (amount {})",
        seats.len(),
        req.show_id,
        booking_reference,
        amount
    );

    Ok((
        StatusCode::CREATED,
        Json(BookingCreated {
            message: "Booking successful".to_string(),
            booking_reference,
            event_id: req.event_id,
            show_id: req.show_id,
            seats: labels,
            amount,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn references_are_prefixed_uppercase_hex() {
        let reference = new_booking_reference();
        assert!(reference.starts_with("SP-"));
        assert_eq!(reference.len(), 11);
        assert!(reference[3..]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn references_are_unique_enough() {
        let a = new_booking_reference();
        let b = new_booking_reference();
        assert_ne!(a, b);
    }

    #[test]
    fn normalization_rejects_empty_submissions() {
        let err = normalize_seats(&[]).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(msg) if msg.contains("At least one seat")));
    }

    #[test]
    fn normalization_names_every_invalid_label() {
        let raw = vec!["A1".to_string(), "Z9".to_string(), "a99".to_string()];
        let err = normalize_seats(&raw).unwrap_err();
        match err {
            ApiError::BadRequest(msg) => {
                assert_eq!(msg, "Invalid seat labels: Z9, A99");
            }
            other => panic!("expected BadRequest, got {other:?}"),
        }
    }

    #[test]
    fn normalization_rejects_duplicates_after_trimming() {
        let raw = vec!["A1".to_string(), " a1 ".to_string()];
        let err = normalize_seats(&raw).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(msg) if msg == "Duplicate seats selected"));
    }

    #[test]
    fn normalization_uppercases_labels() {
        let raw = vec!["b2".to_string(), "C10".to_string()];
        let seats = normalize_seats(&raw).unwrap();
        let labels: Vec<String> = seats.iter().map(ToString::to_string).collect();
        assert_eq!(labels, vec!["B2", "C10"]);
    }
}
