use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One scheduled performance of an event. `price` is the per-seat price in
/// whole currency units; every seat in the auditorium sells at this price.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Show {
    pub id: i64,
    pub event_id: i64,
    pub theater_name: String,
    pub show_time: NaiveDateTime,
    pub price: i64,
    pub total_seats: i32,
}
