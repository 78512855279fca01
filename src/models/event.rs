use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub location: String,
    pub date_time: NaiveDateTime,
    pub total_seats: i32,
    pub banner_url: Option<String>,
}
