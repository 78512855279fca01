//! api.rs
//!
//! HTTP client for the booking API. Wraps every endpoint the flow needs and
//! maps non-success responses onto [`BookingError`] so callers never look at
//! status codes or response bodies themselves.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::Duration;
use uuid::Uuid;

use crate::flow::error::BookingError;
use crate::models::{Booking, Event, SeatCode, Show};

/// Payload for `POST /book`.
#[derive(Debug, Clone, Serialize)]
pub struct BookingRequest {
    pub event_id: i64,
    pub show_id: i64,
    pub seats: Vec<SeatCode>,
}

/// Accepted-submission response from `POST /book`.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingConfirmation {
    pub booking_reference: String,
    pub event_id: i64,
    pub show_id: i64,
    pub seats: Vec<SeatCode>,
    pub amount: i64,
}

#[derive(Debug, Deserialize)]
struct BookedSeatsResponse {
    booked_seats: Vec<SeatCode>,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
    role: String,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /* ---------- endpoints ---------- */

    pub async fn list_events(&self) -> Result<Vec<Event>, BookingError> {
        self.get("/events").await
    }

    pub async fn list_shows(&self, event_id: i64) -> Result<Vec<Show>, BookingError> {
        self.get(&format!("/shows/event/{}", event_id)).await
    }

    pub async fn booked_seats(&self, show_id: i64) -> Result<Vec<SeatCode>, BookingError> {
        let response: BookedSeatsResponse =
            self.get(&format!("/booked-seats/{}", show_id)).await?;
        Ok(response.booked_seats)
    }

    /// Submits a booking. The idempotency key makes a retry of the same
    /// submission replayable on the server instead of booking twice.
    pub async fn submit_booking(
        &self,
        request: &BookingRequest,
        idempotency_key: Uuid,
    ) -> Result<BookingConfirmation, BookingError> {
        self.post("/book", request, Some(idempotency_key)).await
    }

    pub async fn my_bookings(&self) -> Result<Vec<Booking>, BookingError> {
        self.get("/reports/my-bookings").await
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<(), BookingError> {
        let request = RegisterRequest {
            name,
            email,
            password,
        };
        let _: Value = self.post("/register", &request, None).await?;
        Ok(())
    }

    /// Logs in, stores the bearer token for subsequent calls and returns the
    /// account role.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<String, BookingError> {
        let request = LoginRequest { email, password };
        let response: LoginResponse = self.post("/login", &request, None).await?;
        self.token = Some(response.access_token);
        Ok(response.role)
    }

    /* ---------- plumbing ---------- */

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, BookingError> {
        let mut request = self.http.get(self.url(path));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        Self::decode(response).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        idempotency_key: Option<Uuid>,
    ) -> Result<T, BookingError> {
        let mut request = self.http.post(self.url(path)).json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(key) = idempotency_key {
            request = request.header("Idempotency-Key", key.to_string());
        }
        let response = request.send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BookingError> {
        let status = response.status();
        if status.is_success() {
            return response.json::<T>().await.map_err(BookingError::from);
        }
        let body = response.text().await.unwrap_or_default();
        Err(map_rejection(status, &body))
    }
}

/// Classifies a non-success response. 401 demands a login; 409 and any
/// rejection whose detail names already-booked seats become availability
/// conflicts; everything else is a plain rejection carrying the detail.
fn map_rejection(status: StatusCode, body: &str) -> BookingError {
    if status == StatusCode::UNAUTHORIZED {
        return BookingError::AuthRequired;
    }
    let detail =
        parse_detail(body).unwrap_or_else(|| "Booking failed. Please retry.".to_string());
    if status == StatusCode::CONFLICT || detail.to_lowercase().contains("already booked") {
        return BookingError::AvailabilityConflict(detail);
    }
    BookingError::Rejected(detail)
}

// The API reports errors as {"detail": string} but validation layers may
// send {"detail": [{"msg": ...}, ...]}. Both collapse to one string.
fn parse_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match &value["detail"] {
        Value::String(detail) => Some(detail.clone()),
        Value::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .map(|item| match item["msg"].as_str() {
                    Some(msg) => msg.to_string(),
                    None => item.to_string(),
                })
                .collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        _ => None,
    }
}
