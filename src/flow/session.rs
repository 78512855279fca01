//! session.rs
//!
//! Typed stage descriptors for the booking flow. Each page boundary in the
//! storefront hands over a small query-string payload; these types parse and
//! validate that payload once at the boundary, so the later stages can rely
//! on the fields instead of re-checking them.

use serde::{Deserialize, Serialize};

use crate::flow::api::BookingRequest;
use crate::flow::error::{BookingError, SelectionError};
use crate::models::SeatCode;
use crate::pricing::PriceBreakdown;

/// Upper bound on the seat count a patron can ask for in one booking.
pub const MAX_SEATS_PER_BOOKING: u8 = 10;

/* ---------- seat picking stage ---------- */

// Wire shape of the seat-picking handoff: eventId, showId, count, price.
#[derive(Debug, Serialize, Deserialize)]
struct SeatPickingQuery {
    #[serde(rename = "eventId")]
    event_id: i64,
    #[serde(rename = "showId")]
    show_id: i64,
    count: u8,
    price: i64,
}

/// A booking in progress: the chosen show, the seat-count cap the patron
/// asked for, and the seats selected so far. Valid by construction; the only
/// way to mutate the seat list is through the selection engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingSession {
    event_id: i64,
    show_id: i64,
    max_seats: u8,
    price_per_seat: i64,
    selected_seats: Vec<SeatCode>,
}

impl BookingSession {
    pub fn new(
        event_id: i64,
        show_id: i64,
        max_seats: u8,
        price_per_seat: i64,
    ) -> Result<Self, BookingError> {
        if event_id <= 0 || show_id <= 0 {
            return Err(BookingError::InvalidSession(
                "event and show ids must be positive".to_string(),
            ));
        }
        if max_seats == 0 || max_seats > MAX_SEATS_PER_BOOKING {
            return Err(BookingError::InvalidSession(format!(
                "seat count must be between 1 and {}",
                MAX_SEATS_PER_BOOKING
            )));
        }
        if price_per_seat <= 0 {
            return Err(BookingError::InvalidSession(
                "price per seat must be positive".to_string(),
            ));
        }
        Ok(Self {
            event_id,
            show_id,
            max_seats,
            price_per_seat,
            selected_seats: Vec::new(),
        })
    }

    pub fn event_id(&self) -> i64 {
        self.event_id
    }

    pub fn show_id(&self) -> i64 {
        self.show_id
    }

    pub fn max_seats(&self) -> u8 {
        self.max_seats
    }

    pub fn price_per_seat(&self) -> i64 {
        self.price_per_seat
    }

    pub fn selected_seats(&self) -> &[SeatCode] {
        &self.selected_seats
    }

    /// Seat subtotal before fee and tax, as shown next to the seat map.
    pub fn base_total(&self) -> i64 {
        self.selected_seats.len() as i64 * self.price_per_seat
    }

    pub(super) fn contains(&self, seat: SeatCode) -> bool {
        self.selected_seats.contains(&seat)
    }

    pub(super) fn push_seat(&mut self, seat: SeatCode) {
        self.selected_seats.push(seat);
    }

    pub(super) fn remove_seat(&mut self, seat: SeatCode) {
        self.selected_seats.retain(|s| *s != seat);
    }

    pub(super) fn retain_available(&mut self, is_available: impl Fn(SeatCode) -> bool) {
        self.selected_seats.retain(|s| is_available(*s));
    }

    /// Encodes the seat-picking handoff payload.
    pub fn to_query(&self) -> String {
        serde_urlencoded::to_string(SeatPickingQuery {
            event_id: self.event_id,
            show_id: self.show_id,
            count: self.max_seats,
            price: self.price_per_seat,
        })
        .expect("query serialization")
    }

    /// Decodes and validates a seat-picking payload. The session starts with
    /// an empty selection regardless of what produced the query.
    pub fn from_query(query: &str) -> Result<Self, BookingError> {
        let wire: SeatPickingQuery = serde_urlencoded::from_str(query)
            .map_err(|e| BookingError::InvalidSession(e.to_string()))?;
        Self::new(wire.event_id, wire.show_id, wire.count, wire.price)
    }

    /// Moves on to checkout. Requires at least one selected seat.
    pub fn checkout(self) -> Result<CheckoutOrder, BookingError> {
        if self.selected_seats.is_empty() {
            return Err(SelectionError::EmptySelection.into());
        }
        Ok(CheckoutOrder {
            event_id: self.event_id,
            show_id: self.show_id,
            seats: self.selected_seats,
            price_per_seat: self.price_per_seat,
        })
    }
}

/* ---------- checkout stage ---------- */

// Wire shape of the checkout handoff: eventId, showId, seats, price. Seats
// travel as one comma-joined field.
#[derive(Debug, Serialize, Deserialize)]
struct CheckoutQuery {
    #[serde(rename = "eventId")]
    event_id: i64,
    #[serde(rename = "showId")]
    show_id: i64,
    seats: String,
    price: i64,
}

/// A finalized seat pick headed for payment review. Non-empty by
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutOrder {
    event_id: i64,
    show_id: i64,
    seats: Vec<SeatCode>,
    price_per_seat: i64,
}

impl CheckoutOrder {
    pub fn event_id(&self) -> i64 {
        self.event_id
    }

    pub fn show_id(&self) -> i64 {
        self.show_id
    }

    pub fn seats(&self) -> &[SeatCode] {
        &self.seats
    }

    pub fn price_per_seat(&self) -> i64 {
        self.price_per_seat
    }

    /// The full bill for this order.
    pub fn price_breakdown(&self) -> PriceBreakdown {
        PriceBreakdown::compute(self.seats.len() as u32, self.price_per_seat)
    }

    /// The wire payload the submitter sends.
    pub fn booking_request(&self) -> BookingRequest {
        BookingRequest {
            event_id: self.event_id,
            show_id: self.show_id,
            seats: self.seats.clone(),
        }
    }

    /// Encodes the checkout handoff payload.
    pub fn to_query(&self) -> String {
        let seats = self
            .seats
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        serde_urlencoded::to_string(CheckoutQuery {
            event_id: self.event_id,
            show_id: self.show_id,
            seats,
            price: self.price_per_seat,
        })
        .expect("query serialization")
    }

    /// Decodes and validates a checkout payload. An empty seat list is the
    /// "arrived at billing without picking seats" case and surfaces as
    /// [`SelectionError::EmptySelection`] so callers can bounce back to the
    /// seat map.
    pub fn from_query(query: &str) -> Result<Self, BookingError> {
        let wire: CheckoutQuery = serde_urlencoded::from_str(query)
            .map_err(|e| BookingError::InvalidSession(e.to_string()))?;
        if wire.event_id <= 0 || wire.show_id <= 0 {
            return Err(BookingError::InvalidSession(
                "event and show ids must be positive".to_string(),
            ));
        }
        if wire.price <= 0 {
            return Err(BookingError::InvalidSession(
                "price per seat must be positive".to_string(),
            ));
        }

        let joined = wire.seats.trim();
        if joined.is_empty() {
            return Err(SelectionError::EmptySelection.into());
        }
        let mut seats: Vec<SeatCode> = Vec::new();
        for part in joined.split(',') {
            let seat: SeatCode = part
                .parse()
                .map_err(|e: crate::models::InvalidSeatCode| {
                    BookingError::InvalidSession(format!("bad seat label: {}", e.0))
                })?;
            if seats.contains(&seat) {
                return Err(BookingError::InvalidSession(format!(
                    "duplicate seat label: {seat}"
                )));
            }
            seats.push(seat);
        }

        Ok(Self {
            event_id: wire.event_id,
            show_id: wire.show_id,
            seats,
            price_per_seat: wire.price,
        })
    }
}
