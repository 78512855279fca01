//! receipt.rs
//!
//! The confirmation stage. Normally it renders the server's booking
//! reference; when the handoff arrives without one (deep link, reload, a
//! truncated query) it synthesizes a clearly marked local placeholder so
//! the patron still leaves with something to quote to support.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::flow::checkout::BookingReceipt;
use crate::flow::error::BookingError;
use crate::flow::session::CheckoutOrder;
use crate::models::SeatCode;

/// Where the rendered reference came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceSource {
    /// Issued by the booking service; safe to quote for support lookups.
    Server,
    /// Synthesized locally because the handoff lost the reference. The
    /// booking may or may not exist on the server.
    LocalFallback,
}

// Wire shape of the confirmation handoff: seats, total, eventId, showId,
// bookingRef. A lost reference travels as an empty bookingRef.
#[derive(Debug, Serialize, Deserialize)]
struct ConfirmationQuery {
    seats: String,
    total: i64,
    #[serde(rename = "eventId")]
    event_id: i64,
    #[serde(rename = "showId")]
    show_id: i64,
    #[serde(rename = "bookingRef", default)]
    booking_ref: String,
}

/// Everything the confirmation page needs, before a reference is settled.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmationContext {
    seats: Vec<SeatCode>,
    total: i64,
    event_id: i64,
    show_id: i64,
    booking_reference: Option<String>,
}

impl ConfirmationContext {
    /// The normal path: a submission just succeeded.
    pub fn from_submission(order: &CheckoutOrder, receipt: &BookingReceipt) -> Self {
        Self {
            seats: order.seats().to_vec(),
            total: receipt.amount,
            event_id: order.event_id(),
            show_id: order.show_id(),
            booking_reference: Some(receipt.booking_reference.clone()),
        }
    }

    pub fn booking_reference(&self) -> Option<&str> {
        self.booking_reference.as_deref()
    }

    /// Encodes the confirmation handoff payload.
    pub fn to_query(&self) -> String {
        let seats = self
            .seats
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        serde_urlencoded::to_string(ConfirmationQuery {
            seats,
            total: self.total,
            event_id: self.event_id,
            show_id: self.show_id,
            booking_ref: self.booking_reference.clone().unwrap_or_default(),
        })
        .expect("query serialization")
    }

    /// Decodes a confirmation payload. A missing or empty `bookingRef` is
    /// legal here; it selects the fallback reference at render time.
    pub fn from_query(query: &str) -> Result<Self, BookingError> {
        let wire: ConfirmationQuery = serde_urlencoded::from_str(query)
            .map_err(|e| BookingError::InvalidSession(e.to_string()))?;

        let mut seats = Vec::new();
        for part in wire.seats.split(',') {
            if part.trim().is_empty() {
                continue;
            }
            let seat: SeatCode = part.parse().map_err(|e: crate::models::InvalidSeatCode| {
                BookingError::InvalidSession(format!("bad seat label: {}", e.0))
            })?;
            seats.push(seat);
        }
        if seats.is_empty() {
            return Err(BookingError::InvalidSession(
                "confirmation without seats".to_string(),
            ));
        }

        let booking_reference = if wire.booking_ref.trim().is_empty() {
            None
        } else {
            Some(wire.booking_ref)
        };

        Ok(Self {
            seats,
            total: wire.total,
            event_id: wire.event_id,
            show_id: wire.show_id,
            booking_reference,
        })
    }

    /// Produces the final receipt. `now` feeds both the booked-on date and
    /// the fallback reference, so rendering is deterministic for a fixed
    /// clock.
    pub fn render(&self, now: DateTime<Utc>) -> Receipt {
        let (booking_reference, reference_source) = match &self.booking_reference {
            Some(reference) if !reference.trim().is_empty() => {
                (reference.clone(), ReferenceSource::Server)
            }
            _ => (synthesize_reference(now), ReferenceSource::LocalFallback),
        };
        Receipt {
            booking_reference,
            reference_source,
            seats: self.seats.clone(),
            total_paid: self.total,
            event_id: self.event_id,
            show_id: self.show_id,
            booked_on: now.date_naive(),
        }
    }
}

/// The rendered confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub booking_reference: String,
    pub reference_source: ReferenceSource,
    pub seats: Vec<SeatCode>,
    pub total_paid: i64,
    pub event_id: i64,
    pub show_id: i64,
    pub booked_on: NaiveDate,
}

impl Receipt {
    /// `false` means the reference is a local placeholder and support
    /// cannot look the booking up by it.
    pub fn is_confirmed(&self) -> bool {
        self.reference_source == ReferenceSource::Server
    }
}

impl fmt::Display for Receipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let seats = self
            .seats
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(f, "Booking Confirmed!")?;
        writeln!(f, "Seats:      {}", seats)?;
        writeln!(f, "Total paid: {}", self.total_paid)?;
        writeln!(f, "Event/show: {}/{}", self.event_id, self.show_id)?;
        writeln!(f, "Booked on:  {}", self.booked_on)?;
        match self.reference_source {
            ReferenceSource::Server => write!(f, "Reference:  {}", self.booking_reference),
            ReferenceSource::LocalFallback => {
                write!(f, "Reference:  {} (unconfirmed)", self.booking_reference)
            }
        }
    }
}

fn synthesize_reference(now: DateTime<Utc>) -> String {
    format!("UNC-{}", base36(now.timestamp_millis()))
}

fn base36(mut value: i64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    if value <= 0 {
        return "0".to_string();
    }
    let mut out = String::new();
    while value > 0 {
        out.insert(0, DIGITS[(value % 36) as usize] as char);
        value /= 36;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seat(label: &str) -> SeatCode {
        label.parse().unwrap()
    }

    fn context(reference: Option<&str>) -> ConfirmationContext {
        ConfirmationContext {
            seats: vec![seat("A1"), seat("A2"), seat("A3")],
            total: 798,
            event_id: 7,
            show_id: 12,
            booking_reference: reference.map(str::to_owned),
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_766_000_000_000).unwrap()
    }

    #[test]
    fn server_references_render_as_confirmed() {
        let receipt = context(Some("SP-1A2B3C4D")).render(fixed_now());
        assert_eq!(receipt.booking_reference, "SP-1A2B3C4D");
        assert!(receipt.is_confirmed());
        assert!(!receipt.to_string().contains("unconfirmed"));
    }

    #[test]
    fn missing_references_fall_back_to_a_marked_placeholder() {
        let receipt = context(None).render(fixed_now());
        assert!(receipt.booking_reference.starts_with("UNC-"));
        assert!(!receipt.is_confirmed());
        assert!(receipt.to_string().contains("unconfirmed"));
    }

    #[test]
    fn fallback_references_are_deterministic_in_the_clock() {
        let now = fixed_now();
        let first = context(None).render(now);
        let second = context(None).render(now);
        assert_eq!(first.booking_reference, second.booking_reference);

        let later = DateTime::from_timestamp_millis(1_766_000_000_001).unwrap();
        let third = context(None).render(later);
        assert_ne!(first.booking_reference, third.booking_reference);
    }

    #[test]
    fn base36_round_trips() {
        for value in [1i64, 35, 36, 1_000, 1_766_000_000_000] {
            let encoded = base36(value);
            assert_eq!(i64::from_str_radix(&encoded, 36).unwrap(), value);
        }
        assert_eq!(base36(0), "0");
        assert_eq!(base36(35), "Z");
        assert_eq!(base36(36), "10");
    }

    #[test]
    fn query_round_trips_with_and_without_a_reference() {
        let with_ref = context(Some("SP-1A2B3C4D"));
        let query = with_ref.to_query();
        assert_eq!(
            query,
            "seats=A1%2CA2%2CA3&total=798&eventId=7&showId=12&bookingRef=SP-1A2B3C4D"
        );
        assert_eq!(ConfirmationContext::from_query(&query).unwrap(), with_ref);

        let without_ref = context(None);
        let query = without_ref.to_query();
        assert_eq!(
            query,
            "seats=A1%2CA2%2CA3&total=798&eventId=7&showId=12&bookingRef="
        );
        assert_eq!(
            ConfirmationContext::from_query(&query).unwrap(),
            without_ref
        );
    }

    #[test]
    fn a_query_without_the_reference_param_still_parses() {
        let parsed =
            ConfirmationContext::from_query("seats=B4&total=266&eventId=7&showId=12").unwrap();
        assert_eq!(parsed.booking_reference(), None);
    }

    #[test]
    fn a_query_without_seats_is_rejected() {
        assert!(ConfirmationContext::from_query("seats=&total=0&eventId=7&showId=12").is_err());
        assert!(ConfirmationContext::from_query("seats=Q9&total=0&eventId=7&showId=12").is_err());
    }

    #[test]
    fn received_date_comes_from_the_clock() {
        let receipt = context(Some("SP-1A2B3C4D")).render(fixed_now());
        assert_eq!(receipt.booked_on, fixed_now().date_naive());
    }
}
