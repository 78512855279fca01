use serde::{Deserialize, Serialize};

use crate::models::seat::SeatCode;

/// A confirmed booking as reported back to the account holder. Assembled
/// from the bookings row plus its seat rows, not read with `FromRow`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub booking_reference: String,
    pub event_id: i64,
    pub show_id: i64,
    pub seats: Vec<SeatCode>,
    pub amount: i64,
}
