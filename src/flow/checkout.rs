//! checkout.rs
//!
//! Submission of a finalized order. The server applies the whole order
//! atomically and replays it when the same idempotency key comes back, so
//! the safe recovery from a network error is to resubmit the same
//! [`Submission`] rather than build a new one.

use std::sync::atomic::{AtomicBool, Ordering};

use uuid::Uuid;

use crate::flow::api::ApiClient;
use crate::flow::error::BookingError;
use crate::flow::session::CheckoutOrder;

/// What the patron walks away with: the server's reference and the amount
/// actually charged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingReceipt {
    pub booking_reference: String,
    pub amount: i64,
}

/// One order plus the idempotency key that identifies this submission
/// attempt. Reusing the value on retry is what makes the retry safe;
/// building a second `Submission` from the same order books again.
#[derive(Debug, Clone)]
pub struct Submission {
    order: CheckoutOrder,
    idempotency_key: Uuid,
}

impl Submission {
    pub fn new(order: CheckoutOrder) -> Self {
        Self {
            order,
            idempotency_key: Uuid::new_v4(),
        }
    }

    pub fn order(&self) -> &CheckoutOrder {
        &self.order
    }

    pub fn idempotency_key(&self) -> Uuid {
        self.idempotency_key
    }
}

/// Sends submissions, at most one at a time. The gate absorbs double-taps
/// on the pay button: while a call is in flight every further attempt fails
/// fast with [`BookingError::SubmissionInFlight`].
pub struct CheckoutSubmitter {
    api: ApiClient,
    in_flight: AtomicBool,
}

impl CheckoutSubmitter {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            in_flight: AtomicBool::new(false),
        }
    }

    pub async fn submit(&self, submission: &Submission) -> Result<BookingReceipt, BookingError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Acquire)
            .is_err()
        {
            return Err(BookingError::SubmissionInFlight);
        }
        let _gate = InFlightGate {
            flag: &self.in_flight,
        };

        let request = submission.order().booking_request();
        let confirmation = self
            .api
            .submit_booking(&request, submission.idempotency_key())
            .await?;

        Ok(BookingReceipt {
            booking_reference: confirmation.booking_reference,
            amount: confirmation.amount,
        })
    }
}

// Clears the in-flight flag on every exit path, including early returns
// and panics.
struct InFlightGate<'a> {
    flag: &'a AtomicBool,
}

impl Drop for InFlightGate<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use crate::flow::session::BookingSession;
    use crate::models::SeatCode;

    use super::*;

    fn order() -> CheckoutOrder {
        let mut session = BookingSession::new(7, 12, 3, 200).unwrap();
        session.push_seat("A1".parse::<SeatCode>().unwrap());
        session.checkout().unwrap()
    }

    #[test]
    fn each_submission_gets_its_own_key() {
        let a = Submission::new(order());
        let b = Submission::new(order());
        assert_ne!(a.idempotency_key(), b.idempotency_key());
    }

    #[test]
    fn cloning_a_submission_keeps_the_key() {
        let original = Submission::new(order());
        let retry = original.clone();
        assert_eq!(original.idempotency_key(), retry.idempotency_key());
    }

    #[test]
    fn the_gate_resets_when_dropped() {
        let flag = AtomicBool::new(false);
        assert!(flag
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Acquire)
            .is_ok());
        {
            let _gate = InFlightGate { flag: &flag };
            assert!(flag.load(Ordering::Acquire));
        }
        assert!(!flag.load(Ordering::Acquire));
    }
}
