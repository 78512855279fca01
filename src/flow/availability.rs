//! availability.rs
//!
//! Tracks which seats a show has already sold. The snapshot is advisory: it
//! is only as fresh as the last refresh, and the booking endpoint remains
//! the sole authority on seat ownership.

use std::collections::BTreeSet;

use crate::flow::api::ApiClient;
use crate::flow::error::BookingError;
use crate::models::SeatCode;

/// An immutable set of sold seats, ordered row-major.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookedSeatSet(BTreeSet<SeatCode>);

impl BookedSeatSet {
    pub fn contains(&self, seat: SeatCode) -> bool {
        self.0.contains(&seat)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = SeatCode> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<SeatCode> for BookedSeatSet {
    fn from_iter<I: IntoIterator<Item = SeatCode>>(iter: I) -> Self {
        BookedSeatSet(iter.into_iter().collect())
    }
}

/// Polls the booked-seat roster for a show and keeps the last good snapshot.
pub struct AvailabilityTracker {
    api: ApiClient,
    snapshot: BookedSeatSet,
}

impl AvailabilityTracker {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            snapshot: BookedSeatSet::default(),
        }
    }

    /// Fetches the current roster. On failure the previous snapshot stays in
    /// place, so a flaky poll can never un-book seats that were already
    /// known to be sold.
    pub async fn refresh(&mut self, show_id: i64) -> Result<&BookedSeatSet, BookingError> {
        let seats = self.api.booked_seats(show_id).await?;
        self.snapshot = seats.into_iter().collect();
        Ok(&self.snapshot)
    }

    pub fn snapshot(&self) -> &BookedSeatSet {
        &self.snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seat(label: &str) -> SeatCode {
        label.parse().unwrap()
    }

    #[test]
    fn set_membership_and_order() {
        let set: BookedSeatSet = [seat("B1"), seat("A10"), seat("A2")].into_iter().collect();
        assert!(set.contains(seat("A2")));
        assert!(!set.contains(seat("A1")));
        assert_eq!(set.len(), 3);
        let ordered: Vec<String> = set.iter().map(|s| s.to_string()).collect();
        assert_eq!(ordered, vec!["A2", "A10", "B1"]);
    }

    #[test]
    fn duplicate_seats_collapse() {
        let set: BookedSeatSet = [seat("C3"), seat("C3")].into_iter().collect();
        assert_eq!(set.len(), 1);
    }
}
