//! selection.rs
//!
//! The seat-map state machine. Tapping a seat toggles it; the engine
//! enforces the two selection rules (never a sold seat, never more than the
//! session's cap) and keeps the running subtotal in step.

use crate::flow::availability::BookedSeatSet;
use crate::flow::error::{BookingError, SelectionError};
use crate::flow::session::{BookingSession, CheckoutOrder};
use crate::models::SeatCode;

/// Outcome of a toggle that did not violate a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
    /// The seat is already sold; the selection is unchanged.
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    Empty,
    PartiallySelected(u8),
    Full,
}

/// A booking session joined with a booked-seat snapshot. Holds the
/// invariant that no selected seat is in the snapshot and the selection
/// never exceeds the session cap.
#[derive(Debug)]
pub struct SeatSelection {
    session: BookingSession,
    booked: BookedSeatSet,
}

impl SeatSelection {
    /// Combines a session with the latest availability snapshot. Seats that
    /// were selected earlier but have sold in the meantime (a session
    /// restored after a login detour, for instance) are silently dropped.
    pub fn new(mut session: BookingSession, booked: BookedSeatSet) -> Self {
        session.retain_available(|seat| !booked.contains(seat));
        Self { session, booked }
    }

    /// Applies a tap on `seat`. Never changes the selection when it returns
    /// `Ok(Toggle::Unavailable)` or an error.
    pub fn toggle(&mut self, seat: SeatCode) -> Result<Toggle, SelectionError> {
        if self.booked.contains(seat) {
            return Ok(Toggle::Unavailable);
        }
        if self.session.contains(seat) {
            self.session.remove_seat(seat);
            return Ok(Toggle::Removed);
        }
        if self.selected().len() >= self.session.max_seats() as usize {
            return Err(SelectionError::LimitExceeded {
                max_seats: self.session.max_seats(),
            });
        }
        self.session.push_seat(seat);
        Ok(Toggle::Added)
    }

    pub fn state(&self) -> SelectionState {
        let count = self.selected().len() as u8;
        if count == 0 {
            SelectionState::Empty
        } else if count < self.session.max_seats() {
            SelectionState::PartiallySelected(count)
        } else {
            SelectionState::Full
        }
    }

    pub fn selected(&self) -> &[SeatCode] {
        self.session.selected_seats()
    }

    pub fn booked(&self) -> &BookedSeatSet {
        &self.booked
    }

    /// Seat subtotal before fee and tax.
    pub fn base_total(&self) -> i64 {
        self.session.base_total()
    }

    /// Hands the session back, e.g. to stash it across a login detour.
    pub fn into_session(self) -> BookingSession {
        self.session
    }

    /// Finalizes the pick and moves to checkout.
    pub fn checkout(self) -> Result<CheckoutOrder, BookingError> {
        self.session.checkout()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn seat(label: &str) -> SeatCode {
        label.parse().unwrap()
    }

    fn selection(max_seats: u8, booked: &[&str]) -> SeatSelection {
        let session = BookingSession::new(7, 12, max_seats, 200).unwrap();
        let booked: BookedSeatSet = booked.iter().map(|label| seat(label)).collect();
        SeatSelection::new(session, booked)
    }

    #[test]
    fn toggling_twice_is_an_involution() {
        let mut sel = selection(3, &[]);
        assert_eq!(sel.toggle(seat("A1")).unwrap(), Toggle::Added);
        assert_eq!(sel.selected(), &[seat("A1")]);
        assert_eq!(sel.toggle(seat("A1")).unwrap(), Toggle::Removed);
        assert!(sel.selected().is_empty());
    }

    #[test]
    fn booked_seats_do_not_toggle() {
        let mut sel = selection(3, &["D4"]);
        assert_eq!(sel.toggle(seat("D4")).unwrap(), Toggle::Unavailable);
        assert!(sel.selected().is_empty());
        assert_eq!(sel.state(), SelectionState::Empty);
    }

    #[test]
    fn the_cap_blocks_additions_but_allows_swaps() {
        let mut sel = selection(2, &[]);
        sel.toggle(seat("A1")).unwrap();
        sel.toggle(seat("A2")).unwrap();
        assert_eq!(sel.state(), SelectionState::Full);

        let err = sel.toggle(seat("A3")).unwrap_err();
        assert_eq!(err, SelectionError::LimitExceeded { max_seats: 2 });
        assert_eq!(sel.selected(), &[seat("A1"), seat("A2")]);

        // Removing still works at the cap, which is what makes swaps possible.
        assert_eq!(sel.toggle(seat("A1")).unwrap(), Toggle::Removed);
        assert_eq!(sel.toggle(seat("A3")).unwrap(), Toggle::Added);
        assert_eq!(sel.selected(), &[seat("A2"), seat("A3")]);
    }

    #[test]
    fn state_reports_partial_counts() {
        let mut sel = selection(3, &[]);
        assert_eq!(sel.state(), SelectionState::Empty);
        sel.toggle(seat("B1")).unwrap();
        assert_eq!(sel.state(), SelectionState::PartiallySelected(1));
        sel.toggle(seat("B2")).unwrap();
        assert_eq!(sel.state(), SelectionState::PartiallySelected(2));
        sel.toggle(seat("B3")).unwrap();
        assert_eq!(sel.state(), SelectionState::Full);
    }

    #[test]
    fn restoring_a_session_drops_seats_sold_in_the_meantime() {
        let mut session = BookingSession::new(7, 12, 3, 200).unwrap();
        session.push_seat(seat("A1"));
        session.push_seat(seat("A2"));

        let booked: BookedSeatSet = [seat("A2")].into_iter().collect();
        let sel = SeatSelection::new(session, booked);
        assert_eq!(sel.selected(), &[seat("A1")]);
    }

    #[test]
    fn subtotal_follows_toggles() {
        let mut sel = selection(3, &[]);
        sel.toggle(seat("A1")).unwrap();
        sel.toggle(seat("A2")).unwrap();
        assert_eq!(sel.base_total(), 400);
        sel.toggle(seat("A2")).unwrap();
        assert_eq!(sel.base_total(), 200);
    }

    #[test]
    fn checkout_carries_the_picked_seats() {
        let mut sel = selection(3, &[]);
        sel.toggle(seat("C1")).unwrap();
        sel.toggle(seat("C2")).unwrap();
        let order = sel.checkout().unwrap();
        assert_eq!(order.seats(), &[seat("C1"), seat("C2")]);
    }

    proptest! {
        // Any tap sequence keeps the two invariants: the cap holds and no
        // booked seat is ever selected.
        #[test]
        fn random_tap_sequences_keep_invariants(
            max_seats in 1u8..=10,
            booked_idx in proptest::collection::vec(0usize..80, 0..20),
            taps in proptest::collection::vec(0usize..80, 0..60),
        ) {
            let grid: Vec<SeatCode> = SeatCode::all().collect();
            let booked: BookedSeatSet = booked_idx.iter().map(|&i| grid[i]).collect();
            let session = BookingSession::new(1, 1, max_seats, 150).unwrap();
            let mut sel = SeatSelection::new(session, booked.clone());

            for &i in &taps {
                let _ = sel.toggle(grid[i]);
                prop_assert!(sel.selected().len() <= max_seats as usize);
                prop_assert!(sel.selected().iter().all(|s| !booked.contains(*s)));
                prop_assert_eq!(
                    sel.base_total(),
                    sel.selected().len() as i64 * 150
                );
            }
        }
    }
}
