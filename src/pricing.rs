//! Price computation shared by the checkout flow and the booking endpoint.
//!
//! Both sides run the same formula so the total a customer reviews is the
//! total the server charges:
//!
//! ```text
//! base   = seats * price_per_seat
//! fee    = seats * CONVENIENCE_FEE_PER_SEAT
//! tax    = base * TAX_RATE
//! total  = floor(base + fee + tax)
//! ```

use serde::Serialize;

/// Flat convenience fee charged per seat, in whole currency units.
pub const CONVENIENCE_FEE_PER_SEAT: i64 = 30;

/// Tax applied to the seat subtotal only. The convenience fee is not taxed.
pub const TAX_RATE: f64 = 0.18;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceBreakdown {
    pub seat_count: u32,
    pub price_per_seat: i64,
    pub base_total: i64,
    pub convenience_fee: i64,
    pub tax: f64,
    pub grand_total: i64,
}

impl PriceBreakdown {
    /// Computes the full breakdown for `seat_count` seats at a uniform
    /// per-seat price. The grand total rounds down to a whole unit; the
    /// fractional tax remainder is kept only for display.
    pub fn compute(seat_count: u32, price_per_seat: i64) -> Self {
        let seats = seat_count as i64;
        let base_total = seats * price_per_seat;
        let convenience_fee = seats * CONVENIENCE_FEE_PER_SEAT;
        let tax = base_total as f64 * TAX_RATE;
        let grand_total = ((base_total + convenience_fee) as f64 + tax).floor() as i64;
        PriceBreakdown {
            seat_count,
            price_per_seat,
            base_total,
            convenience_fee,
            tax,
            grand_total,
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn three_seats_at_two_hundred() {
        let breakdown = PriceBreakdown::compute(3, 200);
        assert_eq!(breakdown.base_total, 600);
        assert_eq!(breakdown.convenience_fee, 90);
        assert_eq!(breakdown.tax, 108.0);
        assert_eq!(breakdown.grand_total, 798);
    }

    #[test]
    fn no_seats_costs_nothing() {
        let breakdown = PriceBreakdown::compute(0, 250);
        assert_eq!(breakdown.base_total, 0);
        assert_eq!(breakdown.convenience_fee, 0);
        assert_eq!(breakdown.tax, 0.0);
        assert_eq!(breakdown.grand_total, 0);
    }

    #[test]
    fn fractional_tax_rounds_down() {
        // base 150, fee 30, tax 27.0 -> 207; base 155 gives tax 27.9 -> 212
        assert_eq!(PriceBreakdown::compute(1, 150).grand_total, 207);
        assert_eq!(PriceBreakdown::compute(1, 155).grand_total, 212);
    }

    #[test]
    fn same_inputs_same_total() {
        let a = PriceBreakdown::compute(7, 433);
        let b = PriceBreakdown::compute(7, 433);
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn grand_total_never_exceeds_components(seats in 0u32..=10, price in 0i64..=1_000_000) {
            let b = PriceBreakdown::compute(seats, price);
            let exact = (b.base_total + b.convenience_fee) as f64 + b.tax;
            prop_assert!(b.grand_total as f64 <= exact);
            prop_assert!(exact - (b.grand_total as f64) < 1.0);
        }

        #[test]
        fn adding_a_seat_never_lowers_the_total(seats in 0u32..10, price in 0i64..=1_000_000) {
            let smaller = PriceBreakdown::compute(seats, price);
            let larger = PriceBreakdown::compute(seats + 1, price);
            prop_assert!(larger.grand_total >= smaller.grand_total);
        }
    }
}
