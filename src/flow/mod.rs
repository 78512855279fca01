//! Client-side booking flow: everything between "pick a show" and "hold a
//! confirmed booking".
//!
//! The flow is a pipeline of typed stages:
//!
//! 1. [`BookingSession`]: chosen show, seat-count cap, selection so far.
//! 2. [`SeatSelection`]: the session joined with a [`BookedSeatSet`]
//!    snapshot; enforces the toggle rules.
//! 3. [`CheckoutOrder`]: a finalized, non-empty seat pick with its
//!    [`PriceBreakdown`](crate::pricing::PriceBreakdown).
//! 4. [`Submission`]: the order plus its idempotency key, sent through the
//!    single-flight [`CheckoutSubmitter`].
//! 5. [`ConfirmationContext`]: renders the [`Receipt`], falling back to a
//!    marked local reference when the server one got lost in the handoff.
//!
//! Stage handoffs serialize to the storefront's query-string payloads, so a
//! descriptor can cross a page boundary (or a login detour via
//! [`SessionStash`]) and be revalidated on the way back in.

pub mod api;
pub mod availability;
pub mod checkout;
pub mod error;
pub mod receipt;
pub mod selection;
pub mod session;
pub mod stash;

pub use api::{ApiClient, BookingConfirmation, BookingRequest};
pub use availability::{AvailabilityTracker, BookedSeatSet};
pub use checkout::{BookingReceipt, CheckoutSubmitter, Submission};
pub use error::{BookingError, SelectionError};
pub use receipt::{ConfirmationContext, Receipt, ReferenceSource};
pub use selection::{SeatSelection, SelectionState, Toggle};
pub use session::{BookingSession, CheckoutOrder, MAX_SEATS_PER_BOOKING};
pub use stash::{SessionStash, DEFAULT_STASH_TTL};
