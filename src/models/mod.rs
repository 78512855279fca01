pub mod booking;
pub mod event;
pub mod seat;
pub mod show;

pub use booking::Booking;
pub use event::Event;
pub use seat::{InvalidSeatCode, SeatCode, SeatTier};
pub use show::Show;
