pub mod bookings;
pub mod events;
pub mod reports;
pub mod users;

use std::sync::Arc;

use axum::Router;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(events::routes())
        .merge(bookings::routes())
        .merge(reports::routes())
        .merge(users::routes())
}
