pub mod admin;
pub mod bookings;
pub mod calendar;
pub mod clinic;
pub mod health;

use std::sync::Arc;

use axum::routing::{get, patch, post, put};
use axum::Router;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/services", get(clinic::list_services))
        .route("/api/schedule", get(clinic::get_schedule))
        .route("/api/availability", get(clinic::get_availability))
        .route("/api/bookings", post(bookings::create_booking))
        .route("/api/bookings/client", get(bookings::client_bookings))
        .route("/api/bookings/:id/cancel", post(bookings::cancel_booking))
        .route("/calendar/:booking_id", get(calendar::download_ics))
        .route("/api/admin/bookings", get(admin::get_bookings))
        .route("/api/admin/bookings/:id", patch(admin::update_booking_status))
        .route("/api/admin/schedule", put(admin::put_schedule))
        .route("/api/admin/services", post(admin::save_service))
        .route("/api/admin/notifications", get(admin::get_notifications))
        .route(
            "/api/admin/notifications/:id/read",
            post(admin::mark_notification_read),
        )
        .route(
            "/api/admin/notifications/events",
            get(admin::notification_events),
        )
        .with_state(state)
}
