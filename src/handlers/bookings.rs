use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Booking, BookingRequest};
use crate::services::booking;
use crate::state::AppState;

// POST /api/bookings
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let booking = booking::submit_booking(&state, request).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

// GET /api/bookings/client?phone=
#[derive(Deserialize)]
pub struct ClientBookingsQuery {
    pub phone: Option<String>,
}

pub async fn client_bookings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ClientBookingsQuery>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let phone = query
        .phone
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::BadRequest("phone is required".to_string()))?;

    let bookings = {
        let db = state.db()?;
        queries::get_bookings_for_phone(&db, phone)?
    };
    Ok(Json(bookings))
}

// POST /api/bookings/:id/cancel
#[derive(Deserialize)]
pub struct CancelRequest {
    pub phone: String,
}

pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<CancelRequest>,
) -> Result<Json<Booking>, AppError> {
    let booking = booking::cancel_booking(&state, &id, &body.phone).await?;
    Ok(Json(booking))
}
