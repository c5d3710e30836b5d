use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::sse::{Event, Sse};
use axum::Json;
use serde::Deserialize;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Booking, BookingStatus, ClinicSchedule, ClinicService, Notification};
use crate::services::booking;
use crate::services::validation::parse_date;
use crate::state::AppState;

fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token.is_empty() || token != expected_token {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

// GET /api/admin/bookings
#[derive(Deserialize)]
pub struct BookingsQuery {
    pub date: Option<String>,
    pub status: Option<String>,
    pub limit: Option<i64>,
}

pub async fn get_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Vec<Booking>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let date = query.date.as_deref().map(parse_date).transpose()?;
    let status = query
        .status
        .as_deref()
        .map(|s| {
            BookingStatus::parse(s).ok_or_else(|| AppError::BadRequest(format!("unknown status: {s}")))
        })
        .transpose()?;
    let limit = query.limit.unwrap_or(50).clamp(1, 500);

    let bookings = {
        let db = state.db()?;
        queries::get_all_bookings(&db, date, status, limit)?
    };
    Ok(Json(bookings))
}

// PATCH /api/admin/bookings/:id
#[derive(Deserialize)]
pub struct StatusUpdate {
    pub status: BookingStatus,
}

pub async fn update_booking_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<StatusUpdate>,
) -> Result<Json<Booking>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let booking = booking::update_booking_status(&state, &id, body.status)?;
    Ok(Json(booking))
}

// PUT /api/admin/schedule
pub async fn put_schedule(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<ClinicSchedule>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let schedule = ClinicSchedule::from_json(&body)?;
    {
        let db = state.db()?;
        queries::save_schedule(&db, &schedule)?;
    }
    tracing::info!(hours = %schedule.to_human_readable(), "clinic schedule updated");
    Ok(Json(schedule))
}

// POST /api/admin/services
pub async fn save_service(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(service): Json<ClinicService>,
) -> Result<Json<ClinicService>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    if service.id.trim().is_empty() || service.title.trim().is_empty() {
        return Err(AppError::BadRequest("service id and title are required".to_string()));
    }
    {
        let db = state.db()?;
        queries::save_service(&db, &service)?;
    }
    Ok(Json(service))
}

// GET /api/admin/notifications
#[derive(Deserialize)]
pub struct NotificationsQuery {
    pub unread: Option<bool>,
    pub limit: Option<i64>,
}

pub async fn get_notifications(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<NotificationsQuery>,
) -> Result<Json<Vec<Notification>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let limit = query.limit.unwrap_or(50).clamp(1, 500);

    let notifications = {
        let db = state.db()?;
        queries::list_notifications(&db, query.unread.unwrap_or(false), limit)?
    };
    Ok(Json(notifications))
}

// POST /api/admin/notifications/:id/read
pub async fn mark_notification_read(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let updated = {
        let db = state.db()?;
        queries::mark_notification_read(&db, id)?
    };
    if !updated {
        return Err(AppError::NotFound(format!("notification {id}")));
    }
    Ok(Json(serde_json::json!({"ok": true})))
}

// GET /api/admin/notifications/events — SSE stream
#[derive(Deserialize)]
pub struct SseQuery {
    pub token: Option<String>,
    pub last_id: Option<i64>,
}

pub async fn notification_events(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SseQuery>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>>, AppError> {
    // EventSource cannot set headers, so the token comes in the query string
    let token = query.token.as_deref().unwrap_or("");
    if token.is_empty() || token != state.config.admin_token {
        return Err(AppError::Unauthorized);
    }

    let rx = state.notifications_tx.subscribe();
    let catchup = match query.last_id {
        Some(last_id) => {
            let db = state.db()?;
            queries::get_notifications_since(&db, last_id)?
        }
        None => vec![],
    };

    let catchup_stream = tokio_stream::iter(
        catchup
            .into_iter()
            .map(|n| Ok::<_, Infallible>(notification_event(&n))),
    );

    let live_stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(n) => Some(Ok(notification_event(&n))),
        Err(tokio_stream::wrappers::errors::BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(skipped, "notification stream lagged");
            None
        }
    });

    let keepalive_stream = tokio_stream::wrappers::IntervalStream::new(tokio::time::interval(
        Duration::from_secs(30),
    ))
    .map(|_| Ok(Event::default().comment("keepalive")));

    Ok(Sse::new(catchup_stream.chain(live_stream).merge(keepalive_stream)))
}

fn notification_event(notification: &Notification) -> Event {
    let data = serde_json::to_string(notification).unwrap_or_default();
    Event::default()
        .id(notification.id.to_string())
        .event("notification")
        .data(data)
}
