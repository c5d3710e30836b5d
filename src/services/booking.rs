use chrono::{NaiveDate, Utc};
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::queries;
use crate::models::{AvailabilitySnapshot, Booking, BookingRequest, BookingStatus, NewNotification, ValidatedBooking};
use crate::services::availability::resolve_availability;
use crate::services::validation::{parse_date, validate_booking, ValidationError};
use crate::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("the time slot is already booked")]
    Conflict,

    #[error("unknown or inactive service: {0}")]
    UnknownService(String),

    #[error("booking not found: {0}")]
    NotFound(String),

    #[error("cannot change booking from {} to {}", .from.as_str(), .to.as_str())]
    InvalidTransition { from: BookingStatus, to: BookingStatus },

    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Submitting,
    Committed { booking_id: String },
    Failed { reason: String },
}

/// Tracks one booking attempt through `Idle -> Submitting -> Committed | Failed`.
#[derive(Debug)]
pub struct Submission {
    state: SubmissionState,
}

impl Default for Submission {
    fn default() -> Self {
        Self {
            state: SubmissionState::Idle,
        }
    }
}

impl Submission {
    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn begin(&mut self) {
        if self.state == SubmissionState::Idle {
            self.state = SubmissionState::Submitting;
        } else {
            tracing::warn!(state = ?self.state, "booking submission started twice");
        }
    }

    pub fn commit(&mut self, booking_id: &str) {
        if self.state == SubmissionState::Submitting {
            tracing::info!(booking_id, "booking committed");
            self.state = SubmissionState::Committed {
                booking_id: booking_id.to_string(),
            };
        }
    }

    pub fn fail(&mut self, reason: &str) {
        if self.state == SubmissionState::Submitting {
            tracing::warn!(reason, "booking commit failed");
            self.state = SubmissionState::Failed {
                reason: reason.to_string(),
            };
        }
    }
}

/// Availability for `date` from the current schedule and booking ledger.
pub fn availability_for(conn: &Connection, date: NaiveDate) -> anyhow::Result<AvailabilitySnapshot> {
    let schedule = queries::get_schedule(conn)?;
    let ledger = queries::get_bookings_for_date(conn, date)?;
    Ok(resolve_availability(date, schedule.for_date(date), &ledger))
}

/// Runs the submission checks against a fresh read of the ledger.
pub fn prepare_booking(
    conn: &Connection,
    request: &BookingRequest,
    today: NaiveDate,
) -> Result<ValidatedBooking, BookingError> {
    // An unparseable date gets no snapshot of its own; the validator reports
    // the earlier failing check or the date error itself.
    let availability = match parse_date(&request.date) {
        Ok(date) => availability_for(conn, date)?,
        Err(_) => AvailabilitySnapshot {
            date: today,
            slots: vec![],
        },
    };

    let validated = validate_booking(request, &availability, today)?;

    match queries::get_service(conn, &validated.service_id)? {
        Some(service) if service.is_active => Ok(validated),
        _ => Err(BookingError::UnknownService(validated.service_id)),
    }
}

pub async fn submit_booking(state: &AppState, request: BookingRequest) -> Result<Booking, BookingError> {
    let today = state.config.clinic_today();
    let mut submission = Submission::default();

    let outcome = {
        let db = state.db()?;
        match prepare_booking(&db, &request, today) {
            Ok(validated) => {
                submission.begin();
                let booking =
                    validated.into_booking(Uuid::new_v4().to_string(), Utc::now().naive_utc());
                match queries::create_booking(&db, &booking) {
                    Ok(true) => Ok(booking),
                    Ok(false) => Err(BookingError::Conflict),
                    Err(e) => Err(BookingError::Storage(e)),
                }
            }
            // The re-read itself failed, so the attempt counts as a failed commit
            Err(BookingError::Storage(e)) => {
                submission.begin();
                Err(BookingError::Storage(e))
            }
            Err(e) => return Err(e),
        }
    };

    match outcome {
        Ok(booking) => {
            submission.commit(&booking.id);
            tracing::info!(
                booking_id = %booking.id,
                date = %booking.date,
                time = %booking.time,
                service_id = %booking.service_id,
                "booking created"
            );
            state
                .notifier
                .emit(NewNotification::booking_created(
                    &booking.id,
                    &booking.client_name,
                    &describe_slot(&booking),
                ))
                .await;
            Ok(booking)
        }
        Err(e) => {
            submission.fail(&e.to_string());
            state
                .notifier
                .emit(NewNotification::booking_failed(&format!(
                    "{} for {} at {}: {e}",
                    request.name.trim(),
                    request.date.trim(),
                    request.time.trim()
                )))
                .await;
            Err(e)
        }
    }
}

/// Client-initiated cancellation. The caller proves ownership with the phone
/// number the booking was made with; a mismatch looks like a missing booking.
pub async fn cancel_booking(state: &AppState, id: &str, phone: &str) -> Result<Booking, BookingError> {
    let booking = {
        let db = state.db()?;
        let booking = queries::get_booking_by_id(&db, id)?
            .filter(|b| b.client_phone == phone.trim())
            .ok_or_else(|| BookingError::NotFound(id.to_string()))?;
        apply_transition(&db, booking, BookingStatus::Cancelled)?
    };

    tracing::info!(booking_id = %booking.id, date = %booking.date, time = %booking.time, "booking cancelled by client");
    state
        .notifier
        .emit(NewNotification::booking_cancelled(
            &booking.id,
            &booking.client_name,
            &describe_slot(&booking),
        ))
        .await;
    Ok(booking)
}

/// Staff-facing lifecycle change.
pub fn update_booking_status(state: &AppState, id: &str, next: BookingStatus) -> Result<Booking, BookingError> {
    let db = state.db()?;
    let booking = queries::get_booking_by_id(&db, id)?
        .ok_or_else(|| BookingError::NotFound(id.to_string()))?;
    let booking = apply_transition(&db, booking, next)?;
    tracing::info!(booking_id = %booking.id, status = booking.status.as_str(), "booking status updated");
    Ok(booking)
}

fn apply_transition(conn: &Connection, mut booking: Booking, next: BookingStatus) -> Result<Booking, BookingError> {
    if !booking.status.can_transition_to(next) {
        return Err(BookingError::InvalidTransition {
            from: booking.status,
            to: next,
        });
    }
    if !queries::update_booking_status(conn, &booking.id, next)? {
        return Err(BookingError::NotFound(booking.id));
    }
    booking.status = next;
    booking.updated_at = Utc::now().naive_utc();
    Ok(booking)
}

fn describe_slot(booking: &Booking) -> String {
    format!("{} at {}", booking.date.format("%A %Y-%m-%d"), booking.time)
}
