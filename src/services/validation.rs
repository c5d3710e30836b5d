use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::models::{AvailabilitySnapshot, BookingRequest, BookingStatus, ValidatedBooking, WallClockTime};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("phone must be an Egyptian mobile number (010, 011, 012 or 015 followed by 8 digits)")]
    InvalidPhone,

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("cannot book a date in the past")]
    PastDate,

    #[error("the requested time slot is not available")]
    SlotUnavailable,
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingField(_) => "missing_field",
            ValidationError::InvalidPhone => "invalid_phone",
            ValidationError::InvalidDate(_) => "invalid_date",
            ValidationError::PastDate => "past_date",
            ValidationError::SlotUnavailable => "slot_unavailable",
        }
    }
}

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(010|011|012|015)[0-9]{8}$").expect("valid phone regex"))
}

pub fn is_valid_phone(phone: &str) -> bool {
    phone_pattern().is_match(phone)
}

pub fn parse_date(s: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(s.to_string()))
}

/// Checks a booking request against a freshly resolved availability snapshot.
///
/// Checks run in a fixed order and stop at the first failure: required
/// fields, phone format, date, then slot availability. `today` is the
/// clinic-local calendar date.
pub fn validate_booking(
    request: &BookingRequest,
    availability: &AvailabilitySnapshot,
    today: NaiveDate,
) -> Result<ValidatedBooking, ValidationError> {
    let required = [
        ("name", &request.name),
        ("phone", &request.phone),
        ("serviceId", &request.service_id),
        ("date", &request.date),
        ("time", &request.time),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(ValidationError::MissingField(field));
        }
    }

    let phone = request.phone.trim();
    if !is_valid_phone(phone) {
        return Err(ValidationError::InvalidPhone);
    }

    let date = parse_date(&request.date)?;
    if date < today {
        return Err(ValidationError::PastDate);
    }

    let time = WallClockTime::parse(&request.time).map_err(|_| ValidationError::SlotUnavailable)?;
    if !availability.is_available(date, time) {
        return Err(ValidationError::SlotUnavailable);
    }

    Ok(ValidatedBooking {
        service_id: request.service_id.trim().to_string(),
        date,
        time,
        status: BookingStatus::Pending,
        client_name: request.name.trim().to_string(),
        client_phone: phone.to_string(),
        client_email: non_empty(&request.email),
        message: non_empty(&request.message),
        user_id: non_empty(&request.user_id),
    })
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
