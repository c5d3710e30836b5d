use std::collections::HashSet;

use chrono::NaiveDate;

use crate::models::{AnnotatedSlot, AvailabilitySnapshot, Booking, DaySchedule, WallClockTime};
use crate::services::slots::{generate_slots, SLOT_DURATION_MINUTES};

/// Annotates every slot of `date` with whether it can still be booked.
///
/// A slot is taken iff some booking on the same date and start time is in a
/// non-terminal status. Bookings for other dates are ignored.
pub fn resolve_availability(
    date: NaiveDate,
    day: Option<&DaySchedule>,
    bookings: &[Booking],
) -> AvailabilitySnapshot {
    let occupied: HashSet<WallClockTime> = bookings
        .iter()
        .filter(|b| b.date == date && b.status.occupies_slot())
        .map(|b| b.time)
        .collect();

    let slots = generate_slots(date, day, SLOT_DURATION_MINUTES)
        .into_iter()
        .map(|slot| AnnotatedSlot {
            available: !occupied.contains(&slot.start),
            slot,
        })
        .collect();

    AvailabilitySnapshot { date, slots }
}
