use chrono::NaiveDate;

use crate::models::{DaySchedule, TimeSlot, WallClockTime};

pub const SLOT_DURATION_MINUTES: u32 = 30;

/// Bookable slots for `date`, in chronological order.
///
/// A slot is emitted only if it ends at or before closing time, so a clinic
/// open 09:00 AM to 05:00 PM yields a last slot at 04:30 PM. Closed days and
/// days without hours yield nothing.
pub fn generate_slots(
    date: NaiveDate,
    day: Option<&DaySchedule>,
    slot_duration_minutes: u32,
) -> Vec<TimeSlot> {
    let Some(day) = day else {
        return vec![];
    };
    if day.is_closed || slot_duration_minutes == 0 {
        return vec![];
    }

    let close = day.to.minutes();
    let mut current = day.from.minutes();
    let mut slots = vec![];

    while current + slot_duration_minutes <= close {
        if let Some(start) = WallClockTime::from_minutes(current) {
            slots.push(TimeSlot { date, start });
        }
        current += slot_duration_minutes;
    }

    slots
}
