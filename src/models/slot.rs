use chrono::NaiveDate;
use serde::Serialize;

use super::WallClockTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeSlot {
    pub date: NaiveDate,
    pub start: WallClockTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnnotatedSlot {
    #[serde(flatten)]
    pub slot: TimeSlot,
    pub available: bool,
}

/// Point-in-time availability for a single date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailabilitySnapshot {
    pub date: NaiveDate,
    pub slots: Vec<AnnotatedSlot>,
}

impl AvailabilitySnapshot {
    pub fn is_available(&self, date: NaiveDate, time: WallClockTime) -> bool {
        self.date == date
            && self
                .slots
                .iter()
                .any(|s| s.slot.start == time && s.available)
    }

    pub fn available_count(&self) -> usize {
        self.slots.iter().filter(|s| s.available).count()
    }
}
