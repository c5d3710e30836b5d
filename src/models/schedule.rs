use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    #[error("invalid schedule format: {0}")]
    InvalidScheduleFormat(String),
}

fn invalid(msg: impl Into<String>) -> ScheduleError {
    ScheduleError::InvalidScheduleFormat(msg.into())
}

/// Time of day at minute resolution, stored as minutes since midnight.
///
/// Accepts the clinic front end's `"hh:mm AM"` form as well as 24-hour
/// `"HH:MM"`, and always serializes back to the 12-hour form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WallClockTime(u16);

impl WallClockTime {
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        if hour > 23 || minute > 59 {
            return None;
        }
        Some(Self((hour * 60 + minute) as u16))
    }

    pub fn from_minutes(minutes: u32) -> Option<Self> {
        Self::from_hm(minutes / 60, minutes % 60)
    }

    pub fn minutes(self) -> u32 {
        self.0 as u32
    }

    pub fn hour(self) -> u32 {
        self.minutes() / 60
    }

    pub fn minute(self) -> u32 {
        self.minutes() % 60
    }

    pub fn parse(s: &str) -> Result<Self, ScheduleError> {
        let trimmed = s.trim();
        let (clock, meridiem) = match trimmed.rsplit_once(' ') {
            Some((clock, m)) => (clock.trim(), Some(m.to_ascii_uppercase())),
            None => (trimmed, None),
        };

        let (h, m) = clock
            .split_once(':')
            .ok_or_else(|| invalid(format!("expected hh:mm in: {s}")))?;
        if !(1..=2).contains(&h.len()) || !h.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid(format!("invalid hour in: {s}")));
        }
        if m.len() != 2 || !m.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid(format!("invalid minute in: {s}")));
        }
        let hour: u32 = h
            .parse()
            .map_err(|_| invalid(format!("invalid hour in: {s}")))?;
        let minute: u32 = m
            .parse()
            .map_err(|_| invalid(format!("invalid minute in: {s}")))?;
        if minute > 59 {
            return Err(invalid(format!("invalid minute in: {s}")));
        }

        let hour = match meridiem.as_deref() {
            Some(suffix @ ("AM" | "PM")) => {
                if !(1..=12).contains(&hour) {
                    return Err(invalid(format!("hour out of range: {s}")));
                }
                if suffix == "AM" {
                    hour % 12
                } else {
                    hour % 12 + 12
                }
            }
            Some(other) => return Err(invalid(format!("unknown meridiem {other} in: {s}"))),
            None => hour,
        };

        Self::from_hm(hour, minute).ok_or_else(|| invalid(format!("time out of range: {s}")))
    }

    /// Canonical 24-hour form, used for storage so that string order is time order.
    pub fn to_24h(self) -> String {
        format!("{:02}:{:02}", self.hour(), self.minute())
    }
}

impl fmt::Display for WallClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (hour12, suffix) = match self.hour() {
            0 => (12, "AM"),
            h @ 1..=11 => (h, "AM"),
            12 => (12, "PM"),
            h => (h - 12, "PM"),
        };
        write!(f, "{hour12:02}:{:02} {suffix}", self.minute())
    }
}

impl TryFrom<String> for WallClockTime {
    type Error = ScheduleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<WallClockTime> for String {
    fn from(value: WallClockTime) -> Self {
        value.to_string()
    }
}

/// Clinic week, ordered the way the clinic lists it (Saturday first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Saturday,
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Saturday,
        Weekday::Sunday,
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
    ];

    pub fn of(date: NaiveDate) -> Self {
        match date.weekday() {
            chrono::Weekday::Sat => Weekday::Saturday,
            chrono::Weekday::Sun => Weekday::Sunday,
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Saturday => "saturday",
            Weekday::Sunday => "sunday",
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.to_lowercase();
        Self::ALL.into_iter().find(|d| d.as_str() == lower)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySchedule {
    pub is_closed: bool,
    pub from: WallClockTime,
    pub to: WallClockTime,
}

impl DaySchedule {
    pub fn open(from: WallClockTime, to: WallClockTime) -> Self {
        Self {
            is_closed: false,
            from,
            to,
        }
    }

    pub fn validate(&self) -> Result<(), ScheduleError> {
        if !self.is_closed && self.from >= self.to {
            return Err(invalid(format!(
                "opening time {} must be before closing time {}",
                self.from, self.to
            )));
        }
        Ok(())
    }
}

/// Weekly open hours of the clinic. Days without an entry are treated as closed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClinicSchedule {
    pub days: BTreeMap<Weekday, DaySchedule>,
}

impl ClinicSchedule {
    pub fn from_json(s: &str) -> Result<Self, ScheduleError> {
        let schedule: ClinicSchedule =
            serde_json::from_str(s).map_err(|e| invalid(e.to_string()))?;
        schedule.validate()?;
        Ok(schedule)
    }

    pub fn validate(&self) -> Result<(), ScheduleError> {
        for (day, hours) in &self.days {
            hours
                .validate()
                .map_err(|ScheduleError::InvalidScheduleFormat(msg)| {
                    invalid(format!("{}: {msg}", day.as_str()))
                })?;
        }
        Ok(())
    }

    pub fn day(&self, weekday: Weekday) -> Option<&DaySchedule> {
        self.days.get(&weekday)
    }

    pub fn for_date(&self, date: NaiveDate) -> Option<&DaySchedule> {
        self.day(Weekday::of(date))
    }

    pub fn to_human_readable(&self) -> String {
        self.days
            .iter()
            .filter(|(_, hours)| !hours.is_closed)
            .map(|(day, hours)| format!("{}: {}-{}", capitalize(day.as_str()), hours.from, hours.to))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn capitalize(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        None => String::new(),
        Some(f) => f.to_uppercase().to_string() + c.as_str(),
    }
}
