pub mod booking;
pub mod notification;
pub mod schedule;
pub mod service;
pub mod slot;

pub use booking::{Booking, BookingRequest, BookingStatus, ValidatedBooking};
pub use notification::{NewNotification, Notification, NotificationKind};
pub use schedule::{ClinicSchedule, DaySchedule, ScheduleError, WallClockTime, Weekday};
pub use service::ClinicService;
pub use slot::{AnnotatedSlot, AvailabilitySnapshot, TimeSlot};
