pub mod availability;
pub mod booking;
pub mod calendar;
pub mod notifications;
pub mod slots;
pub mod validation;
