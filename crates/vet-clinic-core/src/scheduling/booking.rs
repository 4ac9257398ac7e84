//! Booking service: grid and date checks in front of the booking transaction.

use chrono::NaiveDate;

use super::{ScheduleError, ScheduleResult};
use crate::config::ScheduleConfig;
use crate::db::Database;
use crate::models::{BookingConfirmation, BookingRequest};

/// Validates booking requests against the clinic calendar.
pub struct Booking<'a> {
    db: &'a Database,
    config: &'a ScheduleConfig,
}

impl<'a> Booking<'a> {
    pub fn new(db: &'a Database, config: &'a ScheduleConfig) -> Self {
        Self { db, config }
    }

    /// Book a visit.
    ///
    /// The date must not be before `today` and the time must be one of the
    /// grid slots. Reference and double-booking checks happen inside the
    /// database transaction.
    pub fn book(
        &self,
        request: &BookingRequest,
        today: NaiveDate,
    ) -> ScheduleResult<BookingConfirmation> {
        if request.date < today {
            return Err(ScheduleError::DateInPast(request.date));
        }
        if !self.config.is_on_grid(request.time) {
            return Err(ScheduleError::OffGrid(
                request.time.format("%H:%M").to_string(),
            ));
        }

        Ok(self.db.book_appointment(request)?)
    }
}
