//! Appointment slot availability and booking.
//!
//! The clinic works on a fixed grid: from opening to closing time inclusive,
//! one slot every `slot_minutes`. A slot is free for a day unless a
//! non-cancelled appointment already occupies it.

mod booking;
mod slots;

pub use booking::*;
pub use slots::*;

use chrono::NaiveDate;
use thiserror::Error;

use crate::db::DbError;

/// Scheduling errors.
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Date {0} is in the past")]
    DateInPast(NaiveDate),

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Time {0} is outside the appointment grid")]
    OffGrid(String),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
