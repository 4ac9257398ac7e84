//! Appointment models for booking, client history and staff schedules.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Status persisted in the `appointments` table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoredStatus {
    /// Booked, visit not yet recorded
    Scheduled,
    /// Visit recorded by a veterinarian
    Completed,
    /// Cancelled by staff; frees the slot
    Cancelled,
}

impl StoredStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            StoredStatus::Scheduled => "scheduled",
            StoredStatus::Completed => "completed",
            StoredStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "scheduled" => Some(StoredStatus::Scheduled),
            "completed" => Some(StoredStatus::Completed),
            "cancelled" => Some(StoredStatus::Cancelled),
            _ => None,
        }
    }
}

/// Clients may cancel a booking up to this many hours before it starts.
pub const CLIENT_CANCEL_NOTICE_HOURS: i64 = 2;

/// Whether a client may still cancel a visit starting at `starts_at`.
pub fn client_may_cancel(starts_at: NaiveDateTime, now: NaiveDateTime) -> bool {
    starts_at - now >= Duration::hours(CLIENT_CANCEL_NOTICE_HOURS)
}

/// Status as presented to users, derived from the stored status and the clock.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Upcoming,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn label(self) -> &'static str {
        match self {
            AppointmentStatus::Upcoming => "Upcoming",
            AppointmentStatus::Completed => "Completed",
            AppointmentStatus::Cancelled => "Cancelled",
        }
    }
}

/// Client-side appointment list filter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentFilter {
    #[default]
    All,
    Upcoming,
    Past,
}

impl AppointmentFilter {
    /// Check whether a derived status passes the filter.
    ///
    /// Cancelled appointments are only listed under `All`.
    pub fn matches(self, status: AppointmentStatus) -> bool {
        match self {
            AppointmentFilter::All => true,
            AppointmentFilter::Upcoming => status == AppointmentStatus::Upcoming,
            AppointmentFilter::Past => status == AppointmentStatus::Completed,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "all" => Some(AppointmentFilter::All),
            "upcoming" => Some(AppointmentFilter::Upcoming),
            "past" => Some(AppointmentFilter::Past),
            _ => None,
        }
    }

    /// Message shown when the filtered list is empty.
    pub fn empty_message(self) -> &'static str {
        match self {
            AppointmentFilter::All => "You have no appointments yet.",
            AppointmentFilter::Upcoming => "You have no upcoming appointments.",
            AppointmentFilter::Past => "You have no past appointments.",
        }
    }
}

/// An appointment as seen by the client who booked it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub appointment_id: i64,
    pub client_id: i64,
    pub veterinarian_id: i64,
    pub veterinarian_name: String,
    pub service_id: i64,
    pub service_name: String,
    pub pet_id: Option<i64>,
    pub pet_name: Option<String>,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    /// Service price at query time, minor units
    pub price_cents: i64,
    pub stored_status: StoredStatus,
    pub booked_at: String,
}

impl Appointment {
    /// Combined date and time of the visit.
    pub fn starts_at(&self) -> NaiveDateTime {
        self.appointment_date.and_time(self.appointment_time)
    }

    /// Derive the user-facing status at `now`.
    ///
    /// A scheduled appointment whose start lies strictly before `now` is
    /// reported as completed.
    pub fn status_at(&self, now: NaiveDateTime) -> AppointmentStatus {
        match self.stored_status {
            StoredStatus::Cancelled => AppointmentStatus::Cancelled,
            StoredStatus::Completed => AppointmentStatus::Completed,
            StoredStatus::Scheduled if self.starts_at() < now => AppointmentStatus::Completed,
            StoredStatus::Scheduled => AppointmentStatus::Upcoming,
        }
    }

    /// Whether the client may cancel at `now`: still scheduled and far enough ahead.
    pub fn can_be_cancelled_at(&self, now: NaiveDateTime) -> bool {
        self.stored_status == StoredStatus::Scheduled && client_may_cancel(self.starts_at(), now)
    }

    /// "dd.mm.yyyy HH:MM"
    pub fn formatted_date_time(&self) -> String {
        format!(
            "{} {}",
            self.appointment_date.format("%d.%m.%Y"),
            self.appointment_time.format("%H:%M")
        )
    }
}

/// Filter appointments by derived status at `now`.
pub fn filter_appointments(
    appointments: &[Appointment],
    filter: AppointmentFilter,
    now: NaiveDateTime,
) -> Vec<Appointment> {
    appointments
        .iter()
        .filter(|a| filter.matches(a.status_at(now)))
        .cloned()
        .collect()
}

/// Everything needed to book a visit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingRequest {
    pub client_id: i64,
    pub service_id: i64,
    pub veterinarian_id: i64,
    pub pet_id: i64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    /// Owner's description of the problem
    pub complaints: Option<String>,
    /// Free-form notes for the veterinarian
    pub additional_info: Option<String>,
}

/// Result of a successful booking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingConfirmation {
    pub appointment_id: i64,
    /// Initial medical record created with the booking
    pub medical_record_id: i64,
    pub service_name: String,
    pub veterinarian_name: String,
    pub pet_name: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub price_cents: i64,
}

/// An appointment as seen on a veterinarian's schedule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleEntry {
    pub appointment_id: i64,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub client_name: String,
    pub client_phone: String,
    pub service_name: String,
    pub pet_name: Option<String>,
    pub status: StoredStatus,
    pub notes: Option<String>,
}

impl ScheduleEntry {
    fn matches(&self, needle: &str) -> bool {
        self.client_name.to_lowercase().contains(needle)
            || self.service_name.to_lowercase().contains(needle)
            || self
                .pet_name
                .as_ref()
                .is_some_and(|p| p.to_lowercase().contains(needle))
            || self
                .notes
                .as_ref()
                .is_some_and(|n| n.to_lowercase().contains(needle))
    }
}

/// One day of a veterinarian's schedule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DaySchedule {
    pub date: NaiveDate,
    pub entries: Vec<ScheduleEntry>,
}

/// Group schedule entries by date, ordered by date then time.
pub fn group_schedule_by_day(entries: Vec<ScheduleEntry>) -> Vec<DaySchedule> {
    let mut entries = entries;
    entries.sort_by_key(|e| (e.appointment_date, e.appointment_time));

    let mut days: Vec<DaySchedule> = Vec::new();
    for entry in entries {
        match days.last_mut() {
            Some(day) if day.date == entry.appointment_date => day.entries.push(entry),
            _ => days.push(DaySchedule {
                date: entry.appointment_date,
                entries: vec![entry],
            }),
        }
    }
    days
}

/// Case-insensitive search over a grouped schedule. Days left empty are dropped.
pub fn search_schedule(days: &[DaySchedule], query: &str) -> Vec<DaySchedule> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return days.to_vec();
    }

    days.iter()
        .map(|day| DaySchedule {
            date: day.date,
            entries: day
                .entries
                .iter()
                .filter(|e| e.matches(&needle))
                .cloned()
                .collect(),
        })
        .filter(|day| !day.entries.is_empty())
        .collect()
}
