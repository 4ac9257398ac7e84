//! Slot grid generation and availability.

use chrono::{Duration, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use super::{ScheduleError, ScheduleResult};
use crate::config::ScheduleConfig;
use crate::db::Database;

/// A bookable start time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeSlot {
    pub time: NaiveTime,
}

impl TimeSlot {
    pub fn new(time: NaiveTime) -> Self {
        Self { time }
    }

    pub fn day_part(&self) -> DayPart {
        DayPart::of(self.time)
    }

    /// "HH:MM"
    pub fn label(&self) -> String {
        self.time.format("%H:%M").to_string()
    }
}

/// Section of the day a slot is listed under.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DayPart {
    /// Before 12:00
    Morning,
    /// 12:00 to 17:59
    Afternoon,
    /// 18:00 onwards
    Evening,
}

impl DayPart {
    pub fn of(time: NaiveTime) -> Self {
        match time.hour() {
            h if h < 12 => DayPart::Morning,
            h if h < 18 => DayPart::Afternoon,
            _ => DayPart::Evening,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DayPart::Morning => "Morning",
            DayPart::Afternoon => "Afternoon",
            DayPart::Evening => "Evening",
        }
    }
}

/// Free slots of one day split by day part.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DaySlots {
    pub morning: Vec<TimeSlot>,
    pub afternoon: Vec<TimeSlot>,
    pub evening: Vec<TimeSlot>,
}

impl DaySlots {
    pub fn is_empty(&self) -> bool {
        self.morning.is_empty() && self.afternoon.is_empty() && self.evening.is_empty()
    }

    pub fn len(&self) -> usize {
        self.morning.len() + self.afternoon.len() + self.evening.len()
    }
}

/// Every slot start from opening to closing time, both inclusive.
pub fn generate_slots(config: &ScheduleConfig) -> Vec<NaiveTime> {
    let mut slots = Vec::new();
    if config.slot_minutes == 0 {
        return slots;
    }
    let step = Duration::minutes(i64::from(config.slot_minutes));

    let mut current = config.opening_time;
    while current <= config.closing_time {
        slots.push(current);
        let (next, wrapped) = current.overflowing_add_signed(step);
        // Stop at midnight rather than wrapping into the next day
        if wrapped != 0 || next <= current {
            break;
        }
        current = next;
    }
    slots
}

/// Free slots on `date`, given the times already booked.
///
/// Dates before `today` have no availability.
pub fn available_slots(
    config: &ScheduleConfig,
    date: NaiveDate,
    today: NaiveDate,
    booked: &[NaiveTime],
) -> ScheduleResult<Vec<TimeSlot>> {
    if date < today {
        return Err(ScheduleError::DateInPast(date));
    }

    Ok(generate_slots(config)
        .into_iter()
        .filter(|t| !booked.contains(t))
        .map(TimeSlot::new)
        .collect())
}

/// Split slots into morning, afternoon and evening, preserving order.
pub fn group_by_day_part(slots: &[TimeSlot]) -> DaySlots {
    let mut grouped = DaySlots::default();
    for slot in slots {
        match slot.day_part() {
            DayPart::Morning => grouped.morning.push(*slot),
            DayPart::Afternoon => grouped.afternoon.push(*slot),
            DayPart::Evening => grouped.evening.push(*slot),
        }
    }
    grouped
}

/// Parse a user-entered slot time, `HH:MM` or `HH:MM:SS`.
pub fn parse_slot_time(input: &str) -> ScheduleResult<NaiveTime> {
    let input = input.trim();
    NaiveTime::parse_from_str(input, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M:%S"))
        .map_err(|_| ScheduleError::InvalidTime(input.to_string()))
}

/// Computes availability against the live database.
pub struct SlotPlanner<'a> {
    db: &'a Database,
    config: &'a ScheduleConfig,
}

impl<'a> SlotPlanner<'a> {
    pub fn new(db: &'a Database, config: &'a ScheduleConfig) -> Self {
        Self { db, config }
    }

    /// Slots not taken by any veterinarian on `date`.
    pub fn slots_for(&self, date: NaiveDate, today: NaiveDate) -> ScheduleResult<Vec<TimeSlot>> {
        if date < today {
            return Err(ScheduleError::DateInPast(date));
        }
        let booked = self.db.booked_times(date)?;
        let free = available_slots(self.config, date, today, &booked)?;
        tracing::debug!(%date, free = free.len(), "computed free slots");
        Ok(free)
    }

    /// Slots not taken by the given veterinarian on `date`.
    pub fn slots_for_vet(
        &self,
        veterinarian_id: i64,
        date: NaiveDate,
        today: NaiveDate,
    ) -> ScheduleResult<Vec<TimeSlot>> {
        if date < today {
            return Err(ScheduleError::DateInPast(date));
        }
        let booked = self.db.booked_times_for_vet(veterinarian_id, date)?;
        let free = available_slots(self.config, date, today, &booked)?;
        tracing::debug!(%date, veterinarian_id, free = free.len(), "computed free slots");
        Ok(free)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_grid() {
        let slots = generate_slots(&ScheduleConfig::default());
        assert_eq!(slots.len(), 23);
        assert_eq!(slots.first(), Some(&time(9, 0)));
        assert_eq!(slots.last(), Some(&time(20, 0)));
    }

    #[test]
    fn test_grid_stops_at_midnight() {
        let config = ScheduleConfig {
            opening_time: time(22, 0),
            closing_time: time(23, 59),
            slot_minutes: 60,
            ..ScheduleConfig::default()
        };
        assert_eq!(generate_slots(&config), vec![time(22, 0), time(23, 0)]);
    }

    #[test]
    fn test_available_excludes_booked() {
        let config = ScheduleConfig::default();
        let today = date(2024, 6, 10);
        let free = available_slots(&config, today, today, &[time(9, 0), time(19, 30)]).unwrap();

        assert_eq!(free.len(), 21);
        assert!(!free.contains(&TimeSlot::new(time(9, 0))));
        assert!(free.contains(&TimeSlot::new(time(9, 30))));
    }

    #[test]
    fn test_past_date_rejected() {
        let config = ScheduleConfig::default();
        let result = available_slots(&config, date(2024, 6, 9), date(2024, 6, 10), &[]);
        assert!(matches!(result, Err(ScheduleError::DateInPast(_))));
    }

    #[test]
    fn test_group_by_day_part() {
        let slots: Vec<_> = generate_slots(&ScheduleConfig::default())
            .into_iter()
            .map(TimeSlot::new)
            .collect();
        let grouped = group_by_day_part(&slots);

        // 09:00..=11:30, 12:00..=17:30, 18:00..=20:00
        assert_eq!(grouped.morning.len(), 6);
        assert_eq!(grouped.afternoon.len(), 12);
        assert_eq!(grouped.evening.len(), 5);
        assert_eq!(grouped.len(), 23);
        assert!(group_by_day_part(&[]).is_empty());
    }

    #[test]
    fn test_parse_slot_time() {
        assert_eq!(parse_slot_time("09:30").unwrap(), time(9, 30));
        assert_eq!(parse_slot_time(" 14:00:00 ").unwrap(), time(14, 0));
        assert!(matches!(
            parse_slot_time("25:00"),
            Err(ScheduleError::InvalidTime(_))
        ));
        assert!(parse_slot_time("noon").is_err());
    }

    #[test]
    fn test_labels() {
        assert_eq!(TimeSlot::new(time(9, 0)).label(), "09:00");
        assert_eq!(DayPart::of(time(11, 59)), DayPart::Morning);
        assert_eq!(DayPart::of(time(12, 0)), DayPart::Afternoon);
        assert_eq!(DayPart::of(time(18, 0)).label(), "Evening");
    }

    proptest! {
        #[test]
        fn prop_slots_sorted_on_grid_within_hours(
            open_h in 0u32..23,
            span_h in 1u32..12,
            step in prop::sample::select(vec![5u32, 10, 15, 20, 30, 60, 90, 120]),
        ) {
            let close_h = (open_h + span_h).min(23);
            prop_assume!(close_h > open_h);
            let config = ScheduleConfig {
                opening_time: time(open_h, 0),
                closing_time: time(close_h, 0),
                slot_minutes: step,
                ..ScheduleConfig::default()
            };

            let slots = generate_slots(&config);
            prop_assert!(!slots.is_empty());
            prop_assert_eq!(slots[0], config.opening_time);
            for pair in slots.windows(2) {
                prop_assert!(pair[0] < pair[1]);
            }
            for slot in &slots {
                prop_assert!(*slot <= config.closing_time);
                prop_assert!(config.is_on_grid(*slot));
            }
            let span_minutes = i64::from(close_h - open_h) * 60;
            prop_assert_eq!(slots.len() as i64, span_minutes / i64::from(step) + 1);
        }

        #[test]
        fn prop_available_is_generated_minus_booked(
            booked_idx in prop::collection::vec(0usize..23, 0..10),
        ) {
            let config = ScheduleConfig::default();
            let all = generate_slots(&config);
            let booked: Vec<NaiveTime> = booked_idx.iter().map(|&i| all[i]).collect();
            let today = date(2024, 6, 10);

            let free = available_slots(&config, today, today, &booked).unwrap();
            for slot in &free {
                prop_assert!(!booked.contains(&slot.time));
            }
            let mut distinct = booked.clone();
            distinct.sort();
            distinct.dedup();
            prop_assert_eq!(free.len() + distinct.len(), all.len());
        }
    }
}
