//! Aggregates shown on staff and client dashboards.

use serde::{Deserialize, Serialize};

/// Appointments and revenue for one calendar month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyStat {
    pub year: i32,
    pub month: u32,
    pub appointment_count: u32,
    pub revenue_cents: i64,
}

/// Appointments and revenue for one service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceStat {
    pub service_name: String,
    pub appointment_count: u32,
    pub revenue_cents: i64,
}

/// A pet a veterinarian has seen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VetPatient {
    pub pet_id: i64,
    pub pet_name: String,
    pub type_name: String,
    pub breed: Option<String>,
    /// Whole years, when the birth date is known
    pub age_years: Option<u32>,
    pub owner_name: String,
}

/// Counters on the client profile page.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ClientSummary {
    pub appointments_count: u32,
    pub pets_with_records_count: u32,
}

/// English month name for 1..=12.
pub fn month_name(month: u32) -> &'static str {
    const NAMES: [&str; 12] = [
        "January", "February", "March", "April", "May", "June", "July", "August", "September",
        "October", "November", "December",
    ];
    month
        .checked_sub(1)
        .and_then(|i| NAMES.get(i as usize).copied())
        .unwrap_or("Unknown")
}

impl MonthlyStat {
    /// "March 2024"
    pub fn label(&self) -> String {
        format!("{} {}", month_name(self.month), self.year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_name_bounds() {
        assert_eq!(month_name(1), "January");
        assert_eq!(month_name(12), "December");
        assert_eq!(month_name(0), "Unknown");
        assert_eq!(month_name(13), "Unknown");
    }

    #[test]
    fn test_monthly_label() {
        let stat = MonthlyStat {
            year: 2024,
            month: 3,
            appointment_count: 4,
            revenue_cents: 0,
        };
        assert_eq!(stat.label(), "March 2024");
    }
}
