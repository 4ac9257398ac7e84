//! Statistics report: monthly load and per-service breakdown for one veterinarian.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::db::{Database, DbResult};
use crate::models::{format_price, MonthlyStat, ServiceStat};

/// Statistics for one veterinarian.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticsReport {
    /// Report timestamp
    pub generated_at: String,
    pub veterinarian_id: i64,
    /// Oldest month first
    pub monthly: Vec<MonthlyStat>,
    /// Busiest service first
    pub services: Vec<ServiceStat>,
}

impl StatisticsReport {
    /// Total appointments over the monthly window.
    pub fn total_appointments(&self) -> u32 {
        self.monthly.iter().map(|m| m.appointment_count).sum()
    }

    /// Total revenue over the monthly window, minor units.
    pub fn total_revenue_cents(&self) -> i64 {
        self.monthly.iter().map(|m| m.revenue_cents).sum()
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export to CSV: a monthly section, a blank line, then a service section.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();

        csv.push_str("month,appointments,revenue\n");
        for month in &self.monthly {
            csv.push_str(&format!(
                "{},{},{}\n",
                escape_csv(&month.label()),
                month.appointment_count,
                format_price(month.revenue_cents),
            ));
        }

        csv.push('\n');

        csv.push_str("service,appointments,revenue\n");
        for service in &self.services {
            csv.push_str(&format!(
                "{},{},{}\n",
                escape_csv(&service.service_name),
                service.appointment_count,
                format_price(service.revenue_cents),
            ));
        }

        csv
    }
}

/// Builds statistics reports from the database.
pub struct StatisticsReporter<'a> {
    db: &'a Database,
}

impl<'a> StatisticsReporter<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Build the report for a veterinarian as of `today`.
    pub fn build(
        &self,
        veterinarian_id: i64,
        today: NaiveDate,
        window_months: u32,
    ) -> DbResult<StatisticsReport> {
        let monthly = self.db.monthly_stats(veterinarian_id, today, window_months)?;
        let services = self.db.service_stats(veterinarian_id)?;
        tracing::debug!(
            veterinarian_id,
            months = monthly.len(),
            services = services.len(),
            "built statistics report"
        );

        Ok(StatisticsReport {
            generated_at: chrono::Utc::now().to_rfc3339(),
            veterinarian_id,
            monthly,
            services,
        })
    }
}

/// Escape a string for CSV output.
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
