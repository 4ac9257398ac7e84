//! Veterinarian statistics queries.

use chrono::NaiveDate;
use rusqlite::params;

use super::{Database, DbResult};
use crate::models::{MonthlyStat, PetAge, ServiceStat, VetPatient};

impl Database {
    /// Appointments and revenue per month over the last `window_months`.
    ///
    /// Cancelled appointments are excluded. Months are returned oldest first.
    pub fn monthly_stats(
        &self,
        veterinarian_id: i64,
        today: NaiveDate,
        window_months: u32,
    ) -> DbResult<Vec<MonthlyStat>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT CAST(strftime('%Y', a.appointment_date) AS INTEGER) AS year,
                   CAST(strftime('%m', a.appointment_date) AS INTEGER) AS month,
                   COUNT(*),
                   COALESCE(SUM(s.price_cents), 0)
            FROM appointments a
            JOIN services s ON s.service_id = a.service_id
            WHERE a.veterinarian_id = ?1
              AND a.status <> 'cancelled'
              AND a.appointment_date >= date(?2, ?3)
            GROUP BY year, month
            ORDER BY year, month
            "#,
        )?;

        let window = format!("-{} months", window_months);
        let rows = stmt.query_map(params![veterinarian_id, today, window], |row| {
            Ok(MonthlyStat {
                year: row.get(0)?,
                month: row.get(1)?,
                appointment_count: row.get(2)?,
                revenue_cents: row.get(3)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Appointments and revenue per service, busiest first.
    pub fn service_stats(&self, veterinarian_id: i64) -> DbResult<Vec<ServiceStat>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT s.name, COUNT(*) AS appointment_count, COALESCE(SUM(s.price_cents), 0)
            FROM appointments a
            JOIN services s ON s.service_id = a.service_id
            WHERE a.veterinarian_id = ? AND a.status <> 'cancelled'
            GROUP BY s.name
            ORDER BY appointment_count DESC, s.name
            "#,
        )?;

        let rows = stmt.query_map([veterinarian_id], |row| {
            Ok(ServiceStat {
                service_name: row.get(0)?,
                appointment_count: row.get(1)?,
                revenue_cents: row.get(2)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Distinct pets the veterinarian has an appointment with.
    pub fn vet_patients(&self, veterinarian_id: i64, today: NaiveDate) -> DbResult<Vec<VetPatient>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT DISTINCT p.pet_id, p.name, t.name, p.breed, p.birth_date, c.full_name
            FROM appointments a
            JOIN pets p ON p.pet_id = a.pet_id
            JOIN animal_types t ON t.type_id = p.type_id
            JOIN clients c ON c.client_id = p.client_id
            WHERE a.veterinarian_id = ?
            ORDER BY c.full_name, p.name
            "#,
        )?;

        let rows = stmt.query_map([veterinarian_id], |row| {
            let birth_date: Option<NaiveDate> = row.get(4)?;
            Ok(VetPatient {
                pet_id: row.get(0)?,
                pet_name: row.get(1)?,
                type_name: row.get(2)?,
                breed: row.get(3)?,
                age_years: birth_date
                    .and_then(|birth| PetAge::between(birth, today))
                    .map(|age| age.years),
                owner_name: row.get(5)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
