//! Appointment database operations: booking, listings and status changes.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::{params, OptionalExtension};

use super::{
    is_constraint_violation, local_timestamp, non_empty, Database, DbError, DbResult,
    TIMESTAMP_FORMAT,
};
use crate::models::{
    client_may_cancel, group_schedule_by_day, Appointment, BookingConfirmation, BookingRequest,
    DaySchedule, Role, ScheduleEntry, StoredStatus, CLIENT_CANCEL_NOTICE_HOURS, INITIAL_DIAGNOSIS,
};

impl Database {
    /// Times already taken on a date by any veterinarian.
    pub fn booked_times(&self, date: NaiveDate) -> DbResult<Vec<NaiveTime>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT DISTINCT appointment_time
            FROM appointments
            WHERE appointment_date = ? AND status <> 'cancelled'
            ORDER BY appointment_time
            "#,
        )?;
        let rows = stmt.query_map([date], |row| row.get(0))?;
        let times = rows.collect::<Result<Vec<NaiveTime>, _>>()?;
        tracing::debug!(%date, booked = times.len(), "loaded booked times");
        Ok(times)
    }

    /// Times already taken on a date by one veterinarian.
    pub fn booked_times_for_vet(
        &self,
        veterinarian_id: i64,
        date: NaiveDate,
    ) -> DbResult<Vec<NaiveTime>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT appointment_time
            FROM appointments
            WHERE veterinarian_id = ? AND appointment_date = ? AND status <> 'cancelled'
            ORDER BY appointment_time
            "#,
        )?;
        let rows = stmt.query_map(params![veterinarian_id, date], |row| row.get(0))?;
        rows.collect::<Result<Vec<NaiveTime>, _>>().map_err(Into::into)
    }

    /// Book a visit together with its initial medical record.
    ///
    /// Both rows are written in one transaction; on any error neither exists.
    /// Date and grid checks live in [`crate::scheduling::Booking`].
    pub fn book_appointment(&self, request: &BookingRequest) -> DbResult<BookingConfirmation> {
        let tx = self.transaction()?;

        let (service_name, price_cents): (String, i64) = tx
            .query_row(
                "SELECT name, price_cents FROM services WHERE service_id = ?",
                [request.service_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?
            .ok_or_else(|| DbError::NotFound(format!("service {}", request.service_id)))?;

        let veterinarian_name: String = tx
            .query_row(
                "SELECT full_name FROM employees WHERE employee_id = ? AND role_id = ?",
                params![request.veterinarian_id, Role::Veterinarian.id()],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| {
                DbError::NotFound(format!("veterinarian {}", request.veterinarian_id))
            })?;

        let pet_name: String = tx
            .query_row(
                "SELECT name FROM pets WHERE pet_id = ? AND client_id = ?",
                [request.pet_id, request.client_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| {
                DbError::NotFound(format!(
                    "pet {} for client {}",
                    request.pet_id, request.client_id
                ))
            })?;

        let taken: bool = tx.query_row(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM appointments
                WHERE veterinarian_id = ? AND appointment_date = ? AND appointment_time = ?
                  AND status <> 'cancelled'
            )
            "#,
            params![request.veterinarian_id, request.date, request.time],
            |row| row.get(0),
        )?;
        if taken {
            tracing::warn!(
                veterinarian_id = request.veterinarian_id,
                date = %request.date,
                time = %request.time,
                "rejected double booking"
            );
            return Err(slot_taken(request));
        }

        let now = local_timestamp();
        tx.execute(
            r#"
            INSERT INTO appointments (
                client_id, veterinarian_id, service_id, pet_id,
                appointment_date, appointment_time, status, notes, booked_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'scheduled', ?7, ?8, ?8)
            "#,
            params![
                request.client_id,
                request.veterinarian_id,
                request.service_id,
                request.pet_id,
                request.date,
                request.time,
                non_empty(request.complaints.as_deref()),
                now,
            ],
        )
        .map_err(|e| {
            if is_constraint_violation(&e) {
                slot_taken(request)
            } else {
                e.into()
            }
        })?;
        let appointment_id = tx.last_insert_rowid();

        tx.execute(
            r#"
            INSERT INTO medical_records (
                pet_id, appointment_id, veterinarian_id, visit_date,
                complaints, diagnosis, recommendations
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                request.pet_id,
                appointment_id,
                request.veterinarian_id,
                request.date,
                non_empty(request.complaints.as_deref()),
                INITIAL_DIAGNOSIS,
                non_empty(request.additional_info.as_deref()),
            ],
        )?;
        let medical_record_id = tx.last_insert_rowid();

        tx.commit()?;
        tracing::info!(
            appointment_id,
            client_id = request.client_id,
            veterinarian_id = request.veterinarian_id,
            "booked appointment"
        );

        Ok(BookingConfirmation {
            appointment_id,
            medical_record_id,
            service_name,
            veterinarian_name,
            pet_name,
            date: request.date,
            time: request.time,
            price_cents,
        })
    }

    /// A client's appointments, newest first.
    pub fn list_client_appointments(&self, client_id: i64) -> DbResult<Vec<Appointment>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT a.appointment_id, a.client_id, a.veterinarian_id, e.full_name,
                   a.service_id, s.name, a.pet_id, p.name,
                   a.appointment_date, a.appointment_time, s.price_cents,
                   a.status, a.booked_at
            FROM appointments a
            JOIN employees e ON e.employee_id = a.veterinarian_id
            JOIN services s ON s.service_id = a.service_id
            LEFT JOIN pets p ON p.pet_id = a.pet_id
            WHERE a.client_id = ?
            ORDER BY a.appointment_date DESC, a.appointment_time DESC
            "#,
        )?;

        let rows = stmt.query_map([client_id], |row| {
            Ok(AppointmentRow {
                appointment_id: row.get(0)?,
                client_id: row.get(1)?,
                veterinarian_id: row.get(2)?,
                veterinarian_name: row.get(3)?,
                service_id: row.get(4)?,
                service_name: row.get(5)?,
                pet_id: row.get(6)?,
                pet_name: row.get(7)?,
                appointment_date: row.get(8)?,
                appointment_time: row.get(9)?,
                price_cents: row.get(10)?,
                status: row.get(11)?,
                booked_at: row.get(12)?,
            })
        })?;

        let mut appointments = Vec::new();
        for row in rows {
            appointments.push(row?.try_into()?);
        }
        Ok(appointments)
    }

    /// A veterinarian's live appointments grouped by day, optionally from a date on.
    pub fn list_vet_schedule(
        &self,
        veterinarian_id: i64,
        from: Option<NaiveDate>,
    ) -> DbResult<Vec<DaySchedule>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT a.appointment_id, a.appointment_date, a.appointment_time,
                   c.full_name, c.phone, s.name, p.name, a.status, a.notes
            FROM appointments a
            JOIN clients c ON c.client_id = a.client_id
            JOIN services s ON s.service_id = a.service_id
            LEFT JOIN pets p ON p.pet_id = a.pet_id
            WHERE a.veterinarian_id = ?1
              AND a.status <> 'cancelled'
              AND (?2 IS NULL OR a.appointment_date >= ?2)
            ORDER BY a.appointment_date, a.appointment_time
            "#,
        )?;

        let rows = stmt.query_map(params![veterinarian_id, from], |row| {
            Ok((
                ScheduleEntry {
                    appointment_id: row.get(0)?,
                    appointment_date: row.get(1)?,
                    appointment_time: row.get(2)?,
                    client_name: row.get(3)?,
                    client_phone: row.get(4)?,
                    service_name: row.get(5)?,
                    pet_name: row.get(6)?,
                    status: StoredStatus::Scheduled,
                    notes: row.get(8)?,
                },
                row.get::<_, String>(7)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (mut entry, status) = row?;
            entry.status = parse_status(&status)?;
            entries.push(entry);
        }
        tracing::debug!(veterinarian_id, entries = entries.len(), "loaded schedule");
        Ok(group_schedule_by_day(entries))
    }

    /// Cancel a booking on the client's behalf.
    ///
    /// The appointment and its medical records are removed. Only scheduled
    /// visits starting at least [`CLIENT_CANCEL_NOTICE_HOURS`] after `now`
    /// (local time) can be cancelled.
    pub fn cancel_client_appointment(
        &self,
        appointment_id: i64,
        client_id: i64,
        now: NaiveDateTime,
    ) -> DbResult<()> {
        let tx = self.transaction()?;

        let (status, date, time): (String, NaiveDate, NaiveTime) = tx
            .query_row(
                r#"
                SELECT status, appointment_date, appointment_time
                FROM appointments
                WHERE appointment_id = ? AND client_id = ?
                "#,
                [appointment_id, client_id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?
            .ok_or_else(|| DbError::NotFound(format!("appointment {}", appointment_id)))?;

        let status = parse_status(&status)?;
        if status != StoredStatus::Scheduled {
            return Err(DbError::InvalidState(format!(
                "appointment {} is already {}",
                appointment_id,
                status.as_str()
            )));
        }
        if !client_may_cancel(date.and_time(time), now) {
            tracing::warn!(appointment_id, client_id, "late cancellation refused");
            return Err(DbError::InvalidState(format!(
                "appointment {} starts in less than {} hours",
                appointment_id, CLIENT_CANCEL_NOTICE_HOURS
            )));
        }

        tx.execute(
            "DELETE FROM medical_records WHERE appointment_id = ?",
            [appointment_id],
        )?;
        tx.execute(
            "DELETE FROM appointments WHERE appointment_id = ?",
            [appointment_id],
        )?;
        tx.commit()?;

        tracing::info!(appointment_id, client_id, "client cancelled appointment");
        Ok(())
    }

    /// Mark a scheduled appointment cancelled. The slot becomes free again.
    pub fn cancel_appointment_by_staff(&self, appointment_id: i64) -> DbResult<()> {
        self.transition(appointment_id, StoredStatus::Cancelled)?;
        tracing::info!(appointment_id, "staff cancelled appointment");
        Ok(())
    }

    /// Mark a scheduled appointment completed.
    pub fn complete_appointment(&self, appointment_id: i64) -> DbResult<()> {
        self.transition(appointment_id, StoredStatus::Completed)?;
        tracing::info!(appointment_id, "appointment completed");
        Ok(())
    }

    /// True if any of the veterinarian's appointments was booked or changed after `since`.
    ///
    /// `since` is local wall-clock time, the clock `booked_at` and
    /// `updated_at` are written in.
    pub fn schedule_changed_since(
        &self,
        veterinarian_id: i64,
        since: NaiveDateTime,
    ) -> DbResult<bool> {
        let since = since.format(TIMESTAMP_FORMAT).to_string();
        let changed: bool = self.conn.query_row(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM appointments
                WHERE veterinarian_id = ?1 AND (booked_at > ?2 OR updated_at > ?2)
            )
            "#,
            params![veterinarian_id, since],
            |row| row.get(0),
        )?;
        Ok(changed)
    }

    /// Move a scheduled appointment to a final status.
    fn transition(&self, appointment_id: i64, to: StoredStatus) -> DbResult<()> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE appointments
            SET status = ?2, updated_at = ?3
            WHERE appointment_id = ?1 AND status = 'scheduled'
            "#,
            params![appointment_id, to.as_str(), local_timestamp()],
        )?;
        if rows_affected > 0 {
            return Ok(());
        }

        let current: Option<String> = self
            .conn
            .query_row(
                "SELECT status FROM appointments WHERE appointment_id = ?",
                [appointment_id],
                |row| row.get(0),
            )
            .optional()?;
        match current {
            None => Err(DbError::NotFound(format!("appointment {}", appointment_id))),
            Some(status) => Err(DbError::InvalidState(format!(
                "appointment {} is {}, expected scheduled",
                appointment_id, status
            ))),
        }
    }
}

fn slot_taken(request: &BookingRequest) -> DbError {
    DbError::SlotTaken {
        date: request.date.format("%Y-%m-%d").to_string(),
        time: request.time.format("%H:%M").to_string(),
    }
}

fn parse_status(s: &str) -> DbResult<StoredStatus> {
    StoredStatus::parse(s)
        .ok_or_else(|| DbError::Constraint(format!("Unknown appointment status: {}", s)))
}

/// Intermediate row struct for database mapping.
struct AppointmentRow {
    appointment_id: i64,
    client_id: i64,
    veterinarian_id: i64,
    veterinarian_name: String,
    service_id: i64,
    service_name: String,
    pet_id: Option<i64>,
    pet_name: Option<String>,
    appointment_date: NaiveDate,
    appointment_time: NaiveTime,
    price_cents: i64,
    status: String,
    booked_at: String,
}

impl TryFrom<AppointmentRow> for Appointment {
    type Error = DbError;

    fn try_from(row: AppointmentRow) -> Result<Self, Self::Error> {
        Ok(Appointment {
            appointment_id: row.appointment_id,
            client_id: row.client_id,
            veterinarian_id: row.veterinarian_id,
            veterinarian_name: row.veterinarian_name,
            service_id: row.service_id,
            service_name: row.service_name,
            pet_id: row.pet_id,
            pet_name: row.pet_name,
            appointment_date: row.appointment_date,
            appointment_time: row.appointment_time,
            price_cents: row.price_cents,
            stored_status: parse_status(&row.status)?,
            booked_at: row.booked_at,
        })
    }
}
