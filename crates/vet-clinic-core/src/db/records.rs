//! Medical record database operations.

use rusqlite::{params, OptionalExtension};

use super::{is_constraint_violation, local_timestamp, non_empty, Database, DbError, DbResult};
use crate::models::{MedicalRecord, NewMedicalRecord};

const RECORD_SELECT: &str = r#"
    SELECT m.record_id, m.pet_id, m.appointment_id, m.veterinarian_id, e.full_name,
           s.name, m.visit_date, m.complaints, m.diagnosis, m.recommendations
    FROM medical_records m
    JOIN employees e ON e.employee_id = m.veterinarian_id
    LEFT JOIN appointments a ON a.appointment_id = m.appointment_id
    LEFT JOIN services s ON s.service_id = a.service_id
"#;

impl Database {
    /// Write a medical record.
    pub fn insert_medical_record(&self, record: &NewMedicalRecord) -> DbResult<i64> {
        insert_record(&self.conn, record)
    }

    /// Record the outcome of a visit and mark its appointment completed.
    ///
    /// The record must name the appointment's own pet and veterinarian, and
    /// complaints are required.
    pub fn record_visit(&self, record: &NewMedicalRecord) -> DbResult<i64> {
        let appointment_id = record.appointment_id.ok_or_else(|| {
            DbError::InvalidState("a visit record must reference an appointment".into())
        })?;
        if non_empty(record.complaints.as_deref()).is_none() {
            return Err(DbError::Constraint("complaints are required".into()));
        }

        let tx = self.transaction()?;
        let (status, pet_id, veterinarian_id): (String, Option<i64>, i64) = tx
            .query_row(
                "SELECT status, pet_id, veterinarian_id FROM appointments WHERE appointment_id = ?",
                [appointment_id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?
            .ok_or_else(|| DbError::NotFound(format!("appointment {}", appointment_id)))?;
        if status == "cancelled" {
            return Err(DbError::InvalidState(format!(
                "appointment {} is cancelled",
                appointment_id
            )));
        }
        if pet_id != Some(record.pet_id) {
            return Err(DbError::InvalidState(format!(
                "appointment {} is not for pet {}",
                appointment_id, record.pet_id
            )));
        }
        if veterinarian_id != record.veterinarian_id {
            return Err(DbError::InvalidState(format!(
                "appointment {} belongs to another veterinarian",
                appointment_id
            )));
        }

        let record_id = insert_record(&tx, record)?;
        tx.execute(
            r#"
            UPDATE appointments
            SET status = 'completed', updated_at = ?2
            WHERE appointment_id = ?1
            "#,
            params![appointment_id, local_timestamp()],
        )?;
        tx.commit()?;

        tracing::info!(record_id, appointment_id, "visit recorded");
        Ok(record_id)
    }

    /// Get a medical record by ID.
    pub fn get_medical_record(&self, record_id: i64) -> DbResult<Option<MedicalRecord>> {
        let sql = format!("{} WHERE m.record_id = ?", RECORD_SELECT);
        self.conn
            .query_row(&sql, [record_id], record_from_row)
            .optional()
            .map_err(Into::into)
    }

    /// A pet's medical card, most recent visit first.
    pub fn list_records_for_pet(&self, pet_id: i64) -> DbResult<Vec<MedicalRecord>> {
        let sql = format!(
            "{} WHERE m.pet_id = ? ORDER BY m.visit_date DESC, m.record_id DESC",
            RECORD_SELECT
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([pet_id], record_from_row)?;
        let records = rows.collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(pet_id, records = records.len(), "loaded medical card");
        Ok(records)
    }

    /// Update the clinical fields of a record.
    pub fn update_medical_record(&self, record: &MedicalRecord) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE medical_records SET
                visit_date = ?2,
                complaints = ?3,
                diagnosis = ?4,
                recommendations = ?5
            WHERE record_id = ?1
            "#,
            params![
                record.record_id,
                record.visit_date,
                non_empty(record.complaints.as_deref()),
                non_empty(record.diagnosis.as_deref()),
                non_empty(record.recommendations.as_deref()),
            ],
        )?;
        if rows_affected > 0 {
            tracing::info!(record_id = record.record_id, "medical record updated");
        }
        Ok(rows_affected > 0)
    }

    /// Delete a medical record.
    pub fn delete_medical_record(&self, record_id: i64) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM medical_records WHERE record_id = ?", [record_id])?;
        Ok(rows_affected > 0)
    }
}

fn insert_record(conn: &rusqlite::Connection, record: &NewMedicalRecord) -> DbResult<i64> {
    conn.execute(
        r#"
        INSERT INTO medical_records (
            pet_id, appointment_id, veterinarian_id, visit_date,
            complaints, diagnosis, recommendations
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
        params![
            record.pet_id,
            record.appointment_id,
            record.veterinarian_id,
            record.visit_date,
            non_empty(record.complaints.as_deref()),
            non_empty(record.diagnosis.as_deref()),
            non_empty(record.recommendations.as_deref()),
        ],
    )
    .map_err(|e| {
        if is_constraint_violation(&e) {
            DbError::Constraint(format!(
                "medical record references a missing pet, appointment or veterinarian: {}",
                e
            ))
        } else {
            e.into()
        }
    })?;
    let record_id = conn.last_insert_rowid();
    tracing::info!(record_id, pet_id = record.pet_id, "medical record added");
    Ok(record_id)
}

fn record_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MedicalRecord> {
    Ok(MedicalRecord {
        record_id: row.get(0)?,
        pet_id: row.get(1)?,
        appointment_id: row.get(2)?,
        veterinarian_id: row.get(3)?,
        veterinarian_name: row.get(4)?,
        service_name: row.get(5)?,
        visit_date: row.get(6)?,
        complaints: row.get(7)?,
        diagnosis: row.get(8)?,
        recommendations: row.get(9)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::clinic;
    use crate::db::fixtures::Clinic;
    use crate::models::{BookingRequest, NewEmployee, NewPet, Role, StoredStatus};
    use chrono::{NaiveDate, NaiveTime};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_insert_standalone_record() {
        let c = clinic();
        let mut record = NewMedicalRecord::new(c.pet_id, c.vet_id, date(2024, 3, 1));
        record.diagnosis = Some("Healthy".into());
        let id = c.db.insert_medical_record(&record).unwrap();

        let stored = c.db.get_medical_record(id).unwrap().unwrap();
        assert_eq!(stored.appointment_id, None);
        assert_eq!(stored.service_name, None);
        assert_eq!(stored.veterinarian_name, "Dr. Anna Smirnova");
        assert_eq!(stored.diagnosis.as_deref(), Some("Healthy"));

        assert_eq!(c.db.list_pets_for_client(c.client_id).unwrap()[0].medical_records_count, 1);
    }

    #[test]
    fn test_insert_record_for_missing_pet() {
        let c = clinic();
        let record = NewMedicalRecord::new(9999, c.vet_id, date(2024, 3, 1));
        assert!(matches!(
            c.db.insert_medical_record(&record),
            Err(DbError::Constraint(_))
        ));
    }

    #[test]
    fn test_list_records_newest_first() {
        let c = clinic();
        for d in [date(2024, 1, 5), date(2024, 3, 1), date(2023, 12, 20)] {
            c.db
                .insert_medical_record(&NewMedicalRecord::new(c.pet_id, c.vet_id, d))
                .unwrap();
        }

        let dates: Vec<_> = c
            .db
            .list_records_for_pet(c.pet_id)
            .unwrap()
            .iter()
            .map(|r| r.visit_date)
            .collect();
        assert_eq!(
            dates,
            vec![date(2024, 3, 1), date(2024, 1, 5), date(2023, 12, 20)]
        );
    }

    fn book(c: &Clinic) -> i64 {
        c.db.book_appointment(&BookingRequest {
            client_id: c.client_id,
            service_id: c.service_id,
            veterinarian_id: c.vet_id,
            pet_id: c.pet_id,
            date: date(2030, 6, 10),
            time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            complaints: None,
            additional_info: None,
        })
        .unwrap()
        .appointment_id
    }

    fn visit_for(c: &Clinic, appointment_id: i64) -> NewMedicalRecord {
        let mut visit = NewMedicalRecord::new(c.pet_id, c.vet_id, date(2030, 6, 10));
        visit.appointment_id = Some(appointment_id);
        visit.complaints = Some("Coughing at night".into());
        visit
    }

    #[test]
    fn test_record_visit_completes_appointment() {
        let c = clinic();
        let appointment_id = book(&c);

        let mut visit = visit_for(&c, appointment_id);
        visit.diagnosis = Some("Mild rhinitis".into());
        let record_id = c.db.record_visit(&visit).unwrap();

        let stored = c.db.get_medical_record(record_id).unwrap().unwrap();
        assert_eq!(stored.service_name.as_deref(), Some("Examination"));

        let appointments = c.db.list_client_appointments(c.client_id).unwrap();
        assert_eq!(appointments[0].stored_status, StoredStatus::Completed);
    }

    #[test]
    fn test_record_visit_requires_appointment() {
        let c = clinic();
        let visit = NewMedicalRecord::new(c.pet_id, c.vet_id, date(2030, 6, 10));
        assert!(matches!(
            c.db.record_visit(&visit),
            Err(DbError::InvalidState(_))
        ));

        let mut missing = visit.clone();
        missing.appointment_id = Some(42);
        missing.complaints = Some("Limping".into());
        assert!(matches!(c.db.record_visit(&missing), Err(DbError::NotFound(_))));
    }

    #[test]
    fn test_record_visit_requires_complaints() {
        let c = clinic();
        let appointment_id = book(&c);

        for complaints in [None, Some("   ".to_string())] {
            let mut visit = visit_for(&c, appointment_id);
            visit.complaints = complaints;
            assert!(matches!(c.db.record_visit(&visit), Err(DbError::Constraint(_))));
        }

        let appointments = c.db.list_client_appointments(c.client_id).unwrap();
        assert_eq!(appointments[0].stored_status, StoredStatus::Scheduled);
    }

    #[test]
    fn test_record_visit_must_match_appointment() {
        let c = clinic();
        let appointment_id = book(&c);
        let other_pet = c
            .db
            .insert_pet(&NewPet::new(c.client_id, 2, "Sharik".into()))
            .unwrap()
            .pet_id;
        let other_vet = c
            .db
            .insert_employee(&NewEmployee::new(
                "Dr. Oleg Volkov".into(),
                Role::Veterinarian,
                "vetpass".into(),
            ))
            .unwrap();

        let mut wrong_pet = visit_for(&c, appointment_id);
        wrong_pet.pet_id = other_pet;
        assert!(matches!(c.db.record_visit(&wrong_pet), Err(DbError::InvalidState(_))));

        let mut wrong_vet = visit_for(&c, appointment_id);
        wrong_vet.veterinarian_id = other_vet;
        assert!(matches!(c.db.record_visit(&wrong_vet), Err(DbError::InvalidState(_))));

        // Nothing was written to either pet's card
        assert!(c.db.list_records_for_pet(other_pet).unwrap().is_empty());
        assert_eq!(c.db.list_records_for_pet(c.pet_id).unwrap().len(), 1);

        c.db.record_visit(&visit_for(&c, appointment_id)).unwrap();
        assert_eq!(c.db.list_records_for_pet(c.pet_id).unwrap().len(), 2);
    }

    #[test]
    fn test_update_and_delete_record() {
        let c = clinic();
        let id = c
            .db
            .insert_medical_record(&NewMedicalRecord::new(c.pet_id, c.vet_id, date(2024, 3, 1)))
            .unwrap();

        let mut record = c.db.get_medical_record(id).unwrap().unwrap();
        record.recommendations = Some("Rest for a week".into());
        assert!(c.db.update_medical_record(&record).unwrap());
        assert_eq!(
            c.db.get_medical_record(id).unwrap().unwrap().recommendations.as_deref(),
            Some("Rest for a week")
        );

        assert!(c.db.delete_medical_record(id).unwrap());
        assert!(!c.db.delete_medical_record(id).unwrap());
    }
}
