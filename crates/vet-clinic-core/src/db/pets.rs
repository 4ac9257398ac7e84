//! Pet database operations.

use rusqlite::{params, OptionalExtension};

use super::{non_empty, Database, DbError, DbResult};
use crate::models::{AnimalType, Gender, NewPet, Pet};

const PET_SELECT: &str = r#"
    SELECT p.pet_id, p.client_id, p.type_id, t.name, p.name, p.breed, p.gender,
           p.birth_date, p.color, p.special_marks, p.notes,
           (SELECT COUNT(*) FROM medical_records m WHERE m.pet_id = p.pet_id)
    FROM pets p
    JOIN animal_types t ON t.type_id = p.type_id
"#;

impl Database {
    /// List all animal types.
    pub fn list_animal_types(&self) -> DbResult<Vec<AnimalType>> {
        let mut stmt = self
            .conn
            .prepare("SELECT type_id, name FROM animal_types ORDER BY type_id")?;
        let rows = stmt.query_map([], |row| {
            Ok(AnimalType {
                type_id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Register a pet for a client.
    pub fn insert_pet(&self, pet: &NewPet) -> DbResult<Pet> {
        let name = pet.name.trim();
        if name.is_empty() {
            return Err(DbError::Constraint("pet name is required".into()));
        }
        let type_exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM animal_types WHERE type_id = ?)",
            [pet.type_id],
            |row| row.get(0),
        )?;
        if !type_exists {
            return Err(DbError::NotFound(format!("animal type {}", pet.type_id)));
        }
        if self.get_client(pet.client_id)?.is_none() {
            return Err(DbError::NotFound(format!("client {}", pet.client_id)));
        }

        self.conn.execute(
            r#"
            INSERT INTO pets (
                client_id, type_id, name, breed, gender,
                birth_date, color, special_marks, notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                pet.client_id,
                pet.type_id,
                name,
                non_empty(pet.breed.as_deref()),
                pet.gender.as_str(),
                pet.birth_date,
                non_empty(pet.color.as_deref()),
                non_empty(pet.special_marks.as_deref()),
                non_empty(pet.notes.as_deref()),
            ],
        )?;
        let pet_id = self.conn.last_insert_rowid();
        tracing::info!(pet_id, client_id = pet.client_id, "added pet");

        self.get_pet(pet_id)?
            .ok_or_else(|| DbError::NotFound(format!("pet {}", pet_id)))
    }

    /// Get a pet by ID.
    pub fn get_pet(&self, pet_id: i64) -> DbResult<Option<Pet>> {
        let sql = format!("{} WHERE p.pet_id = ?", PET_SELECT);
        self.conn
            .query_row(&sql, [pet_id], pet_from_row)
            .optional()
            .map_err(Into::into)
    }

    /// List a client's pets, with medical record counts.
    pub fn list_pets_for_client(&self, client_id: i64) -> DbResult<Vec<Pet>> {
        let sql = format!("{} WHERE p.client_id = ? ORDER BY p.name", PET_SELECT);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([client_id], pet_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Update an existing pet.
    pub fn update_pet(&self, pet: &Pet) -> DbResult<bool> {
        if pet.name.trim().is_empty() {
            return Err(DbError::Constraint("pet name is required".into()));
        }
        let rows_affected = self.conn.execute(
            r#"
            UPDATE pets SET
                type_id = ?2,
                name = ?3,
                breed = ?4,
                gender = ?5,
                birth_date = ?6,
                color = ?7,
                special_marks = ?8,
                notes = ?9
            WHERE pet_id = ?1
            "#,
            params![
                pet.pet_id,
                pet.type_id,
                pet.name.trim(),
                non_empty(pet.breed.as_deref()),
                pet.gender.as_str(),
                pet.birth_date,
                non_empty(pet.color.as_deref()),
                non_empty(pet.special_marks.as_deref()),
                non_empty(pet.notes.as_deref()),
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Delete a pet owned by the given client. Its medical records go with it.
    pub fn delete_pet(&self, pet_id: i64, client_id: i64) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "DELETE FROM pets WHERE pet_id = ? AND client_id = ?",
            [pet_id, client_id],
        )?;
        if rows_affected > 0 {
            tracing::info!(pet_id, client_id, "deleted pet");
        }
        Ok(rows_affected > 0)
    }
}

fn pet_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Pet> {
    let gender: String = row.get(6)?;
    Ok(Pet {
        pet_id: row.get(0)?,
        client_id: row.get(1)?,
        type_id: row.get(2)?,
        type_name: row.get(3)?,
        name: row.get(4)?,
        breed: row.get(5)?,
        gender: Gender::parse(&gender),
        birth_date: row.get(7)?,
        color: row.get(8)?,
        special_marks: row.get(9)?,
        notes: row.get(10)?,
        medical_records_count: row.get(11)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hash_password;
    use crate::models::NewClient;
    use chrono::NaiveDate;

    fn setup_db() -> (Database, i64) {
        let db = Database::open_in_memory().unwrap();
        let client = NewClient::new("Ivan".into(), "+79001234567".into());
        let client_id = db.insert_client(&client, &hash_password("secret1")).unwrap();
        (db, client_id)
    }

    #[test]
    fn test_animal_types_seeded() {
        let (db, _) = setup_db();
        let types = db.list_animal_types().unwrap();
        assert_eq!(types.len(), 6);
        assert_eq!(types[0].name, "Cat");
    }

    #[test]
    fn test_insert_and_list_pets() {
        let (db, client_id) = setup_db();

        let mut barsik = NewPet::new(client_id, 1, "Barsik".into());
        barsik.gender = Gender::Male;
        barsik.birth_date = NaiveDate::from_ymd_opt(2020, 5, 1);
        barsik.breed = Some("".into());
        let pet = db.insert_pet(&barsik).unwrap();
        assert_eq!(pet.type_name, "Cat");
        assert_eq!(pet.breed, None);
        assert_eq!(pet.medical_records_count, 0);

        db.insert_pet(&NewPet::new(client_id, 2, "Arnold".into())).unwrap();

        let pets = db.list_pets_for_client(client_id).unwrap();
        let names: Vec<_> = pets.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Arnold", "Barsik"]);
        assert_eq!(pets[1].birth_date, NaiveDate::from_ymd_opt(2020, 5, 1));
        assert_eq!(pets[1].gender, Gender::Male);
    }

    #[test]
    fn test_insert_pet_validation() {
        let (db, client_id) = setup_db();

        let blank = NewPet::new(client_id, 1, "  ".into());
        assert!(matches!(db.insert_pet(&blank), Err(DbError::Constraint(_))));

        let bad_type = NewPet::new(client_id, 99, "Rex".into());
        assert!(matches!(db.insert_pet(&bad_type), Err(DbError::NotFound(_))));

        let bad_client = NewPet::new(client_id + 100, 1, "Rex".into());
        assert!(matches!(db.insert_pet(&bad_client), Err(DbError::NotFound(_))));
    }

    #[test]
    fn test_update_pet() {
        let (db, client_id) = setup_db();
        let mut pet = db.insert_pet(&NewPet::new(client_id, 1, "Barsik".into())).unwrap();

        pet.color = Some("ginger".into());
        pet.notes = Some("Afraid of the vacuum".into());
        assert!(db.update_pet(&pet).unwrap());

        let retrieved = db.get_pet(pet.pet_id).unwrap().unwrap();
        assert_eq!(retrieved.color, Some("ginger".into()));
        assert_eq!(retrieved.notes, Some("Afraid of the vacuum".into()));
    }

    #[test]
    fn test_delete_pet_requires_owner() {
        let (db, client_id) = setup_db();
        let pet = db.insert_pet(&NewPet::new(client_id, 1, "Barsik".into())).unwrap();

        assert!(!db.delete_pet(pet.pet_id, client_id + 1).unwrap());
        assert!(db.delete_pet(pet.pet_id, client_id).unwrap());
        assert!(db.get_pet(pet.pet_id).unwrap().is_none());
    }
}
