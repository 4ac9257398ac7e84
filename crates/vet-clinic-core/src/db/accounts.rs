//! Client and employee account operations.

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};

use super::{is_constraint_violation, non_empty, Database, DbError, DbResult};
use crate::auth::{hash_password, PasswordHash};
use crate::models::{
    Client, ClientSummary, CredentialRecord, Employee, NewClient, NewEmployee, ProfileUpdate, Role,
};

const CLIENT_COLUMNS: &str =
    "client_id, full_name, phone, email, login, image_url, created_at";

const EMPLOYEE_COLUMNS: &str = "employee_id, full_name, role_id, position, specialty, \
     experience_years, email, login, phone, birth_date, image_url";

impl Database {
    // =========================================================================
    // Clients
    // =========================================================================

    /// Insert a new client with an already-hashed password.
    pub fn insert_client(&self, client: &NewClient, password: &PasswordHash) -> DbResult<i64> {
        self.conn
            .execute(
                r#"
                INSERT INTO clients (
                    full_name, phone, email, login, image_url,
                    password_hash, password_salt, role_id
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
                params![
                    client.full_name,
                    client.phone,
                    non_empty(client.email.as_deref()),
                    non_empty(client.login.as_deref()),
                    non_empty(client.image_url.as_deref()),
                    password.hash,
                    password.salt,
                    Role::Client.id(),
                ],
            )
            .map_err(|e| {
                if is_constraint_violation(&e) {
                    DbError::Constraint(format!("client {} already exists", client.phone))
                } else {
                    e.into()
                }
            })?;
        let client_id = self.conn.last_insert_rowid();
        tracing::info!(client_id, "registered client");
        Ok(client_id)
    }

    /// Get a client by ID.
    pub fn get_client(&self, client_id: i64) -> DbResult<Option<Client>> {
        let sql = format!("SELECT {} FROM clients WHERE client_id = ?", CLIENT_COLUMNS);
        self.conn
            .query_row(&sql, [client_id], |row| {
                Ok(Client {
                    client_id: row.get(0)?,
                    full_name: row.get(1)?,
                    phone: row.get(2)?,
                    email: row.get(3)?,
                    login: row.get(4)?,
                    image_url: row.get(5)?,
                    created_at: row.get(6)?,
                })
            })
            .optional()
            .map_err(Into::into)
    }

    /// Check whether a phone number is already registered.
    pub fn phone_exists(&self, phone: &str) -> DbResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM clients WHERE phone = ?",
            [phone],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Find client credentials by login, email or phone.
    pub fn find_client_credentials(&self, identifier: &str) -> DbResult<Option<CredentialRecord>> {
        self.conn
            .query_row(
                r#"
                SELECT client_id, password_hash, password_salt
                FROM clients
                WHERE login = ?1 OR email = ?1 OR phone = ?1
                ORDER BY client_id
                LIMIT 1
                "#,
                [identifier],
                |row| {
                    Ok(CredentialRecord {
                        account_id: row.get(0)?,
                        role: Role::Client,
                        password_hash: row.get(1)?,
                        password_salt: row.get(2)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// Get credentials for a known client.
    pub fn client_credentials(&self, client_id: i64) -> DbResult<Option<CredentialRecord>> {
        self.conn
            .query_row(
                "SELECT client_id, password_hash, password_salt FROM clients WHERE client_id = ?",
                [client_id],
                |row| {
                    Ok(CredentialRecord {
                        account_id: row.get(0)?,
                        role: Role::Client,
                        password_hash: row.get(1)?,
                        password_salt: row.get(2)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// Replace a client's password.
    pub fn set_client_password(&self, client_id: i64, password: &PasswordHash) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE clients SET password_hash = ?2, password_salt = ?3 WHERE client_id = ?1",
            params![client_id, password.hash, password.salt],
        )?;
        if rows_affected > 0 {
            tracing::info!(client_id, "client password changed");
        }
        Ok(rows_affected > 0)
    }

    /// Update name, phone and email of a client.
    pub fn update_client_profile(&self, client_id: i64, update: &ProfileUpdate) -> DbResult<bool> {
        let full_name = update.full_name.trim();
        let phone = update.phone.trim();
        if full_name.is_empty() || phone.is_empty() {
            return Err(DbError::Constraint(
                "full name and phone are required".into(),
            ));
        }
        let email = non_empty(update.email.as_deref());
        if let Some(email) = &email {
            if !email.contains('@') {
                return Err(DbError::Constraint(format!("invalid email: {}", email)));
            }
        }

        let rows_affected = self
            .conn
            .execute(
                r#"
                UPDATE clients SET
                    full_name = ?2,
                    phone = ?3,
                    email = ?4
                WHERE client_id = ?1
                "#,
                params![client_id, full_name, phone, email],
            )
            .map_err(|e| {
                if is_constraint_violation(&e) {
                    DbError::Constraint(format!("phone {} is used by another client", phone))
                } else {
                    e.into()
                }
            })?;

        if rows_affected > 0 {
            tracing::info!(client_id, "client profile updated");
        }
        Ok(rows_affected > 0)
    }

    /// Set or clear the client's profile picture.
    pub fn update_client_image(&self, client_id: i64, image_url: Option<&str>) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE clients SET image_url = ?2 WHERE client_id = ?1",
            params![client_id, non_empty(image_url)],
        )?;
        Ok(rows_affected > 0)
    }

    /// Profile counters: appointments booked and pets with medical records.
    pub fn client_summary(&self, client_id: i64) -> DbResult<ClientSummary> {
        let appointments_count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM appointments WHERE client_id = ?",
            [client_id],
            |row| row.get(0),
        )?;
        let pets_with_records_count: i64 = self.conn.query_row(
            r#"
            SELECT COUNT(DISTINCT m.pet_id)
            FROM medical_records m
            JOIN pets p ON p.pet_id = m.pet_id
            WHERE p.client_id = ?
            "#,
            [client_id],
            |row| row.get(0),
        )?;
        Ok(ClientSummary {
            appointments_count: appointments_count as u32,
            pets_with_records_count: pets_with_records_count as u32,
        })
    }

    // =========================================================================
    // Employees
    // =========================================================================

    /// Insert an employee account. The password is hashed here.
    pub fn insert_employee(&self, employee: &NewEmployee) -> DbResult<i64> {
        let password = hash_password(&employee.password);
        self.conn.execute(
            r#"
            INSERT INTO employees (
                full_name, role_id, position, specialty, experience_years,
                email, login, phone, image_url, password_hash, password_salt
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                employee.full_name,
                employee.role.id(),
                employee.position,
                employee.specialty,
                employee.experience_years,
                non_empty(employee.email.as_deref()),
                non_empty(employee.login.as_deref()),
                non_empty(employee.phone.as_deref()),
                non_empty(employee.image_url.as_deref()),
                password.hash,
                password.salt,
            ],
        )?;
        let employee_id = self.conn.last_insert_rowid();
        tracing::info!(employee_id, role = employee.role.as_str(), "added employee");
        Ok(employee_id)
    }

    /// Get an employee by ID.
    pub fn get_employee(&self, employee_id: i64) -> DbResult<Option<Employee>> {
        let sql = format!(
            "SELECT {} FROM employees WHERE employee_id = ?",
            EMPLOYEE_COLUMNS
        );
        self.conn
            .query_row(&sql, [employee_id], employee_row)
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// Find employee credentials by login or email.
    pub fn find_employee_credentials(
        &self,
        identifier: &str,
    ) -> DbResult<Option<CredentialRecord>> {
        let found = self
            .conn
            .query_row(
                r#"
                SELECT employee_id, role_id, password_hash, password_salt
                FROM employees
                WHERE login = ?1 OR email = ?1
                ORDER BY employee_id
                LIMIT 1
                "#,
                [identifier],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, Option<String>>(3)?,
                    ))
                },
            )
            .optional()?;

        found
            .map(|(account_id, role_id, password_hash, password_salt)| {
                Ok(CredentialRecord {
                    account_id,
                    role: role_from_id(role_id)?,
                    password_hash,
                    password_salt,
                })
            })
            .transpose()
    }

    /// Update the editable part of an employee profile.
    pub fn update_employee_profile(
        &self,
        employee_id: i64,
        email: Option<&str>,
        birth_date: Option<NaiveDate>,
    ) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE employees SET email = ?2, birth_date = ?3 WHERE employee_id = ?1",
            params![employee_id, non_empty(email), birth_date],
        )?;
        if rows_affected > 0 {
            tracing::info!(employee_id, "employee profile updated");
        }
        Ok(rows_affected > 0)
    }

    /// List veterinarians available for booking.
    pub fn list_veterinarians(&self) -> DbResult<Vec<Employee>> {
        let sql = format!(
            "SELECT {} FROM employees WHERE role_id = ? ORDER BY full_name",
            EMPLOYEE_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([Role::Veterinarian.id()], employee_row)?;

        let mut vets = Vec::new();
        for row in rows {
            vets.push(row?.try_into()?);
        }
        Ok(vets)
    }
}

/// Intermediate row struct for database mapping.
struct EmployeeRow {
    employee_id: i64,
    full_name: String,
    role_id: i64,
    position: Option<String>,
    specialty: Option<String>,
    experience_years: u32,
    email: Option<String>,
    login: Option<String>,
    phone: Option<String>,
    birth_date: Option<String>,
    image_url: Option<String>,
}

fn employee_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<EmployeeRow> {
    Ok(EmployeeRow {
        employee_id: row.get(0)?,
        full_name: row.get(1)?,
        role_id: row.get(2)?,
        position: row.get(3)?,
        specialty: row.get(4)?,
        experience_years: row.get(5)?,
        email: row.get(6)?,
        login: row.get(7)?,
        phone: row.get(8)?,
        birth_date: row.get(9)?,
        image_url: row.get(10)?,
    })
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = DbError;

    fn try_from(row: EmployeeRow) -> Result<Self, Self::Error> {
        Ok(Employee {
            employee_id: row.employee_id,
            full_name: row.full_name,
            role: role_from_id(row.role_id)?,
            position: row.position,
            specialty: row.specialty,
            experience_years: row.experience_years,
            email: row.email,
            login: row.login,
            phone: row.phone,
            birth_date: row.birth_date,
            image_url: row.image_url,
        })
    }
}

fn role_from_id(role_id: i64) -> DbResult<Role> {
    Role::from_id(role_id).ok_or_else(|| DbError::Constraint(format!("Unknown role id: {}", role_id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn add_client(db: &Database, name: &str, phone: &str) -> i64 {
        let client = NewClient::new(name.into(), phone.into());
        db.insert_client(&client, &hash_password("secret1")).unwrap()
    }

    #[test]
    fn test_insert_and_get_client() {
        let db = setup_db();
        let mut client = NewClient::new("Ivan Ivanov".into(), "+79001234567".into());
        client.image_url = Some("  ".into());
        let id = db.insert_client(&client, &hash_password("secret1")).unwrap();

        let retrieved = db.get_client(id).unwrap().unwrap();
        assert_eq!(retrieved.full_name, "Ivan Ivanov");
        assert_eq!(retrieved.phone, "+79001234567");
        assert_eq!(retrieved.image_url, None);
        assert!(db.phone_exists("+79001234567").unwrap());
        assert!(!db.phone_exists("+79000000000").unwrap());
    }

    #[test]
    fn test_duplicate_phone_rejected() {
        let db = setup_db();
        add_client(&db, "Ivan", "+79001234567");

        let client = NewClient::new("Other".into(), "+79001234567".into());
        let result = db.insert_client(&client, &hash_password("secret1"));
        assert!(matches!(result, Err(DbError::Constraint(_))));
    }

    #[test]
    fn test_find_client_by_any_identifier() {
        let db = setup_db();
        let mut client = NewClient::new("Ivan".into(), "+79001234567".into());
        client.email = Some("ivan@example.com".into());
        client.login = Some("ivan".into());
        let id = db.insert_client(&client, &hash_password("secret1")).unwrap();

        for identifier in ["ivan", "ivan@example.com", "+79001234567"] {
            let creds = db.find_client_credentials(identifier).unwrap().unwrap();
            assert_eq!(creds.account_id, id);
            assert_eq!(creds.role, Role::Client);
        }
        assert!(db.find_client_credentials("nobody").unwrap().is_none());
    }

    #[test]
    fn test_update_profile() {
        let db = setup_db();
        let id = add_client(&db, "Ivan", "+79001234567");

        let update = ProfileUpdate {
            full_name: "Ivan Petrov".into(),
            phone: "+79007654321".into(),
            email: Some("ivan@example.com".into()),
        };
        assert!(db.update_client_profile(id, &update).unwrap());

        let client = db.get_client(id).unwrap().unwrap();
        assert_eq!(client.full_name, "Ivan Petrov");
        assert_eq!(client.email, Some("ivan@example.com".into()));
    }

    #[test]
    fn test_update_profile_validation() {
        let db = setup_db();
        let id = add_client(&db, "Ivan", "+79001234567");
        add_client(&db, "Maria", "+79005555555");

        let bad_email = ProfileUpdate {
            full_name: "Ivan".into(),
            phone: "+79001234567".into(),
            email: Some("not-an-email".into()),
        };
        assert!(matches!(
            db.update_client_profile(id, &bad_email),
            Err(DbError::Constraint(_))
        ));

        let taken_phone = ProfileUpdate {
            full_name: "Ivan".into(),
            phone: "+79005555555".into(),
            email: None,
        };
        assert!(matches!(
            db.update_client_profile(id, &taken_phone),
            Err(DbError::Constraint(_))
        ));

        let blank_name = ProfileUpdate {
            full_name: "  ".into(),
            phone: "+79001234567".into(),
            email: None,
        };
        assert!(db.update_client_profile(id, &blank_name).is_err());
    }

    #[test]
    fn test_employee_round_trip() {
        let db = setup_db();
        let mut vet = NewEmployee::new("Dr. Anna Smirnova".into(), Role::Veterinarian, "vetpass".into());
        vet.position = Some("Surgeon".into());
        vet.experience_years = 8;
        vet.login = Some("smirnova".into());
        let id = db.insert_employee(&vet).unwrap();

        let employee = db.get_employee(id).unwrap().unwrap();
        assert_eq!(employee.role, Role::Veterinarian);
        assert_eq!(employee.position, Some("Surgeon".into()));
        assert_eq!(employee.experience_years, 8);

        let creds = db.find_employee_credentials("smirnova").unwrap().unwrap();
        assert_eq!(creds.account_id, id);
        assert_eq!(creds.role, Role::Veterinarian);
    }

    #[test]
    fn test_list_veterinarians_excludes_admins() {
        let db = setup_db();
        db.insert_employee(&NewEmployee::new("Zoe Vet".into(), Role::Veterinarian, "pw1234".into()))
            .unwrap();
        db.insert_employee(&NewEmployee::new("Adam Vet".into(), Role::Veterinarian, "pw1234".into()))
            .unwrap();
        db.insert_employee(&NewEmployee::new("Boss".into(), Role::Administrator, "pw1234".into()))
            .unwrap();

        let vets = db.list_veterinarians().unwrap();
        let names: Vec<_> = vets.iter().map(|v| v.full_name.as_str()).collect();
        assert_eq!(names, vec!["Adam Vet", "Zoe Vet"]);
    }

    #[test]
    fn test_update_employee_profile() {
        let db = setup_db();
        let id = db
            .insert_employee(&NewEmployee::new("Dr. Vet".into(), Role::Veterinarian, "pw1234".into()))
            .unwrap();

        let birth = NaiveDate::from_ymd_opt(1985, 4, 12).unwrap();
        assert!(db
            .update_employee_profile(id, Some("vet@clinic.test"), Some(birth))
            .unwrap());

        let employee = db.get_employee(id).unwrap().unwrap();
        assert_eq!(employee.email, Some("vet@clinic.test".into()));
        assert_eq!(employee.birth_date, Some("1985-04-12".into()));
    }
}
